//! Plain-text rendering for `calendario show`

use std::fmt::Write;

use crate::types::DisplayCell;
use crate::view::CalendarPage;

const CELL_WIDTH: usize = 5;

/// Render the grid as rows of seven cells followed by the tasks of each day.
///
/// Days with tasks show their count, today is marked with `*`.
pub fn render_grid(page: &CalendarPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", page.title);
    for name in ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"] {
        let _ = write!(out, "{name:>width$}", width = CELL_WIDTH);
    }
    out.push('\n');

    for row in page.cells.chunks(7) {
        for cell in row {
            let label = match cell {
                DisplayCell::Padding => String::new(),
                DisplayCell::Day(view) => {
                    let mut label = view.day.date().format("%-d").to_string();
                    if view.is_today {
                        label.push('*');
                    }
                    if !view.tasks.is_empty() {
                        let _ = write!(label, "+{}", view.tasks.len());
                    }
                    label
                }
            };
            let _ = write!(out, "{label:>width$}", width = CELL_WIDTH);
        }
        out.push('\n');
    }

    let days_with_tasks = page
        .cells
        .iter()
        .filter_map(DisplayCell::as_day)
        .filter(|view| !view.tasks.is_empty());
    for view in days_with_tasks {
        let _ = writeln!(out, "\n{}", view.day);
        for task in &view.tasks {
            let _ = writeln!(out, "  - {task}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::derive_cells;
    use crate::types::{DayKey, TaskStore, ViewMode};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_render_grid_month() {
        let mut store = TaskStore::new();
        store.add_task(DayKey::new(d(2024, 3, 15)), "Write report");
        store.add_task(DayKey::new(d(2024, 3, 15)), "Review PR");
        let page = CalendarPage {
            title: "March 2024".to_string(),
            mode: ViewMode::Month,
            focus: DayKey::new(d(2024, 3, 15)),
            cells: derive_cells(&store, d(2024, 3, 15), ViewMode::Month, d(2024, 3, 1)),
        };

        let out = render_grid(&page);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "March 2024");
        assert_eq!(lines[1], "   Mo   Tu   We   Th   Fr   Sa   Su");
        assert_eq!(lines[2], format!("{}{:>5}{:>5}{:>5}", " ".repeat(20), "1*", "2", "3"));
        assert!(lines[4].contains("15+2"));
        assert!(out.contains("\n2024-03-15\n  - Write report\n  - Review PR\n"));
    }
}
