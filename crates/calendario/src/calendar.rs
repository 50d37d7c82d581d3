//! Calendar grid arithmetic
//!
//! Grids are Monday-first. A month grid is prefixed with one padding slot per
//! weekday before the 1st and is not padded after the last day; a week grid is
//! always the seven days starting on the Monday on or before the focus date.

use chrono::{Datelike, Days, NaiveDate};

use crate::types::{DayKey, DayView, Direction, DisplayCell, TaskStore, ViewMode};

/// Weekday index with Monday = 0 and Sunday = 6
pub fn monday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .count() as u32
}

/// Grid for the month containing `focus`: leading `None` padding, then every day
pub fn month_cells(focus: NaiveDate) -> Vec<Option<NaiveDate>> {
    let first = first_of_month(focus);
    let padding = monday_index(first) as usize;

    std::iter::repeat(None)
        .take(padding)
        .chain(
            first
                .iter_days()
                .take_while(|d| d.month() == first.month())
                .map(Some),
        )
        .collect()
}

/// The seven consecutive days of the Monday-first week containing `focus`
pub fn week_cells(focus: NaiveDate) -> Vec<NaiveDate> {
    let monday = focus
        .checked_sub_days(Days::new(u64::from(monday_index(focus))))
        .unwrap_or(focus);
    monday.iter_days().take(7).collect()
}

/// Move `date` by `months` calendar months.
///
/// The day-of-month is kept as an offset from the 1st of the target month, so
/// it overflows into the following month when the target is shorter:
/// 2024-01-31 + 1 month is 2024-03-02. This is not reversible in general.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(Days::new(u64::from(date.day0()))))
        .unwrap_or(date)
}

/// Next focus date for a navigation step in the given mode
pub fn navigate(focus: NaiveDate, mode: ViewMode, direction: Direction) -> NaiveDate {
    match (mode, direction) {
        (ViewMode::Month, Direction::Next) => shift_months(focus, 1),
        (ViewMode::Month, Direction::Prev) => shift_months(focus, -1),
        (ViewMode::Week, Direction::Next) => focus.checked_add_days(Days::new(7)).unwrap_or(focus),
        (ViewMode::Week, Direction::Prev) => focus.checked_sub_days(Days::new(7)).unwrap_or(focus),
    }
}

/// Build the display cells for the current focus and mode.
///
/// Pure: tasks are copied out of `store`, and `is_today` compares calendar
/// dates only.
pub fn derive_cells(
    store: &TaskStore,
    focus: NaiveDate,
    mode: ViewMode,
    today: NaiveDate,
) -> Vec<DisplayCell> {
    let day_cell = |date: NaiveDate| {
        let day = DayKey::new(date);
        DisplayCell::Day(DayView {
            tasks: store.tasks(&day).to_vec(),
            is_today: date == today,
            day,
        })
    };

    match mode {
        ViewMode::Month => month_cells(focus)
            .into_iter()
            .map(|slot| slot.map_or(DisplayCell::Padding, day_cell))
            .collect(),
        ViewMode::Week => week_cells(focus).into_iter().map(day_cell).collect(),
    }
}

/// Heading shown above the grid
pub fn title(focus: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Month => focus.format("%B %Y").to_string(),
        ViewMode::Week => {
            let monday = week_cells(focus).first().copied().unwrap_or(focus);
            format!("Week of {}", DayKey::new(monday))
        }
    }
}
