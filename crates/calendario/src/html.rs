use anyhow::Result;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::types::{DayKey, DayView, DisplayCell, ViewMode};
use crate::view::CalendarPage;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Write a static snapshot of the page (forms will not work without the server)
pub fn generate_html(page: &CalendarPage, path: &Path) -> Result<()> {
    let html = render_page(page);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(page: &CalendarPage) -> Markup {
    let toggle_label = match page.mode {
        ViewMode::Month => "Week view",
        ViewMode::Week => "Month view",
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Calendario - " (page.title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    div.header {
                        div.nav {
                            form method="post" action="/navigate/prev" {
                                button type="submit" title="Previous" { (PreEscaped("&uarr;")) }
                            }
                            form method="post" action="/navigate/next" {
                                button type="submit" title="Next" { (PreEscaped("&darr;")) }
                            }
                        }
                        h2.title { (page.title) }
                        form method="post" action="/mode" {
                            button.mode-toggle type="submit" data-mode=(page.mode.as_str()) {
                                (toggle_label)
                            }
                        }
                    }
                    div.day-names {
                        @for name in DAY_NAMES {
                            div { (name) }
                        }
                    }
                    div.calendar-grid {
                        @for cell in &page.cells {
                            @match cell {
                                DisplayCell::Padding => {
                                    div.padding {}
                                }
                                DisplayCell::Day(view) => {
                                    (render_day_cell(view))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A single day: its tasks in order plus add and remove controls.
///
/// Controls only become visible while the pointer is over the cell.
pub fn render_day_cell(view: &DayView) -> Markup {
    let day = view.day.to_string();
    let add_action = format!("/days/{day}/tasks");
    let remove_action = format!("/days/{day}/tasks/remove");

    html! {
        div.day-cell.weekend[view.day.is_weekend()].today[view.is_today] data-day=(day) {
            h3 { (day) }
            ul.tasks {
                @for (idx, task) in view.tasks.iter().enumerate() {
                    li.task {
                        div.swatch style={ "background: " (accent_color(&view.day, idx, task)) } {}
                        span.task-text { (task) }
                        form.controls.remove method="post" action=(remove_action) {
                            input type="hidden" name="text" value=(task);
                            button type="submit" title="Remove task" { "x" }
                        }
                    }
                }
            }
            form.controls.add method="post" action=(add_action) {
                input type="text" name="text" placeholder="Enter a task";
                button type="submit" title="Add task" { "+" }
            }
        }
    }
}

/// Decorative swatch colour, stable for a given task slot
pub fn accent_color(day: &DayKey, position: usize, task: &str) -> String {
    let mut hasher = DefaultHasher::new();
    day.hash(&mut hasher);
    position.hash(&mut hasher);
    task.hash(&mut hasher);
    format!("#{:06x}", hasher.finish() & 0x00ff_ffff)
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #fafafa;
    color: #222;
}

.container {
    width: 80%;
    margin: 0 auto;
    padding: 24px 0;
}

.header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 16px;
}

.nav {
    display: flex;
    gap: 4px;
}

.title {
    font-size: 1.5rem;
    font-weight: bold;
}

.day-names,
.calendar-grid {
    display: grid;
    grid-template-columns: repeat(7, 1fr);
    gap: 8px;
}

.day-names {
    text-align: center;
    margin-bottom: 8px;
}

.calendar-grid {
    padding: 16px;
}

.day-cell {
    background: #f0f0f0;
    padding: 8px;
    position: relative;
    border-radius: 8px;
    display: flex;
    flex-direction: column;
    justify-content: space-between;
    min-height: 150px;
    overflow: hidden;
    border: 2px solid transparent;
}

.day-cell.weekend {
    background: #d0d0d0;
}

.day-cell.today {
    border-color: lightgreen;
}

.day-cell h3 {
    font-size: 0.9rem;
}

.tasks {
    list-style: none;
}

.task {
    background: white;
    border-radius: 5px;
    min-height: 50px;
    position: relative;
    margin-bottom: 3px;
    padding: 0 4px 4px;
}

.swatch {
    height: 5px;
    width: 25px;
    border-radius: 4px;
    margin: 3px 0;
}

.controls {
    visibility: hidden;
}

.day-cell:hover .controls {
    visibility: visible;
}

.controls.remove {
    position: absolute;
    top: 0;
    right: 0;
}

.controls.remove button {
    padding: 4px 8px;
    border-radius: 4px;
    border: none;
    cursor: pointer;
}

.controls.add {
    display: flex;
    gap: 4px;
}

.controls.add input {
    flex: 1;
    min-width: 0;
}
"#;
