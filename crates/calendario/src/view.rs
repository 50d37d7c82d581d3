//! The calendar state container
//!
//! [`CalendarView`] is the only owner of the task store, the focus date and
//! the view mode. Every mutation goes through it and is followed by an
//! explicit [`CalendarView::persist`].

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, info, warn};

use crate::calendar;
use crate::db::LocalStorage;
use crate::types::{DayKey, Direction, DisplayCell, TaskStore, ViewMode};

/// Storage slot holding the serialized task store
pub const TASKS_SLOT: &str = "tasks";

/// Source of task text supplied by the host UI
pub trait TaskPrompt {
    /// Ask the user for a task on `day`; `None` means they declined
    fn request_task(&mut self, day: &DayKey) -> Option<String>;
}

/// An answer that is already known, e.g. a submitted form field
#[derive(Debug, Clone, Default)]
pub struct FixedAnswer(pub Option<String>);

impl TaskPrompt for FixedAnswer {
    fn request_task(&mut self, _day: &DayKey) -> Option<String> {
        self.0.take()
    }
}

/// Reads a single line from a buffered reader, typically stdin
pub struct StdinPrompt<R> {
    reader: R,
}

impl<R: BufRead> StdinPrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> TaskPrompt for StdinPrompt<R> {
    fn request_task(&mut self, day: &DayKey) -> Option<String> {
        eprint!("Enter a task for {day}: ");
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read task text");
                None
            }
        }
    }
}

/// Everything the page renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct CalendarPage {
    pub title: String,
    pub mode: ViewMode,
    pub focus: DayKey,
    pub cells: Vec<DisplayCell>,
}

pub struct CalendarView {
    store: TaskStore,
    focus: NaiveDate,
    mode: ViewMode,
    storage: Box<dyn LocalStorage + Send>,
}

impl CalendarView {
    /// Build the view, adopting any previously persisted task store.
    ///
    /// A missing, unreadable or malformed snapshot starts an empty store.
    pub fn initialize(storage: Box<dyn LocalStorage + Send>, focus: NaiveDate) -> Self {
        let store = load_store(storage.as_ref());
        let tasks: usize = store.iter().map(|(_, tasks)| tasks.len()).sum();
        info!(
            days = store.len(),
            tasks = tasks,
            focus = %DayKey::new(focus),
            "Calendar initialized"
        );

        Self {
            store,
            focus,
            mode: ViewMode::default(),
            storage,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn focus(&self) -> NaiveDate {
        self.focus
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Write the full store to its slot. Empty stores are never written.
    ///
    /// Returns whether a write happened.
    pub fn persist(&mut self) -> Result<bool> {
        if self.store.is_empty() {
            debug!("Store empty, skipping persist");
            return Ok(false);
        }

        let json = serde_json::to_string(&self.store).context("Failed to serialize tasks")?;
        self.storage.set(TASKS_SLOT, &json)?;
        debug!(days = self.store.len(), "Tasks persisted");
        Ok(true)
    }

    pub fn add_task(&mut self, day: DayKey, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        debug!(day = %day, task = %text, "Adding task");
        self.store.add_task(day, text);
        self.persist()?;
        Ok(())
    }

    /// Ask `prompt` for the task text and add it; declining adds an empty task
    pub fn add_task_from(&mut self, day: DayKey, prompt: &mut dyn TaskPrompt) -> Result<()> {
        let text = prompt.request_task(&day).unwrap_or_default();
        self.add_task(day, text)
    }

    /// Remove every task on `day` equal to `text`.
    ///
    /// Fails with [`crate::types::StoreError::NoTasksForDay`] when the day was
    /// never recorded; the store is left untouched in that case.
    pub fn remove_task(&mut self, day: &DayKey, text: &str) -> Result<usize> {
        let removed = self.store.remove_task(day, text)?;
        debug!(day = %day, task = %text, removed = removed, "Removed task");
        self.persist()?;
        Ok(removed)
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.focus = calendar::navigate(self.focus, self.mode, direction);
        debug!(focus = %DayKey::new(self.focus), mode = self.mode.as_str(), "Navigated");
    }

    /// Flip between month and week grids; the focus date is kept
    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = self.mode.toggle();
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn set_focus(&mut self, focus: NaiveDate) {
        self.focus = focus;
    }

    pub fn cells(&self, today: NaiveDate) -> Vec<DisplayCell> {
        calendar::derive_cells(&self.store, self.focus, self.mode, today)
    }

    pub fn page(&self, today: NaiveDate) -> CalendarPage {
        CalendarPage {
            title: calendar::title(self.focus, self.mode),
            mode: self.mode,
            focus: DayKey::new(self.focus),
            cells: self.cells(today),
        }
    }
}

fn load_store(storage: &(dyn LocalStorage + Send)) -> TaskStore {
    let raw = match storage.get(TASKS_SLOT) {
        Ok(Some(raw)) => raw,
        Ok(None) => return TaskStore::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read saved tasks, starting empty");
            return TaskStore::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Discarding malformed saved tasks");
            TaskStore::new()
        }
    }
}
