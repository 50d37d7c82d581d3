use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Errors raised by task store operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no tasks recorded for {0}")]
    NoTasksForDay(DayKey),

    #[error("invalid day key {0:?}, expected YYYY-MM-DD")]
    InvalidDayKey(String),
}

/// Canonical `YYYY-MM-DD` identifier of a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Saturday and Sunday
    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for DayKey {
    type Err = StoreError;

    /// Only the zero-padded form is accepted, so "2024-3-5" is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, DAY_KEY_FORMAT)
            .map_err(|_| StoreError::InvalidDayKey(s.to_string()))?;
        if date.format(DAY_KEY_FORMAT).to_string() != s {
            return Err(StoreError::InvalidDayKey(s.to_string()));
        }
        Ok(Self(date))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-day task lists keyed by day.
///
/// Insertion order within a day is display order and duplicates are allowed.
/// Serialized as a plain JSON object: `{"2024-03-15": ["Write report"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    days: BTreeMap<DayKey, Vec<String>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no day has ever been recorded
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of recorded days, including days whose list was emptied
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Tasks for a day, empty when the day has none
    pub fn tasks(&self, day: &DayKey) -> &[String] {
        self.days.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DayKey, &Vec<String>)> {
        self.days.iter()
    }

    /// Append a task to the end of the day's list, creating it if needed
    pub fn add_task(&mut self, day: DayKey, text: impl Into<String>) {
        self.days.entry(day).or_default().push(text.into());
    }

    /// Remove every task on `day` equal to `text`.
    ///
    /// Returns how many entries were dropped. The day itself stays recorded
    /// even when its list becomes empty.
    pub fn remove_task(&mut self, day: &DayKey, text: &str) -> Result<usize, StoreError> {
        let tasks = self
            .days
            .get_mut(day)
            .ok_or(StoreError::NoTasksForDay(*day))?;
        let before = tasks.len();
        tasks.retain(|t| t != text);
        Ok(before - tasks.len())
    }
}

/// Which grid algorithm the calendar renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Month => ViewMode::Week,
            ViewMode::Week => ViewMode::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(ViewMode::Month),
            "week" => Ok(ViewMode::Week),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Navigation step for the focus date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Direction::Next),
            "prev" => Ok(Direction::Prev),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// A concrete day in the rendered grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub day: DayKey,
    pub tasks: Vec<String>,
    pub is_today: bool,
}

/// One slot of the rendered grid, recomputed on every render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayCell {
    Padding,
    Day(DayView),
}

impl DisplayCell {
    pub fn as_day(&self) -> Option<&DayView> {
        match self {
            DisplayCell::Padding => None,
            DisplayCell::Day(view) => Some(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    // ========== DayKey tests ==========

    #[test]
    fn test_day_key_roundtrips_display() {
        assert_eq!(key("2024-03-15").to_string(), "2024-03-15");
    }

    #[test]
    fn test_day_key_rejects_non_canonical() {
        assert_eq!(
            "2024-3-5".parse::<DayKey>(),
            Err(StoreError::InvalidDayKey("2024-3-5".to_string()))
        );
        assert!("2024-02-30".parse::<DayKey>().is_err());
        assert!("tomorrow".parse::<DayKey>().is_err());
        assert!("".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_day_key_weekend() {
        assert!(key("2024-03-16").is_weekend()); // Saturday
        assert!(key("2024-03-17").is_weekend()); // Sunday
        assert!(!key("2024-03-15").is_weekend()); // Friday
        assert!(!key("2024-03-18").is_weekend()); // Monday
    }

    // ========== TaskStore tests ==========

    #[test]
    fn test_add_task_preserves_insertion_order() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Write report");
        store.add_task(key("2024-03-15"), "Review PR");

        assert_eq!(store.tasks(&key("2024-03-15")), ["Write report", "Review PR"]);
    }

    #[test]
    fn test_add_task_accepts_empty_and_duplicates() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "");
        store.add_task(key("2024-03-15"), "Call mom");
        store.add_task(key("2024-03-15"), "Call mom");

        assert_eq!(store.tasks(&key("2024-03-15")), ["", "Call mom", "Call mom"]);
    }

    #[test]
    fn test_tasks_for_missing_day_is_empty() {
        let store = TaskStore::new();
        assert!(store.tasks(&key("2024-03-15")).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_task_removes_all_matches() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Gym");
        store.add_task(key("2024-03-15"), "Read");
        store.add_task(key("2024-03-15"), "Gym");

        let removed = store.remove_task(&key("2024-03-15"), "Gym").unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.tasks(&key("2024-03-15")), ["Read"]);
    }

    #[test]
    fn test_remove_absent_task_leaves_list_unchanged() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Read");

        let removed = store.remove_task(&key("2024-03-15"), "Gym").unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.tasks(&key("2024-03-15")), ["Read"]);
    }

    #[test]
    fn test_remove_task_on_unknown_day_fails() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Read");
        let before = store.clone();

        let err = store.remove_task(&key("2024-03-16"), "Read").unwrap_err();

        assert_eq!(err, StoreError::NoTasksForDay(key("2024-03-16")));
        assert_eq!(store, before);
    }

    #[test]
    fn test_remove_last_task_keeps_day() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Read");
        store.remove_task(&key("2024-03-15"), "Read").unwrap();

        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
        assert!(store.tasks(&key("2024-03-15")).is_empty());
    }

    #[test]
    fn test_task_store_json_shape() {
        let mut store = TaskStore::new();
        store.add_task(key("2024-03-15"), "Write report");

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"2024-03-15":["Write report"]}"#);
    }

    #[test]
    fn test_task_store_rejects_invalid_keys() {
        let json = r#"{"2024-03-15":["ok"],"not-a-date":["bad"]}"#;
        assert!(serde_json::from_str::<TaskStore>(json).is_err());
    }

    // ========== ViewMode / Direction tests ==========

    #[test]
    fn test_view_mode_toggle() {
        assert_eq!(ViewMode::Month.toggle(), ViewMode::Week);
        assert_eq!(ViewMode::Week.toggle(), ViewMode::Month);
        assert_eq!(ViewMode::default(), ViewMode::Month);
    }

    #[test]
    fn test_parse_mode_and_direction() {
        assert_eq!("week".parse::<ViewMode>(), Ok(ViewMode::Week));
        assert!("year".parse::<ViewMode>().is_err());
        assert_eq!("prev".parse::<Direction>(), Ok(Direction::Prev));
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_display_cell_serialization() {
        let cell = DisplayCell::Day(DayView {
            day: key("2024-03-15"),
            tasks: vec!["Read".to_string()],
            is_today: true,
        });

        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"day","day":"2024-03-15","tasks":["Read"],"is_today":true}"#
        );
        assert_eq!(
            serde_json::to_string(&DisplayCell::Padding).unwrap(),
            r#"{"kind":"padding"}"#
        );
    }
}
