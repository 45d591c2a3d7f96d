#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::error::TodoError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Creation timestamp in milliseconds since the Unix epoch, bumped past the
/// largest id in the list when the clock has not advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|e| TodoError::Other(format!("invalid task id '{s}': {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    #[must_use]
    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TodoError::InvalidPriority(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Work,
    Personal,
    Errand,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Errand];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Errand => "Errand",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    #[must_use]
    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TodoError::InvalidCategory(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TodoError::InvalidFilter(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(rename = "prio", default)]
    pub priority: Priority,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(rename = "cat", default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    #[must_use]
    pub fn date_string(&self) -> String {
        self.date.map(format_date).unwrap_or_default()
    }
}

pub fn parse_date(input: &str) -> Result<Date, TodoError> {
    Date::parse(input.trim(), DATE_FORMAT).map_err(|_| TodoError::InvalidDate(input.to_owned()))
}

/// Empty input means "no date".
pub fn parse_optional_date(input: &str) -> Result<Option<Date>, TodoError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_date(input).map(Some)
}

#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_default()
}

fn cycle<T: Copy + PartialEq>(all: &[T], cur: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == cur).unwrap_or(0);
    all[(idx + step) % all.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn persisted_shape_uses_short_field_names() {
        let task = Task {
            id: TaskId(1_700_000_000_000),
            text: "Buy milk".to_owned(),
            priority: Priority::High,
            date: Some(date!(2024 - 05 - 01)),
            category: Category::Errand,
            completed: false,
        };
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["id"], 1_700_000_000_000u64);
        assert_eq!(v["prio"], "High");
        assert_eq!(v["cat"], "Errand");
        assert_eq!(v["date"], "2024-05-01");
        assert_eq!(v["completed"], false);
    }

    #[test]
    fn null_date_and_missing_fields_use_defaults() {
        let raw = r#"{"id": 5, "text": "x", "date": null}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.date, None);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, Category::Work);
        assert!(!task.completed);
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Errand ".parse::<Category>().unwrap(), Category::Errand);
        assert_eq!("ACTIVE".parse::<Filter>().unwrap(), Filter::Active);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("home".parse::<Category>().is_err());
        assert!("done".parse::<Filter>().is_err());
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(Priority::High.next(), Priority::Low);
        assert_eq!(Priority::Low.prev(), Priority::High);
        assert_eq!(Category::Errand.next(), Category::Work);
        assert_eq!(Filter::Completed.next(), Filter::All);
    }

    #[test]
    fn dates_parse_and_format() {
        let d = parse_date("2025-12-31").unwrap();
        assert_eq!(format_date(d), "2025-12-31");
        assert!(parse_date("31/12/2025").is_err());
        assert_eq!(parse_optional_date("  ").unwrap(), None);
    }
}
