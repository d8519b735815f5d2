//! Typed payloads of the PTO server's JSON endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

pub type UserId = u64;
pub type EntryId = u64;

// --- calendar ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    pub id: u64,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mine: bool,
}

impl CalendarEvent {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegendColor {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarFeed {
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub colors: Vec<LegendColor>,
}

// --- list ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListData {
    #[serde(rename = "aaData", default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Column headings of the list table, in server column order.
pub const LIST_COLUMNS: [&str; 10] = [
    "Email", "First name", "Last name", "Added", "Days", "Start", "End", "City", "Country",
    "Details",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub cells: Vec<String>,
}

impl ListRow {
    pub fn from_values(values: &[serde_json::Value]) -> Self {
        let cells = values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        Self { cells }
    }

    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl ListData {
    pub fn into_rows(self) -> Vec<ListRow> {
        self.rows.iter().map(|r| ListRow::from_values(r)).collect()
    }
}

// --- mobile ---

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub logged_in: bool,
}

/// Bare `{"ok": true}` acknowledgment.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Absence {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RightNow {
    #[serde(default)]
    pub now: Vec<Absence>,
    #[serde(default)]
    pub upcoming: Vec<Absence>,
}

/// A quantity the server sends either as a number or preformatted text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PtoLeft {
    #[serde(default)]
    pub hours: Option<Amount>,
    #[serde(default)]
    pub days: Option<Amount>,
    #[serde(default)]
    pub missing: Option<Vec<String>>,
    #[serde(default)]
    pub less_than_a_year: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PtoTaken {
    #[serde(default)]
    pub taken: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_totals: Option<serde_json::Value>,
    #[serde(default)]
    pub unrecognized_country: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NotifyCreated {
    pub entry: EntryId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HoursDay {
    pub key: String,
    pub value: i32,
    pub full_day: String,
}

// --- following ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowReply {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnfollowReply {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    pub value: String,
}

/// A row of the observed or not-observed table.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowingEntry {
    pub id: UserId,
    pub name: String,
    pub reason: String,
}

/// What the server-rendered following page carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowingPage {
    pub action: Option<String>,
    pub csrf_token: Option<String>,
    pub observed: Vec<FollowingEntry>,
    pub not_observed: Vec<FollowingEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_feed() {
        let body = r##"{"events": [{"id": 1, "title": "Bob on PTO", "start": "2024-01-08",
            "end": "2024-01-10", "color": "#f00", "mine": false}],
            "colors": [{"name": "Bob", "color": "#f00"}]}"##;
        let feed: CalendarFeed = serde_json::from_str(body).unwrap();
        assert_eq!(feed.events.len(), 1);
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert!(feed.events[0].covers(day));
        assert_eq!(feed.colors[0].name, "Bob");
    }

    #[test]
    fn test_list_row_cells() {
        let body = r#"{"aaData": [["a@b.c", "Ann", "Lee", "2024-01-01", 1.5, "2024-01-02",
            "2024-01-03", null, "US", ""]]}"#;
        let data: ListData = serde_json::from_str(body).unwrap();
        let rows = data.into_rows();
        assert_eq!(rows[0].cell(4), "1.5");
        assert_eq!(rows[0].cell(7), "");
        assert_eq!(rows[0].cell(42), "");
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::Number(16.0).to_string(), "16");
        assert_eq!(Amount::Number(2.5).to_string(), "2.5");
        assert_eq!(Amount::Text("3 days".into()).to_string(), "3 days");
        assert_eq!(Amount::Text(" 12 ".into()).as_f64(), Some(12.0));
    }
}
