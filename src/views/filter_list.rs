//! Filter form and data table of the list page.

use crate::api::models::{ListData, ListRow, LIST_COLUMNS};
use crate::api::{Outcome, Request};
use crate::views::date_range::{DateLimits, DateRangeControl};
use crate::views::text_field::TextField;
use crate::views::{alert, alert_form_errors, Effect};
use std::cmp::Ordering;

pub const DATE_PREFIXES: [&str; 2] = ["date", "date_filed"];
pub const PLACEHOLDER: &str = "Choose some filters and press Enter to load entries.";
pub const LOADING: &str = "Loading…";

const DEFAULT_SORT_COLUMN: usize = 5;
const DAYS_COLUMN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Focusable inputs of the filter form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    DateFrom,
    DateTo,
    FiledFrom,
    FiledTo,
    Name,
    Country,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::FiledFrom,
        FilterField::FiledTo,
        FilterField::Name,
        FilterField::Country,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::DateFrom => "Date from",
            FilterField::DateTo => "Date to",
            FilterField::FiledFrom => "Filed from",
            FilterField::FiledTo => "Filed to",
            FilterField::Name => "Name",
            FilterField::Country => "Country",
        }
    }

    /// Element id of date fields.
    pub fn date_id(self) -> Option<&'static str> {
        match self {
            FilterField::DateFrom => Some("id_date_from"),
            FilterField::DateTo => Some("id_date_to"),
            FilterField::FiledFrom => Some("id_date_filed_from"),
            FilterField::FiledTo => Some("id_date_filed_to"),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Client-side sorted and paginated rows.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub rows: Vec<ListRow>,
    pub sort_column: usize,
    pub direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
}

impl DataTable {
    pub fn new(rows: Vec<ListRow>, page_size: usize) -> Self {
        let mut table = Self {
            rows,
            sort_column: DEFAULT_SORT_COLUMN,
            direction: SortDirection::Asc,
            page: 0,
            page_size: page_size.max(1),
        };
        table.sort();
        table
    }

    /// Sort by `column`; picking the current column again flips direction.
    pub fn sort_by(&mut self, column: usize) {
        if column >= LIST_COLUMNS.len() {
            return;
        }
        if column == self.sort_column {
            self.direction = self.direction.flip();
        } else {
            self.sort_column = column;
            self.direction = SortDirection::Asc;
        }
        self.page = 0;
        self.sort();
    }

    fn sort(&mut self) {
        let column = self.sort_column;
        let direction = self.direction;
        self.rows.sort_by(|a, b| {
            let ord = compare_cells(column, a.cell(column), b.cell(column));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    pub fn page_rows(&self) -> &[ListRow] {
        let start = (self.page * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn info(&self) -> String {
        if self.rows.is_empty() {
            return "Showing 0 to 0 of 0 entries".to_string();
        }
        let start = self.page * self.page_size + 1;
        let end = (start + self.page_size - 1).min(self.rows.len());
        format!("Showing {} to {} of {} entries", start, end, self.rows.len())
    }
}

fn compare_cells(column: usize, a: &str, b: &str) -> Ordering {
    if column == DAYS_COLUMN {
        let a = a.trim().parse::<f64>().unwrap_or(0.0);
        let b = b.trim().parse::<f64>().unwrap_or(0.0);
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

pub struct FilterList {
    pub dates: DateRangeControl,
    pub name: TextField,
    pub country: TextField,
    pub focus: FilterField,
    /// Query string the table is bound to.
    pub query: Option<String>,
    pub table: Option<DataTable>,
    pub loading: bool,
    page_size: usize,
}

impl FilterList {
    pub fn new(date_format: &str, limits: &DateLimits, page_size: usize) -> Self {
        Self {
            dates: DateRangeControl::init(&DATE_PREFIXES, date_format, limits),
            name: TextField::new(),
            country: TextField::new(),
            focus: FilterField::DateFrom,
            query: None,
            table: None,
            loading: false,
            page_size,
        }
    }

    /// Text input of the focused field.
    pub fn focused_input(&mut self) -> &mut TextField {
        match self.focus {
            FilterField::Name => &mut self.name,
            FilterField::Country => &mut self.country,
            field => {
                let id = field.date_id().unwrap_or("id_date_from");
                let (index, role) = self.dates.locate(id).unwrap_or((0, crate::views::date_range::Role::From));
                &mut self.dates.pairs[index].field_mut(role).input
            }
        }
    }

    /// Commit the focused date field, if it is one.
    pub fn commit_focused(&mut self) {
        if let Some((index, role)) = self.focus.date_id().and_then(|id| self.dates.locate(id)) {
            self.dates.change(index, role);
        }
    }

    /// Shift the focused date field by `days`.
    pub fn step_focused(&mut self, days: i64, today: chrono::NaiveDate) {
        if let Some((index, role)) = self.focus.date_id().and_then(|id| self.dates.locate(id)) {
            let format = self.dates.format.clone();
            self.dates.pairs[index].step(role, days, today, &format);
        }
    }

    pub fn focus_next(&mut self) {
        self.commit_focused();
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.commit_focused();
        self.focus = self.focus.prev();
    }

    /// URL-encoded query from the non-empty filter fields.
    pub fn build_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.dates.query_pairs() {
            serializer.append_pair(&name, &value);
        }
        for (name, field) in [("name", &self.name), ("country", &self.country)] {
            let value = field.value().trim();
            if !value.is_empty() {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }

    pub fn apply_filters(&mut self) -> Option<Effect> {
        self.commit_focused();
        let query = self.build_query();
        self.query = if query.is_empty() { None } else { Some(query) };
        self.load()
    }

    /// Bind the table to the current query. Nothing happens without one.
    pub fn load(&mut self) -> Option<Effect> {
        let query = self.query.clone()?;
        self.loading = true;
        Some(Effect::Request(Request::ListEntries { query }))
    }

    /// Prefill the form from a query string, as when the page is opened
    /// with one, then load.
    pub fn open_query(&mut self, query: &str) -> Option<Effect> {
        self.reset();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "name" => self.name.set(value.as_ref()),
                "country" => self.country.set(value.as_ref()),
                other => {
                    self.dates.prefill(&format!("id_{}", other), &value);
                }
            }
        }
        self.dates.prime();
        self.apply_filters()
    }

    pub fn reset(&mut self) {
        self.dates.clear();
        self.name.clear();
        self.country.clear();
        self.query = None;
        self.table = None;
        self.loading = false;
    }

    pub fn apply(&mut self, query: &str, outcome: Outcome<ListData>) -> Vec<Effect> {
        if self.query.as_deref() != Some(query) {
            return vec![];
        }
        self.loading = false;
        match outcome {
            Outcome::Ok(data) => {
                self.table = Some(DataTable::new(data.into_rows(), self.page_size));
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    /// What to show where the table would be.
    pub fn placeholder(&self) -> Option<&'static str> {
        match (&self.table, self.loading) {
            (None, true) => Some(LOADING),
            (None, false) => Some(PLACEHOLDER),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::date_range::Role;
    use chrono::NaiveDate;
    use serde_json::json;

    const FMT: &str = "%-d %B %Y";

    fn list() -> FilterList {
        FilterList::new(FMT, &DateLimits::default(), 10)
    }

    fn row(email: &str, days: &str, start: &str) -> Vec<serde_json::Value> {
        vec![
            json!(email),
            json!("First"),
            json!("Last"),
            json!("2024-01-01"),
            json!(days),
            json!(start),
            json!(start),
            json!("City"),
            json!("US"),
            json!(""),
        ]
    }

    #[test]
    fn test_no_query_never_loads() {
        let mut list = list();
        assert!(list.apply_filters().is_none());
        assert!(list.query.is_none());
        assert!(list.table.is_none());
        assert_eq!(list.placeholder(), Some(PLACEHOLDER));
    }

    #[test]
    fn test_query_from_non_empty_fields() {
        let mut list = list();
        list.dates.pairs[0].set(Role::From, NaiveDate::from_ymd_opt(2024, 1, 5), FMT);
        list.name.set("Peter B");
        let effect = list.apply_filters();
        assert_eq!(
            effect,
            Some(Effect::Request(Request::ListEntries {
                query: "date_from=5+January+2024&name=Peter+B".into()
            }))
        );
        assert_eq!(list.placeholder(), Some(LOADING));
    }

    #[test]
    fn test_reset_drops_query_and_table() {
        let mut list = list();
        list.country.set("DE");
        list.apply_filters();
        let query = list.query.clone().unwrap();
        list.apply(&query, Outcome::Ok(ListData::default()));
        assert!(list.table.is_some());

        list.reset();
        assert!(list.query.is_none());
        assert!(list.table.is_none());
        assert!(list.country.is_empty());
        assert!(list.load().is_none());
    }

    #[test]
    fn test_open_query_prefills_and_corrects() {
        let mut list = list();
        let effect = list.open_query("date_from=10+January+2024&date_to=5+January+2024&country=GB");
        let pair = list.dates.pair("date").unwrap();
        assert_eq!(pair.to.value, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(list.country.value(), "GB");
        assert!(matches!(effect, Some(Effect::Request(Request::ListEntries { .. }))));
    }

    #[test]
    fn test_stale_reply_ignored() {
        let mut list = list();
        list.name.set("a");
        list.apply_filters();
        list.apply("name=b", Outcome::Ok(ListData::default()));
        assert!(list.table.is_none());
    }

    #[test]
    fn test_default_sort_and_days_numeric() {
        let data = ListData {
            rows: vec![
                row("c@x", "10", "2024-03-01"),
                row("a@x", "2", "2024-01-01"),
                row("b@x", "1.5", "2024-02-01"),
            ],
        };
        let mut table = DataTable::new(data.into_rows(), 10);
        let emails: Vec<_> = table.rows.iter().map(|r| r.cell(0).to_string()).collect();
        assert_eq!(emails, vec!["a@x", "b@x", "c@x"]);

        table.sort_by(4);
        let days: Vec<_> = table.rows.iter().map(|r| r.cell(4).to_string()).collect();
        assert_eq!(days, vec!["1.5", "2", "10"]);
        table.sort_by(4);
        assert_eq!(table.direction, SortDirection::Desc);
        assert_eq!(table.rows[0].cell(4), "10");
    }

    #[test]
    fn test_pagination() {
        let rows: Vec<_> = (0..23)
            .map(|i| ListRow::from_values(&row(&format!("{:02}@x", i), "1", &format!("2024-01-{:02}", i + 1))))
            .collect();
        let mut table = DataTable::new(rows, 10);
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.info(), "Showing 1 to 10 of 23 entries");
        table.next_page();
        table.next_page();
        table.next_page();
        assert_eq!(table.page_rows().len(), 3);
        assert_eq!(table.info(), "Showing 21 to 23 of 23 entries");
        table.prev_page();
        assert_eq!(table.page, 1);
    }
}
