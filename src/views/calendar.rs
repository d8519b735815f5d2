//! Month calendar fed by `/calendar/events/`.

use crate::api::models::{CalendarEvent, CalendarFeed, LegendColor};
use crate::api::{Outcome, Request};
use crate::views::{alert, alert_form_errors, Effect};
use chrono::{Datelike, Duration, Local, NaiveDate, Offset, TimeZone, Weekday};

pub const GRID_DAYS: i64 = 42;
pub const LEGEND_TITLE: &str = "Legend:";
pub const FOLLOWING_LINK: &str = "/following/";
pub const FOLLOWING_LINK_TEXT: &str = "Manage people you follow →";

/// Color key under the calendar. Created on the first non-empty feed and
/// updated in place afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    pub swatches: Vec<LegendColor>,
    pub link: &'static str,
    pub link_text: &'static str,
}

impl Legend {
    fn new() -> Self {
        Self {
            title: LEGEND_TITLE,
            swatches: Vec::new(),
            link: FOLLOWING_LINK,
            link_text: FOLLOWING_LINK_TEXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub link: String,
}

/// UTC offset in seconds of local time on `date`.
pub fn local_offset_secs(date: NaiveDate) -> i32 {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map(|dt| dt.offset().fix().local_minus_utc())
        .unwrap_or(0)
}

/// Epoch milliseconds of local midnight on `date`.
pub fn local_midnight_ms(date: NaiveDate, utc_offset_secs: i32) -> i64 {
    let utc_midnight = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0);
    utc_midnight - i64::from(utc_offset_secs) * 1000
}

/// Local midnight shifted by the UTC offset, so a server reading the
/// timestamp in UTC lands on the same calendar day the user picked.
pub fn adjusted_ms(date: NaiveDate, utc_offset_secs: i32) -> i64 {
    local_midnight_ms(date, utc_offset_secs) + i64::from(utc_offset_secs) * 1000
}

pub fn notify_link(start_ms: i64, end_ms: i64) -> String {
    format!("/notify/?start={}&end={}", start_ms, end_ms)
}

/// First cell of the six-week grid showing `month`.
pub fn grid_start(month: NaiveDate, first_day: Weekday) -> NaiveDate {
    let first = month.with_day(1).unwrap_or(month);
    let back = (7 + first.weekday().num_days_from_sunday() - first_day.num_days_from_sunday()) % 7;
    first - Duration::days(i64::from(back))
}

pub fn weekday_from_index(index: u8) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1).unwrap_or(date)
}

pub struct CalendarView {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub first_day: Weekday,
    pub cursor: NaiveDate,
    /// Start of a range selection in progress.
    pub anchor: Option<NaiveDate>,
    pub events: Vec<CalendarEvent>,
    pub legend: Option<Legend>,
    pub dialog: Option<EditDialog>,
    /// Which of the cursor day's events is highlighted.
    pub event_focus: usize,
    pub loading: bool,
    window: Option<(i64, i64)>,
    offset: fn(NaiveDate) -> i32,
}

impl CalendarView {
    pub fn new(today: NaiveDate, first_day: Weekday) -> Self {
        Self {
            month: today.with_day(1).unwrap_or(today),
            first_day,
            cursor: today,
            anchor: None,
            events: Vec::new(),
            legend: None,
            dialog: None,
            event_focus: 0,
            loading: false,
            window: None,
            offset: local_offset_secs,
        }
    }

    pub fn grid_start(&self) -> NaiveDate {
        grid_start(self.month, self.first_day)
    }

    pub fn visible_days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.grid_start();
        (0..GRID_DAYS).map(move |i| start + Duration::days(i))
    }

    /// Epoch milliseconds of the visible window, end exclusive.
    pub fn window_ms(&self) -> (i64, i64) {
        let start = self.grid_start();
        let end = start + Duration::days(GRID_DAYS);
        (
            local_midnight_ms(start, (self.offset)(start)),
            local_midnight_ms(end, (self.offset)(end)),
        )
    }

    /// Window of the last fetch.
    pub fn window(&self) -> Option<(i64, i64)> {
        self.window
    }

    /// Fetch for the visible window.
    pub fn refresh(&mut self) -> Effect {
        let (start_ms, end_ms) = self.window_ms();
        self.window = Some((start_ms, end_ms));
        self.loading = true;
        Effect::Request(Request::CalendarEvents { start_ms, end_ms })
    }

    pub fn apply_feed(&mut self, start_ms: i64, end_ms: i64, outcome: Outcome<CalendarFeed>) -> Vec<Effect> {
        if self.window != Some((start_ms, end_ms)) {
            return vec![];
        }
        self.loading = false;
        match outcome {
            Outcome::Ok(feed) => {
                self.events = feed.events;
                self.event_focus = 0;
                self.rebuild_legend(feed.colors);
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    fn rebuild_legend(&mut self, colors: Vec<LegendColor>) {
        if colors.is_empty() {
            self.legend = None;
            return;
        }
        let legend = self.legend.get_or_insert_with(Legend::new);
        legend.swatches.clear();
        legend.swatches.extend(colors);
    }

    pub fn events_on(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        self.events.iter().filter(|e| e.covers(day)).collect()
    }

    pub fn focused_event(&self) -> Option<&CalendarEvent> {
        self.events_on(self.cursor).get(self.event_focus).copied()
    }

    pub fn cycle_event_focus(&mut self) {
        let count = self.events_on(self.cursor).len();
        self.event_focus = if count == 0 { 0 } else { (self.event_focus + 1) % count };
    }

    /// Move the cursor; crossing into another month refetches.
    pub fn move_cursor(&mut self, days: i64) -> Option<Effect> {
        let target = self.cursor + Duration::days(days);
        self.jump_to(target)
    }

    pub fn jump_to(&mut self, day: NaiveDate) -> Option<Effect> {
        self.cursor = day;
        self.event_focus = 0;
        let month = day.with_day(1).unwrap_or(day);
        if month != self.month {
            self.month = month;
            return Some(self.refresh());
        }
        None
    }

    pub fn shift_month(&mut self, months: i32) -> Effect {
        self.month = add_months(self.month, months);
        let last = add_months(self.month, 1) - Duration::days(1);
        let day = self.cursor.day().min(last.day());
        self.cursor = self.month.with_day(day).unwrap_or(self.month);
        self.event_focus = 0;
        self.refresh()
    }

    pub fn toggle_anchor(&mut self) {
        self.anchor = match self.anchor {
            Some(_) => None,
            None => Some(self.cursor),
        };
    }

    pub fn in_selection(&self, day: NaiveDate) -> bool {
        match self.anchor {
            Some(anchor) => {
                let (lo, hi) = if anchor <= self.cursor { (anchor, self.cursor) } else { (self.cursor, anchor) };
                lo <= day && day <= hi
            }
            None => false,
        }
    }

    /// Finish a selection: the range goes to the notify form.
    pub fn select(&mut self) -> Vec<Effect> {
        let anchor = self.anchor.take().unwrap_or(self.cursor);
        let (start, end) = if anchor <= self.cursor { (anchor, self.cursor) } else { (self.cursor, anchor) };
        let start_ms = adjusted_ms(start, (self.offset)(start));
        let end_ms = adjusted_ms(end, (self.offset)(end));
        vec![
            Effect::Notice(format!("New notification {}", notify_link(start_ms, end_ms))),
            Effect::OpenNotify { start, end },
        ]
    }

    /// Only the user's own events open the edit dialog.
    pub fn event_click(&mut self, event: &CalendarEvent) -> bool {
        if !event.mine {
            return false;
        }
        let start_ms = local_midnight_ms(event.start, (self.offset)(event.start));
        let end_ms = local_midnight_ms(event.end, (self.offset)(event.end));
        self.dialog = Some(EditDialog {
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            link: notify_link(start_ms, end_ms),
        });
        true
    }

    pub fn click_focused(&mut self) -> bool {
        match self.focused_event().cloned() {
            Some(event) => self.event_click(&event),
            None => false,
        }
    }

    pub fn confirm_dialog(&mut self) -> Option<Effect> {
        self.dialog
            .take()
            .map(|dialog| Effect::OpenNotify { start: dialog.start, end: dialog.end })
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Query string listing entries on the cursor day.
    pub fn list_query(&self, date_format: &str) -> String {
        let day = self.cursor.format(date_format).to_string();
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("date_from", &day)
            .append_pair("date_to", &day)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn view() -> CalendarView {
        let mut view = CalendarView::new(d(2024, 1, 10), Weekday::Sun);
        view.offset = |_| 3600;
        view
    }

    fn event(id: u64, start: NaiveDate, end: NaiveDate, mine: bool) -> CalendarEvent {
        CalendarEvent {
            id,
            title: format!("event {}", id),
            start,
            end,
            color: None,
            mine,
        }
    }

    fn feed(colors: &[(&str, &str)]) -> CalendarFeed {
        CalendarFeed {
            events: vec![],
            colors: colors
                .iter()
                .map(|(name, color)| LegendColor { name: name.to_string(), color: color.to_string() })
                .collect(),
        }
    }

    fn loaded(view: &mut CalendarView, colors: &[(&str, &str)]) {
        let (start, end) = view.window_ms();
        view.refresh();
        assert!(view.apply_feed(start, end, Outcome::Ok(feed(colors))).is_empty());
    }

    #[test]
    fn test_grid_start() {
        // 1 January 2024 is a Monday.
        assert_eq!(grid_start(d(2024, 1, 1), Weekday::Sun), d(2023, 12, 31));
        assert_eq!(grid_start(d(2024, 1, 1), Weekday::Mon), d(2024, 1, 1));
        assert_eq!(grid_start(d(2024, 9, 15), Weekday::Mon), d(2024, 8, 26));
    }

    #[test]
    fn test_window_request() {
        let mut view = view();
        let effect = view.refresh();
        let start = local_midnight_ms(d(2023, 12, 31), 3600);
        let end = local_midnight_ms(d(2024, 2, 11), 3600);
        assert_eq!(effect, Effect::Request(Request::CalendarEvents { start_ms: start, end_ms: end }));
        assert!(view.loading);

        let days: Vec<NaiveDate> = view.visible_days().collect();
        assert_eq!(days.len(), GRID_DAYS as usize);
        assert_eq!(days.first(), Some(&d(2023, 12, 31)));
        assert_eq!(days.last(), Some(&d(2024, 2, 10)));
    }

    #[test]
    fn test_legend_single_swatch() {
        let mut view = view();
        loaded(&mut view, &[("Bob", "#f00")]);
        let legend = view.legend.as_ref().unwrap();
        assert_eq!(legend.title, "Legend:");
        assert_eq!(legend.swatches.len(), 1);
        assert_eq!(legend.swatches[0].name, "Bob");
        assert_eq!(legend.swatches[0].color, "#f00");
        assert_eq!(legend.link, "/following/");
    }

    #[test]
    fn test_legend_removed_on_empty_colors() {
        let mut view = view();
        loaded(&mut view, &[("Bob", "#f00")]);
        loaded(&mut view, &[]);
        assert!(view.legend.is_none());
    }

    #[test]
    fn test_legend_reset_in_place() {
        let mut view = view();
        loaded(&mut view, &[("Bob", "#f00"), ("Ann", "#0f0")]);
        loaded(&mut view, &[("Cid", "#00f")]);
        let names: Vec<_> = view.legend.unwrap().swatches.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Cid"]);
    }

    #[test]
    fn test_stale_window_dropped() {
        let mut view = view();
        let (start, end) = view.window_ms();
        view.refresh();
        view.shift_month(1);
        view.apply_feed(start, end, Outcome::Ok(feed(&[("Bob", "#f00")])));
        assert!(view.legend.is_none());
        assert!(view.loading);
    }

    #[test]
    fn test_feed_error_alerts() {
        let mut view = view();
        let (start, end) = view.window_ms();
        view.refresh();
        let effects = view.apply_feed(start, end, Outcome::Failed(ApiError::Server("Must be logged in".into())));
        assert_eq!(effects, vec![Effect::Alert("Must be logged in".into())]);
        assert!(!view.loading);
    }

    #[test]
    fn test_adjusted_ms_lands_on_utc_midnight() {
        let utc_midnight = d(2024, 1, 10).and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis();
        for offset in [-8 * 3600, 0, 3600, 5 * 3600 + 1800] {
            assert_eq!(adjusted_ms(d(2024, 1, 10), offset), utc_midnight);
        }
    }

    #[test]
    fn test_select_opens_notify() {
        let mut view = view();
        view.toggle_anchor();
        view.move_cursor(-2);
        let effects = view.select();
        assert_eq!(effects[1], Effect::OpenNotify { start: d(2024, 1, 8), end: d(2024, 1, 10) });
        assert!(view.anchor.is_none());
        match &effects[0] {
            Effect::Notice(text) => assert!(text.contains("/notify/?start=1704672000000&end=1704844800000")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_event_click_only_for_mine() {
        let mut view = view();
        assert!(!view.event_click(&event(1, d(2024, 1, 8), d(2024, 1, 9), false)));
        assert!(view.dialog.is_none());

        assert!(view.event_click(&event(2, d(2024, 1, 8), d(2024, 1, 9), true)));
        let dialog = view.dialog.clone().unwrap();
        assert_eq!(
            dialog.link,
            notify_link(local_midnight_ms(d(2024, 1, 8), 3600), local_midnight_ms(d(2024, 1, 9), 3600))
        );
        assert_eq!(
            view.confirm_dialog(),
            Some(Effect::OpenNotify { start: d(2024, 1, 8), end: d(2024, 1, 9) })
        );
        assert!(view.dialog.is_none());
    }

    #[test]
    fn test_cursor_month_change_refetches() {
        let mut view = view();
        assert!(view.move_cursor(1).is_none());
        let effect = view.move_cursor(30);
        assert!(matches!(effect, Some(Effect::Request(Request::CalendarEvents { .. }))));
        assert_eq!(view.month, d(2024, 2, 1));
    }

    #[test]
    fn test_shift_month_clamps_day() {
        let mut view = view();
        view.jump_to(d(2024, 1, 31));
        view.shift_month(1);
        assert_eq!(view.cursor, d(2024, 2, 29));
        view.shift_month(-2);
        assert_eq!(view.month, d(2023, 12, 1));
    }

    #[test]
    fn test_list_query_for_cursor_day() {
        let view = view();
        assert_eq!(
            view.list_query("%-d %B %Y"),
            "date_from=10+January+2024&date_to=10+January+2024"
        );
    }
}
