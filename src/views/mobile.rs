//! Page state machine of the mobile companion screens.
//!
//! Every page has a one-time create step (building forms and defaults) and
//! a show step that runs on each visit and usually starts a fetch.

use crate::api::models::{Absence, HoursDay, Profile, PtoLeft, PtoTaken, RightNow};
use crate::api::response::FORM_LEVEL;
use crate::api::{EntryId, FormErrors, Outcome, Request};
use crate::views::text_field::TextField;
use crate::views::{alert, alert_form_errors, Effect};
use chrono::NaiveDate;
use std::collections::HashSet;

pub const NONE_AT_THE_MOMENT: &str = "None at the moment";
pub const SAVED: &str = "Saved successfully!";
const NOTIFY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Index,
    Login,
    Logout,
    RightNow,
    Left,
    Taken,
    Settings,
    Notify,
    Hours,
}

impl Page {
    /// Entries of the index menu.
    pub const MENU: [Page; 6] = [
        Page::RightNow,
        Page::Left,
        Page::Taken,
        Page::Notify,
        Page::Settings,
        Page::Logout,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Index => "PTO",
            Page::Login => "Log in",
            Page::Logout => "Log out",
            Page::RightNow => "Right now",
            Page::Left => "PTO left",
            Page::Taken => "PTO taken",
            Page::Settings => "Settings",
            Page::Notify => "Notify",
            Page::Hours => "Hours",
        }
    }
}

/// A run of text, optionally emphasized.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub strong: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), strong: false }
    }

    fn strong(text: impl Into<String>) -> Self {
        Self { text: text.into(), strong: true }
    }
}

pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Sentence describing the remaining PTO. Empty when the server sent
/// nothing usable.
pub fn left_summary(left: &PtoLeft) -> Vec<Segment> {
    let hours = left.hours.as_ref().filter(|h| h.as_f64().map_or(true, |n| n != 0.0));
    if let Some(hours) = hours {
        let amount = if hours.as_f64().unwrap_or(0.0) > 16.0 {
            left.days.as_ref().map(ToString::to_string).unwrap_or_default()
        } else {
            format!("{} hours", hours)
        };
        return vec![
            Segment::plain("You have "),
            Segment::strong(amount),
            Segment::plain(" of PTO left this year."),
        ];
    }
    if let Some(missing) = &left.missing {
        return vec![
            Segment::plain("To be able to work this out, enter your "),
            Segment::strong(missing.join(" and ")),
            Segment::plain("."),
        ];
    }
    match left.less_than_a_year {
        Some(days) if days != 0 => vec![Segment::plain(format!(
            "Sorry, this can not be automatically worked out if you have worked less than one year \
             (you have worked here {} days)",
            days
        ))],
        _ => vec![],
    }
}

/// Lines of the taken page.
pub fn taken_summary(taken: &PtoTaken) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(amount) = &taken.taken {
        lines.push(format!("You have taken {} this year.", amount));
    }
    if let Some(country) = &taken.country {
        if taken.unrecognized_country {
            lines.push(format!("Country totals for {} are not available (unrecognized country).", country));
        } else if let Some(totals) = &taken.country_totals {
            lines.push(format!("Country: {}", country));
            lines.extend(describe_totals(totals));
        } else {
            lines.push(format!("Country: {}", country));
        }
    }
    lines
}

fn describe_totals(totals: &serde_json::Value) -> Vec<String> {
    match totals {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("  {}: {}", key, scalar(value)))
            .collect(),
        other => vec![format!("  Total: {}", scalar(other))],
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One option of a day's duration radio group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationOption {
    pub bit: &'static str,
    pub label: &'static str,
    pub value: i32,
}

/// Radio group template: full day, half day, zero and birthday.
pub fn hours_template(work_day: i32) -> Vec<DurationOption> {
    vec![
        DurationOption { bit: "full_day", label: "Full day", value: work_day },
        DurationOption { bit: "half_day", label: "Half day", value: work_day / 2 },
        DurationOption { bit: "zero", label: "Zero", value: 0 },
        DurationOption { bit: "bday", label: "Birthday", value: -1 },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayChoice {
    /// Form field name, `d-YYYYMMDD`.
    pub key: String,
    pub legend: String,
    pub options: Vec<DurationOption>,
    pub checked: Option<usize>,
}

impl DayChoice {
    fn from_template(day: &HoursDay, template: &[DurationOption]) -> Self {
        Self {
            key: day.key.clone(),
            legend: format!("{}:", day.full_day),
            options: template.to_vec(),
            checked: template.iter().position(|o| o.value == day.value),
        }
    }

    pub fn check_next(&mut self) {
        let next = self.checked.map_or(0, |i| (i + 1) % self.options.len());
        self.checked = Some(next);
    }

    pub fn check_prev(&mut self) {
        let len = self.options.len();
        let prev = self.checked.map_or(len - 1, |i| (i + len - 1) % len);
        self.checked = Some(prev);
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: TextField,
    pub password: TextField,
    pub errors: FormErrors,
    pub focus: usize,
}

#[derive(Debug, Default)]
pub struct SettingsForm {
    pub info: Option<Vec<Segment>>,
    pub start_date: TextField,
    pub country: TextField,
    pub city: TextField,
    pub errors: FormErrors,
    pub focus: usize,
}

#[derive(Debug, Default)]
pub struct NotifyForm {
    pub start: TextField,
    pub end: TextField,
    pub details: TextField,
    pub errors: FormErrors,
    pub focus: usize,
}

#[derive(Debug, Default)]
pub struct HoursForm {
    pub days: Vec<DayChoice>,
    pub errors: FormErrors,
    pub focus: usize,
}

pub struct MobilePages {
    pub page: Page,
    pub logged_in: Option<bool>,
    /// Highlighted index menu entry.
    pub menu: usize,
    pub login: LoginForm,
    pub settings: SettingsForm,
    pub notify: NotifyForm,
    pub hours: HoursForm,
    pub now: Option<Vec<Absence>>,
    pub upcoming: Option<Vec<Absence>>,
    pub left: Option<Vec<Segment>>,
    pub taken: Option<Vec<String>>,
    entry: Option<EntryId>,
    template: Vec<DurationOption>,
    work_day: i32,
    created: HashSet<Page>,
}

impl MobilePages {
    pub fn new(work_day: i32) -> Self {
        Self {
            page: Page::Index,
            logged_in: None,
            menu: 0,
            login: LoginForm {
                password: TextField::masked(),
                ..LoginForm::default()
            },
            settings: SettingsForm::default(),
            notify: NotifyForm::default(),
            hours: HoursForm::default(),
            now: None,
            upcoming: None,
            left: None,
            taken: None,
            entry: None,
            template: Vec::new(),
            work_day,
            created: HashSet::new(),
        }
    }

    /// Entry created by the last notification, if any.
    pub fn entry(&self) -> Option<EntryId> {
        self.entry
    }

    fn create(&mut self, page: Page, today: NaiveDate) {
        if !self.created.insert(page) {
            return;
        }
        match page {
            Page::Notify => {
                let today = today.format(NOTIFY_DATE_FORMAT).to_string();
                if self.notify.start.value().is_empty() {
                    self.notify.start.set(today.clone());
                }
                if self.notify.end.value().is_empty() {
                    self.notify.end.set(today);
                }
            }
            Page::Hours => self.template = hours_template(self.work_day),
            _ => {}
        }
    }

    /// Switch to `page`.
    pub fn show(&mut self, page: Page, today: NaiveDate) -> Vec<Effect> {
        self.create(page, today);
        self.page = page;
        match page {
            Page::Index | Page::Login | Page::Logout => vec![Effect::Request(Request::Session)],
            Page::RightNow => {
                self.now = None;
                self.upcoming = None;
                vec![Effect::Request(Request::RightNow)]
            }
            Page::Left => vec![Effect::Request(Request::Left)],
            Page::Taken => vec![Effect::Request(Request::Taken)],
            Page::Settings => vec![Effect::Request(Request::Settings)],
            Page::Notify => vec![],
            Page::Hours => match self.entry {
                Some(entry) => {
                    self.hours.days.clear();
                    self.hours.errors = FormErrors::default();
                    vec![Effect::Request(Request::Hours { entry })]
                }
                None => self.show(Page::Notify, today),
            },
        }
    }

    pub fn open_menu_item(&mut self, today: NaiveDate) -> Vec<Effect> {
        let page = Page::MENU[self.menu.min(Page::MENU.len() - 1)];
        self.show(page, today)
    }

    pub fn apply_session(&mut self, logged_in: bool, today: NaiveDate) -> Vec<Effect> {
        self.logged_in = Some(logged_in);
        let mut effects = vec![Effect::LoggedIn { username: None, logged_in }];
        let next = match (self.page, logged_in) {
            (Page::Index, false) => Some(Page::Login),
            (Page::Login, true) => Some(Page::Index),
            (Page::Logout, false) => Some(Page::Index),
            _ => None,
        };
        if let Some(page) = next {
            effects.extend(self.show(page, today));
        }
        effects
    }

    pub fn submit_login(&mut self) -> Effect {
        self.login.errors = FormErrors::default();
        Effect::Request(Request::Login {
            username: self.login.username.value().to_string(),
            password: self.login.password.value().to_string(),
        })
    }

    pub fn apply_login(&mut self, outcome: Outcome<()>, today: NaiveDate) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(()) => {
                self.login.password.clear();
                self.logged_in = Some(true);
                let mut effects = vec![Effect::LoggedIn {
                    username: Some(self.login.username.value().to_string()),
                    logged_in: true,
                }];
                effects.extend(self.show(Page::Index, today));
                effects
            }
            Outcome::Invalid(errors) => {
                self.login.errors = errors;
                vec![]
            }
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn submit_logout(&self) -> Effect {
        Effect::Request(Request::Logout)
    }

    pub fn apply_logout(&mut self, outcome: Outcome<()>, today: NaiveDate) -> Vec<Effect> {
        match outcome {
            Outcome::Failed(err) => vec![alert(&err)],
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Ok(()) => {
                self.logged_in = Some(false);
                let mut effects = vec![Effect::LoggedIn { username: None, logged_in: false }];
                effects.extend(self.show(Page::Login, today));
                effects
            }
        }
    }

    pub fn apply_right_now(&mut self, outcome: Outcome<RightNow>) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(right_now) => {
                self.now = Some(right_now.now);
                self.upcoming = Some(right_now.upcoming);
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn apply_left(&mut self, outcome: Outcome<PtoLeft>) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(left) => {
                self.left = Some(left_summary(&left));
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn apply_taken(&mut self, outcome: Outcome<PtoTaken>) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(taken) => {
                self.taken = Some(taken_summary(&taken));
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn apply_settings(&mut self, outcome: Outcome<Profile>) -> Vec<Effect> {
        let profile = match outcome {
            Outcome::Ok(profile) => profile,
            Outcome::Invalid(errors) => {
                self.settings.errors = errors;
                return vec![];
            }
            Outcome::Failed(err) => return vec![alert(&err)],
        };
        self.settings.errors = FormErrors::default();
        self.settings.info = Some(vec![
            Segment::plain("You're currently logged in as "),
            Segment::strong(profile.full_name),
            Segment::plain("."),
        ]);
        let prefill = [
            (&mut self.settings.start_date, profile.start_date),
            (&mut self.settings.country, profile.country),
            (&mut self.settings.city, profile.city),
        ];
        for (field, value) in prefill {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                field.set(value);
            }
        }
        vec![]
    }

    pub fn submit_settings(&mut self) -> Effect {
        self.settings.errors = FormErrors::default();
        Effect::Request(Request::SaveSettings {
            start_date: self.settings.start_date.value().to_string(),
            country: self.settings.country.value().to_string(),
            city: self.settings.city.value().to_string(),
        })
    }

    pub fn apply_settings_saved(&mut self, outcome: Outcome<()>) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(()) => vec![Effect::Flash(SAVED.to_string()), Effect::Request(Request::Settings)],
            Outcome::Invalid(errors) => {
                self.settings.errors = errors;
                vec![]
            }
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    /// Both dates are required; a blank one leaves the form alone.
    pub fn submit_notify(&mut self) -> Option<Effect> {
        let start = self.notify.start.value().trim();
        let end = self.notify.end.value().trim();
        if start.is_empty() || end.is_empty() {
            return None;
        }
        let request = Request::Notify {
            start: start.to_string(),
            end: end.to_string(),
            details: self.notify.details.value().to_string(),
        };
        self.notify.errors = FormErrors::default();
        Some(Effect::Request(request))
    }

    /// Prefill the notify form, as when the calendar hands over a range.
    pub fn prefill_notify(&mut self, start: NaiveDate, end: NaiveDate) {
        self.notify.start.set(start.format(NOTIFY_DATE_FORMAT).to_string());
        self.notify.end.set(end.format(NOTIFY_DATE_FORMAT).to_string());
    }

    pub fn apply_notified(&mut self, outcome: Outcome<EntryId>, today: NaiveDate) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(entry) => {
                self.entry = Some(entry);
                self.show(Page::Hours, today)
            }
            Outcome::Invalid(errors) => {
                self.notify.errors = errors;
                vec![]
            }
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn apply_hours(&mut self, entry: EntryId, outcome: Outcome<Vec<HoursDay>>) -> Vec<Effect> {
        if self.entry != Some(entry) {
            return vec![];
        }
        match outcome {
            Outcome::Ok(days) => {
                self.hours.days = days
                    .iter()
                    .map(|day| DayChoice::from_template(day, &self.template))
                    .collect();
                self.hours.focus = 0;
                vec![]
            }
            Outcome::Invalid(errors) => {
                self.hours.errors = errors;
                vec![]
            }
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    /// Post the checked value of every rendered day.
    pub fn submit_hours(&mut self, today: NaiveDate) -> Vec<Effect> {
        let Some(entry) = self.entry else {
            return self.show(Page::Notify, today);
        };
        let durations = self
            .hours
            .days
            .iter()
            .filter_map(|day| {
                let option = day.options.get(day.checked?)?;
                Some((day.key.clone(), option.value))
            })
            .collect();
        self.hours.errors = FormErrors::default();
        vec![Effect::Request(Request::SaveHours { entry, durations })]
    }

    pub fn apply_hours_saved(&mut self, outcome: Outcome<()>, today: NaiveDate) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(()) => {
                let mut effects = vec![Effect::Flash(SAVED.to_string())];
                effects.extend(self.show(Page::Index, today));
                effects
            }
            Outcome::Invalid(errors) => {
                self.hours.errors = errors;
                vec![]
            }
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    /// Inputs of the current page, in focus order.
    pub fn inputs(&self) -> Vec<(&'static str, &TextField)> {
        match self.page {
            Page::Login => vec![("username", &self.login.username), ("password", &self.login.password)],
            Page::Settings => vec![
                ("start_date", &self.settings.start_date),
                ("country", &self.settings.country),
                ("city", &self.settings.city),
            ],
            Page::Notify => vec![
                ("start", &self.notify.start),
                ("end", &self.notify.end),
                ("details", &self.notify.details),
            ],
            _ => vec![],
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut TextField> {
        match self.page {
            Page::Login => match self.login.focus {
                0 => Some(&mut self.login.username),
                _ => Some(&mut self.login.password),
            },
            Page::Settings => match self.settings.focus {
                0 => Some(&mut self.settings.start_date),
                1 => Some(&mut self.settings.country),
                _ => Some(&mut self.settings.city),
            },
            Page::Notify => match self.notify.focus {
                0 => Some(&mut self.notify.start),
                1 => Some(&mut self.notify.end),
                _ => Some(&mut self.notify.details),
            },
            _ => None,
        }
    }

    pub fn focus(&self) -> usize {
        match self.page {
            Page::Login => self.login.focus,
            Page::Settings => self.settings.focus,
            Page::Notify => self.notify.focus,
            Page::Hours => self.hours.focus,
            _ => self.menu,
        }
    }

    /// Move focus within the page by `delta`, wrapping.
    pub fn move_focus(&mut self, delta: isize) {
        let len = match self.page {
            Page::Index => Page::MENU.len(),
            Page::Hours => self.hours.days.len(),
            _ => self.inputs().len(),
        };
        if len == 0 {
            return;
        }
        let step = |current: usize| (current as isize + delta).rem_euclid(len as isize) as usize;
        match self.page {
            Page::Login => self.login.focus = step(self.login.focus),
            Page::Settings => self.settings.focus = step(self.settings.focus),
            Page::Notify => self.notify.focus = step(self.notify.focus),
            Page::Hours => self.hours.focus = step(self.hours.focus),
            Page::Index => self.menu = step(self.menu),
            _ => {}
        }
    }

    /// Validation errors of the current page's form.
    pub fn errors(&self) -> Option<&FormErrors> {
        match self.page {
            Page::Login => Some(&self.login.errors),
            Page::Settings => Some(&self.settings.errors),
            Page::Notify => Some(&self.notify.errors),
            Page::Hours => Some(&self.hours.errors),
            _ => None,
        }
    }

    /// Form-level messages plus any for fields this page does not render.
    pub fn form_messages(&self) -> Vec<String> {
        let Some(errors) = self.errors() else {
            return vec![];
        };
        let shown: Vec<&str> = self.inputs().iter().map(|(name, _)| *name).collect();
        let mut messages = errors.field(FORM_LEVEL).to_vec();
        for (name, list) in errors.fields() {
            if !shown.contains(&name) {
                messages.extend(list.iter().cloned());
            }
        }
        messages
    }
}
