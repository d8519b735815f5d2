//! View controllers, one per screen region.
//!
//! Controllers own their state, take typed server replies and hand back
//! [`Effect`]s for the app handler to carry out. None of them touch the
//! network or the terminal directly.

pub mod calendar;
pub mod date_range;
pub mod filter_list;
pub mod flash;
pub mod following;
pub mod mobile;
pub mod text_field;

use crate::api::{ApiError, FormErrors, Request};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue a request; its reply comes back through the event loop.
    Request(Request),
    /// Blocking alert.
    Alert(String),
    /// Transient acknowledgment banner.
    Flash(String),
    /// Transient informational banner.
    Notice(String),
    /// Show the notify page with the given range.
    OpenNotify { start: NaiveDate, end: NaiveDate },
    /// Show the list filtered by a query string.
    OpenList { query: String },
    OpenFollowing,
    /// Session state learned from the server.
    LoggedIn { username: Option<String>, logged_in: bool },
}

pub(crate) fn alert(err: &ApiError) -> Effect {
    Effect::Alert(err.to_string())
}

/// Alert text for validation errors on a view without inline fields.
pub(crate) fn alert_form_errors(errors: &FormErrors) -> Effect {
    let mut lines: Vec<String> = errors.form_level().to_vec();
    for (name, messages) in errors.fields() {
        lines.extend(messages.iter().map(|m| format!("{}: {}", name, m)));
    }
    Effect::Alert(lines.join("\n"))
}
