//! PTO server API: requests, typed replies and the HTTP client.

pub mod client;
pub mod following_page;
pub mod models;
pub mod response;

pub use models::{EntryId, UserId};
pub use response::{ApiError, FormErrors, Outcome};

use models::*;

/// One call against the server. Every request produces exactly one [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CalendarEvents { start_ms: i64, end_ms: i64 },
    ListEntries { query: String },
    Session,
    Login { username: String, password: String },
    Logout,
    RightNow,
    Left,
    Taken,
    Settings,
    SaveSettings { start_date: String, country: String, city: String },
    Notify { start: String, end: String, details: String },
    Hours { entry: EntryId },
    SaveHours { entry: EntryId, durations: Vec<(String, i32)> },
    FollowingPage,
    Follow { search: String, restoring: Option<UserId> },
    Unfollow { id: UserId },
    Autocomplete { term: String },
}

impl Request {
    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::CalendarEvents { .. } => "calendar-events",
            Request::ListEntries { .. } => "list-entries",
            Request::Session => "session",
            Request::Login { .. } => "login",
            Request::Logout => "logout",
            Request::RightNow => "rightnow",
            Request::Left => "left",
            Request::Taken => "taken",
            Request::Settings => "settings",
            Request::SaveSettings { .. } => "save-settings",
            Request::Notify { .. } => "notify",
            Request::Hours { .. } => "hours",
            Request::SaveHours { .. } => "save-hours",
            Request::FollowingPage => "following-page",
            Request::Follow { .. } => "follow",
            Request::Unfollow { .. } => "unfollow",
            Request::Autocomplete { .. } => "autocomplete",
        }
    }
}

/// Server reply, tagged with whatever the issuing view needs to match it up.
#[derive(Debug)]
pub enum Reply {
    Calendar { start_ms: i64, end_ms: i64, outcome: Outcome<CalendarFeed> },
    List { query: String, outcome: Outcome<ListData> },
    Session(Outcome<SessionStatus>),
    Login(Outcome<Ack>),
    Logout(Outcome<Ack>),
    RightNow(Outcome<RightNow>),
    Left(Outcome<PtoLeft>),
    Taken(Outcome<PtoTaken>),
    Settings(Outcome<Profile>),
    SettingsSaved(Outcome<Ack>),
    Notified(Outcome<NotifyCreated>),
    Hours { entry: EntryId, outcome: Outcome<Vec<HoursDay>> },
    HoursSaved(Outcome<Ack>),
    FollowingPage(Outcome<FollowingPage>),
    Followed { restoring: Option<UserId>, outcome: Outcome<FollowReply> },
    Unfollowed { id: UserId, outcome: Outcome<UnfollowReply> },
    Suggestions { term: String, outcome: Outcome<Vec<Suggestion>> },
}
