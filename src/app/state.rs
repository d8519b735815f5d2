use crate::config::AppConfig;
use crate::views::calendar::{weekday_from_index, CalendarView};
use crate::views::filter_list::FilterList;
use crate::views::flash::{FlashBoard, FlashKind};
use crate::views::following::FollowingLists;
use crate::views::mobile::MobilePages;
use chrono::{Local, NaiveDate};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Calendar,
    List,
    Following,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Calendar, Tab::List, Tab::Following];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Calendar => "Calendar",
            Tab::List => "List",
            Tab::Following => "Following",
        }
    }

    pub fn key(self) -> u8 {
        match self {
            Tab::Home => 1,
            Tab::Calendar => 2,
            Tab::List => 3,
            Tab::Following => 4,
        }
    }
}

/// What the server last told us about the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub logged_in: Option<bool>,
    pub username: Option<String>,
}

pub struct AppState {
    pub config: AppConfig,
    pub tab: Tab,
    pub pages: MobilePages,
    pub calendar: CalendarView,
    pub list: FilterList,
    pub following: FollowingLists,
    pub flashes: FlashBoard,
    /// Blocking alert; captures input until dismissed.
    pub alert: Option<String>,
    pub session: Session,
    /// Requests issued but not yet answered.
    pub in_flight: usize,
    pub should_quit: bool,
    pub dirty: bool,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_today(config, local_today)
    }

    /// State with a fixed notion of "today".
    pub fn with_today(config: AppConfig, today: fn() -> NaiveDate) -> Self {
        let now = today();
        let ui = &config.ui;
        let mut pages = MobilePages::new(config.hours.work_day);
        if let Some(username) = &config.server.username {
            pages.login.username.set(username.clone());
        }
        Self {
            tab: Tab::Home,
            pages,
            calendar: CalendarView::new(now, weekday_from_index(ui.first_day)),
            list: FilterList::new(&ui.date_format, &config.dates.limits(now), ui.page_size),
            following: FollowingLists::new(
                Duration::from_millis(ui.autocomplete_delay_ms),
                ui.autocomplete_min_length,
            ),
            flashes: FlashBoard::new(Duration::from_secs(ui.flash_seconds)),
            alert: None,
            session: Session::default(),
            in_flight: 0,
            should_quit: false,
            dirty: true,
            today,
            config,
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn flash(&mut self, text: String, kind: FlashKind) {
        self.flashes.push(text, kind, Instant::now());
        self.dirty = true;
    }

    pub fn show_alert(&mut self, text: String) {
        // Alerts raised while one is open are appended.
        self.alert = Some(match self.alert.take() {
            Some(existing) if existing != text => format!("{}\n\n{}", existing, text),
            _ => text,
        });
        self.dirty = true;
    }
}
