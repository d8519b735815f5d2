use crate::api::{Outcome, Reply};
use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::*;
use crate::views::flash::FlashKind;
use crate::views::following::Focus;
use crate::views::mobile::Page;
use crate::views::text_field::TextField;
use crate::views::{alert, alert_form_errors, Effect};
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tracing::{debug, info, warn};

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::Api(reply) => {
            state.in_flight = state.in_flight.saturating_sub(1);
            state.dirty = true;
            let effects = handle_reply(state, reply);
            apply_effects(state, effects)
        }
        AppEvent::Tick => handle_tick(state),
    }
}

/// First screen: the home page checks the session.
pub fn startup(state: &mut AppState) -> Vec<Action> {
    let today = state.today();
    let effects = state.pages.show(Page::Index, today);
    apply_effects(state, effects)
}

fn handle_tick(state: &mut AppState) -> Vec<Action> {
    let now = Instant::now();
    if state.flashes.tick(now) {
        state.dirty = true;
    }
    match state.following.tick(now) {
        Some(effect) => apply_effects(state, vec![effect]),
        None => vec![],
    }
}

fn handle_reply(state: &mut AppState, reply: Reply) -> Vec<Effect> {
    let today = state.today();
    match reply {
        Reply::Calendar { start_ms, end_ms, outcome } => state.calendar.apply_feed(start_ms, end_ms, outcome),
        Reply::List { query, outcome } => state.list.apply(&query, outcome),
        Reply::Session(outcome) => match outcome {
            Outcome::Ok(status) => state.pages.apply_session(status.logged_in, today),
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        },
        Reply::Login(outcome) => state.pages.apply_login(outcome.map(|_| ()), today),
        Reply::Logout(outcome) => state.pages.apply_logout(outcome.map(|_| ()), today),
        Reply::RightNow(outcome) => state.pages.apply_right_now(outcome),
        Reply::Left(outcome) => state.pages.apply_left(outcome),
        Reply::Taken(outcome) => state.pages.apply_taken(outcome),
        Reply::Settings(outcome) => state.pages.apply_settings(outcome),
        Reply::SettingsSaved(outcome) => state.pages.apply_settings_saved(outcome.map(|_| ())),
        Reply::Notified(outcome) => state.pages.apply_notified(outcome.map(|created| created.entry), today),
        Reply::Hours { entry, outcome } => state.pages.apply_hours(entry, outcome),
        Reply::HoursSaved(outcome) => state.pages.apply_hours_saved(outcome.map(|_| ()), today),
        Reply::FollowingPage(outcome) => state.following.apply_page(outcome),
        Reply::Followed { restoring, outcome } => state.following.apply_followed(restoring, outcome),
        Reply::Unfollowed { id, outcome } => state.following.apply_unfollowed(id, outcome),
        Reply::Suggestions { term, outcome } => {
            state.following.apply_suggestions(&term, outcome);
            vec![]
        }
    }
}

/// Carry out what the views asked for.
pub fn apply_effects(state: &mut AppState, effects: Vec<Effect>) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut queue: std::collections::VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Request(request) => {
                debug!(request = request.name(), "issuing request");
                state.in_flight += 1;
                actions.push(Action::Api(request));
            }
            Effect::Alert(text) => {
                warn!(%text, "alert");
                state.show_alert(text);
            }
            Effect::Flash(text) => state.flash(text, FlashKind::Success),
            Effect::Notice(text) => state.flash(text, FlashKind::Info),
            Effect::OpenNotify { start, end } => {
                state.tab = Tab::Home;
                state.pages.prefill_notify(start, end);
                let today = state.today();
                queue.extend(state.pages.show(Page::Notify, today));
            }
            Effect::OpenList { query } => {
                state.tab = Tab::List;
                queue.extend(state.list.open_query(&query));
            }
            Effect::OpenFollowing => {
                state.tab = Tab::Following;
                if !state.following.loaded {
                    queue.push_back(state.following.load());
                }
            }
            Effect::LoggedIn { username, logged_in } => {
                state.session.logged_in = Some(logged_in);
                if !logged_in {
                    state.session.username = None;
                    continue;
                }
                let Some(username) = username else { continue };
                info!(%username, "logged in");
                state.session.username = Some(username.clone());
                let remembered = state.config.server.username.as_deref() == Some(username.as_str());
                if state.config.behavior.remember_username && !remembered {
                    state.config.server.username = Some(username.clone());
                    actions.push(Action::SaveUsername(username));
                }
            }
        }
    }
    state.dirty = true;
    actions
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keybindings
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    // Alerts capture all input until dismissed
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            state.alert = None;
        }
        return vec![];
    }

    if ctrl && key.code == KeyCode::Char('d') {
        state.flashes.dismiss_latest(Instant::now());
        return vec![];
    }

    if let KeyCode::F(n) = key.code {
        if let Some(tab) = Tab::ALL.iter().copied().find(|t| t.key() == n) {
            return switch_tab(state, tab);
        }
    }

    let effects = match state.tab {
        Tab::Home => handle_home_key(state, key),
        Tab::Calendar => handle_calendar_key(state, key),
        Tab::List => handle_list_key(state, key),
        Tab::Following => handle_following_key(state, key),
    };
    apply_effects(state, effects)
}

fn switch_tab(state: &mut AppState, tab: Tab) -> Vec<Action> {
    state.tab = tab;
    let effects = match tab {
        Tab::Calendar if state.calendar.window().is_none() => vec![state.calendar.refresh()],
        Tab::Following if !state.following.loaded => vec![state.following.load()],
        _ => vec![],
    };
    apply_effects(state, effects)
}

/// Line editing shared by every text input. Returns true if the text changed.
fn edit_field(field: &mut TextField, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if ctrl => field.delete_word_back(),
        KeyCode::Char('a') if ctrl => {
            field.move_home();
            return false;
        }
        KeyCode::Char('e') if ctrl => {
            field.move_end();
            return false;
        }
        KeyCode::Char(_) if ctrl => return false,
        KeyCode::Char(c) => field.insert_char(c),
        KeyCode::Backspace => field.delete_back(),
        KeyCode::Delete => field.delete_forward(),
        KeyCode::Left => {
            field.move_left();
            return false;
        }
        KeyCode::Right => {
            field.move_right();
            return false;
        }
        KeyCode::Home => {
            field.move_home();
            return false;
        }
        KeyCode::End => {
            field.move_end();
            return false;
        }
        _ => return false,
    }
    true
}

fn handle_home_key(state: &mut AppState, key: KeyEvent) -> Vec<Effect> {
    let today = state.today();
    let pages = &mut state.pages;

    if key.code == KeyCode::Esc && pages.page != Page::Index {
        return pages.show(Page::Index, today);
    }

    match pages.page {
        Page::Index => match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                pages.move_focus(-1);
                vec![]
            }
            KeyCode::Down | KeyCode::Tab => {
                pages.move_focus(1);
                vec![]
            }
            KeyCode::Enter => pages.open_menu_item(today),
            _ => vec![],
        },
        Page::Login | Page::Settings | Page::Notify => match key.code {
            KeyCode::Tab | KeyCode::Down => {
                pages.move_focus(1);
                vec![]
            }
            KeyCode::BackTab | KeyCode::Up => {
                pages.move_focus(-1);
                vec![]
            }
            KeyCode::Enter => match pages.page {
                Page::Login => vec![pages.submit_login()],
                Page::Settings => vec![pages.submit_settings()],
                _ => pages.submit_notify().into_iter().collect(),
            },
            _ => {
                if let Some(field) = pages.focused_input() {
                    edit_field(field, key);
                }
                vec![]
            }
        },
        Page::Logout => match key.code {
            KeyCode::Enter => vec![pages.submit_logout()],
            _ => vec![],
        },
        Page::Hours => {
            let focus = pages.hours.focus;
            match key.code {
                KeyCode::Up | KeyCode::BackTab => pages.move_focus(-1),
                KeyCode::Down | KeyCode::Tab => pages.move_focus(1),
                KeyCode::Left => {
                    if let Some(day) = pages.hours.days.get_mut(focus) {
                        day.check_prev();
                    }
                }
                KeyCode::Right | KeyCode::Char(' ') => {
                    if let Some(day) = pages.hours.days.get_mut(focus) {
                        day.check_next();
                    }
                }
                KeyCode::Enter => return pages.submit_hours(today),
                _ => {}
            }
            vec![]
        }
        Page::RightNow | Page::Left | Page::Taken => match key.code {
            KeyCode::Char('r') => {
                let page = pages.page;
                pages.show(page, today)
            }
            _ => vec![],
        },
    }
}

fn handle_calendar_key(state: &mut AppState, key: KeyEvent) -> Vec<Effect> {
    let today = state.today();
    let calendar = &mut state.calendar;

    if calendar.dialog.is_some() {
        return match key.code {
            KeyCode::Enter => calendar.confirm_dialog().into_iter().collect(),
            KeyCode::Esc => {
                calendar.close_dialog();
                vec![]
            }
            _ => vec![],
        };
    }

    match key.code {
        KeyCode::Left => calendar.move_cursor(-1).into_iter().collect(),
        KeyCode::Right => calendar.move_cursor(1).into_iter().collect(),
        KeyCode::Up => calendar.move_cursor(-7).into_iter().collect(),
        KeyCode::Down => calendar.move_cursor(7).into_iter().collect(),
        KeyCode::PageUp => vec![calendar.shift_month(-1)],
        KeyCode::PageDown => vec![calendar.shift_month(1)],
        KeyCode::Char('t') => calendar.jump_to(today).into_iter().collect(),
        KeyCode::Char('r') => vec![calendar.refresh()],
        KeyCode::Char(' ') => {
            calendar.toggle_anchor();
            vec![]
        }
        KeyCode::Char('e') => {
            calendar.cycle_event_focus();
            vec![]
        }
        KeyCode::Enter => {
            if calendar.anchor.is_none() && calendar.click_focused() {
                return vec![];
            }
            calendar.select()
        }
        KeyCode::Char('n') => calendar.select(),
        KeyCode::Esc => {
            calendar.anchor = None;
            vec![]
        }
        KeyCode::Char('l') => {
            let query = calendar.list_query(&state.config.ui.date_format);
            vec![Effect::OpenList { query }]
        }
        KeyCode::Char('f') => vec![Effect::OpenFollowing],
        _ => vec![],
    }
}

fn handle_list_key(state: &mut AppState, key: KeyEvent) -> Vec<Effect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let today = state.today();
    let list = &mut state.list;

    match key.code {
        KeyCode::Char('r') if ctrl => {
            list.reset();
            vec![]
        }
        KeyCode::Char('s') if ctrl => {
            if let Some(table) = list.table.as_mut() {
                let next = (table.sort_column + 1) % crate::api::models::LIST_COLUMNS.len();
                table.sort_by(next);
            }
            vec![]
        }
        KeyCode::Char('o') if ctrl => {
            if let Some(table) = list.table.as_mut() {
                let column = table.sort_column;
                table.sort_by(column);
            }
            vec![]
        }
        KeyCode::PageDown => {
            if let Some(table) = list.table.as_mut() {
                table.next_page();
            }
            vec![]
        }
        KeyCode::PageUp => {
            if let Some(table) = list.table.as_mut() {
                table.prev_page();
            }
            vec![]
        }
        KeyCode::Tab => {
            list.focus_next();
            vec![]
        }
        KeyCode::BackTab => {
            list.focus_prev();
            vec![]
        }
        KeyCode::Up if list.focus.date_id().is_some() => {
            list.step_focused(1, today);
            vec![]
        }
        KeyCode::Down if list.focus.date_id().is_some() => {
            list.step_focused(-1, today);
            vec![]
        }
        KeyCode::Esc => {
            if let Some((index, role)) = list.focus.date_id().and_then(|id| list.dates.locate(id)) {
                let format = list.dates.format.clone();
                list.dates.pairs[index].field_mut(role).revert(&format);
            }
            vec![]
        }
        KeyCode::Enter => list.apply_filters().into_iter().collect(),
        _ => {
            edit_field(list.focused_input(), key);
            vec![]
        }
    }
}

fn handle_following_key(state: &mut AppState, key: KeyEvent) -> Vec<Effect> {
    let following = &mut state.following;

    match key.code {
        KeyCode::Tab => return following.tab().into_iter().collect(),
        KeyCode::BackTab => {
            following.focus = match following.focus {
                Focus::Search => Focus::NotObserved,
                Focus::Observed => Focus::Search,
                Focus::NotObserved => Focus::Observed,
            };
            following.selected = 0;
            return vec![];
        }
        _ => {}
    }

    if following.focus != Focus::Search {
        return match key.code {
            KeyCode::Up => {
                following.move_selection(-1);
                vec![]
            }
            KeyCode::Down => {
                following.move_selection(1);
                vec![]
            }
            KeyCode::Enter | KeyCode::Delete => following.activate_selected().into_iter().collect(),
            KeyCode::Char('r') => vec![following.load()],
            _ => vec![],
        };
    }

    match key.code {
        KeyCode::Up if following.autocomplete.open => {
            following.autocomplete.prev();
            vec![]
        }
        KeyCode::Down if following.autocomplete.open => {
            following.autocomplete.next();
            vec![]
        }
        KeyCode::Esc => {
            following.autocomplete.close();
            vec![]
        }
        KeyCode::Enter if following.autocomplete.open => following.choose_suggestion().into_iter().collect(),
        KeyCode::Enter => following.submit_search().into_iter().collect(),
        _ => {
            if edit_field(&mut following.search, key) {
                following.search_edited(Instant::now());
            }
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Ack, SessionStatus};
    use crate::api::{ApiError, Request};
    use crate::config::AppConfig;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn state() -> AppState {
        AppState::with_today(AppConfig::default(), today)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)))
    }

    #[test]
    fn test_startup_checks_session() {
        let mut state = state();
        assert_eq!(startup(&mut state), vec![Action::Api(Request::Session)]);
        assert_eq!(state.in_flight, 1);

        let actions = handle_event(
            &mut state,
            AppEvent::Api(Reply::Session(Outcome::Ok(SessionStatus { logged_in: false }))),
        );
        assert_eq!(state.pages.page, Page::Login);
        assert_eq!(actions, vec![Action::Api(Request::Session)]);
        assert_eq!(state.session.logged_in, Some(false));
    }

    #[test]
    fn test_session_form_errors_alert() {
        let mut state = state();
        startup(&mut state);
        let errors = [("__all__", vec!["Session expired".to_string()])].into_iter().collect();
        let actions = handle_event(&mut state, AppEvent::Api(Reply::Session(Outcome::Invalid(errors))));
        assert!(actions.is_empty());
        assert_eq!(state.alert.as_deref(), Some("Session expired"));
        assert_eq!(state.session.logged_in, None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut state = state();
        assert_eq!(handle_event(&mut state, ctrl('c')), vec![Action::Quit]);
    }

    #[test]
    fn test_alert_captures_input() {
        let mut state = state();
        handle_event(
            &mut state,
            AppEvent::Api(Reply::Left(Outcome::Failed(ApiError::Server("Not logged in".into())))),
        );
        assert_eq!(state.alert.as_deref(), Some("Not logged in"));

        assert!(handle_event(&mut state, key(KeyCode::F(2))).is_empty());
        assert_eq!(state.tab, Tab::Home);
        handle_event(&mut state, key(KeyCode::Esc));
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_calendar_tab_fetches_once() {
        let mut state = state();
        let actions = handle_event(&mut state, key(KeyCode::F(2)));
        assert!(matches!(actions.as_slice(), [Action::Api(Request::CalendarEvents { .. })]));
        handle_event(&mut state, key(KeyCode::F(1)));
        assert!(handle_event(&mut state, key(KeyCode::F(2))).is_empty());
    }

    #[test]
    fn test_calendar_selection_opens_notify() {
        let mut state = state();
        handle_event(&mut state, key(KeyCode::F(2)));
        handle_event(&mut state, key(KeyCode::Char(' ')));
        handle_event(&mut state, key(KeyCode::Right));
        handle_event(&mut state, key(KeyCode::Enter));
        assert_eq!(state.tab, Tab::Home);
        assert_eq!(state.pages.page, Page::Notify);
        assert_eq!(state.pages.notify.start.value(), "2024-01-10");
        assert_eq!(state.pages.notify.end.value(), "2024-01-11");
        assert_eq!(state.flashes.items.len(), 1);
    }

    #[test]
    fn test_calendar_list_shortcut() {
        let mut state = state();
        handle_event(&mut state, key(KeyCode::F(2)));
        let actions = handle_event(&mut state, key(KeyCode::Char('l')));
        assert_eq!(state.tab, Tab::List);
        assert_eq!(
            actions,
            vec![Action::Api(Request::ListEntries {
                query: "date_from=10+January+2024&date_to=10+January+2024".into()
            })]
        );
    }

    #[test]
    fn test_login_remembers_username() {
        let mut state = state();
        state.pages.show(Page::Login, today());
        state.pages.login.username.set("peter");
        let actions = handle_event(&mut state, AppEvent::Api(Reply::Login(Outcome::Ok(Ack { ok: true }))));
        assert_eq!(
            actions,
            vec![Action::SaveUsername("peter".into()), Action::Api(Request::Session)]
        );
        assert_eq!(state.config.server.username.as_deref(), Some("peter"));
        assert_eq!(state.session.username.as_deref(), Some("peter"));
    }

    #[test]
    fn test_login_typing_and_submit() {
        let mut state = state();
        state.pages.show(Page::Login, today());
        for c in "ann".chars() {
            handle_event(&mut state, key(KeyCode::Char(c)));
        }
        handle_event(&mut state, key(KeyCode::Tab));
        handle_event(&mut state, key(KeyCode::Char('x')));
        let actions = handle_event(&mut state, key(KeyCode::Enter));
        assert_eq!(
            actions,
            vec![Action::Api(Request::Login { username: "ann".into(), password: "x".into() })]
        );
    }

    #[test]
    fn test_list_reset_without_query_never_loads() {
        let mut state = state();
        handle_event(&mut state, key(KeyCode::F(3)));
        for _ in 0..4 {
            handle_event(&mut state, key(KeyCode::Tab));
        }
        handle_event(&mut state, key(KeyCode::Char('x')));
        handle_event(&mut state, ctrl('r'));
        assert!(handle_event(&mut state, key(KeyCode::Enter)).is_empty());
        assert!(state.list.table.is_none());
    }

    #[test]
    fn test_following_tab_loads_page() {
        let mut state = state();
        let actions = handle_event(&mut state, key(KeyCode::F(4)));
        assert_eq!(actions, vec![Action::Api(Request::FollowingPage)]);
    }

    #[test]
    fn test_ctrl_d_dismisses_flash() {
        let mut state = state();
        apply_effects(&mut state, vec![Effect::Flash("Saved successfully!".into())]);
        let id = state.flashes.items[0].id;
        handle_event(&mut state, ctrl('d'));
        assert!(state.flashes.is_fading(id));
    }

    #[test]
    fn test_flash_kinds() {
        let mut state = state();
        apply_effects(
            &mut state,
            vec![Effect::Flash("Saved successfully!".into()), Effect::Notice("New notification".into())],
        );
        state.flash("Could not save config".into(), FlashKind::Error);
        let kinds: Vec<FlashKind> = state.flashes.items.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FlashKind::Success, FlashKind::Info, FlashKind::Error]);
    }
}
