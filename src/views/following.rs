//! Editor for the people whose PTO the user follows.
//!
//! Rows move between the "observed" and "not observed" tables as soon as
//! the server acknowledges a follow, unfollow or restore.

use crate::api::models::{FollowReply, FollowingEntry, FollowingPage, Suggestion, UnfollowReply};
use crate::api::{Outcome, Request, UserId};
use crate::views::text_field::TextField;
use crate::views::{alert, alert_form_errors, Effect};
use std::time::{Duration, Instant};

/// Deferred suggestion lookups for the search field.
#[derive(Debug)]
pub struct Autocomplete {
    pending: Option<(String, Instant)>,
    /// Term of the last lookup sent; replies for any other term are stale.
    current: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub active: usize,
    pub open: bool,
    delay: Duration,
    min_length: usize,
}

impl Autocomplete {
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            pending: None,
            current: None,
            suggestions: Vec::new(),
            active: 0,
            open: false,
            delay,
            min_length,
        }
    }

    /// The search text changed. Suggestions already shown or in flight
    /// belong to the old text.
    pub fn schedule(&mut self, text: &str, now: Instant) {
        self.current = None;
        self.close();
        let term = text.trim();
        if term.chars().count() < self.min_length {
            self.pending = None;
            return;
        }
        self.pending = Some((term.to_string(), now + self.delay));
    }

    /// Fire the pending lookup once its delay has passed.
    pub fn tick(&mut self, now: Instant) -> Option<Effect> {
        let due = matches!(&self.pending, Some((_, at)) if *at <= now);
        if !due {
            return None;
        }
        let (term, _) = self.pending.take()?;
        self.current = Some(term.clone());
        Some(Effect::Request(Request::Autocomplete { term }))
    }

    pub fn apply(&mut self, term: &str, outcome: Outcome<Vec<Suggestion>>) {
        if self.current.as_deref() != Some(term) {
            return;
        }
        match outcome {
            Outcome::Ok(suggestions) => {
                self.open = !suggestions.is_empty();
                self.suggestions = suggestions;
                self.active = 0;
            }
            Outcome::Invalid(_) | Outcome::Failed(_) => self.close(),
        }
    }

    pub fn next(&mut self) {
        if !self.suggestions.is_empty() {
            self.active = (self.active + 1) % self.suggestions.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.suggestions.is_empty() {
            self.active = (self.active + self.suggestions.len() - 1) % self.suggestions.len();
        }
    }

    pub fn chosen(&self) -> Option<&Suggestion> {
        if self.open {
            self.suggestions.get(self.active)
        } else {
            None
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.suggestions.clear();
        self.active = 0;
    }

    /// Forget everything, in-flight replies included.
    pub fn reset(&mut self) {
        self.pending = None;
        self.current = None;
        self.close();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Observed,
    NotObserved,
}

pub struct FollowingLists {
    pub observed: Vec<FollowingEntry>,
    pub not_observed: Vec<FollowingEntry>,
    pub search: TextField,
    pub autocomplete: Autocomplete,
    pub focus: Focus,
    /// Highlighted row of the focused table.
    pub selected: usize,
    pub loaded: bool,
}

impl FollowingLists {
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            observed: Vec::new(),
            not_observed: Vec::new(),
            search: TextField::new(),
            autocomplete: Autocomplete::new(delay, min_length),
            focus: Focus::Search,
            selected: 0,
            loaded: false,
        }
    }

    pub fn load(&self) -> Effect {
        Effect::Request(Request::FollowingPage)
    }

    pub fn apply_page(&mut self, outcome: Outcome<FollowingPage>) -> Vec<Effect> {
        match outcome {
            Outcome::Ok(page) => {
                self.observed = page.observed;
                self.not_observed = page.not_observed;
                self.loaded = true;
                self.clamp_selection();
                vec![]
            }
            Outcome::Invalid(errors) => vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => vec![alert(&err)],
        }
    }

    pub fn search_edited(&mut self, now: Instant) {
        self.autocomplete.schedule(self.search.value(), now);
    }

    pub fn tick(&mut self, now: Instant) -> Option<Effect> {
        self.autocomplete.tick(now)
    }

    pub fn apply_suggestions(&mut self, term: &str, outcome: Outcome<Vec<Suggestion>>) {
        self.autocomplete.apply(term, outcome);
    }

    /// Submit the search form. Blank input does nothing.
    pub fn submit_search(&mut self) -> Option<Effect> {
        if self.search.value().trim().is_empty() {
            return None;
        }
        self.autocomplete.reset();
        Some(Effect::Request(Request::Follow {
            search: self.search.value().to_string(),
            restoring: None,
        }))
    }

    /// Pick the active suggestion and submit it.
    pub fn choose_suggestion(&mut self) -> Option<Effect> {
        let value = self.autocomplete.chosen()?.value.clone();
        self.search.set(value);
        self.autocomplete.close();
        self.submit_search()
    }

    /// Tab selects from an open menu, otherwise it moves focus.
    pub fn tab(&mut self) -> Option<Effect> {
        if self.focus == Focus::Search && self.autocomplete.open {
            return self.choose_suggestion();
        }
        self.focus = match self.focus {
            Focus::Search => Focus::Observed,
            Focus::Observed => Focus::NotObserved,
            Focus::NotObserved => Focus::Search,
        };
        self.selected = 0;
        None
    }

    pub fn remove(&self, id: UserId) -> Effect {
        Effect::Request(Request::Unfollow { id })
    }

    pub fn restore(&self, id: UserId) -> Effect {
        Effect::Request(Request::Follow {
            search: id.to_string(),
            restoring: Some(id),
        })
    }

    /// Act on the highlighted row of the focused table.
    pub fn activate_selected(&self) -> Option<Effect> {
        match self.focus {
            Focus::Observed => self.observed.get(self.selected).map(|e| self.remove(e.id)),
            Focus::NotObserved => self.not_observed.get(self.selected).map(|e| self.restore(e.id)),
            Focus::Search => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.focused_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Observed => self.observed.len(),
            Focus::NotObserved => self.not_observed.len(),
            Focus::Search => 0,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.focused_len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn apply_followed(&mut self, restoring: Option<UserId>, outcome: Outcome<FollowReply>) -> Vec<Effect> {
        let reply = match outcome {
            Outcome::Ok(reply) => reply,
            Outcome::Invalid(errors) => return vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => return vec![alert(&err)],
        };
        if let FollowReply {
            id: Some(id),
            name: Some(name),
            reason: Some(reason),
        } = reply
        {
            if !name.is_empty() && !reason.is_empty() {
                self.observed.insert(0, FollowingEntry { id, name, reason });
                self.not_observed.retain(|e| e.id != id);
            }
        }
        match restoring {
            Some(id) => self.not_observed.retain(|e| e.id != id),
            None => self.search.clear(),
        }
        self.clamp_selection();
        vec![]
    }

    pub fn apply_unfollowed(&mut self, id: UserId, outcome: Outcome<UnfollowReply>) -> Vec<Effect> {
        let reply = match outcome {
            Outcome::Ok(reply) => reply,
            Outcome::Invalid(errors) => return vec![alert_form_errors(&errors)],
            Outcome::Failed(err) => return vec![alert(&err)],
        };
        self.observed.retain(|e| e.id != id);
        if let (Some(id), Some(name)) = (reply.id, reply.name.filter(|n| !n.is_empty())) {
            self.not_observed.insert(
                0,
                FollowingEntry {
                    id,
                    name,
                    reason: String::new(),
                },
            );
        }
        self.clamp_selection();
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use reqwest::StatusCode;

    fn entry(id: UserId, name: &str, reason: &str) -> FollowingEntry {
        FollowingEntry {
            id,
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn lists() -> FollowingLists {
        let mut lists = FollowingLists::new(Duration::from_millis(300), 2);
        lists.apply_page(Outcome::Ok(FollowingPage {
            observed: vec![entry(3, "Bob", "manager")],
            not_observed: vec![entry(7, "Alice", ""), entry(9, "Cid", "")],
            ..FollowingPage::default()
        }));
        lists
    }

    fn alice() -> FollowReply {
        FollowReply {
            id: Some(7),
            name: Some("Alice".into()),
            reason: Some("team".into()),
        }
    }

    #[test]
    fn test_add_moves_row_to_observed() {
        let mut lists = lists();
        lists.search.set("alice");
        assert_eq!(
            lists.submit_search(),
            Some(Effect::Request(Request::Follow { search: "alice".into(), restoring: None }))
        );
        lists.apply_followed(None, Outcome::Ok(alice()));
        assert_eq!(lists.observed[0], entry(7, "Alice", "team"));
        assert_eq!(lists.observed.len(), 2);
        assert!(lists.not_observed.iter().all(|e| e.id != 7));
        assert!(lists.search.is_empty());
    }

    #[test]
    fn test_blank_search_is_noop() {
        let mut lists = lists();
        lists.search.set("   ");
        assert!(lists.submit_search().is_none());
    }

    #[test]
    fn test_incomplete_reply_adds_nothing() {
        let mut lists = lists();
        lists.search.set("nobody");
        lists.apply_followed(None, Outcome::Ok(FollowReply::default()));
        assert_eq!(lists.observed.len(), 1);
        assert!(lists.search.is_empty());
    }

    #[test]
    fn test_follow_http_error_alerts() {
        let mut lists = lists();
        lists.search.set("zed");
        let effects = lists.apply_followed(
            None,
            Outcome::Failed(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                body: "No user found".into(),
            }),
        );
        assert_eq!(effects, vec![Effect::Alert("400 Bad Request: No user found".into())]);
        assert_eq!(lists.search.value(), "zed");
    }

    #[test]
    fn test_remove_then_restore() {
        let mut lists = lists();
        assert_eq!(lists.remove(3), Effect::Request(Request::Unfollow { id: 3 }));
        lists.apply_unfollowed(
            3,
            Outcome::Ok(UnfollowReply {
                id: Some(3),
                name: Some("Bob".into()),
            }),
        );
        assert!(lists.observed.is_empty());
        assert_eq!(lists.not_observed[0], entry(3, "Bob", ""));

        assert_eq!(
            lists.restore(9),
            Effect::Request(Request::Follow { search: "9".into(), restoring: Some(9) })
        );
        lists.apply_followed(
            Some(9),
            Outcome::Ok(FollowReply {
                id: Some(9),
                name: Some("Cid".into()),
                reason: Some("restored".into()),
            }),
        );
        assert_eq!(lists.observed[0].name, "Cid");
        assert!(lists.not_observed.iter().all(|e| e.id != 9));
    }

    #[test]
    fn test_autocomplete_delay_and_stale_term() {
        let mut lists = lists();
        let start = Instant::now();
        lists.search.set("al");
        lists.search_edited(start);
        assert!(lists.tick(start + Duration::from_millis(100)).is_none());
        assert_eq!(
            lists.tick(start + Duration::from_millis(300)),
            Some(Effect::Request(Request::Autocomplete { term: "al".into() }))
        );

        let suggestion = Suggestion {
            id: Some("7".into()),
            label: "Alice Smith".into(),
            value: "alice@example.com".into(),
        };

        // Reply for the old text lands before the new lookup fires.
        lists.search.set("alx");
        lists.search_edited(start + Duration::from_millis(350));
        lists.apply_suggestions("al", Outcome::Ok(vec![suggestion.clone()]));
        assert!(!lists.autocomplete.open);
        assert_eq!(lists.tab(), None);
        assert_eq!(lists.search.value(), "alx");
        lists.focus = Focus::Search;

        lists.search.set("ali");
        lists.search_edited(start + Duration::from_millis(400));
        lists.tick(start + Duration::from_millis(700));

        lists.apply_suggestions("al", Outcome::Ok(vec![suggestion.clone()]));
        assert!(!lists.autocomplete.open);

        lists.apply_suggestions("ali", Outcome::Ok(vec![suggestion]));
        assert!(lists.autocomplete.open);

        let effect = lists.tab();
        assert_eq!(
            effect,
            Some(Effect::Request(Request::Follow {
                search: "alice@example.com".into(),
                restoring: None
            }))
        );
        assert_eq!(lists.focus, Focus::Search);
    }

    #[test]
    fn test_short_term_does_not_schedule() {
        let mut lists = lists();
        let start = Instant::now();
        lists.search.set("a");
        lists.search_edited(start);
        assert!(lists.tick(start + Duration::from_secs(1)).is_none());
        assert!(lists.tab().is_none());
        assert_eq!(lists.focus, Focus::Observed);
    }
}
