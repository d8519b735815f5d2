use std::time::{Duration, Instant};

pub const FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub id: u64,
    pub text: String,
    pub kind: FlashKind,
    pub shown_at: Instant,
    pub fading_since: Option<Instant>,
}

/// Stack of transient banners.
#[derive(Debug)]
pub struct FlashBoard {
    pub items: Vec<Flash>,
    next_id: u64,
    auto_dismiss: Duration,
}

impl FlashBoard {
    pub fn new(auto_dismiss: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            auto_dismiss,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, kind: FlashKind, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Flash {
            id,
            text: text.into(),
            kind,
            shown_at: now,
            fading_since: None,
        });
        id
    }

    /// Close control: start fading right away.
    pub fn dismiss(&mut self, id: u64, now: Instant) -> bool {
        match self.items.iter_mut().find(|f| f.id == id && f.fading_since.is_none()) {
            Some(flash) => {
                flash.fading_since = Some(now);
                true
            }
            None => false,
        }
    }

    pub fn dismiss_latest(&mut self, now: Instant) -> bool {
        let latest = self
            .items
            .iter()
            .rev()
            .find(|f| f.fading_since.is_none())
            .map(|f| f.id);
        match latest {
            Some(id) => self.dismiss(id, now),
            None => false,
        }
    }

    /// Start due fades and drop faded banners. Returns true if anything
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        let mut changed = false;
        for flash in &mut self.items {
            if flash.fading_since.is_none() && now.duration_since(flash.shown_at) >= self.auto_dismiss {
                flash.fading_since = Some(now);
                changed = true;
            }
        }
        self.items
            .retain(|f| f.fading_since.map_or(true, |since| now.duration_since(since) < FADE));
        changed || self.items.len() != before
    }

    pub fn is_fading(&self, id: u64) -> bool {
        self.items.iter().any(|f| f.id == id && f.fading_since.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_dismiss_after_timeout() {
        let start = Instant::now();
        let mut board = FlashBoard::new(Duration::from_secs(10));
        let id = board.push("Saved successfully!", FlashKind::Success, start);

        assert!(!board.tick(start + Duration::from_secs(9)));
        assert!(!board.is_fading(id));

        assert!(board.tick(start + Duration::from_secs(10)));
        assert!(board.is_fading(id));

        board.tick(start + Duration::from_millis(10_500));
        assert!(board.is_empty());
    }

    #[test]
    fn test_manual_dismiss_fades_immediately() {
        let start = Instant::now();
        let mut board = FlashBoard::new(Duration::from_secs(10));
        let first = board.push("one", FlashKind::Info, start);
        let second = board.push("two", FlashKind::Info, start);

        assert!(board.dismiss_latest(start));
        assert!(board.is_fading(second));
        assert!(!board.is_fading(first));
        assert!(!board.dismiss(second, start));

        board.tick(start + FADE);
        assert_eq!(board.items.len(), 1);
        assert_eq!(board.items[0].id, first);
    }
}
