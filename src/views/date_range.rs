//! Linked from/to date inputs.
//!
//! Each prefix owns a pair of fields, `id_<prefix>_from` and
//! `id_<prefix>_to`. Whenever one of them changes and both hold a date, a
//! range that would run backwards is collapsed onto the value just entered,
//! so `from <= to` holds at all times.

use crate::views::text_field::TextField;
use chrono::{Duration, NaiveDate};

/// Fallback input format, always accepted.
const ISO_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    From,
    To,
}

impl Role {
    pub fn suffix(self) -> &'static str {
        match self {
            Role::From => "_from",
            Role::To => "_to",
        }
    }

    pub fn other(self) -> Role {
        match self {
            Role::From => Role::To,
            Role::To => Role::From,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateBounds {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl DateBounds {
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        let date = self.min.map_or(date, |min| date.max(min));
        self.max.map_or(date, |max| date.min(max))
    }
}

/// Server-provided limits for the two known prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateLimits {
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub filed_min: Option<NaiveDate>,
    pub filed_max: Option<NaiveDate>,
}

/// Picker bounds for one field.
///
/// `date` is bounded on both ends for both fields; `date_filed` only gets a
/// lower bound on `_from` and an upper bound on `_to`.
pub fn bounds_for(prefix: &str, role: Role, limits: &DateLimits) -> DateBounds {
    match (prefix, role) {
        ("date", _) => DateBounds {
            min: limits.date_min,
            max: limits.date_max,
        },
        ("date_filed", Role::From) => DateBounds {
            min: limits.filed_min,
            max: None,
        },
        ("date_filed", Role::To) => DateBounds {
            min: None,
            max: limits.filed_max,
        },
        _ => DateBounds::default(),
    }
}

/// Signed whole days from `from` to `to`.
pub fn days_diff(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Correct a pair after `edited` changed: a backwards range collapses onto
/// the edited value. Empty fields are left alone.
pub fn correct(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    edited: Role,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match (from, to) {
        (Some(f), Some(t)) if days_diff(f, t) < 0 => match edited {
            Role::From => (Some(f), Some(f)),
            Role::To => (Some(t), Some(t)),
        },
        _ => (from, to),
    }
}

pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, format)
        .or_else(|_| NaiveDate::parse_from_str(text, ISO_FORMAT))
        .ok()
}

pub fn format_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

#[derive(Debug, Clone)]
pub struct DateRangeField {
    pub id: String,
    pub role: Role,
    pub value: Option<NaiveDate>,
    pub bounds: DateBounds,
    pub input: TextField,
    previous: Option<NaiveDate>,
}

impl DateRangeField {
    fn new(prefix: &str, role: Role, bounds: DateBounds) -> Self {
        Self {
            id: format!("id_{}{}", prefix, role.suffix()),
            role,
            value: None,
            bounds,
            input: TextField::new(),
            previous: None,
        }
    }

    /// Last committed value.
    pub fn previous(&self) -> Option<NaiveDate> {
        self.previous
    }

    fn show(&mut self, value: Option<NaiveDate>, format: &str) {
        self.value = value;
        match value {
            Some(date) => self.input.set(format_date(date, format)),
            None => self.input.clear(),
        }
    }

    /// Throw away uncommitted text.
    pub fn revert(&mut self, format: &str) {
        let previous = self.previous;
        self.show(previous, format);
    }
}

#[derive(Debug, Clone)]
pub struct DateRangePair {
    pub prefix: String,
    pub from: DateRangeField,
    pub to: DateRangeField,
}

impl DateRangePair {
    pub fn new(prefix: &str, limits: &DateLimits) -> Self {
        Self {
            prefix: prefix.to_string(),
            from: DateRangeField::new(prefix, Role::From, bounds_for(prefix, Role::From, limits)),
            to: DateRangeField::new(prefix, Role::To, bounds_for(prefix, Role::To, limits)),
        }
    }

    pub fn field(&self, role: Role) -> &DateRangeField {
        match role {
            Role::From => &self.from,
            Role::To => &self.to,
        }
    }

    pub fn field_mut(&mut self, role: Role) -> &mut DateRangeField {
        match role {
            Role::From => &mut self.from,
            Role::To => &mut self.to,
        }
    }

    /// Commit the text of `role` and run the correction.
    pub fn change(&mut self, role: Role, format: &str) {
        let field = self.field_mut(role);
        let parsed = parse_date(field.input.value(), format).map(|d| field.bounds.clamp(d));
        field.show(parsed, format);

        // The other field may hold text that was never committed.
        let other = self.field_mut(role.other());
        if other.value.is_none() {
            if let Some(date) = parse_date(other.input.value(), format) {
                let date = other.bounds.clamp(date);
                other.show(Some(date), format);
                other.previous = Some(date);
            }
        }

        let (from, to) = correct(self.from.value, self.to.value, role);
        let corrected = match role {
            Role::From => to,
            Role::To => from,
        };
        let other = self.field_mut(role.other());
        if other.value != corrected {
            other.show(corrected, format);
            other.previous = corrected;
        }

        let field = self.field_mut(role);
        field.previous = field.value;
    }

    pub fn set(&mut self, role: Role, value: Option<NaiveDate>, format: &str) {
        let text = value.map(|d| format_date(d, format)).unwrap_or_default();
        self.field_mut(role).input.set(text);
        self.change(role, format);
    }

    /// Move a field by `days`, starting from `today` when it is empty.
    pub fn step(&mut self, role: Role, days: i64, today: NaiveDate, format: &str) {
        let base = self.field(role).value.unwrap_or(today);
        let next = base.checked_add_signed(Duration::days(days)).unwrap_or(base);
        self.set(role, Some(next), format);
    }

    pub fn clear(&mut self) {
        for field in [&mut self.from, &mut self.to] {
            field.value = None;
            field.previous = None;
            field.input.clear();
        }
    }

    /// Fire one synthetic change on the first field holding text.
    pub fn prime(&mut self, format: &str) -> Option<Role> {
        let role = [Role::From, Role::To]
            .into_iter()
            .find(|role| !self.field(*role).input.value().trim().is_empty())?;
        self.change(role, format);
        Some(role)
    }
}

/// All date pairs of one form.
#[derive(Debug, Clone)]
pub struct DateRangeControl {
    pub format: String,
    pub pairs: Vec<DateRangePair>,
}

impl DateRangeControl {
    pub fn init(prefixes: &[&str], format: &str, limits: &DateLimits) -> Self {
        Self {
            format: format.to_string(),
            pairs: prefixes.iter().map(|p| DateRangePair::new(p, limits)).collect(),
        }
    }

    pub fn pair(&self, prefix: &str) -> Option<&DateRangePair> {
        self.pairs.iter().find(|p| p.prefix == prefix)
    }

    /// Locate a field by its element id (`id_<prefix>_from`).
    pub fn locate(&self, id: &str) -> Option<(usize, Role)> {
        self.pairs.iter().enumerate().find_map(|(i, pair)| {
            [Role::From, Role::To]
                .into_iter()
                .find(|role| pair.field(*role).id == id)
                .map(|role| (i, role))
        })
    }

    /// Put raw text into a field without committing it.
    pub fn prefill(&mut self, id: &str, text: &str) -> bool {
        match self.locate(id) {
            Some((i, role)) => {
                self.pairs[i].field_mut(role).input.set(text);
                true
            }
            None => false,
        }
    }

    pub fn change(&mut self, index: usize, role: Role) {
        let format = self.format.clone();
        if let Some(pair) = self.pairs.get_mut(index) {
            pair.change(role, &format);
        }
    }

    /// Initial correction pass, at most one change per pair.
    pub fn prime(&mut self) -> Vec<Option<Role>> {
        let format = self.format.clone();
        self.pairs.iter_mut().map(|pair| pair.prime(&format)).collect()
    }

    pub fn clear(&mut self) {
        for pair in &mut self.pairs {
            pair.clear();
        }
    }

    /// `(name, text)` for every field holding a date, named without the
    /// `id_` prefix.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .flat_map(|pair| [&pair.from, &pair.to])
            .filter(|field| field.value.is_some())
            .map(|field| {
                let name = field.id.trim_start_matches("id_").to_string();
                (name, field.input.value().to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FMT: &str = "%-d %B %Y";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_correct_from_pushes_to() {
        let (from, to) = correct(Some(d(2024, 1, 10)), Some(d(2024, 1, 5)), Role::From);
        assert_eq!(from, Some(d(2024, 1, 10)));
        assert_eq!(to, Some(d(2024, 1, 10)));
    }

    #[test]
    fn test_correct_to_pulls_from() {
        let (from, to) = correct(Some(d(2024, 1, 10)), Some(d(2024, 1, 5)), Role::To);
        assert_eq!(from, Some(d(2024, 1, 5)));
        assert_eq!(to, Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_correct_ignores_empty_and_ordered() {
        assert_eq!(correct(Some(d(2024, 1, 10)), None, Role::From), (Some(d(2024, 1, 10)), None));
        assert_eq!(
            correct(Some(d(2024, 1, 1)), Some(d(2024, 1, 1)), Role::To),
            (Some(d(2024, 1, 1)), Some(d(2024, 1, 1)))
        );
    }

    #[test]
    fn test_change_on_from_field() {
        let mut control = DateRangeControl::init(&["date"], FMT, &DateLimits::default());
        control.prefill("id_date_from", "2024-01-10");
        control.prefill("id_date_to", "2024-01-05");
        control.change(0, Role::To);
        control.pairs[0].from.input.set("10 January 2024");
        control.change(0, Role::From);
        let pair = &control.pairs[0];
        assert_eq!(pair.to.value, Some(d(2024, 1, 10)));
        assert_eq!(pair.to.input.value(), "10 January 2024");
    }

    #[test]
    fn test_invariant_holds_after_any_edits() {
        let dates = [None, Some(d(2024, 3, 1)), Some(d(2024, 3, 15)), Some(d(2024, 2, 20))];
        let edits: Vec<(Role, Option<NaiveDate>)> = [Role::From, Role::To]
            .into_iter()
            .flat_map(|role| dates.iter().map(move |date| (role, *date)))
            .collect();

        for a in &edits {
            for b in &edits {
                for c in &edits {
                    let mut pair = DateRangePair::new("date", &DateLimits::default());
                    for (role, value) in [a, b, c] {
                        pair.set(*role, *value, FMT);
                        if let (Some(from), Some(to)) = (pair.from.value, pair.to.value) {
                            assert!(from <= to, "{:?} > {:?} after {:?}", from, to, [a, b, c]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_prime_fires_once_and_keeps_prefilled() {
        let mut control =
            DateRangeControl::init(&["date", "date_filed"], FMT, &DateLimits::default());
        control.prefill("id_date_to", "5 January 2024");
        let fired = control.prime();
        assert_eq!(fired, vec![Some(Role::To), None]);
        let pair = control.pair("date").unwrap();
        assert_eq!(pair.to.value, Some(d(2024, 1, 5)));
        assert_eq!(pair.from.value, None);
        assert_eq!(pair.to.previous(), Some(d(2024, 1, 5)));
    }

    #[test]
    fn test_prime_prefers_from_when_both_set() {
        let mut control = DateRangeControl::init(&["date"], FMT, &DateLimits::default());
        control.prefill("id_date_from", "10 January 2024");
        control.prefill("id_date_to", "5 January 2024");
        assert_eq!(control.prime(), vec![Some(Role::From)]);
        let pair = control.pair("date").unwrap();
        assert_eq!(pair.from.value, Some(d(2024, 1, 10)));
        assert_eq!(pair.to.value, Some(d(2024, 1, 10)));
    }

    #[test]
    fn test_bounds_policy() {
        let limits = DateLimits {
            date_min: Some(d(2010, 1, 1)),
            date_max: Some(d(2030, 12, 31)),
            filed_min: Some(d(2011, 6, 1)),
            filed_max: Some(d(2024, 5, 1)),
        };
        let pair = DateRangePair::new("date_filed", &limits);
        assert_eq!(pair.from.bounds, DateBounds { min: Some(d(2011, 6, 1)), max: None });
        assert_eq!(pair.to.bounds, DateBounds { min: None, max: Some(d(2024, 5, 1)) });
        let pair = DateRangePair::new("date", &limits);
        assert_eq!(pair.to.bounds.max, Some(d(2030, 12, 31)));
        assert_eq!(bounds_for("other", Role::From, &limits), DateBounds::default());
    }

    #[test]
    fn test_edit_clamped_to_own_bounds() {
        let limits = DateLimits {
            filed_max: Some(d(2024, 5, 1)),
            ..DateLimits::default()
        };
        let mut pair = DateRangePair::new("date_filed", &limits);
        pair.set(Role::To, Some(d(2024, 6, 9)), FMT);
        assert_eq!(pair.to.value, Some(d(2024, 5, 1)));
    }

    #[test]
    fn test_uncommitted_other_field_is_clamped() {
        let limits = DateLimits {
            filed_max: Some(d(2024, 5, 1)),
            ..DateLimits::default()
        };
        let mut control = DateRangeControl::init(&["date_filed"], FMT, &limits);
        control.prefill("id_date_filed_from", "3 March 2024");
        control.prefill("id_date_filed_to", "1 January 2030");
        control.change(0, Role::From);
        let pair = &control.pairs[0];
        assert_eq!(pair.to.value, Some(d(2024, 5, 1)));
        assert_eq!(pair.to.input.value(), "1 May 2024");
        assert_eq!(pair.to.previous(), Some(d(2024, 5, 1)));
    }

    #[test]
    fn test_unparseable_text_clears_field() {
        let mut pair = DateRangePair::new("date", &DateLimits::default());
        pair.from.input.set("next tuesday");
        pair.change(Role::From, FMT);
        assert_eq!(pair.from.value, None);
        assert!(pair.from.input.is_empty());
    }

    #[test]
    fn test_revert_restores_previous() {
        let mut pair = DateRangePair::new("date", &DateLimits::default());
        pair.set(Role::From, Some(d(2024, 1, 3)), FMT);
        pair.from.input.set("4 Jan");
        pair.from.revert(FMT);
        assert_eq!(pair.from.input.value(), "3 January 2024");
    }

    #[test]
    fn test_step_from_empty_uses_today() {
        let mut pair = DateRangePair::new("date", &DateLimits::default());
        pair.step(Role::To, -1, d(2024, 3, 1), FMT);
        assert_eq!(pair.to.value, Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_query_pairs() {
        let mut control =
            DateRangeControl::init(&["date", "date_filed"], FMT, &DateLimits::default());
        control.pairs[0].set(Role::From, Some(d(2024, 1, 5)), FMT);
        let pairs = control.query_pairs();
        assert_eq!(pairs, vec![("date_from".to_string(), "5 January 2024".to_string())]);
        assert_eq!(control.locate("id_date_filed_to"), Some((1, Role::To)));
    }
}
