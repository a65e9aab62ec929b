//! Search debouncing.
//!
//! Keystrokes arrive one at a time; the debouncer turns them into at most one
//! lookup per quiet period and hands out a token with each lookup so late
//! completions from superseded queries can be recognized and dropped.

use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period between the last keystroke and the lookup.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);
/// Queries shorter than this (in characters) never reach the catalog.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Outcome of a query edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryChange {
    /// Query too short: results and errors should be cleared, nothing scheduled.
    Cleared,
    /// A lookup is now scheduled for `due`.
    Scheduled { due: Instant },
}

/// A lookup whose quiet period has elapsed and should be fired now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub query: String,
    pub token: u64,
}

#[derive(Debug)]
struct PendingLookup {
    query: String,
    due: Instant,
    token: u64,
}

#[derive(Debug)]
pub struct SearchDebouncer {
    quiet_period: Duration,
    min_query_len: usize,
    pending: Option<PendingLookup>,
    latest_token: u64,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD, DEFAULT_MIN_QUERY_LEN)
    }
}

impl SearchDebouncer {
    pub fn new(quiet_period: Duration, min_query_len: usize) -> Self {
        Self {
            quiet_period,
            min_query_len,
            pending: None,
            latest_token: 0,
        }
    }

    /// Records a new query value.
    ///
    /// Every call issues a fresh token, so any lookup already in flight stops
    /// being current the moment the user types again. A pending lookup is
    /// replaced (rescheduled) or dropped (query too short).
    pub fn on_query_change(&mut self, query: &str, now: Instant) -> QueryChange {
        if query.chars().count() < self.min_query_len {
            self.cancel();
            return QueryChange::Cleared;
        }

        self.latest_token = self.latest_token.wrapping_add(1);
        let due = now + self.quiet_period;
        self.pending = Some(PendingLookup {
            query: query.to_string(),
            due,
            token: self.latest_token,
        });
        QueryChange::Scheduled { due }
    }

    /// When the pending lookup becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Takes the pending lookup if its quiet period has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<LookupTicket> {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            self.pending.take().map(|p| LookupTicket {
                query: p.query,
                token: p.token,
            })
        } else {
            None
        }
    }

    /// True if `token` belongs to the most recently issued lookup.
    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest_token
    }

    /// Drops any pending lookup and invalidates the in-flight one.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.latest_token = self.latest_token.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_short_query_clears_without_scheduling() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        assert_eq!(d.on_query_change("in", now), QueryChange::Cleared);
        assert_eq!(d.deadline(), None);
        assert_eq!(d.take_due(now + ms(10_000)), None);
    }

    #[test]
    fn test_short_query_counts_characters_not_bytes() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        // two characters, four bytes
        assert_eq!(d.on_query_change("éé", now), QueryChange::Cleared);
        assert!(matches!(d.on_query_change("ééé", now), QueryChange::Scheduled { .. }));
    }

    #[test]
    fn test_lookup_not_due_before_quiet_period() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        d.on_query_change("inception", now);
        assert_eq!(d.take_due(now + ms(499)), None);
        let ticket = d.take_due(now + ms(500)).unwrap();
        assert_eq!(ticket.query, "inception");
        assert!(d.is_current(ticket.token));
        // taken exactly once
        assert_eq!(d.take_due(now + ms(1000)), None);
    }

    #[test]
    fn test_edit_reschedules() {
        let mut d = SearchDebouncer::default();
        let start = Instant::now();
        d.on_query_change("ince", start);
        d.on_query_change("incep", start + ms(300));
        assert_eq!(d.take_due(start + ms(500)), None);
        assert_eq!(d.deadline(), Some(start + ms(800)));
        assert_eq!(d.take_due(start + ms(800)).unwrap().query, "incep");
    }

    #[test]
    fn test_shortening_query_drops_pending() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        d.on_query_change("inc", now);
        assert_eq!(d.deadline(), Some(now + ms(500)));
        d.on_query_change("in", now + ms(100));
        assert_eq!(d.deadline(), None);
        assert_eq!(d.take_due(now + ms(10_000)), None);
    }

    #[test]
    fn test_short_query_invalidates_in_flight_token() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        d.on_query_change("alien", now);
        let ticket = d.take_due(now + ms(500)).unwrap();
        assert_eq!(d.on_query_change("al", now + ms(600)), QueryChange::Cleared);
        assert!(!d.is_current(ticket.token));
    }

    #[test]
    fn test_typing_invalidates_in_flight_token() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        d.on_query_change("heat", now);
        let first = d.take_due(now + ms(500)).unwrap();
        assert!(d.is_current(first.token));

        d.on_query_change("heat 1995", now + ms(600));
        assert!(!d.is_current(first.token));

        let second = d.take_due(now + ms(1100)).unwrap();
        assert!(d.is_current(second.token));
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_cancel_invalidates_everything() {
        let mut d = SearchDebouncer::default();
        let now = Instant::now();
        d.on_query_change("alien", now);
        let ticket = d.take_due(now + ms(500)).unwrap();
        d.on_query_change("aliens", now + ms(600));
        d.cancel();
        assert!(!d.is_current(ticket.token));
        assert_eq!(d.take_due(now + ms(5000)), None);
    }

    #[test]
    fn test_custom_settings() {
        let mut d = SearchDebouncer::new(ms(50), 1);
        let now = Instant::now();
        assert!(matches!(d.on_query_change("x", now), QueryChange::Scheduled { .. }));
        assert_eq!(d.take_due(now + ms(50)).unwrap().query, "x");
    }

    proptest! {
        /// Any burst of edits inside the quiet period fires only the last value.
        #[test]
        fn prop_only_final_query_fires(
            queries in prop::collection::vec("[a-z]{3,12}", 1..20),
            gaps in prop::collection::vec(0u64..500, 20),
        ) {
            let mut d = SearchDebouncer::default();
            let mut now = Instant::now();
            let mut fired = Vec::new();

            for (i, q) in queries.iter().enumerate() {
                if i > 0 {
                    now += ms(gaps[i - 1].min(499));
                }
                if let Some(t) = d.take_due(now) {
                    fired.push(t.query);
                }
                d.on_query_change(q, now);
            }
            if let Some(t) = d.take_due(now + ms(500)) {
                fired.push(t.query);
            }

            prop_assert_eq!(fired, vec![queries.last().unwrap().clone()]);
        }
    }
}
