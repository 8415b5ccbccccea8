//! Request generations for discarding stale responses.
//!
//! Every outgoing request takes a [`Ticket`] from a [`RequestTracker`].
//! Issuing a new ticket supersedes all earlier ones, so a response is
//! committed only if its ticket is still current when it arrives.

/// Tracks the latest request issued for a piece of state.
#[derive(Debug, Clone)]
pub struct RequestTracker<K> {
    generation: u64,
    current: Option<K>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
        }
    }
}

/// Identity of one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    generation: u64,
    key: K,
}

impl<K> Ticket<K> {
    /// The request target, e.g. a slug or filter.
    pub const fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Clone> RequestTracker<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `key`, superseding every earlier ticket.
    pub fn issue(&mut self, key: K) -> Ticket<K> {
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(key.clone());
        Ticket {
            generation: self.generation,
            key,
        }
    }

    /// Whether `ticket` is the latest one issued.
    #[must_use]
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        ticket.generation == self.generation
    }

    /// Target of the latest ticket.
    #[must_use]
    pub const fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }
}

/// Outcome of delivering a response to page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The response was written to state.
    Applied,
    /// A newer request superseded this one; the response was dropped.
    Stale,
    /// No request was issued.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_is_current() {
        let mut tracker = RequestTracker::new();

        let a = tracker.issue("a");
        assert!(tracker.is_current(&a));

        let b = tracker.issue("b");
        assert!(!tracker.is_current(&a));
        assert!(tracker.is_current(&b));
        assert_eq!(tracker.current(), Some(&"b"));
    }

    #[test]
    fn test_same_key_reissued_supersedes() {
        let mut tracker = RequestTracker::new();

        let first = tracker.issue("a");
        let second = tracker.issue("a");

        assert_eq!(first.key(), second.key());
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }
}
