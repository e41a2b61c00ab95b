use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Per-endpoint failure counters shared by every caller of a cluster.
///
/// The set of keys is fixed when the ledger is built; only the values change
/// afterwards. Every read and write goes through the same lock, so a scan over
/// several endpoints always sees one consistent set of counts.
#[derive(Debug)]
pub struct ErrorLedger {
    counts: Mutex<HashMap<String, u64>>,
}

impl ErrorLedger {
    pub fn new<'a, I>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let counts = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.to_string(), 0))
            .collect();
        Self {
            counts: Mutex::new(counts),
        }
    }

    // Counters are plain integers, a panic elsewhere cannot leave them half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one failure to `endpoint`. Returns `false` if the endpoint is not tracked.
    pub fn increment(&self, endpoint: &str) -> bool {
        match self.lock().get_mut(endpoint) {
            Some(count) => {
                *count = count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Clears the failures of `endpoint`. Returns `false` if the endpoint is not tracked.
    pub fn reset(&self, endpoint: &str) -> bool {
        match self.lock().get_mut(endpoint) {
            Some(count) => {
                *count = 0;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, endpoint: &str) -> Option<u64> {
        self.lock().get(endpoint).copied()
    }

    /// Reads the counters of `endpoints`, in order, inside a single critical section.
    pub fn snapshot<'a, I>(&self, endpoints: I) -> Vec<u64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let counts = self.lock();
        endpoints
            .into_iter()
            .map(|endpoint| counts.get(endpoint).copied().unwrap_or(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let ledger = ErrorLedger::new(["a", "b"]);
        assert_eq!(ledger.get("a"), Some(0));
        assert_eq!(ledger.get("b"), Some(0));
        assert_eq!(ledger.get("c"), None);
    }

    #[test]
    fn increment_and_reset() {
        let ledger = ErrorLedger::new(["a", "b"]);
        assert!(ledger.increment("a"));
        assert!(ledger.increment("a"));
        assert!(ledger.increment("b"));
        assert_eq!(ledger.snapshot(["a", "b"]), vec![2, 1]);

        assert!(ledger.reset("a"));
        assert_eq!(ledger.snapshot(["a", "b"]), vec![0, 1]);
    }

    #[test]
    fn unknown_endpoints_are_not_added() {
        let ledger = ErrorLedger::new(["a"]);
        assert!(!ledger.increment("z"));
        assert!(!ledger.reset("z"));
        assert_eq!(ledger.get("z"), None);
    }

    #[test]
    fn duplicates_share_one_counter() {
        let ledger = ErrorLedger::new(["a", "a", "b"]);
        ledger.increment("a");
        assert_eq!(ledger.snapshot(["a", "a", "b"]), vec![1, 1, 0]);
    }

    #[test]
    fn increment_saturates() {
        let ledger = ErrorLedger::new(["a"]);
        ledger.lock().insert("a".to_string(), u64::MAX);
        ledger.increment("a");
        assert_eq!(ledger.get("a"), Some(u64::MAX));
    }
}
