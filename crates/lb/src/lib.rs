//! Error-adaptive endpoint selection.
//!
//! A [`ClusterState`] holds a fixed list of endpoints and a failure counter per
//! endpoint. The first attempt of a request picks an endpoint at random, weighted
//! away from endpoints that have been failing. Retries walk the list in order,
//! starting after the endpoint that was tried last, so every endpoint gets a turn.

use log::debug;

use rand::Rng;

pub mod driver;
pub mod error;
pub mod ledger;
pub mod retry;
pub mod weighted;

pub use error::LbError;
pub use ledger::ErrorLedger;
pub use retry::RetryCursor;
pub use weighted::WeightedSelector;

#[derive(Debug)]
pub struct ClusterState {
    endpoints: Vec<String>,
    ledger: ErrorLedger,
}

impl ClusterState {
    pub fn new<I, S>(endpoints: I) -> Result<Self, LbError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints: Vec<String> = endpoints.into_iter().map(Into::into).collect();
        if endpoints.is_empty() {
            return Err(LbError::InvalidConfiguration(
                "endpoint list is empty".to_string(),
            ));
        }

        let ledger = ErrorLedger::new(endpoints.iter().map(String::as_str));
        Ok(Self { endpoints, ledger })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Bounds-checked lookup used by every selection path.
    pub fn endpoint(&self, index: usize) -> Result<&str, LbError> {
        self.endpoints
            .get(index)
            .map(String::as_str)
            .ok_or(LbError::IndexOutOfRange {
                index,
                count: self.endpoints.len(),
            })
    }

    /// Chooses the endpoint for attempt number `attempt` of a request.
    ///
    /// `previous` is the endpoint used by the preceding attempt and is only
    /// consulted on retries (`attempt > 0`).
    pub fn select(&self, attempt: usize, previous: Option<&str>) -> Result<&str, LbError> {
        self.select_with_rng(attempt, previous, &mut rand::thread_rng())
    }

    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        attempt: usize,
        previous: Option<&str>,
        rng: &mut R,
    ) -> Result<&str, LbError> {
        match self.endpoints.len() {
            0 => return Err(LbError::NoEndpoints),
            1 => return self.endpoint(0),
            _ => {}
        }

        let picked = if attempt == 0 {
            let counts = self.ledger.snapshot(self.endpoints.iter().map(String::as_str));
            WeightedSelector::new().pick(&counts, rng)
        } else {
            RetryCursor::new().next(&self.endpoints, previous)
        };
        let index = picked.ok_or(LbError::NoEndpoints)?;

        let endpoint = self.endpoint(index)?;
        debug!("Attempt {attempt} routed to endpoint {endpoint}");
        Ok(endpoint)
    }

    /// Records a failed attempt against `endpoint`. Unknown endpoints are ignored.
    pub fn increment_error(&self, endpoint: &str) {
        self.ledger.increment(endpoint);
    }

    /// Clears the failure history of `endpoint` after a successful attempt.
    pub fn reset_error(&self, endpoint: &str) {
        self.ledger.reset(endpoint);
    }

    pub fn error_count(&self, endpoint: &str) -> Result<u64, LbError> {
        self.ledger
            .get(endpoint)
            .ok_or_else(|| LbError::UnknownEndpoint(endpoint.to_string()))
    }

    /// Current counters, in endpoint order, read in one pass over the ledger.
    pub fn error_counts(&self) -> Vec<(&str, u64)> {
        let counts = self.ledger.snapshot(self.endpoints.iter().map(String::as_str));
        self.endpoints
            .iter()
            .map(String::as_str)
            .zip(counts)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn empty_cluster() -> ClusterState {
        ClusterState {
            endpoints: Vec::new(),
            ledger: ErrorLedger::new(std::iter::empty()),
        }
    }

    #[test]
    fn construction_zeroes_counters() {
        let cluster = ClusterState::new(["s0", "s1", "s2"]).unwrap();
        assert_eq!(cluster.len(), 3);
        assert_eq!(
            cluster.error_counts(),
            vec![("s0", 0), ("s1", 0), ("s2", 0)]
        );
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = ClusterState::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, LbError::InvalidConfiguration(_)));
    }

    #[test]
    fn empty_cluster_has_no_endpoints() {
        let cluster = empty_cluster();
        assert_eq!(cluster.select(0, None), Err(LbError::NoEndpoints));
        assert_eq!(cluster.select(1, Some("s0")), Err(LbError::NoEndpoints));
        assert_eq!(cluster.select(5, None), Err(LbError::NoEndpoints));
    }

    #[test]
    fn single_endpoint_always_wins() {
        let cluster = ClusterState::new(["only"]).unwrap();
        cluster.increment_error("only");
        cluster.increment_error("only");
        for attempt in 0..5 {
            assert_eq!(cluster.select(attempt, Some("only")), Ok("only"));
        }
    }

    #[test]
    fn retries_are_round_robin() {
        let cluster = ClusterState::new(["s0", "s1", "s2"]).unwrap();
        assert_eq!(cluster.select(1, Some("s0")), Ok("s1"));
        assert_eq!(cluster.select(1, Some("s1")), Ok("s2"));
        assert_eq!(cluster.select(2, Some("s2")), Ok("s0"));
        assert_eq!(cluster.select(1, Some("missing")), Ok("s0"));
        assert_eq!(cluster.select(1, None), Ok("s0"));
    }

    #[test]
    fn retries_ignore_error_counts() {
        let cluster = ClusterState::new(["s0", "s1", "s2"]).unwrap();
        for _ in 0..10 {
            cluster.increment_error("s1");
        }
        assert_eq!(cluster.select(1, Some("s0")), Ok("s1"));
    }

    #[test]
    fn bounds_checked_lookup() {
        let cluster = ClusterState::new(["s0", "s1"]).unwrap();
        assert_eq!(cluster.endpoint(1), Ok("s1"));
        assert_eq!(
            cluster.endpoint(2),
            Err(LbError::IndexOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn error_reporting() {
        let cluster = ClusterState::new(["s0", "s1"]).unwrap();
        cluster.increment_error("s0");
        cluster.increment_error("s0");
        assert_eq!(cluster.error_count("s0"), Ok(2));

        cluster.reset_error("s0");
        assert_eq!(cluster.error_count("s0"), Ok(0));

        cluster.increment_error("ghost");
        assert_eq!(
            cluster.error_count("ghost"),
            Err(LbError::UnknownEndpoint("ghost".to_string()))
        );
    }

    #[test]
    fn first_attempt_is_seedable() {
        let cluster = ClusterState::new(["s0", "s1", "s2", "s3"]).unwrap();
        cluster.increment_error("s2");

        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| cluster.select_with_rng(0, None, &mut rng).unwrap().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(9), picks(9));
    }
}
