// Reference retry loop on top of ClusterState: select, send, report the outcome.
use log::{debug, warn};

use crate::{ClusterState, LbError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Endpoint that accepted the request, `None` if every attempt failed.
    pub endpoint: Option<String>,
    pub attempts: usize,
}

impl Dispatch {
    pub fn delivered(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Sends one request with up to `retry_limit` retries after the first attempt.
///
/// `send` returns `true` when the endpoint handled the request. Failures are
/// recorded in the cluster's error ledger and a success clears the endpoint's
/// history.
pub fn dispatch<F>(
    cluster: &ClusterState,
    retry_limit: usize,
    mut send: F,
) -> Result<Dispatch, LbError>
where
    F: FnMut(&str) -> bool,
{
    let mut previous: Option<String> = None;

    for attempt in 0..=retry_limit {
        let endpoint = cluster.select(attempt, previous.as_deref())?.to_string();

        if send(&endpoint) {
            cluster.reset_error(&endpoint);
            return Ok(Dispatch {
                endpoint: Some(endpoint),
                attempts: attempt + 1,
            });
        }

        debug!("Attempt {attempt} against {endpoint} failed");
        cluster.increment_error(&endpoint);
        previous = Some(endpoint);
    }

    warn!("Request failed after {} attempts", retry_limit + 1);
    Ok(Dispatch {
        endpoint: None,
        attempts: retry_limit + 1,
    })
}
