use serde::{Deserialize, Serialize};

use crate::default::{
    get_default_concurrency, get_default_failure_rate, get_default_log, get_default_log_level,
    get_default_requests, get_default_simulation, get_default_version,
};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default = "get_default_version")]
    pub version: u32,

    pub cluster: Cluster,

    #[serde(default)]
    pub retry: Retry,

    #[serde(default = "get_default_simulation")]
    pub simulation: Simulation,

    #[serde(default = "get_default_log")]
    pub log: Log,
}

impl Config {
    /// Retries allowed after the first attempt. Defaults to one pass over the
    /// remaining endpoints.
    pub fn retry_limit(&self) -> usize {
        self.retry
            .limit
            .unwrap_or_else(|| self.cluster.endpoints.len().saturating_sub(1))
    }

    pub fn endpoint_addresses(&self) -> Vec<String> {
        self.cluster
            .endpoints
            .iter()
            .map(|endpoint| endpoint.address().to_string())
            .collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Cluster {
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Endpoint {
    Simple(String),
    Full {
        address: String,

        // only used by the simulator to fake outcomes
        #[serde(default = "get_default_failure_rate")]
        failure_rate: f64,
    },
}

impl Endpoint {
    pub fn address(&self) -> &str {
        match self {
            Endpoint::Simple(address) => address,
            Endpoint::Full { address, .. } => address,
        }
    }

    pub fn failure_rate(&self) -> f64 {
        match self {
            Endpoint::Simple(_) => get_default_failure_rate(),
            Endpoint::Full { failure_rate, .. } => *failure_rate,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Retry {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Simulation {
    #[serde(default = "get_default_requests")]
    pub requests: usize,

    #[serde(default = "get_default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Log {
    #[serde(default = "get_default_log_level")]
    pub level: String, // "trace, debug, info, warn, error, off"

    #[serde(default)]
    pub file: Option<String>,
}
