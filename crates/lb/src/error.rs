#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LbError {
    InvalidConfiguration(String),
    NoEndpoints,
    IndexOutOfRange { index: usize, count: usize },
    UnknownEndpoint(String),
}

impl std::fmt::Display for LbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LbError::InvalidConfiguration(reason) => {
                write!(f, "invalid cluster configuration: {reason}")
            }
            LbError::NoEndpoints => write!(f, "cluster has no endpoints"),
            LbError::IndexOutOfRange { index, count } => {
                write!(f, "endpoint index {index} out of range for {count} endpoints")
            }
            LbError::UnknownEndpoint(endpoint) => write!(f, "unknown endpoint: {endpoint}"),
        }
    }
}

impl std::error::Error for LbError {}
