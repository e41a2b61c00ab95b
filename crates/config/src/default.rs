use crate::config::{Log, Simulation};

// default values
pub fn get_default_version() -> u32 {
    1
}

pub fn get_default_failure_rate() -> f64 {
    0.0
}

pub fn get_default_requests() -> usize {
    1000
}

pub fn get_default_concurrency() -> usize {
    4
}

pub fn get_default_log_level() -> String {
    String::from("info")
}

pub fn get_default_simulation() -> Simulation {
    Simulation {
        requests: get_default_requests(),
        concurrency: get_default_concurrency(),
        seed: None,
    }
}

pub fn get_default_log() -> Log {
    Log {
        level: get_default_log_level(),
        file: None,
    }
}
