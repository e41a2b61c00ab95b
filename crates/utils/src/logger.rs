use std::{
    fs::{File, OpenOptions, create_dir_all},
    path::Path,
};

use env_logger::{Builder, Target};
use log::LevelFilter;

pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,

        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
            LevelFilter::Info
        }
    }
}

fn open_log_file(log_file: &str) -> Result<File, String> {
    if let Some(parent) = Path::new(log_file).parent() {
        create_dir_all(parent).map_err(|err| {
            format!("Failed to create log directory '{}': {}", parent.display(), err)
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|err| format!("Failed to open log file '{}': {}", log_file, err))
}

pub fn init_logger(log_level: &str, log_file: Option<&str>) -> Result<(), String> {
    let mut builder = Builder::new();
    builder
        .filter_level(parse_level(log_level))
        .format_timestamp_secs();

    // only write to file if configured
    if let Some(log_file) = log_file {
        let file = open_log_file(log_file)?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    // else → default (stderr)

    builder
        .try_init()
        .map_err(|err| format!("Failed to initialise logger: {}", err))
}
