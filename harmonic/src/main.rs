//! Harmonic - error-adaptive endpoint selection simulator
//!
//! Loads a cluster from the YAML config and pushes simulated requests through
//! the selection core, failing each attempt with the endpoint's configured
//! failure rate. Prints how traffic ended up spread over the endpoints.

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use log::{error, info};

use harmonic_config::validator::validate as validate_config;
use harmonic_lb::ClusterState;

mod simulate;

use simulate::{Report, Simulation};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    // Sets a custom config file
    #[arg(short, long)]
    config: Option<String>,

    /// Overrides the number of simulated requests
    #[arg(short, long)]
    requests: Option<usize>,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,
}

fn print_report(cluster: &ClusterState, report: &Report) {
    println!(
        "{:<24} {:>12} {:>10} {:>10} {:>8}",
        "endpoint", "first picks", "successes", "failures", "errors"
    );
    let mut printed = Vec::new();
    for (endpoint, errors) in cluster.error_counts() {
        if printed.contains(&endpoint) {
            continue;
        }
        printed.push(endpoint);

        let stats = report.endpoints.get(endpoint).cloned().unwrap_or_default();
        println!(
            "{:<24} {:>12} {:>10} {:>10} {:>8}",
            endpoint, stats.first_picks, stats.successes, stats.failures, errors
        );
    }
    println!(
        "delivered: {}  undelivered: {}  attempts: {}",
        report.delivered, report.undelivered, report.attempts
    );
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| "./config/config.yaml".to_string());

    // Read configuration file
    let mut config = match harmonic_config::loader::read_config(&config_path) {
        Ok(cfg) => cfg,
        Err(err_msg) => {
            eprintln!("Error loading config: {}", err_msg);
            std::process::exit(1);
        }
    };

    if let Some(requests) = cli.requests {
        config.simulation.requests = requests;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }

    // Initialize the Logger
    if let Err(err_msg) =
        harmonic_utils::logger::init_logger(&config.log.level, config.log.file.as_deref())
    {
        eprintln!("{}", err_msg);
        std::process::exit(1);
    }

    // Validate Configurations
    if !validate_config(&config) {
        error!("Configuration validation failed. Exiting...");
        std::process::exit(1);
    }

    let cluster = match ClusterState::new(config.endpoint_addresses()) {
        Ok(cluster) => Arc::new(cluster),
        Err(err) => {
            error!("Could not build cluster: {}", err);
            std::process::exit(1);
        }
    };

    let failure_rates: HashMap<String, f64> = config
        .cluster
        .endpoints
        .iter()
        .map(|endpoint| (endpoint.address().to_string(), endpoint.failure_rate()))
        .collect();

    info!(
        "Simulating {} requests over {} endpoints (retry limit {})",
        config.simulation.requests,
        cluster.len(),
        config.retry_limit()
    );

    let simulation = Simulation {
        cluster: Arc::clone(&cluster),
        failure_rates: Arc::new(failure_rates),
        retry_limit: config.retry_limit(),
        requests: config.simulation.requests,
        concurrency: config.simulation.concurrency,
        seed: config.simulation.seed,
    };

    match simulation.run().await {
        Ok(report) => print_report(&cluster, &report),
        Err(err) => {
            error!("Simulation aborted: {}", err);
            std::process::exit(1);
        }
    }
}
