use std::{collections::HashMap, sync::Arc};

use log::{error, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::task::JoinSet;

use harmonic_lb::{ClusterState, LbError, driver};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EndpointStats {
    pub first_picks: usize,
    pub successes: usize,
    pub failures: usize,
}

#[derive(Debug, Default)]
pub struct Report {
    pub delivered: usize,
    pub undelivered: usize,
    pub attempts: usize,
    pub endpoints: HashMap<String, EndpointStats>,
}

impl Report {
    fn merge(&mut self, other: Report) {
        self.delivered += other.delivered;
        self.undelivered += other.undelivered;
        self.attempts += other.attempts;
        for (endpoint, stats) in other.endpoints {
            let entry = self.endpoints.entry(endpoint).or_default();
            entry.first_picks += stats.first_picks;
            entry.successes += stats.successes;
            entry.failures += stats.failures;
        }
    }
}

pub struct Simulation {
    pub cluster: Arc<ClusterState>,
    pub failure_rates: Arc<HashMap<String, f64>>,
    pub retry_limit: usize,
    pub requests: usize,
    pub concurrency: usize,
    pub seed: Option<u64>,
}

impl Simulation {
    pub async fn run(&self) -> Result<Report, LbError> {
        let workers = self.concurrency.max(1);
        let mut tasks = JoinSet::new();

        for worker in 0..workers {
            // spread the remainder over the first workers
            let share = self.requests / workers + usize::from(worker < self.requests % workers);
            if share == 0 {
                continue;
            }

            let cluster = Arc::clone(&self.cluster);
            let failure_rates = Arc::clone(&self.failure_rates);
            let retry_limit = self.retry_limit;
            let rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
                None => StdRng::from_entropy(),
            };

            tasks.spawn(async move {
                run_worker(&cluster, &failure_rates, retry_limit, share, rng)
            });
        }

        let mut report = Report::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => report.merge(result?),
                Err(err) => error!("Simulation worker stopped unexpectedly: {}", err),
            }
        }

        info!(
            "Simulation finished: {} delivered, {} undelivered, {} attempts",
            report.delivered, report.undelivered, report.attempts
        );
        Ok(report)
    }
}

fn run_worker(
    cluster: &ClusterState,
    failure_rates: &HashMap<String, f64>,
    retry_limit: usize,
    requests: usize,
    mut rng: StdRng,
) -> Result<Report, LbError> {
    let mut report = Report::default();

    for _ in 0..requests {
        let mut first = true;
        let outcome = driver::dispatch(cluster, retry_limit, |endpoint| {
            let stats = report.endpoints.entry(endpoint.to_string()).or_default();
            if first {
                stats.first_picks += 1;
                first = false;
            }

            let failure_rate = failure_rates.get(endpoint).copied().unwrap_or(0.0);
            let ok = !rng.gen_bool(failure_rate.clamp(0.0, 1.0));
            if ok {
                stats.successes += 1;
            } else {
                stats.failures += 1;
            }
            ok
        })?;

        report.attempts += outcome.attempts;
        if outcome.delivered() {
            report.delivered += 1;
        } else {
            report.undelivered += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(rates: &[(&str, f64)], requests: usize, concurrency: usize) -> Simulation {
        let cluster = ClusterState::new(rates.iter().map(|(name, _)| *name)).unwrap();
        let failure_rates = rates
            .iter()
            .map(|(name, rate)| (name.to_string(), *rate))
            .collect();

        Simulation {
            cluster: Arc::new(cluster),
            failure_rates: Arc::new(failure_rates),
            retry_limit: rates.len() - 1,
            requests,
            concurrency,
            seed: Some(11),
        }
    }

    #[tokio::test]
    async fn healthy_cluster_delivers_everything() {
        let sim = simulation(&[("s0", 0.0), ("s1", 0.0), ("s2", 0.0)], 300, 3);
        let report = sim.run().await.unwrap();

        assert_eq!(report.delivered, 300);
        assert_eq!(report.undelivered, 0);
        assert_eq!(report.attempts, 300);
        let picks: usize = report.endpoints.values().map(|s| s.first_picks).sum();
        assert_eq!(picks, 300);
    }

    #[tokio::test]
    async fn dead_endpoint_is_routed_around() {
        let sim = simulation(&[("s0", 0.0), ("s1", 1.0), ("s2", 0.0)], 2_000, 4);
        let report = sim.run().await.unwrap();

        // one retry always reaches a healthy endpoint
        assert_eq!(report.delivered, 2_000);
        assert_eq!(report.endpoints["s1"].successes, 0);
        assert!(report.endpoints["s1"].first_picks < report.endpoints["s0"].first_picks);
        assert!(report.endpoints["s1"].first_picks < report.endpoints["s2"].first_picks);
        assert_eq!(
            sim.cluster.error_count("s1"),
            Ok(report.endpoints["s1"].failures as u64)
        );
    }

    #[tokio::test]
    async fn fully_broken_cluster_gives_up() {
        let sim = simulation(&[("s0", 1.0), ("s1", 1.0)], 10, 2);
        let report = sim.run().await.unwrap();

        assert_eq!(report.delivered, 0);
        assert_eq!(report.undelivered, 10);
        assert_eq!(report.attempts, 20);
    }
}
