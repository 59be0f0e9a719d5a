//! Concurrent request runner

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::Result;

use super::config::{LoadConfig, Target};

/// Outcome of one load run against one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub name: String,
    /// Responses with status 200
    pub successes: usize,
    /// Requests fired
    pub requests: usize,
    /// Wall-clock time from first spawn to last completion
    pub elapsed: Duration,
}

impl LoadReport {
    /// Requests that failed or returned anything but 200
    pub fn failures(&self) -> usize {
        self.requests - self.successes
    }

    /// Completed requests per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} successful responses in {:?}",
            self.name, self.successes, self.requests, self.elapsed
        )
    }
}

/// Fire `config.requests` concurrent GETs at `target`
pub async fn run(target: &Target, config: &LoadConfig) -> Result<LoadReport> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(run_with_client(&client, target, config.requests).await)
}

/// Same as [`run`], reusing an existing client and its connection pool
pub async fn run_with_client(
    client: &reqwest::Client,
    target: &Target,
    requests: usize,
) -> LoadReport {
    tracing::info!(target_name = %target.name, url = %target.url, requests, "Starting load run");

    let start = Instant::now();

    let handles: Vec<_> = (0..requests)
        .map(|_| {
            let client = client.clone();
            let url = target.url.clone();
            tokio::spawn(async move {
                match client.get(&url).send().await {
                    Ok(resp) => resp.status() == reqwest::StatusCode::OK,
                    Err(e) => {
                        tracing::debug!(error = %e, "Request failed");
                        false
                    }
                }
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await {
            Ok(true) => successes += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Request task failed"),
        }
    }

    let report = LoadReport {
        name: target.name.clone(),
        successes,
        requests,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        target_name = %report.name,
        successes = report.successes,
        failures = report.failures(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Load run finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = LoadReport {
            name: "Standard Server".into(),
            successes: 998,
            requests: 1000,
            elapsed: Duration::from_millis(250),
        };

        assert_eq!(
            report.to_string(),
            "Standard Server: 998/1000 successful responses in 250ms"
        );
        assert_eq!(report.failures(), 2);
        assert_eq!(report.throughput(), 4000.0);
    }

    #[test]
    fn test_report_zero_elapsed() {
        let report = LoadReport {
            name: "x".into(),
            successes: 0,
            requests: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.throughput(), 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_target_counts_failures() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = Target::new("dead", format!("http://{}/", addr));
        let config = LoadConfig::default()
            .requests(5)
            .timeout(Duration::from_secs(2));

        let report = run(&target, &config).await.unwrap();
        assert_eq!(report.successes, 0);
        assert_eq!(report.failures(), 5);
    }
}
