//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use workers::{CorrelationStrategy, RuntimeConfig};

/// Process configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `WORKER_NAME`: name reported on job activation (default: `"saga-worker"`)
/// - `WORKER_MAX_JOBS`: jobs activated per job type and poll (default: `32`)
/// - `WORKER_JOB_TIMEOUT_MS`: activation timeout (default: `300000`)
/// - `WORKER_POLL_INTERVAL_MS`: pause between polls (default: `100`)
/// - `PAYMENT_REQUEST_CORRELATION`: `empty`, `process-instance` or
///   `variable:<name>` (default: `empty`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub worker: RuntimeConfig,
    pub payment_request_correlation: CorrelationStrategy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());

        let worker = RuntimeConfig {
            worker_name: lookup("WORKER_NAME").unwrap_or(defaults.worker.worker_name),
            max_jobs_active: parsed("WORKER_MAX_JOBS")
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.worker.max_jobs_active),
            job_timeout: parsed("WORKER_JOB_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.worker.job_timeout),
            poll_interval: parsed("WORKER_POLL_INTERVAL_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.worker.poll_interval),
        };

        let payment_request_correlation = match lookup("PAYMENT_REQUEST_CORRELATION") {
            Some(raw) => CorrelationStrategy::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to empty correlation key");
                CorrelationStrategy::Empty
            }),
            None => defaults.payment_request_correlation,
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            worker,
            payment_request_correlation,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            worker: RuntimeConfig::default(),
            payment_request_correlation: CorrelationStrategy::Empty,
        }
    }
}
