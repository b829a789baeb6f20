//! Prometheus metrics for the Account Collector plugin
//!
//! - `account_collector_requests_total` (counter) - requests by operation and result
//! - `account_collector_request_duration_seconds` (histogram) - handler latency
//! - `account_collector_accounts_synced_total` (counter) - records returned by sync

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Outcome label for request metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Request metrics for plugin operations
pub struct PluginMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    duration_seconds: HistogramVec,
    accounts_synced_total: IntCounter,
}

impl PluginMetrics {
    /// Create metrics in a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "account_collector_requests_total",
                "Plugin requests by operation and result",
            ),
            &["operation", "result"],
        )?;
        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "account_collector_request_duration_seconds",
                "Plugin request duration in seconds",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
            &["operation"],
        )?;
        let accounts_synced_total = IntCounter::new(
            "account_collector_accounts_synced_total",
            "Account records returned by sync",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(accounts_synced_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            duration_seconds,
            accounts_synced_total,
        })
    }

    /// Record a finished request
    pub fn record_request(&self, operation: &str, outcome: Outcome, seconds: f64) {
        self.requests_total
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
        self.duration_seconds
            .with_label_values(&[operation])
            .observe(seconds);
    }

    /// Record accounts returned by a sync
    pub fn record_accounts(&self, count: usize) {
        self.accounts_synced_total.inc_by(count as u64);
    }

    /// Request count for an operation and outcome
    pub fn request_count(&self, operation: &str, outcome: Outcome) -> u64 {
        self.requests_total
            .with_label_values(&[operation, outcome.as_str()])
            .get()
    }

    /// Total accounts synced
    pub fn accounts_synced(&self) -> u64 {
        self.accounts_synced_total.get()
    }

    /// Prometheus text exposition
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = PluginMetrics::new().unwrap();
        metrics.record_request("AccountCollector.sync", Outcome::Success, 0.2);
        metrics.record_request("AccountCollector.sync", Outcome::Failure, 0.1);
        metrics.record_accounts(3);

        assert_eq!(metrics.request_count("AccountCollector.sync", Outcome::Success), 1);
        assert_eq!(metrics.request_count("AccountCollector.init", Outcome::Success), 0);
        assert_eq!(metrics.accounts_synced(), 3);

        let text = metrics.render().unwrap();
        assert!(text.contains("account_collector_requests_total"));
        assert!(text.contains("account_collector_accounts_synced_total 3"));
    }
}
