//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `account_operations_total` - Operations by kind and outcome
//! - `account_operation_duration_seconds` - Operation latency by kind

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector
///
/// Collectors register against an owned registry rather than the process
/// default, so independent instances never collide.
#[derive(Clone)]
pub struct Metrics {
    /// Operations by kind and outcome
    pub operations_total: IntCounterVec,

    /// Operation latency by kind
    pub operation_duration: HistogramVec,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounterVec::new(
            Opts::new("account_operations_total", "Total account operations"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "account_operation_duration_seconds",
                "Account operation latency",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
            registry,
        })
    }

    /// Record one completed operation
    pub fn record_operation(&self, operation: &str, ok: bool, duration: Duration) {
        let status = if ok { "success" } else { "error" };
        self.operations_total
            .with_label_values(&[operation, status])
            .inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["deposit", "success"])
                .get(),
            0
        );
    }

    #[test]
    fn test_record_operation() {
        let metrics = Metrics::new().unwrap();

        metrics.record_operation("deposit", true, Duration::from_millis(3));
        metrics.record_operation("deposit", true, Duration::from_millis(5));
        metrics.record_operation("withdraw", false, Duration::from_millis(1));

        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["deposit", "success"])
                .get(),
            2
        );
        assert_eq!(
            metrics
                .operations_total
                .with_label_values(&["withdraw", "error"])
                .get(),
            1
        );
    }

    #[test]
    fn test_independent_instances() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();

        a.record_operation("create", true, Duration::from_millis(1));

        assert_eq!(
            b.operations_total
                .with_label_values(&["create", "success"])
                .get(),
            0
        );
    }
}
