//! Task and request metrics.
//!
//! [`Metrics`] owns a `prometheus-client` registry with three task event
//! counters, a request counter and a request latency histogram. The `/metrics`
//! endpoint renders it in OpenMetrics text format.

use std::sync::{Arc, OnceLock};

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Labels for request counters and duration histograms.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// HTTP method.
    pub method: String,
    /// Route template, e.g. `/todos/{id}`.
    pub endpoint: String,
}

impl RequestLabels {
    fn new(method: &str, endpoint: &str) -> Self {
        Self {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

static GLOBAL: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Process-wide task and request metrics.
///
/// All counters are cumulative event counts backed by atomics. The completed
/// counter is not a gauge: un-completing a task does not decrement it.
#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    tasks_created: Counter,
    tasks_completed: Counter,
    tasks_deleted: Counter,
    requests_total: Family<RequestLabels, Counter>,
    request_duration_seconds: Family<RequestLabels, Histogram>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Creates an isolated set of metrics with its own registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let tasks_created = Counter::default();
        registry.register(
            "todoapp_tasks_created",
            "Total number of tasks created",
            tasks_created.clone(),
        );

        let tasks_completed = Counter::default();
        registry.register(
            "todoapp_tasks_completed",
            "Total number of tasks marked as completed",
            tasks_completed.clone(),
        );

        let tasks_deleted = Counter::default();
        registry.register(
            "todoapp_tasks_deleted",
            "Total number of tasks deleted",
            tasks_deleted.clone(),
        );

        let requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "todoapp_requests",
            "Total number of HTTP requests",
            requests_total.clone(),
        );

        // 5ms .. ~10s
        let request_duration_seconds =
            Family::<RequestLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.005, 2.0, 12))
            });
        registry.register(
            "todoapp_request_duration_seconds",
            "HTTP request duration in seconds",
            request_duration_seconds.clone(),
        );

        Self {
            registry,
            tasks_created,
            tasks_completed,
            tasks_deleted,
            requests_total,
            request_duration_seconds,
        }
    }

    /// Returns the process-wide metrics, creating them on first use.
    pub fn global() -> Arc<Metrics> {
        GLOBAL.get_or_init(|| Arc::new(Metrics::new())).clone()
    }

    pub fn increment_tasks_created(&self) {
        self.tasks_created.inc();
    }

    pub fn increment_tasks_completed(&self) {
        self.tasks_completed.inc();
    }

    pub fn increment_tasks_deleted(&self) {
        self.tasks_deleted.inc();
    }

    /// Counts one request to `endpoint`.
    pub fn increment_requests(&self, method: &str, endpoint: &str) {
        self.requests_total
            .get_or_create(&RequestLabels::new(method, endpoint))
            .inc();
    }

    /// Records how long a request to `endpoint` took.
    pub fn record_request_duration(&self, seconds: f64, method: &str, endpoint: &str) {
        self.request_duration_seconds
            .get_or_create(&RequestLabels::new(method, endpoint))
            .observe(seconds);
    }

    pub fn tasks_created(&self) -> u64 {
        self.tasks_created.get()
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.get()
    }

    pub fn tasks_deleted(&self) -> u64 {
        self.tasks_deleted.get()
    }

    /// Returns the number of requests counted for `method` and `endpoint`.
    /// Reading never creates the series.
    pub fn requests(&self, method: &str, endpoint: &str) -> u64 {
        self.requests_total
            .get(&RequestLabels::new(method, endpoint))
            .map_or(0, |counter| counter.get())
    }

    /// Encodes all metrics in OpenMetrics text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_counters() {
        let metrics = Metrics::new();

        metrics.increment_tasks_created();
        metrics.increment_tasks_created();
        metrics.increment_tasks_completed();
        metrics.increment_tasks_deleted();

        assert_eq!(metrics.tasks_created(), 2);
        assert_eq!(metrics.tasks_completed(), 1);
        assert_eq!(metrics.tasks_deleted(), 1);
    }

    #[test]
    fn test_request_counters_are_per_label_set() {
        let metrics = Metrics::new();

        metrics.increment_requests("GET", "/todos");
        metrics.increment_requests("GET", "/todos");
        metrics.increment_requests("POST", "/todos");

        assert_eq!(metrics.requests("GET", "/todos"), 2);
        assert_eq!(metrics.requests("POST", "/todos"), 1);
        assert_eq!(metrics.requests("DELETE", "/todos/{id}"), 0);
    }

    #[test]
    fn test_concurrent_increments_are_exact() {
        const THREADS: usize = 8;
        const INCREMENTS: usize = 1_000;
        let metrics = Metrics::new();

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..INCREMENTS {
                        metrics.increment_tasks_created();
                        metrics.increment_requests("GET", "/todos");
                    }
                });
            }
        });

        assert_eq!(metrics.tasks_created(), (THREADS * INCREMENTS) as u64);
        assert_eq!(metrics.requests("GET", "/todos"), (THREADS * INCREMENTS) as u64);
    }

    #[test]
    fn test_encode() {
        let metrics = Metrics::new();
        metrics.increment_tasks_created();
        metrics.increment_requests("GET", "/todos/{id}");
        metrics.record_request_duration(0.042, "GET", "/todos/{id}");

        let buffer = metrics.encode().expect("encoding should succeed");

        assert!(buffer.contains("todoapp_tasks_created"));
        assert!(buffer.contains("todoapp_tasks_completed"));
        assert!(buffer.contains("todoapp_requests"));
        assert!(buffer.contains("todoapp_request_duration_seconds"));
        assert!(buffer.contains(r#"endpoint="/todos/{id}""#));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&Metrics::global(), &Metrics::global()));
    }

    #[test]
    fn test_reading_requests_does_not_create_series() {
        let metrics = Metrics::new();

        assert_eq!(metrics.requests("DELETE", "/todos/{id}"), 0);

        let buffer = metrics.encode().expect("encoding should succeed");
        assert!(!buffer.contains(r#"method="DELETE""#));
    }
}
