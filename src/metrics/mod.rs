// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - HTTP traffic (request counts by method/status, latency by method)
// - Order placement throughput
// - Status ledger updates by target status
// - Rejected logins
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Order Metrics
    pub orders_placed_total: IntCounter,
    pub order_status_updates_total: IntCounterVec,

    // Account Metrics
    pub auth_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["method"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        // Order Metrics
        let orders_placed_total = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed_total.clone()))?;

        let order_status_updates_total = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Status ledger updates by new status"),
            &["status"],
        )?;
        registry.register(Box::new(order_status_updates_total.clone()))?;

        // Account Metrics
        let auth_failures_total =
            IntCounter::new("auth_failures_total", "Total rejected login attempts")?;
        registry.register(Box::new(auth_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            orders_placed_total,
            order_status_updates_total,
            auth_failures_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a finished HTTP request
    pub fn record_request(&self, method: &str, status: u16, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method])
            .observe(duration_secs);
    }

    pub fn record_order_placed(&self) {
        self.orders_placed_total.inc();
    }

    pub fn record_status_update(&self, status: &str) {
        self.order_status_updates_total
            .with_label_values(&[status])
            .inc();
    }

    pub fn record_auth_failure(&self) {
        self.auth_failures_total.inc();
    }
}
