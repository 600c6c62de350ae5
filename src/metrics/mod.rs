use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::utils::CircuitState;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Order placement (outcomes, failure reasons, reference collisions, totals)
// - Checkout gateway calls (outcomes, latency, circuit breaker state)
//
// Each `Metrics` owns its registry; the HTTP layer serves it at /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_placed: IntCounterVec,
    pub order_build_failures: IntCounterVec,
    pub order_reference_collisions: IntCounter,
    pub order_total_amount: Histogram,

    // Checkout Metrics
    pub checkout_sessions: IntCounterVec,
    pub checkout_request_duration: Histogram,
    pub checkout_circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Order Metrics
        let orders_placed = IntCounterVec::new(
            Opts::new("orders_placed_total", "Total orders persisted"),
            &["status"],
        )?;
        registry.register(Box::new(orders_placed.clone()))?;

        let order_build_failures = IntCounterVec::new(
            Opts::new("order_build_failures_total", "Orders that could not be placed"),
            &["reason"],
        )?;
        registry.register(Box::new(order_build_failures.clone()))?;

        let order_reference_collisions = IntCounter::new(
            "order_reference_collisions_total",
            "Order saves rejected because the reference already existed",
        )?;
        registry.register(Box::new(order_reference_collisions.clone()))?;

        let order_total_amount = Histogram::with_opts(
            HistogramOpts::new("order_total_amount", "Order totals in major currency units")
                .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]),
        )?;
        registry.register(Box::new(order_total_amount.clone()))?;

        // Checkout Metrics
        let checkout_sessions = IntCounterVec::new(
            Opts::new("checkout_sessions_total", "Checkout session requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checkout_sessions.clone()))?;

        let checkout_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "checkout_request_duration_seconds",
                "Latency of checkout gateway calls",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(checkout_request_duration.clone()))?;

        let checkout_circuit_breaker_state = IntGauge::new(
            "checkout_circuit_breaker_state",
            "Checkout gateway circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(checkout_circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            order_build_failures,
            order_reference_collisions,
            order_total_amount,
            checkout_sessions,
            checkout_request_duration,
            checkout_circuit_breaker_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    pub fn record_order_placed(&self, status: &str, total: Decimal) {
        self.orders_placed.with_label_values(&[status]).inc();
        if let Some(total) = total.to_f64() {
            self.order_total_amount.observe(total);
        }
    }

    pub fn record_order_failure(&self, reason: &str) {
        self.order_build_failures.with_label_values(&[reason]).inc();
    }

    pub fn record_reference_collision(&self) {
        self.order_reference_collisions.inc();
    }

    pub fn record_checkout(&self, outcome: &str, duration_secs: f64) {
        self.checkout_sessions.with_label_values(&[outcome]).inc();
        self.checkout_request_duration.observe(duration_secs);
    }

    pub fn update_circuit_breaker_state(&self, state: CircuitState) {
        self.checkout_circuit_breaker_state.set(state.as_gauge());
    }
}
