//! Prometheus metrics for the take-profit order hook.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, a fatal configuration error that only surfaces during static
//! initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec,
    Encoder, HistogramVec, IntGaugeVec, TextEncoder,
};

use crate::error::TelemetryResult;

/// Orders placed. Labels: pool, direction.
pub static ORDERS_PLACED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tpo_orders_placed_total",
        "Total take-profit deposits",
        &["pool", "direction"]
    )
    .unwrap()
});

/// Orders cancelled. Labels: pool, direction.
pub static ORDERS_CANCELLED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tpo_orders_cancelled_total",
        "Total whole-share cancellations",
        &["pool", "direction"]
    )
    .unwrap()
});

/// Redemptions. Labels: pool, direction.
pub static REDEMPTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tpo_redemptions_total",
        "Total claim redemptions",
        &["pool", "direction"]
    )
    .unwrap()
});

/// Resting orders executed against the pool. Labels: pool, direction.
pub static FILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tpo_fills_total",
        "Total resting price levels executed",
        &["pool", "direction"]
    )
    .unwrap()
});

/// Crossing passes by outcome.
/// Labels: pool, outcome (completed/capped/failed/self_trade)
pub static CROSSING_PASSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tpo_crossing_passes_total",
        "Crossing-detection invocations by outcome",
        &["pool", "outcome"]
    )
    .unwrap()
});

/// Levels examined per crossing pass.
pub static LEVELS_SCANNED: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tpo_levels_scanned",
        "Price levels examined in one crossing pass",
        &["pool"],
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1000.0, 10000.0]
    )
    .unwrap()
});

/// Live price levels. Labels: pool.
pub static PENDING_LEVELS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "tpo_pending_levels",
        "Price levels with a non-zero pending amount",
        &["pool"]
    )
    .unwrap()
});

/// Stateless facade over the metric statics.
pub struct Metrics;

impl Metrics {
    pub fn order_placed(pool: &str, direction: &str) {
        ORDERS_PLACED_TOTAL
            .with_label_values(&[pool, direction])
            .inc();
    }

    pub fn order_cancelled(pool: &str, direction: &str) {
        ORDERS_CANCELLED_TOTAL
            .with_label_values(&[pool, direction])
            .inc();
    }

    pub fn order_redeemed(pool: &str, direction: &str) {
        REDEMPTIONS_TOTAL.with_label_values(&[pool, direction]).inc();
    }

    pub fn fill_executed(pool: &str, direction: &str) {
        FILLS_TOTAL.with_label_values(&[pool, direction]).inc();
    }

    /// Record the end of a crossing pass.
    pub fn crossing_pass(pool: &str, outcome: &str, levels_scanned: u64) {
        CROSSING_PASSES_TOTAL
            .with_label_values(&[pool, outcome])
            .inc();
        LEVELS_SCANNED
            .with_label_values(&[pool])
            .observe(levels_scanned as f64);
    }

    /// Record an invocation short-circuited by the self-trade guard.
    pub fn self_trade_skipped(pool: &str) {
        CROSSING_PASSES_TOTAL
            .with_label_values(&[pool, "self_trade"])
            .inc();
    }

    pub fn pending_levels(pool: &str, count: usize) {
        PENDING_LEVELS
            .with_label_values(&[pool])
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_counter_increments() {
        let before = FILLS_TOTAL
            .with_label_values(&["test_pool", "zero_for_one"])
            .get();
        Metrics::fill_executed("test_pool", "zero_for_one");
        let after = FILLS_TOTAL
            .with_label_values(&["test_pool", "zero_for_one"])
            .get();
        assert_eq!(after - before, 1.0);
    }

    #[test]
    fn test_render_contains_registered_metric() {
        Metrics::crossing_pass("render_pool", "completed", 3);
        let text = Metrics::render().unwrap();
        assert!(text.contains("tpo_crossing_passes_total"));
    }

    #[test]
    fn test_pending_levels_gauge() {
        Metrics::pending_levels("gauge_pool", 4);
        assert_eq!(PENDING_LEVELS.with_label_values(&["gauge_pool"]).get(), 4);
    }
}
