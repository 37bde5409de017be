//! Prometheus metrics for the Fiber-Chain ledger.
//!
//! All metrics follow the naming convention: `fc_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., fc_transitions_applied_total)
//! - **Gauge**: Value that can go up or down (e.g., fc_event_subscribers)

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LIFECYCLE TRANSITIONS
    // =========================================================================

    /// Committed transitions by action
    pub static ref TRANSITIONS_APPLIED: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_transitions_applied_total", "Lifecycle transitions committed"),
        &["action"]
    ).expect("metric creation failed");

    /// Rejected transitions by action and error kind
    pub static ref TRANSITIONS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("fc_transitions_rejected_total", "Lifecycle transitions rejected"),
        &["action", "reason"]
    ).expect("metric creation failed");

    // =========================================================================
    // PAYMENTS
    // =========================================================================

    /// Successful Buy settlements
    pub static ref PAYMENTS_SETTLED: IntCounter = IntCounter::new(
        "fc_payments_settled_total",
        "Total Buy settlements completed"
    ).expect("metric creation failed");

    /// Value moved to sellers
    pub static ref PAYMENT_VOLUME: IntCounter = IntCounter::new(
        "fc_payment_volume_total",
        "Total value settled to sellers"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS
    // =========================================================================

    /// Provenance events published
    pub static ref EVENTS_PUBLISHED: IntCounter = IntCounter::new(
        "fc_events_published_total",
        "Total provenance events published"
    ).expect("metric creation failed");

    /// Subscribers that received the most recent event
    pub static ref EVENT_SUBSCRIBERS: IntGauge = IntGauge::new(
        "fc_event_subscribers",
        "Receivers of the last published event"
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    _private: (),
}

impl MetricsHandle {
    /// Prometheus text exposition of every registered metric.
    pub fn gather(&self) -> Result<String, TelemetryError> {
        encode_metrics()
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRANSITIONS_APPLIED.clone()),
        Box::new(TRANSITIONS_REJECTED.clone()),
        Box::new(PAYMENTS_SETTLED.clone()),
        Box::new(PAYMENT_VOLUME.clone()),
        Box::new(EVENTS_PUBLISHED.clone()),
        Box::new(EVENT_SUBSCRIBERS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count a committed transition.
pub fn record_transition_applied(action: &str) {
    crate::metric_inc!(TRANSITIONS_APPLIED, &[action]);
}

/// Count a rejected transition.
pub fn record_transition_rejected(action: &str, reason: &str) {
    crate::metric_inc!(TRANSITIONS_REJECTED, &[action, reason]);
}

/// Count a completed settlement and the value paid to the seller.
pub fn record_settlement(price: u64) {
    crate::metric_inc!(PAYMENTS_SETTLED);
    PAYMENT_VOLUME.inc_by(price);
}

/// Count a published event and how many subscribers received it.
pub fn record_event_published(receivers: usize) {
    crate::metric_inc!(EVENTS_PUBLISHED);
    EVENT_SUBSCRIBERS.set(i64::try_from(receivers).unwrap_or(i64::MAX));
}
