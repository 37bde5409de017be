//! # Fiber Telemetry
//!
//! Logging and metrics for the Fiber-Chain ledger.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an `EnvFilter` and a
//!   pretty or JSON fmt layer
//! - **Metrics**: Prometheus counters for transitions, payments and events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fiber_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_SERVICE_NAME` | `fiber-chain` | Service name in logs |
//! | `FC_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `FC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `FC_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `FC_NETWORK` | `devnet` | Deployment label |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, EVENTS_PUBLISHED, PAYMENTS_SETTLED,
    PAYMENT_VOLUME, TRANSITIONS_APPLIED, TRANSITIONS_REJECTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or the layer failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid filter directive or other configuration problem.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so counters exist before the first log line.
    let metrics = register_metrics()?;
    init_logging(&config)?;

    Ok(TelemetryGuard { metrics, config })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: MetricsHandle,
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// Metrics handle for text exposition.
    pub fn metrics(&self) -> MetricsHandle {
        self.metrics
    }

    /// Configuration the guard was created with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.full_service_name(), "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
