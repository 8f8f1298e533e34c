//! # mediacrypt-observability
//!
//! - Prometheus-kompatible Frame-Metriken pro E2EE-Kontext
//! - Structured Logging (Text oder JSON) via tracing-subscriber

pub mod logging;
pub mod metrics;

pub use logging::logging_initialisieren;
pub use metrics::MediacryptMetrics;
