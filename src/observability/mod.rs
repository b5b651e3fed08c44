//! Observability infrastructure.
//!
//! Provides:
//! - The injected observer that carries populate log points
//! - Structured tracing setup
//! - OpenTelemetry metrics for statements, skips and flushes

pub mod metrics;
pub mod observer;
pub mod tracing;

pub use observer::{PopulateObserver, TracingObserver};
