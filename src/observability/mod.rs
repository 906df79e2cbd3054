//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the gateway client produce:
//!     → logging.rs (structured log events, credentials redacted)
//!     → metrics.rs (per-operation counters and latency histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) flows through the trace layer spans
//! - Metrics are off by default

pub mod logging;
pub mod metrics;
