//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and HTTP layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
