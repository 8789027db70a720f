//! API layer
//!
//! HTTP handlers for:
//! - Account registration and sessions
//! - Metrics (Prometheus)

mod accounts;
mod dto;
pub mod metrics;

pub use dto::*;

pub use accounts::accounts_router;
pub use metrics::metrics_router;
