//! Server-side services.

pub mod metrics;
