//! Observability conventions for `siri-hub`.
//!
//! The workspace uses `tracing` for logs/events. Library code emits events
//! with canonical names and field keys and never installs a global
//! subscriber; binaries and tests own one-time `tracing_subscriber`
//! initialization at process boundaries.

pub mod events;
pub mod fields;
pub(crate) mod metrics;
