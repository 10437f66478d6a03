//! Control-plane layer.
//!
//! Owns the subscription registry, the reconciliation lifecycle that is the
//! registry's only write path, configuration validation, and the channel
//! planning decision table. This layer is responsible for preserve-identity
//! semantics across configuration reloads: unchanged subscriptions keep their
//! externally visible id and runtime health untouched.

pub(crate) mod channel_planner;
pub(crate) mod reconciler;
pub(crate) mod setup_validation;
pub(crate) mod subscription_registry;
