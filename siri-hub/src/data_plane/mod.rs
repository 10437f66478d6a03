//! Data-plane layer.
//!
//! Owns the per-update fan-out, the ephemeral delivery channels, the live
//! channel set, and the optional per-kind topic fan-out. No delivery-path
//! failure ever propagates past this layer.

pub(crate) mod channel_set;
pub(crate) mod delivery_channel;
pub(crate) mod dispatch_engine;
pub(crate) mod topic_publisher;
