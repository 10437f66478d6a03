//! Canonical structured event names used across `siri-hub`.

// Reconciliation and registry events.
pub const RECONCILE_START: &str = "reconcile_start";
pub const RECONCILE_ENTRY_REJECTED: &str = "reconcile_entry_rejected";
pub const RECONCILE_ENTRY_CREATED: &str = "reconcile_entry_created";
pub const RECONCILE_ENTRY_KEPT: &str = "reconcile_entry_kept";
pub const RECONCILE_ENTRY_UPDATED: &str = "reconcile_entry_updated";
pub const RECONCILE_COMPLETE: &str = "reconcile_complete";
pub const REGISTRY_SNAPSHOT_REBUILT: &str = "registry_snapshot_rebuilt";
pub const REGISTRY_HEALTH_TRANSITION: &str = "registry_health_transition";
pub const REGISTRY_UNKNOWN_SUBSCRIPTION: &str = "registry_unknown_subscription";

// Dispatch events.
pub const DISPATCH_SKIP_EMPTY_FILTER: &str = "dispatch_skip_empty_filter";
pub const DISPATCH_BATCH_DROPPED_EMPTY: &str = "dispatch_batch_dropped_empty";
pub const DISPATCH_CHANNEL_SPAWNED: &str = "dispatch_channel_spawned";

// Delivery-channel events.
pub const CHANNEL_SEND_ATTEMPT: &str = "channel_send_attempt";
pub const CHANNEL_SEND_OK: &str = "channel_send_ok";
pub const CHANNEL_CONNECT_REFUSED: &str = "channel_connect_refused";
pub const CHANNEL_DELIVERY_FAILED: &str = "channel_delivery_failed";
pub const CHANNEL_ENCODE_FAILED: &str = "channel_encode_failed";
pub const CHANNEL_TEARDOWN_TIMEOUT: &str = "channel_teardown_timeout";
pub const CHANNEL_REMOVE_MISSING: &str = "channel_remove_missing";

// Topic-publisher events.
pub const TOPIC_PUBLISH_OK: &str = "topic_publish_ok";
pub const TOPIC_PUBLISH_FAILED: &str = "topic_publish_failed";
pub const TOPIC_PUBLISH_PROGRESS: &str = "topic_publish_progress";
