//! Live channel-set storage owner for delivery-channel identity.

use std::collections::HashMap;
use tokio::sync::Mutex;

/// Diagnostic record of one running delivery channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ChannelRecord {
    pub(crate) subscription_id: String,
    pub(crate) target: String,
}

/// Mapping of channel-id to running channel.
///
/// Creation and removal are atomic with respect to the single owning mutex;
/// channel lifetimes are short and non-overlapping per key.
pub(crate) struct DeliveryChannelSet {
    channels: Mutex<HashMap<String, ChannelRecord>>,
}

impl DeliveryChannelSet {
    pub(crate) fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a channel identity. Returns `true` only when first inserted.
    pub(crate) async fn insert(&self, channel_id: &str, record: ChannelRecord) -> bool {
        let mut channels = self.channels.lock().await;
        channels.insert(channel_id.to_string(), record).is_none()
    }

    /// Removes a channel identity. Returns `true` only when it existed.
    pub(crate) async fn remove(&self, channel_id: &str) -> bool {
        let mut channels = self.channels.lock().await;
        channels.remove(channel_id).is_some()
    }

    pub(crate) async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }
}
