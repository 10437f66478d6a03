//! Per-update outbound fan-out.
//!
//! Selects matching active subscribers from the registry snapshot, applies
//! filter and identifier mapping per subscriber, splits oversized payloads,
//! and starts one delivery channel per surviving batch. The engine runs on
//! whatever thread delivers the inbound update and never awaits delivery
//! completion; all suspension happens inside the spawned channel tasks.

use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::data_plane::channel_set::DeliveryChannelSet;
use crate::data_plane::delivery_channel::DeliveryChannel;
use crate::observability::events;
use crate::routing::delivery_splitter::split_into_batches;
use crate::routing::payload_filter::PayloadFilter;
use crate::runtime::worker_runtime::DeliveryWorkerPool;
use crate::service_delivery::ServiceDelivery;
use crate::transport::{BrokerClient, DeliveryEncoder, HttpPushClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub(crate) const DEFAULT_MAX_ELEMENTS_PER_BATCH: usize = 1000;

const COMPONENT: &str = "dispatch_engine";

pub(crate) struct DispatchEngine {
    registry: Arc<SubscriptionRegistry>,
    filter: Arc<dyn PayloadFilter>,
    http: Arc<dyn HttpPushClient>,
    broker: Arc<dyn BrokerClient>,
    encoder: Arc<dyn DeliveryEncoder>,
    channel_set: Arc<DeliveryChannelSet>,
    pool: DeliveryWorkerPool,
    max_elements_per_batch: usize,
    send_timeout: Duration,
    teardown_timeout: Duration,
}

impl DispatchEngine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: Arc<SubscriptionRegistry>,
        filter: Arc<dyn PayloadFilter>,
        http: Arc<dyn HttpPushClient>,
        broker: Arc<dyn BrokerClient>,
        encoder: Arc<dyn DeliveryEncoder>,
        channel_set: Arc<DeliveryChannelSet>,
        pool: DeliveryWorkerPool,
        max_elements_per_batch: usize,
        send_timeout: Duration,
        teardown_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            filter,
            http,
            broker,
            encoder,
            channel_set,
            pool,
            max_elements_per_batch: max_elements_per_batch.max(1),
            send_timeout,
            teardown_timeout,
        }
    }

    /// Fans one normalized update out to every matching active subscriber.
    ///
    /// No ordering guarantee exists between batches or between subscribers;
    /// each is an independent unit of work.
    pub(crate) fn dispatch(&self, update: &ServiceDelivery) {
        let kind = update.data_kind();

        for subscriber in self.registry.active_subscribers(kind) {
            let filtered = self.filter.apply(update, &subscriber.filter_criteria);
            if !filtered.carries_data() {
                debug!(
                    event = events::DISPATCH_SKIP_EMPTY_FILTER,
                    component = COMPONENT,
                    subscription_id = subscriber.subscription_id.as_str(),
                    data_kind = %kind,
                    "filter selected nothing, skipping subscriber"
                );
                continue;
            }

            let remapped = subscriber.adapter_chain.apply(filtered);

            for batch in split_into_batches(remapped, self.max_elements_per_batch) {
                if !batch.carries_data() {
                    debug!(
                        event = events::DISPATCH_BATCH_DROPPED_EMPTY,
                        component = COMPONENT,
                        subscription_id = subscriber.subscription_id.as_str(),
                        data_kind = %kind,
                        "batch carries no data, dropping"
                    );
                    continue;
                }

                let channel = DeliveryChannel::new(
                    batch,
                    subscriber.clone(),
                    self.http.clone(),
                    self.broker.clone(),
                    self.encoder.clone(),
                    self.channel_set.clone(),
                    self.send_timeout,
                    self.teardown_timeout,
                );
                debug!(
                    event = events::DISPATCH_CHANNEL_SPAWNED,
                    component = COMPONENT,
                    channel_id = channel.channel_id(),
                    subscription_id = subscriber.subscription_id.as_str(),
                    data_kind = %kind,
                    "starting delivery channel"
                );
                self.pool.spawn_delivery(channel.deliver());
            }
        }
    }
}
