/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Outward API facade of the hub.

use crate::control_plane::reconciler::{ReconcileReport, Reconciler};
use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::data_plane::channel_set::DeliveryChannelSet;
use crate::data_plane::delivery_channel::{DEFAULT_SEND_TIMEOUT, DEFAULT_TEARDOWN_TIMEOUT};
use crate::data_plane::dispatch_engine::{DispatchEngine, DEFAULT_MAX_ELEMENTS_PER_BATCH};
use crate::data_plane::topic_publisher::{TopicPublisher, TopicRouting};
use crate::routing::adapter_registry::AdapterRegistry;
use crate::routing::payload_filter::PayloadFilter;
use crate::runtime::worker_runtime::{DeliveryWorkerPool, DEFAULT_MAX_IN_FLIGHT_DELIVERIES};
use crate::service_delivery::ServiceDelivery;
use crate::subscription_setup::SubscriptionSetup;
use crate::subscription_status::SubscriptionStatusReport;
use crate::transport::{BrokerClient, DeliveryEncoder, HttpPushClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

fn default_max_elements_per_batch() -> usize {
    DEFAULT_MAX_ELEMENTS_PER_BATCH
}

fn default_max_in_flight_deliveries() -> usize {
    DEFAULT_MAX_IN_FLIGHT_DELIVERIES
}

fn default_send_timeout_secs() -> u64 {
    DEFAULT_SEND_TIMEOUT.as_secs()
}

fn default_teardown_timeout_secs() -> u64 {
    DEFAULT_TEARDOWN_TIMEOUT.as_secs()
}

/// Tunables of one hub instance.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HubSettings {
    /// Base URL upstream feeds deliver to; also the source of resolved
    /// callback addresses.
    pub inbound_base_url: String,
    #[serde(default = "default_max_elements_per_batch")]
    pub max_elements_per_batch: usize,
    #[serde(default = "default_max_in_flight_deliveries")]
    pub max_in_flight_deliveries: usize,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    #[serde(default = "default_teardown_timeout_secs")]
    pub teardown_timeout_secs: u64,
    #[serde(default)]
    pub topic_routing: TopicRouting,
}

impl HubSettings {
    pub fn new(inbound_base_url: impl Into<String>) -> Self {
        Self {
            inbound_base_url: inbound_base_url.into(),
            max_elements_per_batch: DEFAULT_MAX_ELEMENTS_PER_BATCH,
            max_in_flight_deliveries: DEFAULT_MAX_IN_FLIGHT_DELIVERIES,
            send_timeout_secs: DEFAULT_SEND_TIMEOUT.as_secs(),
            teardown_timeout_secs: DEFAULT_TEARDOWN_TIMEOUT.as_secs(),
            topic_routing: TopicRouting::disabled(),
        }
    }
}

/// External capabilities the hub consumes but never implements.
pub struct HubCapabilities {
    pub filter: Arc<dyn PayloadFilter>,
    pub http: Arc<dyn HttpPushClient>,
    pub broker: Arc<dyn BrokerClient>,
    pub encoder: Arc<dyn DeliveryEncoder>,
}

/// The hub: a versioned subscription registry plus the outbound dispatch
/// engine, wired over caller-supplied transport capabilities.
pub struct SiriHub {
    name: String,
    inbound_base_url: String,
    registry: Arc<SubscriptionRegistry>,
    adapters: AdapterRegistry,
    engine: DispatchEngine,
    topics: Option<TopicPublisher>,
    pool: DeliveryWorkerPool,
    channel_set: Arc<DeliveryChannelSet>,
}

impl SiriHub {
    pub fn new(
        name: &str,
        settings: HubSettings,
        adapters: AdapterRegistry,
        capabilities: HubCapabilities,
    ) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let channel_set = Arc::new(DeliveryChannelSet::new());
        let pool = DeliveryWorkerPool::new(settings.max_in_flight_deliveries);

        let engine = DispatchEngine::new(
            registry.clone(),
            capabilities.filter,
            capabilities.http,
            capabilities.broker.clone(),
            capabilities.encoder.clone(),
            channel_set.clone(),
            pool.clone(),
            settings.max_elements_per_batch,
            Duration::from_secs(settings.send_timeout_secs),
            Duration::from_secs(settings.teardown_timeout_secs),
        );

        let topics = settings.topic_routing.is_enabled().then(|| {
            TopicPublisher::new(
                settings.topic_routing.clone(),
                capabilities.broker,
                capabilities.encoder,
            )
        });

        debug!(name, "SiriHub started");

        Self {
            name: name.to_string(),
            inbound_base_url: settings.inbound_base_url,
            registry,
            adapters,
            engine,
            topics,
            pool,
            channel_set,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reconciles a freshly declared configuration list against the registry.
    ///
    /// Reconciliation is the only path by which the registry changes shape;
    /// the returned report carries the channel plans the transport layer must
    /// realize plus all per-entry configuration errors.
    pub async fn apply_configuration(
        &self,
        declared: Vec<SubscriptionSetup>,
    ) -> ReconcileReport {
        Reconciler::new(&self.registry, &self.adapters, &self.inbound_base_url)
            .reconcile(declared)
            .await
    }

    /// Fans one normalized inbound update out to all matching active
    /// subscribers and configured topics. Returns without waiting for any
    /// delivery to complete.
    pub fn dispatch(&self, update: &ServiceDelivery) {
        if let Some(topics) = &self.topics {
            topics.publish_split(update, &self.pool);
        }
        self.engine.dispatch(update);
    }

    /// Operator inspection per stable internal id.
    pub async fn subscription_status(&self, internal_id: u32) -> Option<SubscriptionStatusReport> {
        self.registry.status_report(internal_id).await
    }

    /// Health transition driven by the transport layer once a subscription's
    /// channels are established.
    pub async fn mark_channel_established(&self, subscription_id: &str) -> bool {
        self.registry.mark_active(subscription_id).await
    }

    /// Deliberate pause of one subscription.
    pub async fn mark_subscription_paused(&self, subscription_id: &str) -> bool {
        self.registry.mark_inactive(subscription_id).await
    }

    /// Unrecoverable channel failure of one subscription.
    pub async fn mark_subscription_failed(&self, subscription_id: &str) -> bool {
        self.registry.mark_error(subscription_id).await
    }

    /// Removes one subscription; when and whether to remove is the caller's
    /// deletion policy.
    pub async fn remove_subscription(&self, internal_id: u32) -> bool {
        self.registry.remove(internal_id).await
    }

    /// Number of delivery channels currently live.
    pub async fn live_channel_count(&self) -> usize {
        self.channel_set.len().await
    }
}
