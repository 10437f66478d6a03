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

//! Ephemeral, single-use delivery channel for one payload batch.
//!
//! A channel sends exactly one batch to one subscriber target and guarantees
//! teardown on every exit path. No failure propagates to the caller: refused
//! connections are expected churn, anything else is logged with detail, and a
//! teardown that exceeds its bound is abandoned as a logged leak.

use crate::data_plane::channel_set::{ChannelRecord, DeliveryChannelSet};
use crate::observability::events;
use crate::observability::fields::ChannelContext;
use crate::service_delivery::ServiceDelivery;
use crate::subscription_setup::OutboundSubscriptionSetup;
use crate::transport::{BrokerClient, DeliveryEncoder, DeliveryHeaders, HttpPushClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const COMPONENT: &str = "delivery_channel";

/// Concrete transport target a callback address resolves to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum DeliveryTarget {
    HttpPush(String),
    Broker(String),
}

impl DeliveryTarget {
    /// Resolves a subscriber address. Addresses naming a broker destination
    /// publish there; everything else is pushed over HTTP(S).
    pub(crate) fn resolve(address: &str) -> Self {
        match address.strip_prefix("broker:") {
            Some(destination) => DeliveryTarget::Broker(destination.to_string()),
            None => DeliveryTarget::HttpPush(address.to_string()),
        }
    }

    pub(crate) fn describe(&self) -> &str {
        match self {
            DeliveryTarget::HttpPush(url) => url,
            DeliveryTarget::Broker(destination) => destination,
        }
    }
}

pub(crate) struct DeliveryChannel {
    channel_id: String,
    batch: ServiceDelivery,
    subscription: OutboundSubscriptionSetup,
    http: Arc<dyn HttpPushClient>,
    broker: Arc<dyn BrokerClient>,
    encoder: Arc<dyn DeliveryEncoder>,
    channel_set: Arc<DeliveryChannelSet>,
    send_timeout: Duration,
    teardown_timeout: Duration,
}

impl DeliveryChannel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        batch: ServiceDelivery,
        subscription: OutboundSubscriptionSetup,
        http: Arc<dyn HttpPushClient>,
        broker: Arc<dyn BrokerClient>,
        encoder: Arc<dyn DeliveryEncoder>,
        channel_set: Arc<DeliveryChannelSet>,
        send_timeout: Duration,
        teardown_timeout: Duration,
    ) -> Self {
        Self {
            channel_id: Uuid::new_v4().to_string(),
            batch,
            subscription,
            http,
            broker,
            encoder,
            channel_set,
            send_timeout,
            teardown_timeout,
        }
    }

    pub(crate) fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Runs the channel to completion. Never returns an error.
    pub(crate) async fn deliver(self) {
        let context = ChannelContext::with_current_thread(self.channel_id.clone());
        let target = DeliveryTarget::resolve(&self.subscription.address);

        self.channel_set
            .insert(
                &self.channel_id,
                ChannelRecord {
                    subscription_id: self.subscription.subscription_id.clone(),
                    target: target.describe().to_string(),
                },
            )
            .await;

        self.send(&target, &context).await;
        self.teardown(&context).await;
    }

    async fn send(&self, target: &DeliveryTarget, context: &ChannelContext) {
        debug!(
            event = events::CHANNEL_SEND_ATTEMPT,
            component = COMPONENT,
            channel_id = context.channel_id.as_str(),
            channel_thread = context.channel_thread.as_str(),
            subscription_id = self.subscription.subscription_id.as_str(),
            target = target.describe(),
            elements = self.batch.element_count(),
            "attempting delivery"
        );

        let body = match self.encoder.encode(&self.batch) {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    event = events::CHANNEL_ENCODE_FAILED,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    subscription_id = self.subscription.subscription_id.as_str(),
                    err = %err,
                    "unable to encode batch"
                );
                return;
            }
        };

        let result = match target {
            DeliveryTarget::HttpPush(url) => {
                let headers = DeliveryHeaders {
                    subscription_id: self.subscription.subscription_id.clone(),
                    content_type: self.subscription.content_type.clone(),
                };
                self.http
                    .post(url, &headers, body, self.send_timeout)
                    .await
            }
            DeliveryTarget::Broker(destination) => {
                self.broker
                    .publish(destination, body, self.subscription.time_to_live)
                    .await
            }
        };

        match result {
            Ok(()) => {
                debug!(
                    event = events::CHANNEL_SEND_OK,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    channel_thread = context.channel_thread.as_str(),
                    subscription_id = self.subscription.subscription_id.as_str(),
                    target = target.describe(),
                    "delivery complete"
                );
            }
            Err(err) if err.is_connect_failure() => {
                info!(
                    event = events::CHANNEL_CONNECT_REFUSED,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    subscription_id = self.subscription.subscription_id.as_str(),
                    target = target.describe(),
                    "recipient is unreachable - ignoring"
                );
            }
            Err(err) => {
                warn!(
                    event = events::CHANNEL_DELIVERY_FAILED,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    subscription_id = self.subscription.subscription_id.as_str(),
                    target = target.describe(),
                    err = %err,
                    "delivery failed"
                );
            }
        }
    }

    async fn teardown(&self, context: &ChannelContext) {
        match timeout(self.teardown_timeout, self.channel_set.remove(&self.channel_id)).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    event = events::CHANNEL_REMOVE_MISSING,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    "channel was not present in the live set"
                );
            }
            Err(_) => {
                warn!(
                    event = events::CHANNEL_TEARDOWN_TIMEOUT,
                    component = COMPONENT,
                    channel_id = context.channel_id.as_str(),
                    timeout_secs = self.teardown_timeout.as_secs(),
                    "channel teardown did not complete within bound"
                );
            }
        }
    }
}
