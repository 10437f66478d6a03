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

//! Concrete transport and codec implementations wired into the hub.

use async_trait::async_trait;
use siri_hub::{
    BrokerClient, DeliveryEncoder, DeliveryHeaders, EncodeError, HttpPushClient, ServiceDelivery,
    TransportError,
};
use std::time::Duration;
use tracing::warn;

/// HTTP push delivery over a shared `reqwest` client.
pub(crate) struct ReqwestPushClient {
    client: reqwest::Client,
}

impl ReqwestPushClient {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpPushClient for ReqwestPushClient {
    async fn post(
        &self,
        url: &str,
        headers: &DeliveryHeaders,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .header("SubscriptionId", headers.subscription_id.as_str())
            .header(reqwest::header::CONTENT_TYPE, headers.content_type.as_str())
            .body(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    TransportError::ConnectionRefused(err.to_string())
                } else {
                    TransportError::SendFailed(err.to_string())
                }
            })?;

        response
            .error_for_status()
            .map(|_| ())
            .map_err(|err| TransportError::SendFailed(err.to_string()))
    }
}

/// Placeholder broker client used until a concrete broker is wired in.
///
/// Deliveries addressed to broker destinations are dropped with a warning so
/// HTTP subscribers keep working on deployments without a broker.
pub(crate) struct UnconfiguredBrokerClient;

#[async_trait]
impl BrokerClient for UnconfiguredBrokerClient {
    async fn publish(
        &self,
        destination: &str,
        _body: Vec<u8>,
        _time_to_live: Duration,
    ) -> Result<(), TransportError> {
        warn!(destination, "no broker client configured, dropping publish");
        Ok(())
    }
}

/// Encodes normalized deliveries as JSON.
pub(crate) struct JsonDeliveryEncoder;

impl DeliveryEncoder for JsonDeliveryEncoder {
    fn encode(&self, delivery: &ServiceDelivery) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(delivery).map_err(|err| EncodeError::new(err.to_string()))
    }
}
