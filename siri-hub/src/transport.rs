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

//! Transport and codec capability seams consumed by the delivery path.
//!
//! The hub never implements a concrete HTTP client, message-broker client, or
//! wire codec; callers supply trait objects for each. Delivery channels only
//! depend on the error classification exposed here.

use crate::service_delivery::ServiceDelivery;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Failure of one transport send, classified for outcome handling.
#[derive(Debug)]
pub enum TransportError {
    /// The remote endpoint refused the connection or was unreachable.
    /// Expected and transient; recipients come and go.
    ConnectionRefused(String),
    /// Any other send failure.
    SendFailed(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ConnectionRefused(detail) => {
                write!(f, "connection refused: {detail}")
            }
            TransportError::SendFailed(detail) => write!(f, "send failed: {detail}"),
        }
    }
}

impl Error for TransportError {}

impl TransportError {
    /// `true` for the expected-transient class of failures.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, TransportError::ConnectionRefused(_))
    }
}

/// Failure to encode a delivery into its wire form.
#[derive(Debug)]
pub struct EncodeError {
    detail: String,
}

impl EncodeError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to encode delivery: {}", self.detail)
    }
}

impl Error for EncodeError {}

/// Headers attached to every pushed delivery.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveryHeaders {
    pub subscription_id: String,
    pub content_type: String,
}

/// HTTP push client capability for downstream POST delivery.
#[async_trait]
pub trait HttpPushClient: Send + Sync {
    /// POSTs one encoded payload. Both connect and socket operations must be
    /// bounded by `timeout`.
    async fn post(
        &self,
        url: &str,
        headers: &DeliveryHeaders,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<(), TransportError>;
}

/// Message-broker client capability for topic/destination publishing.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Publishes one encoded payload, fire-and-forget, with the given
    /// time-to-live. No delivery confirmation is expected.
    async fn publish(
        &self,
        destination: &str,
        body: Vec<u8>,
        time_to_live: Duration,
    ) -> Result<(), TransportError>;
}

/// External wire codec turning a normalized delivery into bytes.
pub trait DeliveryEncoder: Send + Sync {
    fn encode(&self, delivery: &ServiceDelivery) -> Result<Vec<u8>, EncodeError>;
}

#[cfg(test)]
mod tests {
    use super::TransportError;

    #[test]
    fn connect_failures_are_classified_as_transient() {
        let refused = TransportError::ConnectionRefused("10.0.0.1:8080".to_string());
        let failed = TransportError::SendFailed("500 Internal Server Error".to_string());

        assert!(refused.is_connect_failure());
        assert!(!failed.is_connect_failure());
    }

    #[test]
    fn transport_error_display_carries_detail() {
        let refused = TransportError::ConnectionRefused("10.0.0.1:8080".to_string());

        assert_eq!(refused.to_string(), "connection refused: 10.0.0.1:8080");
    }
}
