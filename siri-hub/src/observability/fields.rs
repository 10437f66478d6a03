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

//! Canonical structured field keys and value-format helpers.

use crate::service_delivery::ServiceDelivery;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const CHANNEL_ID: &str = "channel_id";
pub const CHANNEL_THREAD: &str = "channel_thread";
pub const SUBSCRIPTION_ID: &str = "subscription_id";
pub const INTERNAL_ID: &str = "internal_id";

pub const DATA_KIND: &str = "data_kind";
pub const TARGET: &str = "target";
pub const ELEMENTS: &str = "elements";
pub const BATCHES: &str = "batches";
pub const ERR: &str = "err";
pub const REASON: &str = "reason";

pub const NONE: &str = "none";
pub const DEFAULT_CHANNEL_THREAD: &str = "unknown-thread";

/// Correlation context carried by one delivery channel for its log events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelContext {
    pub channel_id: String,
    pub channel_thread: String,
}

impl ChannelContext {
    pub fn new(channel_id: impl Into<String>, channel_thread: Option<&str>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_thread: thread_name_or_default(channel_thread),
        }
    }

    pub fn with_current_thread(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_thread: current_thread_name_or_default(),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_CHANNEL_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}

pub fn format_producer_ref(delivery: &ServiceDelivery) -> String {
    delivery
        .producer_ref
        .clone()
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        format_producer_ref, thread_name_or_default, DEFAULT_CHANNEL_THREAD, NONE,
    };
    use crate::service_delivery::{ServiceDelivery, VehicleActivity};

    #[test]
    fn format_producer_ref_returns_value_when_present() {
        let delivery = ServiceDelivery::vehicle_monitoring(
            Some("producer-a".to_string()),
            vec![VehicleActivity::default()],
        );

        assert_eq!(format_producer_ref(&delivery), "producer-a");
    }

    #[test]
    fn format_producer_ref_returns_none_when_absent() {
        let delivery = ServiceDelivery::vehicle_monitoring(None, Vec::new());

        assert_eq!(format_producer_ref(&delivery), NONE);
    }

    #[test]
    fn thread_name_or_default_falls_back_when_absent() {
        assert_eq!(thread_name_or_default(None), DEFAULT_CHANNEL_THREAD);
        assert_eq!(thread_name_or_default(Some("named-thread")), "named-thread");
    }
}
