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

//! Declared subscription configuration model.
//!
//! A [`SubscriptionSetup`] describes one upstream feed or downstream consumer
//! relationship. Setups are created by configuration load, mutated only by
//! reconciliation, and matched across reloads solely by `internal_id`.

use crate::routing::adapter_registry::IdentifierAdapterChain;
use crate::routing::payload_filter::FilterCriteria;
use crate::service_delivery::SiriDataKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_TIME_TO_LIVE_MILLIS: u64 = 30_000;

fn default_time_to_live_millis() -> u64 {
    DEFAULT_TIME_TO_LIVE_MILLIS
}

fn default_active() -> bool {
    true
}

/// SIRI protocol version spoken on the remote side of a subscription.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ProtocolVersion {
    #[serde(rename = "1.4")]
    V1_4,
    #[serde(rename = "2.0")]
    V2_0,
}

/// Envelope style used by the remote endpoint.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStyle {
    Soap,
    Rest,
}

/// How data flows for a subscription.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionMode {
    Subscribe,
    RequestResponse,
    FetchedDelivery,
    PollingFetchedDelivery,
}

/// Request roles a subscription may carry URLs for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Subscribe,
    DeleteSubscription,
    GetEstimatedTimetable,
    GetVehicleMonitoring,
    GetSituationExchange,
}

impl RequestType {
    /// Stable wire/config name, also used in configuration error messages.
    pub fn name(&self) -> &'static str {
        match self {
            RequestType::Subscribe => "SUBSCRIBE",
            RequestType::DeleteSubscription => "DELETE_SUBSCRIPTION",
            RequestType::GetEstimatedTimetable => "GET_ESTIMATED_TIMETABLE",
            RequestType::GetVehicleMonitoring => "GET_VEHICLE_MONITORING",
            RequestType::GetSituationExchange => "GET_SITUATION_EXCHANGE",
        }
    }

    /// The fetch role serving one data kind.
    pub fn fetch_role_for(kind: SiriDataKind) -> Self {
        match kind {
            SiriDataKind::EstimatedTimetable => RequestType::GetEstimatedTimetable,
            SiriDataKind::VehicleMonitoring => RequestType::GetVehicleMonitoring,
            SiriDataKind::SituationExchange => RequestType::GetSituationExchange,
        }
    }
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Declared configuration for one upstream or downstream relationship.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SubscriptionSetup {
    /// Stable identity across reconfiguration. Never changes for a
    /// logical subscription.
    pub internal_id: u32,
    /// Externally visible id. May be regenerated; uniqueness across the
    /// registry is enforced during reconciliation.
    pub subscription_id: String,
    pub vendor: String,
    pub dataset_id: String,
    pub requestor_ref: String,
    pub content_type: String,
    pub protocol_version: ProtocolVersion,
    pub service_style: ServiceStyle,
    pub subscription_type: SiriDataKind,
    pub subscription_mode: SubscriptionMode,
    pub duration_of_subscription_secs: u64,
    pub heartbeat_interval_secs: u64,
    #[serde(default)]
    pub preview_interval_secs: Option<u64>,
    #[serde(default)]
    pub urls: HashMap<RequestType, String>,
    /// Resolved from the inbound base URL during reconciliation; never
    /// declared directly.
    #[serde(default)]
    pub callback_address: Option<String>,
    #[serde(default)]
    pub override_https: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub identifier_adapter_id: Option<String>,
    #[serde(default)]
    pub data_supply_request_for_initial_delivery: bool,
    #[serde(default)]
    pub filter_criteria: Option<FilterCriteria>,
    #[serde(default = "default_time_to_live_millis")]
    pub time_to_live_millis: u64,
}

impl SubscriptionSetup {
    pub fn url(&self, request_type: RequestType) -> Option<&str> {
        self.urls.get(&request_type).map(String::as_str)
    }

    pub fn time_to_live(&self) -> Duration {
        Duration::from_millis(self.time_to_live_millis)
    }

    /// Structural equality used by reconciliation change detection.
    ///
    /// Compares every declared field except the three runtime-assigned ones:
    /// `subscription_id` (regenerated), `callback_address` (resolved), and
    /// `active` (runtime intent). Destructuring keeps the comparison
    /// exhaustive: a new field fails to compile until it is classified here.
    pub fn structurally_equal(&self, other: &Self) -> bool {
        let Self {
            internal_id,
            subscription_id: _,
            vendor,
            dataset_id,
            requestor_ref,
            content_type,
            protocol_version,
            service_style,
            subscription_type,
            subscription_mode,
            duration_of_subscription_secs,
            heartbeat_interval_secs,
            preview_interval_secs,
            urls,
            callback_address: _,
            override_https,
            active: _,
            identifier_adapter_id,
            data_supply_request_for_initial_delivery,
            filter_criteria,
            time_to_live_millis,
        } = self;

        *internal_id == other.internal_id
            && *vendor == other.vendor
            && *dataset_id == other.dataset_id
            && *requestor_ref == other.requestor_ref
            && *content_type == other.content_type
            && *protocol_version == other.protocol_version
            && *service_style == other.service_style
            && *subscription_type == other.subscription_type
            && *subscription_mode == other.subscription_mode
            && *duration_of_subscription_secs == other.duration_of_subscription_secs
            && *heartbeat_interval_secs == other.heartbeat_interval_secs
            && *preview_interval_secs == other.preview_interval_secs
            && *urls == other.urls
            && *override_https == other.override_https
            && *identifier_adapter_id == other.identifier_adapter_id
            && *data_supply_request_for_initial_delivery
                == other.data_supply_request_for_initial_delivery
            && *filter_criteria == other.filter_criteria
            && *time_to_live_millis == other.time_to_live_millis
    }
}

/// The dispatch-relevant subset of one registered subscription.
#[derive(Clone)]
pub struct OutboundSubscriptionSetup {
    pub subscription_id: String,
    pub address: String,
    pub content_type: String,
    pub filter_criteria: FilterCriteria,
    pub adapter_chain: IdentifierAdapterChain,
    pub time_to_live: Duration,
}

#[cfg(test)]
mod tests {
    use super::{
        ProtocolVersion, RequestType, ServiceStyle, SubscriptionMode, SubscriptionSetup,
    };
    use crate::service_delivery::SiriDataKind;
    use std::collections::HashMap;

    fn sample_setup(internal_id: u32, subscription_id: &str) -> SubscriptionSetup {
        let mut urls = HashMap::new();
        urls.insert(RequestType::Subscribe, "http://feed.example/siri".to_string());
        urls.insert(
            RequestType::DeleteSubscription,
            "http://feed.example/siri".to_string(),
        );

        SubscriptionSetup {
            internal_id,
            subscription_id: subscription_id.to_string(),
            vendor: "vendor-a".to_string(),
            dataset_id: "DST".to_string(),
            requestor_ref: "hub".to_string(),
            content_type: "application/xml".to_string(),
            protocol_version: ProtocolVersion::V2_0,
            service_style: ServiceStyle::Soap,
            subscription_type: SiriDataKind::VehicleMonitoring,
            subscription_mode: SubscriptionMode::Subscribe,
            duration_of_subscription_secs: 86_400,
            heartbeat_interval_secs: 60,
            preview_interval_secs: None,
            urls,
            callback_address: None,
            override_https: false,
            active: true,
            identifier_adapter_id: None,
            data_supply_request_for_initial_delivery: false,
            filter_criteria: None,
            time_to_live_millis: 30_000,
        }
    }

    #[test]
    fn structural_equality_ignores_runtime_assigned_fields() {
        let declared = sample_setup(1, "sub-declared");
        let mut registered = sample_setup(1, "sub-registered");
        registered.callback_address = Some("http://hub.example/inbound".to_string());
        registered.active = false;

        assert!(declared.structurally_equal(&registered));
    }

    #[test]
    fn structural_equality_detects_changed_url() {
        let declared = sample_setup(1, "sub");
        let mut changed = sample_setup(1, "sub");
        changed
            .urls
            .insert(RequestType::Subscribe, "http://other.example/siri".to_string());

        assert!(!declared.structurally_equal(&changed));
    }

    #[test]
    fn fetch_role_maps_each_data_kind() {
        assert_eq!(
            RequestType::fetch_role_for(SiriDataKind::EstimatedTimetable),
            RequestType::GetEstimatedTimetable
        );
        assert_eq!(
            RequestType::fetch_role_for(SiriDataKind::VehicleMonitoring),
            RequestType::GetVehicleMonitoring
        );
        assert_eq!(
            RequestType::fetch_role_for(SiriDataKind::SituationExchange),
            RequestType::GetSituationExchange
        );
    }

    #[test]
    fn setup_round_trips_through_json() {
        let setup = sample_setup(7, "sub-7");
        let encoded = serde_json::to_string(&setup).expect("setup should serialize");
        let decoded: SubscriptionSetup =
            serde_json::from_str(&encoded).expect("setup should deserialize");

        assert_eq!(setup, decoded);
        assert_eq!(decoded.protocol_version, ProtocolVersion::V2_0);
        assert_eq!(decoded.service_style, ServiceStyle::Soap);
    }
}
