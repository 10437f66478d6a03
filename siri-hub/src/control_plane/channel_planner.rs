//! Channel planning decision table.
//!
//! Maps one accepted subscription setup to the set of protocol channels the
//! transport layer must open for it. The table is explicit: every
//! (mode, style) combination resolves through one exhaustive match, and the
//! protocol adapter selection is a separate lookup that never changes the
//! role set.

use crate::service_delivery::SiriDataKind;
use crate::subscription_setup::{
    ProtocolVersion, ServiceStyle, SubscriptionMode, SubscriptionSetup,
};
use std::collections::BTreeSet;

/// One protocol interaction a subscription requires.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum ChannelRole {
    Subscribe,
    DeleteSubscription,
    RequestResponseEt,
    RequestResponseVm,
    RequestResponseSx,
}

impl ChannelRole {
    /// The request-response role serving one data kind.
    pub fn request_response_for(kind: SiriDataKind) -> Self {
        match kind {
            SiriDataKind::EstimatedTimetable => ChannelRole::RequestResponseEt,
            SiriDataKind::VehicleMonitoring => ChannelRole::RequestResponseVm,
            SiriDataKind::SituationExchange => ChannelRole::RequestResponseSx,
        }
    }
}

/// Concrete protocol adapter realizing the planned roles on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProtocolAdapterKind {
    Soap14,
    Rest14,
    Soap20,
    Rest20,
}

/// Channels to provision for one subscription.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelPlan {
    pub roles: BTreeSet<ChannelRole>,
    pub adapter: ProtocolAdapterKind,
}

fn adapter_kind(version: ProtocolVersion, style: ServiceStyle) -> ProtocolAdapterKind {
    match (version, style) {
        (ProtocolVersion::V1_4, ServiceStyle::Soap) => ProtocolAdapterKind::Soap14,
        (ProtocolVersion::V1_4, ServiceStyle::Rest) => ProtocolAdapterKind::Rest14,
        (ProtocolVersion::V2_0, ServiceStyle::Soap) => ProtocolAdapterKind::Soap20,
        (ProtocolVersion::V2_0, ServiceStyle::Rest) => ProtocolAdapterKind::Rest20,
    }
}

/// Resolves the channel plan for one setup.
///
/// Role sets are identical for SOAP and REST-like styles; the style (with
/// the protocol version) only selects the adapter.
pub fn plan_channels(setup: &SubscriptionSetup) -> ChannelPlan {
    let request_response = ChannelRole::request_response_for(setup.subscription_type);

    let mut roles = BTreeSet::new();
    match setup.subscription_mode {
        SubscriptionMode::Subscribe => {
            roles.insert(ChannelRole::Subscribe);
            if setup.data_supply_request_for_initial_delivery {
                roles.insert(request_response);
            }
        }
        SubscriptionMode::FetchedDelivery | SubscriptionMode::PollingFetchedDelivery => {
            roles.insert(ChannelRole::Subscribe);
            roles.insert(request_response);
        }
        SubscriptionMode::RequestResponse => {
            roles.insert(request_response);
        }
    }

    ChannelPlan {
        roles,
        adapter: adapter_kind(setup.protocol_version, setup.service_style),
    }
}
