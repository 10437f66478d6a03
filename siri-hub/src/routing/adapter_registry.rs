//! Explicit identifier-adapter registry and the per-subscriber adapter chain.
//!
//! Adapters are looked up by id at reconciliation time; an unknown id fails
//! configuration validation instead of being resolved late on the delivery
//! path. The registry is populated by explicit registration at process start.

use crate::service_delivery::{DeliveryPayload, ServiceDelivery};
use crate::subscription_setup::SubscriptionSetup;
use std::collections::HashMap;
use std::sync::Arc;

/// Remaps domain identifiers between upstream and downstream namespaces.
pub trait IdentifierAdapter: Send + Sync {
    fn apply(&self, delivery: ServiceDelivery) -> ServiceDelivery;
}

/// Builds the adapters one subscription needs from its declared setup.
pub type AdapterFactory = fn(&SubscriptionSetup) -> Vec<Arc<dyn IdentifierAdapter>>;

/// Adapter-id to factory mapping.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under an id, replacing any previous registration.
    pub fn register(&mut self, adapter_id: impl Into<String>, factory: AdapterFactory) {
        self.factories.insert(adapter_id.into(), factory);
    }

    pub fn contains(&self, adapter_id: &str) -> bool {
        self.factories.contains_key(adapter_id)
    }

    /// Instantiates the adapter chain for one accepted setup.
    ///
    /// Setups without an adapter id get the identity chain. Unknown ids were
    /// already rejected during validation and resolve to the identity chain
    /// here as well.
    pub fn build_chain(&self, setup: &SubscriptionSetup) -> IdentifierAdapterChain {
        match setup.identifier_adapter_id.as_deref() {
            Some(adapter_id) => match self.factories.get(adapter_id) {
                Some(factory) => IdentifierAdapterChain::new(factory(setup)),
                None => IdentifierAdapterChain::identity(),
            },
            None => IdentifierAdapterChain::identity(),
        }
    }
}

/// Ordered adapters applied to every delivery for one subscriber.
#[derive(Clone)]
pub struct IdentifierAdapterChain {
    adapters: Vec<Arc<dyn IdentifierAdapter>>,
}

impl IdentifierAdapterChain {
    pub fn identity() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    pub fn new(adapters: Vec<Arc<dyn IdentifierAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn is_identity(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn apply(&self, delivery: ServiceDelivery) -> ServiceDelivery {
        self.adapters
            .iter()
            .fold(delivery, |delivery, adapter| adapter.apply(delivery))
    }
}

/// Prefixes line/vehicle/journey/situation references with a codespace.
pub struct CodespacePrefixAdapter {
    codespace: String,
}

impl CodespacePrefixAdapter {
    pub fn new(codespace: impl Into<String>) -> Self {
        Self {
            codespace: codespace.into(),
        }
    }

    fn prefix(&self, value: Option<String>) -> Option<String> {
        value.map(|v| format!("{}:{v}", self.codespace))
    }
}

impl IdentifierAdapter for CodespacePrefixAdapter {
    fn apply(&self, mut delivery: ServiceDelivery) -> ServiceDelivery {
        match &mut delivery.payload {
            DeliveryPayload::EstimatedTimetable(journeys) => {
                for journey in journeys {
                    journey.line_ref = self.prefix(journey.line_ref.take());
                    journey.journey_ref = self.prefix(journey.journey_ref.take());
                }
            }
            DeliveryPayload::VehicleMonitoring(activities) => {
                for activity in activities {
                    activity.line_ref = self.prefix(activity.line_ref.take());
                    activity.vehicle_ref = self.prefix(activity.vehicle_ref.take());
                    activity.journey_ref = self.prefix(activity.journey_ref.take());
                }
            }
            DeliveryPayload::SituationExchange(situations) => {
                for situation in situations {
                    situation.situation_number = self.prefix(situation.situation_number.take());
                }
            }
        }
        delivery
    }
}

/// Factory for [`CodespacePrefixAdapter`] keyed on the setup's dataset id.
pub fn codespace_prefix_factory(setup: &SubscriptionSetup) -> Vec<Arc<dyn IdentifierAdapter>> {
    vec![Arc::new(CodespacePrefixAdapter::new(setup.dataset_id.clone()))]
}
