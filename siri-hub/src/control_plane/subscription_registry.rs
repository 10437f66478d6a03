//! Authoritative, versioned store of subscription configurations and health.
//!
//! Writes go through a mutex-owned entry map and are performed only by
//! reconciliation and explicit health transitions. Reads on the dispatch hot
//! path load an immutable snapshot, rebuilt after every mutation.

use crate::observability::events;
use crate::routing::adapter_registry::IdentifierAdapterChain;
use crate::service_delivery::SiriDataKind;
use crate::subscription_setup::{OutboundSubscriptionSetup, SubscriptionSetup};
use crate::subscription_status::{ReconcileOutcome, SubscriptionHealth, SubscriptionStatusReport};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const COMPONENT: &str = "subscription_registry";

/// One registered subscription with its runtime state.
#[derive(Clone)]
pub(crate) struct RegisteredSubscription {
    pub(crate) setup: SubscriptionSetup,
    pub(crate) health: SubscriptionHealth,
    pub(crate) last_outcome: ReconcileOutcome,
    pub(crate) adapter_chain: IdentifierAdapterChain,
}

impl RegisteredSubscription {
    fn outbound(&self) -> Option<OutboundSubscriptionSetup> {
        let address = self.setup.callback_address.clone()?;
        Some(OutboundSubscriptionSetup {
            subscription_id: self.setup.subscription_id.clone(),
            address,
            content_type: self.setup.content_type.clone(),
            filter_criteria: self.setup.filter_criteria.clone().unwrap_or_default(),
            adapter_chain: self.adapter_chain.clone(),
            time_to_live: self.setup.time_to_live(),
        })
    }
}

struct RegistrySnapshot {
    version: u64,
    active_by_kind: HashMap<SiriDataKind, Vec<OutboundSubscriptionSetup>>,
}

impl RegistrySnapshot {
    fn empty() -> Self {
        Self {
            version: 0,
            active_by_kind: HashMap::new(),
        }
    }

    fn from_entries(version: u64, entries: &HashMap<u32, RegisteredSubscription>) -> Self {
        let mut active_by_kind: HashMap<SiriDataKind, Vec<OutboundSubscriptionSetup>> =
            HashMap::new();
        for entry in entries.values() {
            if entry.health != SubscriptionHealth::Active {
                continue;
            }
            if let Some(outbound) = entry.outbound() {
                active_by_kind
                    .entry(entry.setup.subscription_type)
                    .or_default()
                    .push(outbound);
            }
        }
        Self {
            version,
            active_by_kind,
        }
    }
}

pub(crate) struct SubscriptionRegistry {
    entries: Mutex<HashMap<u32, RegisteredSubscription>>,
    snapshot: ArcSwap<RegistrySnapshot>,
    next_version: AtomicU64,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::empty()),
            next_version: AtomicU64::new(1),
        }
    }

    fn publish_snapshot(&self, entries: &HashMap<u32, RegisteredSubscription>) {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        self.snapshot
            .store(Arc::new(RegistrySnapshot::from_entries(version, entries)));
        debug!(
            event = events::REGISTRY_SNAPSHOT_REBUILT,
            component = COMPONENT,
            snapshot_version = version,
            "registry snapshot rebuilt"
        );
    }

    /// Looks up the registered entry for one stable internal id.
    pub(crate) async fn lookup(&self, internal_id: u32) -> Option<RegisteredSubscription> {
        self.entries.lock().await.get(&internal_id).cloned()
    }

    /// Inserts a newly accepted setup with health PENDING.
    pub(crate) async fn insert_new(
        &self,
        setup: SubscriptionSetup,
        adapter_chain: IdentifierAdapterChain,
    ) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            setup.internal_id,
            RegisteredSubscription {
                setup,
                health: SubscriptionHealth::Pending,
                last_outcome: ReconcileOutcome::Created,
                adapter_chain,
            },
        );
        self.publish_snapshot(&entries);
    }

    /// Records that an unchanged entry survived a reconciliation pass.
    pub(crate) async fn keep_existing(&self, internal_id: u32) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(&internal_id) {
            entry.last_outcome = ReconcileOutcome::Kept;
        }
    }

    /// Adopts the declared fields of an updated setup while preserving the
    /// existing entry's externally visible id and health.
    ///
    /// Returns `true` when the existing entry was ACTIVE and the caller must
    /// schedule reactivation.
    pub(crate) async fn adopt_update(
        &self,
        mut setup: SubscriptionSetup,
        adapter_chain: IdentifierAdapterChain,
    ) -> bool {
        let mut entries = self.entries.lock().await;
        let (health, was_active) = match entries.get(&setup.internal_id) {
            Some(existing) => {
                setup.subscription_id = existing.setup.subscription_id.clone();
                (
                    existing.health,
                    existing.health == SubscriptionHealth::Active,
                )
            }
            None => (SubscriptionHealth::Pending, false),
        };
        entries.insert(
            setup.internal_id,
            RegisteredSubscription {
                setup,
                health,
                last_outcome: ReconcileOutcome::Updated,
                adapter_chain,
            },
        );
        self.publish_snapshot(&entries);
        was_active
    }

    /// Removes one entry. Deletion policy is owned by the caller.
    pub(crate) async fn remove(&self, internal_id: u32) -> bool {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(&internal_id).is_some();
        if removed {
            self.publish_snapshot(&entries);
        }
        removed
    }

    async fn transition_health(
        &self,
        subscription_id: &str,
        health: SubscriptionHealth,
    ) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .values_mut()
            .find(|entry| entry.setup.subscription_id == subscription_id);

        let Some(entry) = entry else {
            warn!(
                event = events::REGISTRY_UNKNOWN_SUBSCRIPTION,
                component = COMPONENT,
                subscription_id,
                "health transition for unknown subscription"
            );
            return false;
        };

        let previous = entry.health;
        entry.health = health;
        debug!(
            event = events::REGISTRY_HEALTH_TRANSITION,
            component = COMPONENT,
            subscription_id,
            from = %previous,
            to = %health,
            "subscription health transition"
        );
        self.publish_snapshot(&entries);
        true
    }

    /// PENDING (or paused) to ACTIVE on successful channel establishment.
    pub(crate) async fn mark_active(&self, subscription_id: &str) -> bool {
        self.transition_health(subscription_id, SubscriptionHealth::Active)
            .await
    }

    /// Deliberate pause.
    pub(crate) async fn mark_inactive(&self, subscription_id: &str) -> bool {
        self.transition_health(subscription_id, SubscriptionHealth::Inactive)
            .await
    }

    /// Unrecoverable channel failure.
    pub(crate) async fn mark_error(&self, subscription_id: &str) -> bool {
        self.transition_health(subscription_id, SubscriptionHealth::Error)
            .await
    }

    /// Operator inspection per stable internal id.
    pub(crate) async fn status_report(&self, internal_id: u32) -> Option<SubscriptionStatusReport> {
        let entries = self.entries.lock().await;
        entries.get(&internal_id).map(|entry| SubscriptionStatusReport {
            internal_id,
            subscription_id: entry.setup.subscription_id.clone(),
            health: entry.health,
            last_outcome: entry.last_outcome,
        })
    }

    /// Active subscribers for one data kind, from the current snapshot.
    ///
    /// Lock-free; safe to call from the dispatch path.
    pub(crate) fn active_subscribers(&self, kind: SiriDataKind) -> Vec<OutboundSubscriptionSetup> {
        let snapshot = self.snapshot.load();
        snapshot
            .active_by_kind
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn snapshot_version(&self) -> u64 {
        self.snapshot.load().version
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionRegistry;
    use crate::routing::adapter_registry::IdentifierAdapterChain;
    use crate::service_delivery::SiriDataKind;
    use crate::subscription_setup::{
        ProtocolVersion, ServiceStyle, SubscriptionMode, SubscriptionSetup,
    };
    use crate::subscription_status::{ReconcileOutcome, SubscriptionHealth};

    fn setup(internal_id: u32, subscription_id: &str) -> SubscriptionSetup {
        SubscriptionSetup {
            internal_id,
            subscription_id: subscription_id.to_string(),
            vendor: "vendor-a".to_string(),
            dataset_id: "DST".to_string(),
            requestor_ref: "hub".to_string(),
            content_type: "application/xml".to_string(),
            protocol_version: ProtocolVersion::V2_0,
            service_style: ServiceStyle::Rest,
            subscription_type: SiriDataKind::VehicleMonitoring,
            subscription_mode: SubscriptionMode::Subscribe,
            duration_of_subscription_secs: 86_400,
            heartbeat_interval_secs: 60,
            preview_interval_secs: None,
            urls: Default::default(),
            callback_address: Some("http://consumer.example/inbound".to_string()),
            override_https: false,
            active: true,
            identifier_adapter_id: None,
            data_supply_request_for_initial_delivery: false,
            filter_criteria: None,
            time_to_live_millis: 30_000,
        }
    }

    #[tokio::test]
    async fn new_entries_start_pending_and_invisible_to_dispatch() {
        let registry = SubscriptionRegistry::new();
        registry
            .insert_new(setup(1, "sub-1"), IdentifierAdapterChain::identity())
            .await;

        let report = registry.status_report(1).await.expect("entry registered");
        assert_eq!(report.health, SubscriptionHealth::Pending);
        assert_eq!(report.last_outcome, ReconcileOutcome::Created);
        assert!(registry
            .active_subscribers(SiriDataKind::VehicleMonitoring)
            .is_empty());
    }

    #[tokio::test]
    async fn activation_exposes_entry_in_the_snapshot() {
        let registry = SubscriptionRegistry::new();
        registry
            .insert_new(setup(1, "sub-1"), IdentifierAdapterChain::identity())
            .await;

        assert!(registry.mark_active("sub-1").await);

        let subscribers = registry.active_subscribers(SiriDataKind::VehicleMonitoring);
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].subscription_id, "sub-1");
        assert!(registry
            .active_subscribers(SiriDataKind::SituationExchange)
            .is_empty());
    }

    #[tokio::test]
    async fn pausing_removes_entry_from_the_snapshot() {
        let registry = SubscriptionRegistry::new();
        registry
            .insert_new(setup(1, "sub-1"), IdentifierAdapterChain::identity())
            .await;
        registry.mark_active("sub-1").await;

        assert!(registry.mark_inactive("sub-1").await);

        assert!(registry
            .active_subscribers(SiriDataKind::VehicleMonitoring)
            .is_empty());
        let report = registry.status_report(1).await.expect("entry registered");
        assert_eq!(report.health, SubscriptionHealth::Inactive);
    }

    #[tokio::test]
    async fn adopt_update_preserves_id_and_health() {
        let registry = SubscriptionRegistry::new();
        registry
            .insert_new(setup(1, "sub-original"), IdentifierAdapterChain::identity())
            .await;
        registry.mark_active("sub-original").await;

        let mut updated = setup(1, "sub-redeclared");
        updated.heartbeat_interval_secs = 120;
        let was_active = registry
            .adopt_update(updated, IdentifierAdapterChain::identity())
            .await;

        assert!(was_active);
        let report = registry.status_report(1).await.expect("entry registered");
        assert_eq!(report.subscription_id, "sub-original");
        assert_eq!(report.health, SubscriptionHealth::Active);
        assert_eq!(report.last_outcome, ReconcileOutcome::Updated);
    }

    #[tokio::test]
    async fn unknown_subscription_transition_is_rejected() {
        let registry = SubscriptionRegistry::new();

        assert!(!registry.mark_active("no-such-subscription").await);
    }

    #[tokio::test]
    async fn entries_without_address_never_reach_the_snapshot() {
        let registry = SubscriptionRegistry::new();
        let mut addressless = setup(1, "sub-1");
        addressless.callback_address = None;
        registry
            .insert_new(addressless, IdentifierAdapterChain::identity())
            .await;
        registry.mark_active("sub-1").await;

        assert!(registry
            .active_subscribers(SiriDataKind::VehicleMonitoring)
            .is_empty());
    }

    #[tokio::test]
    async fn every_mutation_advances_the_snapshot_version() {
        let registry = SubscriptionRegistry::new();
        let first = registry.snapshot_version();
        registry
            .insert_new(setup(1, "sub-1"), IdentifierAdapterChain::identity())
            .await;
        let second = registry.snapshot_version();
        registry.mark_active("sub-1").await;
        let third = registry.snapshot_version();

        assert!(first < second);
        assert!(second < third);
    }
}
