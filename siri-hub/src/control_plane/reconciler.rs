//! Reconciliation of declared configuration against the live registry.
//!
//! Produces the minimal set of create/keep/update actions so unchanged or
//! already-active subscriptions are never disrupted, and rejects invalid or
//! duplicate configurations before any channel is planned.

use crate::control_plane::channel_planner::{plan_channels, ChannelPlan};
use crate::control_plane::setup_validation::{validate_setup, ConfigError};
use crate::control_plane::subscription_registry::SubscriptionRegistry;
use crate::observability::events;
use crate::routing::adapter_registry::AdapterRegistry;
use crate::subscription_setup::{RequestType, SubscriptionMode, SubscriptionSetup};
use std::collections::HashSet;
use tracing::{info, warn};

const COMPONENT: &str = "reconciler";

/// Channels to provision for one accepted subscription.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlannedChannels {
    pub internal_id: u32,
    pub subscription_id: String,
    pub plan: ChannelPlan,
}

/// Result of one reconciliation pass.
#[derive(Default)]
pub struct ReconcileReport {
    /// Subscription ids first seen in this pass.
    pub created: Vec<String>,
    /// Subscription ids of structurally unchanged entries.
    pub kept: Vec<String>,
    /// Subscription ids whose declared fields were adopted.
    pub updated: Vec<String>,
    /// Subset of `updated` that was ACTIVE and must be re-established.
    pub reactivated: Vec<String>,
    /// Channels the transport layer must open, for created and updated
    /// entries. Kept entries require no provisioning.
    pub channel_plans: Vec<PlannedChannels>,
    /// Per-entry-fatal failures. Never abort the pass.
    pub errors: Vec<ConfigError>,
}

impl ReconcileReport {
    pub fn accepted_count(&self) -> usize {
        self.created.len() + self.kept.len() + self.updated.len()
    }
}

/// Orchestrates one reconciliation pass over existing domain owners.
pub(crate) struct Reconciler<'a> {
    registry: &'a SubscriptionRegistry,
    adapters: &'a AdapterRegistry,
    inbound_base_url: &'a str,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        registry: &'a SubscriptionRegistry,
        adapters: &'a AdapterRegistry,
        inbound_base_url: &'a str,
    ) -> Self {
        Self {
            registry,
            adapters,
            inbound_base_url,
        }
    }

    /// Resolves the callback address from the inbound base URL, downgrading
    /// to plain HTTP when the entry requests the override on an HTTPS base.
    fn resolve_callback_address(&self, setup: &SubscriptionSetup) -> String {
        match self.inbound_base_url.strip_prefix("https://") {
            Some(rest) if setup.override_https => format!("http://{rest}"),
            _ => self.inbound_base_url.to_string(),
        }
    }

    /// Fetched-delivery subscriptions serve data requests over the subscribe
    /// endpoint unless a fetch URL is configured explicitly.
    fn apply_fetch_url_defaults(setup: &mut SubscriptionSetup) {
        let fetched = matches!(
            setup.subscription_mode,
            SubscriptionMode::FetchedDelivery | SubscriptionMode::PollingFetchedDelivery
        );
        if !fetched {
            return;
        }
        let Some(subscribe_url) = setup.url(RequestType::Subscribe).map(str::to_string) else {
            return;
        };
        for role in [
            RequestType::GetEstimatedTimetable,
            RequestType::GetVehicleMonitoring,
            RequestType::GetSituationExchange,
        ] {
            setup.urls.entry(role).or_insert_with(|| subscribe_url.clone());
        }
    }

    /// Runs one pass over the declared configuration list.
    pub(crate) async fn reconcile(&self, declared: Vec<SubscriptionSetup>) -> ReconcileReport {
        info!(
            event = events::RECONCILE_START,
            component = COMPONENT,
            declared = declared.len(),
            "reconciling declared configuration"
        );

        let mut report = ReconcileReport::default();
        let mut accepted_ids: HashSet<String> = HashSet::new();

        for mut setup in declared {
            setup.callback_address = Some(self.resolve_callback_address(&setup));

            if let Err(error) = validate_setup(&setup, self.adapters) {
                warn!(
                    event = events::RECONCILE_ENTRY_REJECTED,
                    component = COMPONENT,
                    internal_id = setup.internal_id,
                    err = %error,
                    "declared entry rejected"
                );
                report.errors.push(error);
                continue;
            }

            if accepted_ids.contains(&setup.subscription_id) {
                let error = ConfigError::DuplicateSubscriptionId {
                    internal_id: setup.internal_id,
                    subscription_id: setup.subscription_id.clone(),
                };
                warn!(
                    event = events::RECONCILE_ENTRY_REJECTED,
                    component = COMPONENT,
                    internal_id = setup.internal_id,
                    err = %error,
                    "declared entry rejected"
                );
                report.errors.push(error);
                continue;
            }

            Self::apply_fetch_url_defaults(&mut setup);

            match self.registry.lookup(setup.internal_id).await {
                None => {
                    accepted_ids.insert(setup.subscription_id.clone());
                    let chain = self.adapters.build_chain(&setup);
                    let plan = plan_channels(&setup);
                    report.channel_plans.push(PlannedChannels {
                        internal_id: setup.internal_id,
                        subscription_id: setup.subscription_id.clone(),
                        plan,
                    });
                    info!(
                        event = events::RECONCILE_ENTRY_CREATED,
                        component = COMPONENT,
                        internal_id = setup.internal_id,
                        subscription_id = setup.subscription_id.as_str(),
                        "registering new subscription"
                    );
                    report.created.push(setup.subscription_id.clone());
                    self.registry.insert_new(setup, chain).await;
                }
                Some(existing) if existing.setup.structurally_equal(&setup) => {
                    let existing_id = existing.setup.subscription_id.clone();
                    accepted_ids.insert(existing_id.clone());
                    info!(
                        event = events::RECONCILE_ENTRY_KEPT,
                        component = COMPONENT,
                        internal_id = setup.internal_id,
                        subscription_id = existing_id.as_str(),
                        "declared entry unchanged, keeping existing"
                    );
                    self.registry.keep_existing(setup.internal_id).await;
                    report.kept.push(existing_id);
                }
                Some(existing) => {
                    let preserved_id = existing.setup.subscription_id.clone();
                    accepted_ids.insert(preserved_id.clone());
                    let chain = self.adapters.build_chain(&setup);
                    let plan = plan_channels(&setup);
                    report.channel_plans.push(PlannedChannels {
                        internal_id: setup.internal_id,
                        subscription_id: preserved_id.clone(),
                        plan,
                    });
                    info!(
                        event = events::RECONCILE_ENTRY_UPDATED,
                        component = COMPONENT,
                        internal_id = setup.internal_id,
                        subscription_id = preserved_id.as_str(),
                        "declared entry updated, adopting declared fields"
                    );
                    let was_active = self.registry.adopt_update(setup, chain).await;
                    if was_active {
                        report.reactivated.push(preserved_id.clone());
                    }
                    report.updated.push(preserved_id);
                }
            }
        }

        info!(
            event = events::RECONCILE_COMPLETE,
            component = COMPONENT,
            created = report.created.len(),
            kept = report.kept.len(),
            updated = report.updated.len(),
            rejected = report.errors.len(),
            "reconciliation pass complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::Reconciler;
    use crate::control_plane::setup_validation::ConfigError;
    use crate::control_plane::subscription_registry::SubscriptionRegistry;
    use crate::routing::adapter_registry::AdapterRegistry;
    use crate::service_delivery::SiriDataKind;
    use crate::subscription_setup::{
        ProtocolVersion, RequestType, ServiceStyle, SubscriptionMode, SubscriptionSetup,
    };
    use crate::subscription_status::SubscriptionHealth;

    const BASE_URL: &str = "https://hub.example/inbound";

    fn declared(internal_id: u32, subscription_id: &str) -> SubscriptionSetup {
        let mut urls = std::collections::HashMap::new();
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

    #[tokio::test]
    async fn reconciling_twice_is_a_no_op() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let first = reconciler
            .reconcile(vec![declared(1, "sub-1"), declared(2, "sub-2")])
            .await;
        assert_eq!(first.created, vec!["sub-1", "sub-2"]);
        assert!(first.errors.is_empty());

        registry.mark_active("sub-1").await;

        let second = reconciler
            .reconcile(vec![declared(1, "sub-1"), declared(2, "sub-2")])
            .await;
        assert!(second.created.is_empty());
        assert_eq!(second.kept, vec!["sub-1", "sub-2"]);
        assert!(second.channel_plans.is_empty());

        let report_1 = registry.status_report(1).await.expect("entry registered");
        let report_2 = registry.status_report(2).await.expect("entry registered");
        assert_eq!(report_1.subscription_id, "sub-1");
        assert_eq!(report_1.health, SubscriptionHealth::Active);
        assert_eq!(report_2.subscription_id, "sub-2");
        assert_eq!(report_2.health, SubscriptionHealth::Pending);
    }

    #[tokio::test]
    async fn duplicate_subscription_id_yields_one_error_and_one_accepted_entry() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let report = reconciler
            .reconcile(vec![declared(1, "sub-dup"), declared(2, "sub-dup")])
            .await;

        assert_eq!(report.created, vec!["sub-dup"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0],
            ConfigError::DuplicateSubscriptionId {
                internal_id: 2,
                subscription_id: "sub-dup".to_string(),
            }
        );
        assert!(registry.status_report(2).await.is_none());
    }

    #[tokio::test]
    async fn invalid_entry_does_not_block_the_rest_of_the_pass() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let mut invalid = declared(1, "sub-invalid");
        invalid.subscription_mode = SubscriptionMode::RequestResponse;
        invalid.urls.clear();

        let report = reconciler
            .reconcile(vec![invalid, declared(2, "sub-valid")])
            .await;

        assert_eq!(report.created, vec!["sub-valid"]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0]
            .to_string()
            .contains("GET_VEHICLE_MONITORING"));
    }

    #[tokio::test]
    async fn updated_entry_keeps_id_and_is_marked_for_reactivation() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        reconciler.reconcile(vec![declared(1, "sub-first")]).await;
        registry.mark_active("sub-first").await;

        let mut changed = declared(1, "sub-regenerated");
        changed.heartbeat_interval_secs = 120;
        let report = reconciler.reconcile(vec![changed]).await;

        assert_eq!(report.updated, vec!["sub-first"]);
        assert_eq!(report.reactivated, vec!["sub-first"]);
        assert_eq!(report.channel_plans.len(), 1);
        assert_eq!(report.channel_plans[0].subscription_id, "sub-first");

        let status = registry.status_report(1).await.expect("entry registered");
        assert_eq!(status.subscription_id, "sub-first");
        assert_eq!(status.health, SubscriptionHealth::Active);
    }

    #[tokio::test]
    async fn https_override_downgrades_the_callback_address() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let mut with_override = declared(1, "sub-1");
        with_override.override_https = true;
        reconciler
            .reconcile(vec![with_override, declared(2, "sub-2")])
            .await;

        let downgraded = registry.lookup(1).await.expect("entry registered");
        let untouched = registry.lookup(2).await.expect("entry registered");
        assert_eq!(
            downgraded.setup.callback_address.as_deref(),
            Some("http://hub.example/inbound")
        );
        assert_eq!(
            untouched.setup.callback_address.as_deref(),
            Some("https://hub.example/inbound")
        );
    }

    #[tokio::test]
    async fn fetched_delivery_defaults_fetch_urls_from_subscribe_url() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let mut fetched = declared(1, "sub-1");
        fetched.subscription_mode = SubscriptionMode::FetchedDelivery;
        fetched.urls.insert(
            RequestType::GetVehicleMonitoring,
            "http://feed.example/vm".to_string(),
        );
        reconciler.reconcile(vec![fetched]).await;

        let registered = registry.lookup(1).await.expect("entry registered");
        assert_eq!(
            registered.setup.url(RequestType::GetVehicleMonitoring),
            Some("http://feed.example/vm")
        );
        assert_eq!(
            registered.setup.url(RequestType::GetEstimatedTimetable),
            Some("http://feed.example/siri")
        );
        assert_eq!(
            registered.setup.url(RequestType::GetSituationExchange),
            Some("http://feed.example/siri")
        );
    }

    #[tokio::test]
    async fn subscribe_plan_is_emitted_for_created_entries() {
        let registry = SubscriptionRegistry::new();
        let adapters = AdapterRegistry::new();
        let reconciler = Reconciler::new(&registry, &adapters, BASE_URL);

        let report = reconciler.reconcile(vec![declared(1, "sub-1")]).await;

        assert_eq!(report.channel_plans.len(), 1);
        let plan = &report.channel_plans[0].plan;
        assert!(plan
            .roles
            .contains(&crate::control_plane::channel_planner::ChannelRole::Subscribe));
    }
}
