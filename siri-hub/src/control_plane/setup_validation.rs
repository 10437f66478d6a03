//! Precondition validation for declared subscription setups.

use crate::routing::adapter_registry::AdapterRegistry;
use crate::service_delivery::SiriDataKind;
use crate::subscription_setup::{RequestType, SubscriptionMode, SubscriptionSetup};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-entry-fatal configuration failure.
///
/// Collected and reported by reconciliation; never aborts the pass for the
/// remaining entries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    MissingField {
        internal_id: u32,
        field: &'static str,
    },
    NonPositiveDuration {
        internal_id: u32,
        field: &'static str,
    },
    MissingUrl {
        internal_id: u32,
        request_type: RequestType,
    },
    UnknownAdapter {
        internal_id: u32,
        adapter_id: String,
    },
    DuplicateSubscriptionId {
        internal_id: u32,
        subscription_id: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingField { internal_id, field } => {
                write!(f, "subscription {internal_id}: {field} is not set")
            }
            ConfigError::NonPositiveDuration { internal_id, field } => {
                write!(f, "subscription {internal_id}: {field} must be > 0")
            }
            ConfigError::MissingUrl {
                internal_id,
                request_type,
            } => {
                write!(
                    f,
                    "subscription {internal_id}: {request_type}-url is missing"
                )
            }
            ConfigError::UnknownAdapter {
                internal_id,
                adapter_id,
            } => {
                write!(
                    f,
                    "subscription {internal_id}: unknown identifier adapter '{adapter_id}'"
                )
            }
            ConfigError::DuplicateSubscriptionId {
                internal_id,
                subscription_id,
            } => {
                write!(
                    f,
                    "subscription {internal_id}: duplicate subscription id '{subscription_id}'"
                )
            }
        }
    }
}

impl Error for ConfigError {}

fn require_non_empty(
    internal_id: u32,
    field: &'static str,
    value: &str,
) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingField { internal_id, field });
    }
    Ok(())
}

fn require_url(setup: &SubscriptionSetup, request_type: RequestType) -> Result<(), ConfigError> {
    if setup.url(request_type).is_none() {
        return Err(ConfigError::MissingUrl {
            internal_id: setup.internal_id,
            request_type,
        });
    }
    Ok(())
}

/// Validates one declared setup against all preconditions.
///
/// Returns the first failure; the reconciler records it and moves on to the
/// next declared entry.
pub(crate) fn validate_setup(
    setup: &SubscriptionSetup,
    adapters: &AdapterRegistry,
) -> Result<(), ConfigError> {
    let internal_id = setup.internal_id;

    require_non_empty(internal_id, "vendor", &setup.vendor)?;
    require_non_empty(internal_id, "datasetId", &setup.dataset_id)?;
    require_non_empty(internal_id, "requestorRef", &setup.requestor_ref)?;
    require_non_empty(internal_id, "contentType", &setup.content_type)?;
    require_non_empty(internal_id, "subscriptionId", &setup.subscription_id)?;

    if setup.duration_of_subscription_secs == 0 {
        return Err(ConfigError::NonPositiveDuration {
            internal_id,
            field: "durationOfSubscription",
        });
    }
    if setup.heartbeat_interval_secs == 0 {
        return Err(ConfigError::NonPositiveDuration {
            internal_id,
            field: "heartbeatInterval",
        });
    }
    if setup.preview_interval_secs == Some(0) {
        return Err(ConfigError::NonPositiveDuration {
            internal_id,
            field: "previewInterval",
        });
    }

    match setup.subscription_mode {
        SubscriptionMode::RequestResponse => {
            require_url(setup, RequestType::fetch_role_for(setup.subscription_type))?;
        }
        SubscriptionMode::Subscribe => {
            // ET and SX subscriptions replay a rolling window and need its size.
            let needs_preview = matches!(
                setup.subscription_type,
                SiriDataKind::EstimatedTimetable | SiriDataKind::SituationExchange
            );
            if needs_preview && setup.preview_interval_secs.is_none() {
                return Err(ConfigError::MissingField {
                    internal_id,
                    field: "previewInterval",
                });
            }
            require_url(setup, RequestType::Subscribe)?;
            require_url(setup, RequestType::DeleteSubscription)?;
        }
        SubscriptionMode::FetchedDelivery | SubscriptionMode::PollingFetchedDelivery => {
            require_url(setup, RequestType::Subscribe)?;
            require_url(setup, RequestType::DeleteSubscription)?;
        }
    }

    if let Some(adapter_id) = setup.identifier_adapter_id.as_deref() {
        if !adapters.contains(adapter_id) {
            return Err(ConfigError::UnknownAdapter {
                internal_id,
                adapter_id: adapter_id.to_string(),
            });
        }
    }

    Ok(())
}
