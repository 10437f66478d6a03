//! Public health and inspection metadata for registered subscriptions.

use std::fmt::{Display, Formatter};

/// Runtime health of one registered subscription.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscriptionHealth {
    /// Accepted by reconciliation; channels not yet established.
    Pending,
    /// Channels established and data flowing.
    Active,
    /// Deliberately paused.
    Inactive,
    /// Unrecoverable channel failure.
    Error,
}

impl Display for SubscriptionHealth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubscriptionHealth::Pending => "PENDING",
            SubscriptionHealth::Active => "ACTIVE",
            SubscriptionHealth::Inactive => "INACTIVE",
            SubscriptionHealth::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

/// Outcome of the most recent reconciliation pass for one entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReconcileOutcome {
    /// First seen in this pass.
    Created,
    /// Structurally unchanged; existing entry kept as-is.
    Kept,
    /// Declared fields adopted; identity and health preserved.
    Updated,
}

/// Operator-facing status of one subscription, queryable per `internal_id`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionStatusReport {
    pub internal_id: u32,
    pub subscription_id: String,
    pub health: SubscriptionHealth,
    pub last_outcome: ReconcileOutcome,
}
