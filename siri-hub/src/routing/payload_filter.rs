//! Payload-filter capability seam and the dataset/line default policy.

use crate::service_delivery::{DeliveryPayload, ServiceDelivery};
use serde::{Deserialize, Serialize};

/// Selection criteria of one downstream subscriber.
///
/// An empty criteria set selects everything. Line filtering applies to the
/// kinds that carry a line reference (ET/VM); situation exchange is selected
/// by dataset only.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub line_refs: Vec<String>,
}

impl FilterCriteria {
    pub fn selects_all(&self) -> bool {
        self.dataset_id.is_none() && self.line_refs.is_empty()
    }
}

/// Reduces a delivery to the elements a subscriber's criteria select.
///
/// The concrete filtering framework is an external collaborator; the hub only
/// requires this narrow interface.
pub trait PayloadFilter: Send + Sync {
    fn apply(&self, delivery: &ServiceDelivery, criteria: &FilterCriteria) -> ServiceDelivery;
}

/// Default filter: dataset match plus optional line-reference selection.
pub struct DatasetLineFilter;

impl DatasetLineFilter {
    fn dataset_matches(criteria: &FilterCriteria, dataset_id: Option<&String>) -> bool {
        match &criteria.dataset_id {
            Some(wanted) => dataset_id == Some(wanted),
            None => true,
        }
    }

    fn line_matches(criteria: &FilterCriteria, line_ref: Option<&String>) -> bool {
        if criteria.line_refs.is_empty() {
            return true;
        }
        match line_ref {
            Some(line) => criteria.line_refs.iter().any(|wanted| wanted == line),
            None => false,
        }
    }
}

impl PayloadFilter for DatasetLineFilter {
    fn apply(&self, delivery: &ServiceDelivery, criteria: &FilterCriteria) -> ServiceDelivery {
        if criteria.selects_all() {
            return delivery.clone();
        }

        let payload = match &delivery.payload {
            DeliveryPayload::EstimatedTimetable(journeys) => DeliveryPayload::EstimatedTimetable(
                journeys
                    .iter()
                    .filter(|journey| {
                        Self::dataset_matches(criteria, journey.dataset_id.as_ref())
                            && Self::line_matches(criteria, journey.line_ref.as_ref())
                    })
                    .cloned()
                    .collect(),
            ),
            DeliveryPayload::VehicleMonitoring(activities) => DeliveryPayload::VehicleMonitoring(
                activities
                    .iter()
                    .filter(|activity| {
                        Self::dataset_matches(criteria, activity.dataset_id.as_ref())
                            && Self::line_matches(criteria, activity.line_ref.as_ref())
                    })
                    .cloned()
                    .collect(),
            ),
            DeliveryPayload::SituationExchange(situations) => DeliveryPayload::SituationExchange(
                situations
                    .iter()
                    .filter(|situation| {
                        Self::dataset_matches(criteria, situation.dataset_id.as_ref())
                    })
                    .cloned()
                    .collect(),
            ),
        };

        ServiceDelivery {
            producer_ref: delivery.producer_ref.clone(),
            payload,
        }
    }
}
