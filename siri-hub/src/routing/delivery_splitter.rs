//! Batch-split policy for outbound deliveries.

use crate::service_delivery::{DeliveryPayload, ServiceDelivery};

/// Splits one delivery into ordered batches of at most
/// `max_elements_per_batch` elements. Batch boundaries never split an
/// element. An empty envelope yields a single empty batch, which the
/// actionable-data guard drops before any channel is created.
pub(crate) fn split_into_batches(
    delivery: ServiceDelivery,
    max_elements_per_batch: usize,
) -> Vec<ServiceDelivery> {
    let batch_size = max_elements_per_batch.max(1);
    let producer_ref = delivery.producer_ref;

    fn chunked<T: Clone>(elements: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
        if elements.is_empty() {
            return vec![Vec::new()];
        }
        elements
            .chunks(batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    match delivery.payload {
        DeliveryPayload::EstimatedTimetable(journeys) => chunked(journeys, batch_size)
            .into_iter()
            .map(|chunk| ServiceDelivery::estimated_timetable(producer_ref.clone(), chunk))
            .collect(),
        DeliveryPayload::VehicleMonitoring(activities) => chunked(activities, batch_size)
            .into_iter()
            .map(|chunk| ServiceDelivery::vehicle_monitoring(producer_ref.clone(), chunk))
            .collect(),
        DeliveryPayload::SituationExchange(situations) => chunked(situations, batch_size)
            .into_iter()
            .map(|chunk| ServiceDelivery::situation_exchange(producer_ref.clone(), chunk))
            .collect(),
    }
}
