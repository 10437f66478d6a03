//! Process-wide delivery counters for periodic progress logging.

use crate::service_delivery::SiriDataKind;
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicU64, Ordering};

/// How many publishes between progress log events.
pub(crate) const PROGRESS_LOG_EVERY: u64 = 100;

/// Atomic per-kind publish counters.
pub(crate) struct DeliveryCounters {
    estimated_timetable: AtomicU64,
    vehicle_monitoring: AtomicU64,
    situation_exchange: AtomicU64,
}

impl DeliveryCounters {
    pub(crate) fn new() -> Self {
        Self {
            estimated_timetable: AtomicU64::new(0),
            vehicle_monitoring: AtomicU64::new(0),
            situation_exchange: AtomicU64::new(0),
        }
    }

    fn counter(&self, kind: SiriDataKind) -> &AtomicU64 {
        match kind {
            SiriDataKind::EstimatedTimetable => &self.estimated_timetable,
            SiriDataKind::VehicleMonitoring => &self.vehicle_monitoring,
            SiriDataKind::SituationExchange => &self.situation_exchange,
        }
    }

    /// Records one publish and returns the new running total for the kind.
    pub(crate) fn record(&self, kind: SiriDataKind) -> u64 {
        self.counter(kind).fetch_add(1, Ordering::Relaxed) + 1
    }

    #[cfg(test)]
    pub(crate) fn total(&self, kind: SiriDataKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }
}

/// `true` on every `PROGRESS_LOG_EVERY`-th publish.
pub(crate) fn should_log_progress(total: u64) -> bool {
    total % PROGRESS_LOG_EVERY == 0
}

lazy_static! {
    /// Counters for the optional per-kind topic fan-out.
    pub(crate) static ref TOPIC_PUBLISH_COUNTERS: DeliveryCounters = DeliveryCounters::new();
}
