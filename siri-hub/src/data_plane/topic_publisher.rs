//! Optional per-kind broker topic fan-out.
//!
//! When a topic is configured for a data kind, every inbound update of that
//! kind is split into single-element messages and each is published to the
//! topic. Publishing is fire-and-forget through the shared delivery pool.

use crate::observability::events;
use crate::observability::metrics::{self, TOPIC_PUBLISH_COUNTERS};
use crate::routing::delivery_splitter::split_into_batches;
use crate::runtime::worker_runtime::DeliveryWorkerPool;
use crate::service_delivery::{ServiceDelivery, SiriDataKind};
use crate::transport::{BrokerClient, DeliveryEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const COMPONENT: &str = "topic_publisher";
const TOPIC_PUBLISH_TIME_TO_LIVE: Duration = Duration::from_secs(30);

/// Per-kind topic destinations. A kind without a topic is not published.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TopicRouting {
    #[serde(default)]
    pub estimated_timetable: Option<String>,
    #[serde(default)]
    pub vehicle_monitoring: Option<String>,
    #[serde(default)]
    pub situation_exchange: Option<String>,
}

impl TopicRouting {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.estimated_timetable.is_some()
            || self.vehicle_monitoring.is_some()
            || self.situation_exchange.is_some()
    }

    fn topic_for(&self, kind: SiriDataKind) -> Option<&str> {
        match kind {
            SiriDataKind::EstimatedTimetable => self.estimated_timetable.as_deref(),
            SiriDataKind::VehicleMonitoring => self.vehicle_monitoring.as_deref(),
            SiriDataKind::SituationExchange => self.situation_exchange.as_deref(),
        }
    }
}

pub(crate) struct TopicPublisher {
    routing: TopicRouting,
    broker: Arc<dyn BrokerClient>,
    encoder: Arc<dyn DeliveryEncoder>,
}

impl TopicPublisher {
    pub(crate) fn new(
        routing: TopicRouting,
        broker: Arc<dyn BrokerClient>,
        encoder: Arc<dyn DeliveryEncoder>,
    ) -> Self {
        Self {
            routing,
            broker,
            encoder,
        }
    }

    /// Splits one update into single-element messages and publishes each to
    /// the kind's topic, if one is configured.
    pub(crate) fn publish_split(&self, update: &ServiceDelivery, pool: &DeliveryWorkerPool) {
        let kind = update.data_kind();
        let Some(topic) = self.routing.topic_for(kind) else {
            return;
        };
        let topic = topic.to_string();

        for single in split_into_batches(update.clone(), 1) {
            if !single.carries_data() {
                continue;
            }

            let body = match self.encoder.encode(&single) {
                Ok(body) => body,
                Err(err) => {
                    warn!(
                        event = events::TOPIC_PUBLISH_FAILED,
                        component = COMPONENT,
                        topic = topic.as_str(),
                        data_kind = %kind,
                        err = %err,
                        "unable to encode single-element message"
                    );
                    continue;
                }
            };

            let broker = self.broker.clone();
            let topic = topic.clone();
            pool.spawn_delivery(async move {
                match broker
                    .publish(&topic, body, TOPIC_PUBLISH_TIME_TO_LIVE)
                    .await
                {
                    Ok(()) => {
                        debug!(
                            event = events::TOPIC_PUBLISH_OK,
                            component = COMPONENT,
                            topic = topic.as_str(),
                            data_kind = %kind,
                            "published single-element message"
                        );
                        let total = TOPIC_PUBLISH_COUNTERS.record(kind);
                        if metrics::should_log_progress(total) {
                            info!(
                                event = events::TOPIC_PUBLISH_PROGRESS,
                                component = COMPONENT,
                                topic = topic.as_str(),
                                data_kind = %kind,
                                total,
                                "topic publish progress"
                            );
                        }
                    }
                    Err(err) => {
                        warn!(
                            event = events::TOPIC_PUBLISH_FAILED,
                            component = COMPONENT,
                            topic = topic.as_str(),
                            data_kind = %kind,
                            err = %err,
                            "topic publish failed"
                        );
                    }
                }
            });
        }
    }
}
