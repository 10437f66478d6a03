/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # siri-hub
//!
//! `siri-hub` is a real-time public-transport data hub: it maintains many
//! independently configured upstream SIRI feed subscriptions (estimated
//! timetable, vehicle monitoring, situation exchange) and re-publishes
//! filtered, identifier-remapped copies of incoming updates to downstream
//! subscribers, each with its own delivery address, filter, and
//! identifier-mapping rules.
//!
//! Typical usage is API-first and centered on [`SiriHub`]: declare the
//! subscription configuration, reconcile it, and feed normalized inbound
//! updates into [`SiriHub::dispatch`]. Envelope codecs and concrete network
//! clients stay outside the crate and are supplied as capability trait
//! objects via [`HubCapabilities`].
//!
//! ```
//! use std::sync::Arc;
//! use siri_hub::{AdapterRegistry, DatasetLineFilter, HubCapabilities, HubSettings, SiriHub};
//!
//! # pub mod mock_transport {
//! #     use async_trait::async_trait;
//! #     use siri_hub::{
//! #         BrokerClient, DeliveryEncoder, DeliveryHeaders, EncodeError, HttpPushClient,
//! #         ServiceDelivery, TransportError,
//! #     };
//! #     use std::time::Duration;
//! #
//! #     pub struct MockHttpClient;
//! #
//! #     #[async_trait]
//! #     impl HttpPushClient for MockHttpClient {
//! #         async fn post(
//! #             &self,
//! #             _url: &str,
//! #             _headers: &DeliveryHeaders,
//! #             _body: Vec<u8>,
//! #             _timeout: Duration,
//! #         ) -> Result<(), TransportError> {
//! #             Ok(())
//! #         }
//! #     }
//! #
//! #     pub struct MockBroker;
//! #
//! #     #[async_trait]
//! #     impl BrokerClient for MockBroker {
//! #         async fn publish(
//! #             &self,
//! #             _destination: &str,
//! #             _body: Vec<u8>,
//! #             _time_to_live: Duration,
//! #         ) -> Result<(), TransportError> {
//! #             Ok(())
//! #         }
//! #     }
//! #
//! #     pub struct MockEncoder;
//! #
//! #     impl DeliveryEncoder for MockEncoder {
//! #         fn encode(&self, _delivery: &ServiceDelivery) -> Result<Vec<u8>, EncodeError> {
//! #             Ok(Vec::new())
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap().block_on(async {
//! let capabilities = HubCapabilities {
//!     filter: Arc::new(DatasetLineFilter),
//!     http: Arc::new(mock_transport::MockHttpClient),
//!     broker: Arc::new(mock_transport::MockBroker),
//!     encoder: Arc::new(mock_transport::MockEncoder),
//! };
//!
//! let hub = SiriHub::new(
//!     "quick-start",
//!     HubSettings::new("https://hub.example/inbound"),
//!     AdapterRegistry::new(),
//!     capabilities,
//! );
//!
//! let report = hub.apply_configuration(Vec::new()).await;
//! assert_eq!(report.accepted_count(), 0);
//! assert!(report.errors.is_empty());
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward [`SiriHub`] surface and the public data model
//! - Control plane: subscription registry ownership, reconciliation
//!   lifecycle, setup validation, and channel planning
//! - Routing: filter/identifier-adapter capability seams and split policy
//! - Data plane: dispatch fan-out, delivery channels, and topic publishing
//! - Runtime: the bounded delivery worker pool
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits events
//! and does not unconditionally initialize a global subscriber.
//! Binaries/tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod control_plane;
mod data_plane;
mod routing;
mod runtime;

#[doc(hidden)]
pub mod observability;

mod service_delivery;
pub use service_delivery::{
    DeliveryPayload, EstimatedVehicleJourney, PtSituationElement, ServiceDelivery, SiriDataKind,
    VehicleActivity,
};

mod subscription_setup;
pub use subscription_setup::{
    OutboundSubscriptionSetup, ProtocolVersion, RequestType, ServiceStyle, SubscriptionMode,
    SubscriptionSetup,
};

mod subscription_status;
pub use subscription_status::{ReconcileOutcome, SubscriptionHealth, SubscriptionStatusReport};

mod transport;
pub use transport::{
    BrokerClient, DeliveryEncoder, DeliveryHeaders, EncodeError, HttpPushClient, TransportError,
};

pub use control_plane::channel_planner::{
    plan_channels, ChannelPlan, ChannelRole, ProtocolAdapterKind,
};
pub use control_plane::reconciler::{PlannedChannels, ReconcileReport};
pub use control_plane::setup_validation::ConfigError;
pub use data_plane::topic_publisher::TopicRouting;
pub use routing::adapter_registry::{
    codespace_prefix_factory, AdapterFactory, AdapterRegistry, CodespacePrefixAdapter,
    IdentifierAdapter, IdentifierAdapterChain,
};
pub use routing::payload_filter::{DatasetLineFilter, FilterCriteria, PayloadFilter};

mod hub;
pub use hub::{HubCapabilities, HubSettings, SiriHub};
