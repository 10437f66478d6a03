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

//! Normalized SIRI service-delivery payload model shared by dispatch and routing.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The three SIRI functional services this hub carries.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiriDataKind {
    EstimatedTimetable,
    VehicleMonitoring,
    SituationExchange,
}

impl Display for SiriDataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SiriDataKind::EstimatedTimetable => "ESTIMATED_TIMETABLE",
            SiriDataKind::VehicleMonitoring => "VEHICLE_MONITORING",
            SiriDataKind::SituationExchange => "SITUATION_EXCHANGE",
        };
        write!(f, "{name}")
    }
}

/// One estimated-timetable journey entry.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EstimatedVehicleJourney {
    pub line_ref: Option<String>,
    pub dataset_id: Option<String>,
    pub journey_ref: Option<String>,
    pub operator_ref: Option<String>,
    #[serde(default)]
    pub cancellation: bool,
}

/// One vehicle-monitoring activity entry.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct VehicleActivity {
    pub line_ref: Option<String>,
    pub dataset_id: Option<String>,
    pub vehicle_ref: Option<String>,
    pub journey_ref: Option<String>,
    pub delay_seconds: Option<i64>,
}

/// One situation-exchange situation entry.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PtSituationElement {
    pub situation_number: Option<String>,
    pub dataset_id: Option<String>,
    pub participant_ref: Option<String>,
    pub summary: Option<String>,
}

/// Kind-tagged element container of one delivery envelope.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DeliveryPayload {
    EstimatedTimetable(Vec<EstimatedVehicleJourney>),
    VehicleMonitoring(Vec<VehicleActivity>),
    SituationExchange(Vec<PtSituationElement>),
}

/// One normalized inbound or outbound delivery envelope.
///
/// The concrete wire form (XML/Avro/Protobuf) is produced by an external
/// codec; this struct is the in-process shape filters, identifier adapters,
/// and the splitter operate on.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceDelivery {
    pub producer_ref: Option<String>,
    pub payload: DeliveryPayload,
}

impl ServiceDelivery {
    pub fn estimated_timetable(
        producer_ref: Option<String>,
        journeys: Vec<EstimatedVehicleJourney>,
    ) -> Self {
        Self {
            producer_ref,
            payload: DeliveryPayload::EstimatedTimetable(journeys),
        }
    }

    pub fn vehicle_monitoring(
        producer_ref: Option<String>,
        activities: Vec<VehicleActivity>,
    ) -> Self {
        Self {
            producer_ref,
            payload: DeliveryPayload::VehicleMonitoring(activities),
        }
    }

    pub fn situation_exchange(
        producer_ref: Option<String>,
        situations: Vec<PtSituationElement>,
    ) -> Self {
        Self {
            producer_ref,
            payload: DeliveryPayload::SituationExchange(situations),
        }
    }

    pub fn data_kind(&self) -> SiriDataKind {
        match &self.payload {
            DeliveryPayload::EstimatedTimetable(_) => SiriDataKind::EstimatedTimetable,
            DeliveryPayload::VehicleMonitoring(_) => SiriDataKind::VehicleMonitoring,
            DeliveryPayload::SituationExchange(_) => SiriDataKind::SituationExchange,
        }
    }

    pub fn element_count(&self) -> usize {
        match &self.payload {
            DeliveryPayload::EstimatedTimetable(journeys) => journeys.len(),
            DeliveryPayload::VehicleMonitoring(activities) => activities.len(),
            DeliveryPayload::SituationExchange(situations) => situations.len(),
        }
    }

    /// `true` when the envelope contains at least one data element of its kind.
    ///
    /// A delivery that declares an envelope but carries no contained elements
    /// is not worth sending downstream.
    pub fn carries_data(&self) -> bool {
        self.element_count() > 0
    }
}
