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

//! Loads a declared subscription configuration list from a static JSON file.

use siri_hub::SubscriptionSetup;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use tracing::debug;

/// Failure to load the declared configuration list.
#[derive(Debug)]
pub enum SubscriptionFileError {
    FileNotFound(String),
    Unreadable(String),
    Unparseable(String),
}

impl Display for SubscriptionFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionFileError::FileNotFound(detail) => {
                write!(f, "static subscription file not found: {detail}")
            }
            SubscriptionFileError::Unreadable(detail) => {
                write!(f, "unable to read subscription file: {detail}")
            }
            SubscriptionFileError::Unparseable(detail) => {
                write!(f, "unable to parse subscription file: {detail}")
            }
        }
    }
}

impl Error for SubscriptionFileError {}

pub struct SubscriptionStaticFile {
    static_file: String,
}

impl SubscriptionStaticFile {
    pub fn new(static_file: String) -> Self {
        SubscriptionStaticFile { static_file }
    }

    /// Reads and parses the declared subscription list.
    ///
    /// The file holds a JSON array of subscription setups in declaration
    /// order; reconciliation owns all further validation.
    pub fn load_subscriptions(&self) -> Result<Vec<SubscriptionSetup>, SubscriptionFileError> {
        let subscription_json_file = PathBuf::from(self.static_file.clone());
        debug!("subscription_json_file: {subscription_json_file:?}");

        let subscription_json_file = canonicalize(subscription_json_file)
            .map_err(|e| SubscriptionFileError::FileNotFound(format!("{e:?}")))?;

        let data = fs::read_to_string(subscription_json_file)
            .map_err(|e| SubscriptionFileError::Unreadable(format!("{e:?}")))?;

        let subscriptions: Vec<SubscriptionSetup> = serde_json::from_str(&data)
            .map_err(|e| SubscriptionFileError::Unparseable(format!("{e:?}")))?;

        debug!("loaded {} declared subscriptions", subscriptions.len());
        Ok(subscriptions)
    }
}
