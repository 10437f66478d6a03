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

mod config;
mod transports;

use crate::config::Config;
use crate::transports::{JsonDeliveryEncoder, ReqwestPushClient, UnconfiguredBrokerClient};
use clap::Parser;
use siri_hub::{AdapterRegistry, DatasetLineFilter, HubCapabilities, SiriHub};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::sync::Arc;
use subscription_static_file::SubscriptionStaticFile;
use tracing::{info, warn};

#[derive(Parser)]
#[command()]
struct HubArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started siri-hub-service");

    let args = HubArgs::parse();
    let mut file = File::open(args.config)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let config: Config = json5::from_str(&contents)?;

    let declared = SubscriptionStaticFile::new(config.subscription_config.file_path.clone())
        .load_subscriptions()?;

    // Identifier adapters are registered explicitly at process start; the
    // reconciler rejects setups referencing ids that are not present here.
    let mut adapters = AdapterRegistry::new();
    adapters.register("codespace-prefix", siri_hub::codespace_prefix_factory);

    let hub = SiriHub::new(
        &config.hub_name,
        config.hub.clone(),
        adapters,
        HubCapabilities {
            filter: Arc::new(DatasetLineFilter),
            http: Arc::new(ReqwestPushClient::new()),
            broker: Arc::new(UnconfiguredBrokerClient),
            encoder: Arc::new(JsonDeliveryEncoder),
        },
    );

    let report = hub.apply_configuration(declared).await;
    info!(
        created = report.created.len(),
        kept = report.kept.len(),
        updated = report.updated.len(),
        rejected = report.errors.len(),
        "initial configuration applied"
    );
    for error in &report.errors {
        warn!(err = %error, "rejected subscription configuration");
    }
    for planned in &report.channel_plans {
        info!(
            subscription_id = planned.subscription_id.as_str(),
            roles = ?planned.plan.roles,
            adapter = ?planned.plan.adapter,
            "channels to provision"
        );
    }

    // Envelope servers and protocol clients attach to the hub from here;
    // keep the process alive until shut down.
    tokio::signal::ctrl_c().await?;
    info!("Shutting down siri-hub-service");

    Ok(())
}
