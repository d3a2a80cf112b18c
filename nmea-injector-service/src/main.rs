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

use crate::config::{OutboundMode, ServiceConfig};
use clap::Parser;
use nmea_injector::outbound::{
    MavlinkGpsInputTransform, OutboundSink, RawSentenceTransform, SentenceTransform, UdpSink,
};
use nmea_injector::{ControllerEvent, TrafficController};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Injects external NMEA0183 GPS sentences into an autopilot telemetry stream")]
struct InjectorArgs {
    /// json5 config file; built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra UDP input port, tagged with component id 220.
    #[arg(short, long = "udp", value_name = "PORT")]
    udp: Vec<u16>,

    /// Extra TCP input port, tagged with component id 221.
    #[arg(short, long = "tcp", value_name = "PORT")]
    tcp: Vec<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    info!("Started nmea-injector-service");

    let args = InjectorArgs::parse();
    let config = ServiceConfig::load(args.config.as_deref())?.with_cli_ports(&args.udp, &args.tcp);

    let transform: Arc<dyn SentenceTransform> = match config.outbound.mode {
        OutboundMode::MavlinkGpsInput => {
            Arc::new(MavlinkGpsInputTransform::new(config.outbound.system_id))
        }
        OutboundMode::RawSentence => Arc::new(RawSentenceTransform),
    };
    let sink: Arc<dyn OutboundSink> = Arc::new(UdpSink::connect(config.outbound.address).await?);
    info!(
        mode = ?config.outbound.mode,
        address = %config.outbound.address,
        "outbound autopilot stream opened"
    );

    let controller = TrafficController::new("nmea-injector", config.controller, transform, sink)?;
    let reporter = tokio::spawn(report_events(controller.subscribe()));

    for descriptor in config.sockets {
        if let Err(err) = controller.register(descriptor).await {
            warn!(%descriptor, %err, "unable to register startup socket");
        }
    }

    let active = controller.list().await;
    info!(count = active.len(), "input sockets ready");
    for descriptor in &active {
        info!(%descriptor, "listening");
    }

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");

    controller.shutdown().await;
    reporter.abort();
    Ok(())
}

/// Logs the asynchronous failures the controller cannot return to a caller.
async fn report_events(mut events: broadcast::Receiver<ControllerEvent>) {
    loop {
        match events.recv().await {
            Ok(ControllerEvent::ListenerFailed { descriptor, error }) => {
                error!(%descriptor, %error, "input socket failed and was removed");
            }
            Ok(ControllerEvent::WriteFailed { identity, error }) => {
                warn!(identity, %error, "sentence could not be written to the autopilot");
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event reporter fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
