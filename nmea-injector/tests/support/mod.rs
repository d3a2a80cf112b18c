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


use integration_test_utils::{RecordingSink, LOOPBACK, WAIT_TIMEOUT};
use nmea_injector::outbound::{OutboundSink, RawSentenceTransform, SentenceTransform};
use nmea_injector::{ControllerConfig, ControllerEvent, TrafficController};
use std::sync::Arc;
use tokio::sync::broadcast;

#[allow(dead_code)]
pub(crate) const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
#[allow(dead_code)]
pub(crate) const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

pub(crate) fn loopback_config() -> ControllerConfig {
    ControllerConfig {
        bind_address: LOOPBACK,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub(crate) fn make_controller(
    name: &str,
    transform: Arc<dyn SentenceTransform>,
    sink: Arc<dyn OutboundSink>,
) -> TrafficController {
    make_controller_with(name, loopback_config(), transform, sink)
}

#[allow(dead_code)]
pub(crate) fn make_controller_with(
    name: &str,
    config: ControllerConfig,
    transform: Arc<dyn SentenceTransform>,
    sink: Arc<dyn OutboundSink>,
) -> TrafficController {
    integration_test_utils::init_logging();
    TrafficController::new(name, config, transform, sink)
        .expect("controller creation should succeed")
}

/// Controller forwarding raw sentences into a recording sink.
#[allow(dead_code)]
pub(crate) fn make_recording_controller(name: &str) -> (TrafficController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let controller = make_controller(name, Arc::new(RawSentenceTransform), sink.clone());
    (controller, sink)
}

#[allow(dead_code)]
pub(crate) fn crlf(sentence: &str) -> String {
    format!("{sentence}\r\n")
}

#[allow(dead_code)]
pub(crate) async fn next_event(
    events: &mut broadcast::Receiver<ControllerEvent>,
) -> ControllerEvent {
    tokio::time::timeout(WAIT_TIMEOUT, events.recv())
        .await
        .expect("event should arrive within timeout")
        .expect("event channel should stay open")
}
