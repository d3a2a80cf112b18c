/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

mod support;

use integration_test_utils::{free_udp_port, send_udp, RecordingSink};
use nmea_injector::framing::Sentence;
use nmea_injector::outbound::{OutboundFrame, SentenceTransform};
use nmea_injector::{ControllerEvent, SocketDescriptor, SocketKind, TransformError};
use std::sync::Arc;

/// Transform that brings down the listener task calling it.
struct PanickingTransform;

impl SentenceTransform for PanickingTransform {
    fn wrap(
        &self,
        _identity: u8,
        sentence: &Sentence,
    ) -> Result<Option<OutboundFrame>, TransformError> {
        panic!("transform cannot handle {sentence}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn crashed_listener_is_removed_reported_and_port_can_be_reused() {
    let controller = support::make_controller(
        "listener-failure",
        Arc::new(PanickingTransform),
        Arc::new(RecordingSink::new()),
    );
    let mut events = controller.subscribe();
    let gps = SocketDescriptor::new(SocketKind::Udp, free_udp_port(), 220);
    controller.register(gps).await.expect("registration should succeed");
    assert_eq!(
        support::next_event(&mut events).await,
        ControllerEvent::Registered(gps)
    );

    send_udp(gps.port(), support::crlf(support::GGA).as_bytes()).await;

    match support::next_event(&mut events).await {
        ControllerEvent::ListenerFailed { descriptor, error } => {
            assert_eq!(descriptor, gps);
            assert!(
                error.contains("terminated abnormally"),
                "unexpected failure reason: {error}"
            );
        }
        other => panic!("expected a listener failure, got {other:?}"),
    }
    assert!(controller.list().await.is_empty());

    controller
        .register(gps)
        .await
        .expect("port should be free again after the failure");
    assert_eq!(controller.list().await, vec![gps]);
    controller.shutdown().await;
}
