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

use integration_test_utils::{free_udp_port, send_udp, StalledSink, WAIT_TIMEOUT};
use nmea_injector::outbound::RawSentenceTransform;
use nmea_injector::{ControllerConfig, SocketDescriptor, SocketKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const BACKLOG: usize = 60;
const INJECT_TIMEOUT_MS: u64 = 100;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deregister_is_not_held_up_by_a_backed_up_outbound_queue() {
    let sink = Arc::new(StalledSink::new());
    let controller = support::make_controller_with(
        "backpressure",
        ControllerConfig {
            queue_size: 1,
            inject_timeout_ms: INJECT_TIMEOUT_MS,
            write_timeout_ms: 60_000,
            ..support::loopback_config()
        },
        Arc::new(RawSentenceTransform),
        sink.clone(),
    );
    let gps = SocketDescriptor::new(SocketKind::Udp, free_udp_port(), 220);
    controller.register(gps).await.expect("registration should succeed");

    let datagram: String = (0..BACKLOG).map(|n| format!("$GPTXT,{n}*00\r\n")).collect();
    send_udp(gps.port(), datagram.as_bytes()).await;

    // Writer is stuck on the first frame, the second fills the queue, the rest
    // of the datagram waits on the full queue.
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while sink.attempts() == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sink.attempts(), 1, "writer should be blocked on the sink");
    tokio::time::sleep(Duration::from_millis(INJECT_TIMEOUT_MS * 2)).await;

    let started = Instant::now();
    tokio::time::timeout(WAIT_TIMEOUT, controller.deregister(gps))
        .await
        .expect("deregister should not wait for the backlog")
        .expect("socket is registered");
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(INJECT_TIMEOUT_MS * 5),
        "deregister took {elapsed:?} with {BACKLOG} sentences backed up"
    );
    assert!(controller.list().await.is_empty());
}
