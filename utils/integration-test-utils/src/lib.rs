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


mod recording_sink;
pub use recording_sink::{FailingSink, RecordingSink, StalledSink};

mod socket_helpers;
pub use socket_helpers::{
    connect_tcp, free_tcp_port, free_udp_port, send_udp, LOOPBACK, WAIT_TIMEOUT,
};

/// Installs a `tracing` subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
