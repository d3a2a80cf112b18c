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


//! Applies listener failure reports to the registry.
//!
//! Runs on its own task so a listener never needs the registry lock to report:
//! `deregister` holds that lock while it waits for the listener to join.
//!
//! The task only holds a weak reference to the registry. Dropping the
//! controller drops the registry, which stops every listener and ends this
//! loop once the last failure sender is gone.

use super::socket_lifecycle::cleanup_failure;
use super::socket_table::SocketTable;
use crate::controller_event::ControllerEvent;
use crate::data_plane::listener::ListenerFailure;
use crate::observability::{events, fields};
use std::sync::Weak;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const COMPONENT: &str = "failure_supervisor";

pub(crate) fn spawn_failure_supervisor(
    name: String,
    table: Weak<Mutex<SocketTable>>,
    failures: mpsc::UnboundedReceiver<ListenerFailure>,
    notifier: broadcast::Sender<ControllerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(failure_supervisor_loop(name, table, failures, notifier))
}

pub(crate) async fn failure_supervisor_loop(
    name: String,
    table: Weak<Mutex<SocketTable>>,
    mut failures: mpsc::UnboundedReceiver<ListenerFailure>,
    notifier: broadcast::Sender<ControllerEvent>,
) {
    while let Some(failure) = failures.recv().await {
        let Some(registry) = table.upgrade() else {
            break;
        };
        let mut table = registry.lock().await;
        match cleanup_failure(&mut table, &failure).await {
            Some(descriptor) => {
                warn!(
                    event = events::SOCKET_FAILURE_CLEANUP,
                    component = COMPONENT,
                    controller = name.as_str(),
                    kind = %descriptor.kind(),
                    port = descriptor.port(),
                    identity = descriptor.identity(),
                    err = %failure.error,
                    "removed failed socket; re-register to resume"
                );
                let _ = notifier.send(ControllerEvent::ListenerFailed {
                    descriptor,
                    error: failure.error.to_string(),
                });
            }
            None => {
                debug!(
                    event = events::SOCKET_FAILURE_STALE,
                    component = COMPONENT,
                    controller = name.as_str(),
                    kind = %failure.key.kind,
                    port = failure.key.port,
                    generation = failure.generation,
                    reason = fields::REASON_GENERATION_MISMATCH,
                    "ignoring failure report for a replaced or removed socket"
                );
            }
        }
    }
}
