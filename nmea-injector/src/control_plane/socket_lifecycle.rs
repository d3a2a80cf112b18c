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

use super::socket_table::{ActiveSocket, SocketTable};
use crate::data_plane::listener::{BoundSocket, ListenerFailure, ListenerHandle, ListenerSettings};
use crate::error::{DeregisterError, RegisterError};
use crate::observability::events;
use crate::socket_descriptor::{SocketDescriptor, SocketKey};
use crate::ControllerConfig;
use std::io;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::warn;

const COMPONENT: &str = "socket_lifecycle";

/// Orchestrates socket transitions across the registry and the data plane.
///
/// Built for one operation while the registry lock is held, so every check and
/// mutation below is atomic with respect to other registry operations.
pub(crate) struct SocketLifecycle<'a> {
    table: &'a mut SocketTable,
    config: &'a ControllerConfig,
    failures: &'a mpsc::UnboundedSender<ListenerFailure>,
}

impl<'a> SocketLifecycle<'a> {
    pub(crate) fn new(
        table: &'a mut SocketTable,
        config: &'a ControllerConfig,
        failures: &'a mpsc::UnboundedSender<ListenerFailure>,
    ) -> Self {
        Self {
            table,
            config,
            failures,
        }
    }

    /// Binds the socket, starts its listener and inserts the entry. Nothing is
    /// inserted unless every step succeeds. Returns the new listener id.
    pub(crate) async fn register(
        &mut self,
        descriptor: SocketDescriptor,
    ) -> Result<String, RegisterError> {
        let key = descriptor.key();
        let Some(injector) = self.table.injector().cloned() else {
            return Err(RegisterError::ShuttingDown);
        };
        if self.table.contains(&key) {
            return Err(RegisterError::AlreadyRegistered(key));
        }
        if descriptor.port() == 0 {
            return Err(RegisterError::BindFailure {
                key,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "port 0 is not a valid listening port",
                ),
            });
        }

        let socket = self.bind(key).await?;
        let generation = self.table.allocate_generation();
        let listener = ListenerHandle::spawn(
            socket,
            descriptor,
            generation,
            injector,
            ListenerSettings::from(self.config),
            self.failures.clone(),
        );
        let listener_id = listener.listener_id().to_string();

        // Key was checked above under the same lock.
        self.table.insert(ActiveSocket {
            descriptor,
            generation,
            listener,
        });
        Ok(listener_id)
    }

    async fn bind(&self, key: SocketKey) -> Result<BoundSocket, RegisterError> {
        let addr = SocketAddr::new(self.config.bind_address, key.port);
        let timeout = self.config.bind_timeout();
        match tokio::time::timeout(timeout, BoundSocket::bind(key.kind, addr)).await {
            Ok(Ok(socket)) => Ok(socket),
            Ok(Err(source)) => Err(RegisterError::BindFailure { key, source }),
            Err(_) => Err(RegisterError::BindFailure {
                key,
                source: io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("bind did not complete within {timeout:?}"),
                ),
            }),
        }
    }

    /// Removes the entry and returns once its listener has terminated.
    pub(crate) async fn deregister(
        &mut self,
        key: SocketKey,
    ) -> Result<SocketDescriptor, DeregisterError> {
        let socket = self
            .table
            .remove(&key)
            .ok_or(DeregisterError::NotFound(key))?;
        let descriptor = socket.descriptor;
        stop_listener(socket).await;
        Ok(descriptor)
    }
}

/// Applies a failure report. Returns the removed descriptor, or `None` when the
/// report is stale (the entry is gone or belongs to a newer registration).
pub(crate) async fn cleanup_failure(
    table: &mut SocketTable,
    failure: &ListenerFailure,
) -> Option<SocketDescriptor> {
    let socket = table.remove_generation(&failure.key, failure.generation)?;
    let descriptor = socket.descriptor;
    stop_listener(socket).await;
    Some(descriptor)
}

/// Stops a listener that has already been removed from the table.
pub(crate) async fn stop_listener(socket: ActiveSocket) {
    let ActiveSocket {
        descriptor,
        listener,
        ..
    } = socket;
    let listener_id = listener.listener_id().to_string();
    if let Err(join_err) = listener.stop().await {
        warn!(
            event = events::LISTENER_FAILED,
            component = COMPONENT,
            listener_id = listener_id.as_str(),
            kind = %descriptor.kind(),
            port = descriptor.port(),
            err = %join_err,
            "listener task did not join cleanly"
        );
    }
}
