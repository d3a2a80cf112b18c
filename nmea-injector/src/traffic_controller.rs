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

use crate::config::ControllerConfig;
use crate::control_plane::failure_supervisor::spawn_failure_supervisor;
use crate::control_plane::socket_lifecycle::{stop_listener, SocketLifecycle};
use crate::control_plane::socket_table::SocketTable;
use crate::controller_event::ControllerEvent;
use crate::data_plane::injector::Injector;
use crate::data_plane::listener::ListenerFailure;
use crate::data_plane::outbound_writer::spawn_outbound_writer;
use crate::error::{ConfigError, DeregisterError, RegisterError};
use crate::observability::events;
use crate::outbound::{OutboundSink, SentenceTransform};
use crate::socket_descriptor::{SocketDescriptor, SocketKey};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMPONENT: &str = "traffic_controller";

/// Background tasks owned by the controller for its whole lifetime.
struct ControllerTasks {
    supervisor: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// Registry and supervisor of the input sockets.
///
/// Every registered socket gets its own listener; every listener feeds the one
/// injector, which writes to the one outbound sink. Registry operations are
/// serialized by a single lock.
///
/// Must be created from within a tokio runtime. Dropping it without calling
/// [`shutdown`](Self::shutdown) still stops every listener and releases the
/// sockets; frames already queued are flushed in the background.
pub struct TrafficController {
    name: String,
    config: Arc<ControllerConfig>,
    table: Arc<Mutex<SocketTable>>,
    failures: mpsc::UnboundedSender<ListenerFailure>,
    events: broadcast::Sender<ControllerEvent>,
    tasks: Mutex<Option<ControllerTasks>>,
}

impl TrafficController {
    /// Opens the outbound path and starts the background tasks. No socket is
    /// registered yet.
    pub fn new(
        name: &str,
        config: ControllerConfig,
        transform: Arc<dyn SentenceTransform>,
        sink: Arc<dyn OutboundSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let name = name.to_string();
        let config = Arc::new(config);

        let (events, _) = broadcast::channel(config.event_capacity);
        let (injector, frames) =
            Injector::channel(transform, config.queue_size, config.inject_timeout());
        let writer =
            spawn_outbound_writer(frames, sink, config.write_timeout(), events.clone());

        let table = Arc::new(Mutex::new(SocketTable::new(injector)));
        let (failures, failure_reports) = mpsc::unbounded_channel();
        let supervisor = spawn_failure_supervisor(
            name.clone(),
            Arc::downgrade(&table),
            failure_reports,
            events.clone(),
        );

        info!(
            event = events::CONTROLLER_START,
            component = COMPONENT,
            controller = name.as_str(),
            queue_size = config.queue_size,
            max_tcp_peers = config.max_tcp_peers,
            bind_address = %config.bind_address,
            "traffic controller started"
        );

        Ok(Self {
            name,
            config,
            table,
            failures,
            events,
            tasks: Mutex::new(Some(ControllerTasks { supervisor, writer })),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Snapshot of the active descriptors, ordered by kind then port.
    pub async fn list(&self) -> Vec<SocketDescriptor> {
        self.table.lock().await.descriptors()
    }

    /// Subscribes to lifecycle events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Binds a socket for `descriptor` and starts its listener.
    ///
    /// Fails with [`RegisterError::AlreadyRegistered`] without any I/O if the
    /// `(kind, port)` slot is taken, and with [`RegisterError::BindFailure`] if the
    /// OS refuses the socket. The registry is unchanged on failure.
    pub async fn register(&self, descriptor: SocketDescriptor) -> Result<(), RegisterError> {
        debug!(
            event = events::SOCKET_REGISTER_START,
            component = COMPONENT,
            controller = self.name.as_str(),
            kind = %descriptor.kind(),
            port = descriptor.port(),
            identity = descriptor.identity(),
            "registering socket"
        );

        let mut table = self.table.lock().await;
        let result = SocketLifecycle::new(&mut table, &self.config, &self.failures)
            .register(descriptor)
            .await;

        match result {
            Ok(listener_id) => {
                info!(
                    event = events::SOCKET_REGISTER_OK,
                    component = COMPONENT,
                    controller = self.name.as_str(),
                    listener_id = listener_id.as_str(),
                    kind = %descriptor.kind(),
                    port = descriptor.port(),
                    identity = descriptor.identity(),
                    active = table.len(),
                    "socket registered"
                );
                let _ = self.events.send(ControllerEvent::Registered(descriptor));
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::SOCKET_REGISTER_FAILED,
                    component = COMPONENT,
                    controller = self.name.as_str(),
                    kind = %descriptor.kind(),
                    port = descriptor.port(),
                    identity = descriptor.identity(),
                    err = %err,
                    "socket registration failed"
                );
                Err(err)
            }
        }
    }

    /// Stops the listener of the `(kind, port)` slot and removes it.
    ///
    /// Returns only after the listener task has terminated and released its
    /// socket, so the port can be registered again right away. Accepts a
    /// [`SocketDescriptor`] or a [`SocketKey`]; the identity is ignored.
    pub async fn deregister(&self, key: impl Into<SocketKey>) -> Result<(), DeregisterError> {
        let key = key.into();
        debug!(
            event = events::SOCKET_DEREGISTER_START,
            component = COMPONENT,
            controller = self.name.as_str(),
            kind = %key.kind,
            port = key.port,
            "deregistering socket"
        );

        let mut table = self.table.lock().await;
        let result = SocketLifecycle::new(&mut table, &self.config, &self.failures)
            .deregister(key)
            .await;

        match result {
            Ok(descriptor) => {
                info!(
                    event = events::SOCKET_DEREGISTER_OK,
                    component = COMPONENT,
                    controller = self.name.as_str(),
                    kind = %descriptor.kind(),
                    port = descriptor.port(),
                    identity = descriptor.identity(),
                    active = table.len(),
                    "socket deregistered"
                );
                let _ = self.events.send(ControllerEvent::Deregistered(descriptor));
                Ok(())
            }
            Err(err) => {
                debug!(
                    event = events::SOCKET_DEREGISTER_FAILED,
                    component = COMPONENT,
                    controller = self.name.as_str(),
                    kind = %key.kind,
                    port = key.port,
                    err = %err,
                    "socket deregistration failed"
                );
                Err(err)
            }
        }
    }

    /// Stops every listener, then closes the outbound queue and waits until the
    /// frames already queued have been handed to the sink.
    ///
    /// Later registrations fail with [`RegisterError::ShuttingDown`]. Calling it
    /// again is a no-op.
    pub async fn shutdown(&self) {
        let Some(tasks) = self.tasks.lock().await.take() else {
            return;
        };
        info!(
            event = events::CONTROLLER_SHUTDOWN_START,
            component = COMPONENT,
            controller = self.name.as_str(),
            "shutting down traffic controller"
        );

        {
            let mut table = self.table.lock().await;
            for socket in table.close() {
                let descriptor = socket.descriptor;
                stop_listener(socket).await;
                let _ = self.events.send(ControllerEvent::Deregistered(descriptor));
            }
        }

        // Listeners are gone, so nothing is left to report.
        tasks.supervisor.abort();
        let _ = tasks.supervisor.await;

        // The writer exits once the last injector clone is dropped and the
        // queue is drained.
        if let Err(join_err) = tasks.writer.await {
            warn!(
                event = events::OUTBOUND_WRITER_JOIN_FAILED,
                component = COMPONENT,
                controller = self.name.as_str(),
                err = %join_err,
                "outbound writer did not join cleanly"
            );
        }

        info!(
            event = events::CONTROLLER_SHUTDOWN_OK,
            component = COMPONENT,
            controller = self.name.as_str(),
            "traffic controller shut down"
        );
    }
}
