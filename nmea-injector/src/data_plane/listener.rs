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


//! Listener: one bound socket serviced by one task.

use super::injector::Injector;
use super::{tcp_listener, udp_listener};
use crate::error::{InjectError, ListenerError};
use crate::framing::{Sentence, SentenceFramer, Terminator};
use crate::observability::{events, fields};
use crate::socket_descriptor::{SocketDescriptor, SocketKey, SocketKind};
use crate::ControllerConfig;
use std::io;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn, Level};

const COMPONENT: &str = "listener";

/// A socket granted by the OS, ready to be handed to a listener.
pub(crate) enum BoundSocket {
    Udp(UdpSocket),
    Tcp(TcpListener),
}

impl BoundSocket {
    pub(crate) async fn bind(kind: SocketKind, addr: SocketAddr) -> io::Result<Self> {
        match kind {
            SocketKind::Udp => UdpSocket::bind(addr).await.map(BoundSocket::Udp),
            SocketKind::Tcp => TcpListener::bind(addr).await.map(BoundSocket::Tcp),
        }
    }
}

/// Listener tunables taken from the controller config.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ListenerSettings {
    pub(crate) terminator: Terminator,
    pub(crate) max_sentence_len: usize,
    pub(crate) max_tcp_peers: usize,
}

impl From<&ControllerConfig> for ListenerSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            terminator: config.terminator,
            max_sentence_len: config.max_sentence_len,
            max_tcp_peers: config.max_tcp_peers,
        }
    }
}

/// Posted by a listener that stopped without being asked to.
#[derive(Debug)]
pub(crate) struct ListenerFailure {
    pub(crate) key: SocketKey,
    pub(crate) generation: u64,
    pub(crate) error: ListenerError,
}

/// State shared by a listener task and, for TCP, its peer tasks.
pub(crate) struct ListenerContext {
    pub(crate) listener_id: String,
    pub(crate) descriptor: SocketDescriptor,
    pub(crate) injector: Injector,
    pub(crate) settings: ListenerSettings,
}

impl ListenerContext {
    pub(crate) fn key(&self) -> SocketKey {
        self.descriptor.key()
    }

    pub(crate) fn framer(&self) -> SentenceFramer {
        SentenceFramer::for_kind(
            self.descriptor.kind(),
            self.settings.terminator,
            self.settings.max_sentence_len,
        )
    }

    /// Feeds one read through `framer` and injects the resulting sentences in order.
    ///
    /// Rejected and queue-full sentences are dropped; only a closed injector stops
    /// the listener. Returns `Break` as soon as `stop` fires, leaving the rest of
    /// the read uninjected, so a backed-up queue never delays a stop.
    pub(crate) async fn forward(
        &self,
        framer: &mut SentenceFramer,
        bytes: &[u8],
        peer: SocketAddr,
        stop: &watch::Receiver<bool>,
    ) -> Result<ControlFlow<()>, ListenerError> {
        let discarded_before = framer.discarded_bytes();
        let sentences = framer.push(bytes);
        let discarded = framer.discarded_bytes() - discarded_before;
        if discarded > 0 {
            warn!(
                event = events::LISTENER_DISCARD_OVERSIZED,
                component = COMPONENT,
                listener_id = self.listener_id.as_str(),
                kind = %self.descriptor.kind(),
                port = self.descriptor.port(),
                peer = %peer,
                discarded,
                max_sentence_len = self.settings.max_sentence_len,
                "discarding oversized sentence bytes"
            );
        }

        let total = sentences.len();
        for (index, sentence) in sentences.into_iter().enumerate() {
            // A dropped sender counts as a stop.
            if stop.has_changed().unwrap_or(true) {
                return Ok(self.abandon_read(total - index));
            }
            tokio::select! {
                biased;
                _ = stop_requested(stop) => return Ok(self.abandon_read(total - index)),
                injected = self.inject_one(&sentence, peer) => injected?,
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn abandon_read(&self, abandoned: usize) -> ControlFlow<()> {
        debug!(
            event = events::LISTENER_READ_ABANDONED,
            component = COMPONENT,
            listener_id = self.listener_id.as_str(),
            port = self.descriptor.port(),
            abandoned,
            reason = fields::REASON_STOP_SIGNAL,
            "stop requested while injecting; dropping rest of read"
        );
        ControlFlow::Break(())
    }

    async fn inject_one(&self, sentence: &Sentence, peer: SocketAddr) -> Result<(), ListenerError> {
        let identity = self.descriptor.identity();
        let rendered =
            tracing::enabled!(Level::DEBUG).then(|| fields::format_sentence(sentence));
        if let Some(rendered) = rendered.as_ref() {
            debug!(
                event = events::LISTENER_RECEIVE,
                component = COMPONENT,
                listener_id = self.listener_id.as_str(),
                port = self.descriptor.port(),
                identity,
                peer = %peer,
                sentence = rendered.as_str(),
                "received sentence"
            );
        }

        match self.injector.inject(identity, sentence).await {
            Ok(()) => Ok(()),
            Err(InjectError::Rejected(err)) => {
                warn!(
                    event = events::INJECT_REJECTED,
                    component = COMPONENT,
                    listener_id = self.listener_id.as_str(),
                    identity,
                    talker = fields::format_talker(sentence),
                    err = %err,
                    "dropping sentence rejected by transform"
                );
                Ok(())
            }
            Err(err @ InjectError::QueueFull(_)) => {
                warn!(
                    event = events::INJECT_QUEUE_FULL,
                    component = COMPONENT,
                    listener_id = self.listener_id.as_str(),
                    identity,
                    talker = fields::format_talker(sentence),
                    err = %err,
                    "dropping sentence; outbound queue is full"
                );
                Ok(())
            }
            Err(InjectError::Closed) => Err(ListenerError::InjectorClosed(self.key())),
        }
    }
}

/// Resolves once a stop is requested, without marking the change as seen, so
/// the read loop's own `stop.changed()` still fires afterwards.
async fn stop_requested(stop: &watch::Receiver<bool>) {
    let mut observer = stop.clone();
    let _ = observer.changed().await;
}

/// Registry-side handle of a running listener.
pub(crate) struct ListenerHandle {
    listener_id: String,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Starts servicing `socket`. An unrequested exit is posted to `failures`
    /// tagged with `generation`.
    pub(crate) fn spawn(
        socket: BoundSocket,
        descriptor: SocketDescriptor,
        generation: u64,
        injector: Injector,
        settings: ListenerSettings,
        failures: mpsc::UnboundedSender<ListenerFailure>,
    ) -> Self {
        let listener_id = uuid::Uuid::new_v4().hyphenated().to_string();
        let (stop, stop_rx) = watch::channel(false);
        let context = Arc::new(ListenerContext {
            listener_id: listener_id.clone(),
            descriptor,
            injector,
            settings,
        });

        let task = tokio::spawn(supervise_listener(
            context, socket, stop_rx, generation, failures,
        ));

        Self {
            listener_id,
            stop,
            task,
        }
    }

    pub(crate) fn listener_id(&self) -> &str {
        &self.listener_id
    }

    /// Signals the listener to stop and waits until its task, peer tasks and
    /// socket are gone.
    pub(crate) async fn stop(self) -> Result<(), JoinError> {
        // The receiver is gone if the listener already exited.
        let _ = self.stop.send(true);
        self.task.await
    }
}

async fn supervise_listener(
    context: Arc<ListenerContext>,
    socket: BoundSocket,
    stop: watch::Receiver<bool>,
    generation: u64,
    failures: mpsc::UnboundedSender<ListenerFailure>,
) {
    let descriptor = context.descriptor;
    info!(
        event = events::LISTENER_START,
        component = COMPONENT,
        listener_id = context.listener_id.as_str(),
        kind = %descriptor.kind(),
        port = descriptor.port(),
        identity = descriptor.identity(),
        "listener started"
    );

    // Run the loop on its own task so a panic is caught as a join error and
    // reported like any other failure.
    let run = tokio::spawn(run_listener(context.clone(), socket, stop));
    let result = match run.await {
        Ok(result) => result,
        Err(join_err) => Err(ListenerError::Aborted {
            key: descriptor.key(),
            reason: join_err.to_string(),
        }),
    };

    match result {
        Ok(()) => {
            info!(
                event = events::LISTENER_STOP,
                component = COMPONENT,
                listener_id = context.listener_id.as_str(),
                kind = %descriptor.kind(),
                port = descriptor.port(),
                reason = fields::REASON_STOP_SIGNAL,
                "listener stopped"
            );
        }
        Err(error) => {
            warn!(
                event = events::LISTENER_FAILED,
                component = COMPONENT,
                listener_id = context.listener_id.as_str(),
                kind = %descriptor.kind(),
                port = descriptor.port(),
                err = %error,
                "listener failed"
            );
            // The controller may already be gone during shutdown.
            let _ = failures.send(ListenerFailure {
                key: descriptor.key(),
                generation,
                error,
            });
        }
    }
}

async fn run_listener(
    context: Arc<ListenerContext>,
    socket: BoundSocket,
    stop: watch::Receiver<bool>,
) -> Result<(), ListenerError> {
    match socket {
        BoundSocket::Udp(socket) => udp_listener::receive_loop(&context, socket, stop).await,
        BoundSocket::Tcp(listener) => tcp_listener::accept_loop(context, listener, stop).await,
    }
}
