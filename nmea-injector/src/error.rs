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

//! Error taxonomy of the traffic controller.
//!
//! Registry-shape errors ([`RegisterError`], [`DeregisterError`]) are returned
//! synchronously to the caller. Listener and outbound failures happen on
//! background tasks and are surfaced through
//! [`ControllerEvent`](crate::ControllerEvent) and the log instead.

use crate::socket_descriptor::SocketKey;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures of [`TrafficController::register`](crate::TrafficController::register).
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The `(kind, port)` slot is already taken. No I/O was performed.
    #[error("socket {0} is already registered")]
    AlreadyRegistered(SocketKey),

    /// The OS did not grant the requested socket. The registry is unchanged.
    #[error("unable to bind {key}: {source}")]
    BindFailure {
        key: SocketKey,
        #[source]
        source: io::Error,
    },

    /// The controller has been shut down.
    #[error("traffic controller is shutting down")]
    ShuttingDown,
}

/// Failures of [`TrafficController::deregister`](crate::TrafficController::deregister).
#[derive(Debug, Error)]
pub enum DeregisterError {
    #[error("socket {0} is not registered")]
    NotFound(SocketKey),
}

/// Reasons a listener stopped without being asked to.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("receive on {key} failed: {source}")]
    Receive {
        key: SocketKey,
        #[source]
        source: io::Error,
    },

    #[error("accept on {key} failed: {source}")]
    Accept {
        key: SocketKey,
        #[source]
        source: io::Error,
    },

    #[error("outbound injector for {0} is closed")]
    InjectorClosed(SocketKey),

    #[error("listener task for {key} terminated abnormally: {reason}")]
    Aborted { key: SocketKey, reason: String },
}

/// Failures of injecting a sentence into the outbound queue.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("sentence rejected by transform: {0}")]
    Rejected(#[from] TransformError),

    #[error("outbound queue still full after {0:?}")]
    QueueFull(Duration),

    #[error("outbound queue is closed")]
    Closed,
}

/// Failures of a [`SentenceTransform`](crate::outbound::SentenceTransform).
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("malformed sentence: {0}")]
    Malformed(String),

    #[error("unable to encode outbound message: {0}")]
    Encode(String),
}

/// Failures of an [`OutboundSink`](crate::outbound::OutboundSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("outbound write failed: {0}")]
    Io(#[from] io::Error),

    #[error("outbound write timed out after {0:?}")]
    TimedOut(Duration),

    #[error("outbound write was short: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// Invalid [`ControllerConfig`](crate::ControllerConfig) values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` must be greater than zero")]
    MustBePositive(&'static str),
}
