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


use crate::socket_descriptor::SocketDescriptor;

/// Lifecycle notifications published by a [`TrafficController`](crate::TrafficController).
///
/// Delivered over a `tokio::sync::broadcast` channel; a subscriber that falls
/// behind loses the oldest events and never slows the controller down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A socket was bound and its listener started.
    Registered(SocketDescriptor),
    /// A socket was deregistered on request and its listener has terminated.
    Deregistered(SocketDescriptor),
    /// A listener stopped on its own; the socket has been removed from the registry.
    ListenerFailed {
        descriptor: SocketDescriptor,
        error: String,
    },
    /// The outbound sink rejected a frame. The frame is dropped.
    WriteFailed { identity: u8, error: String },
}
