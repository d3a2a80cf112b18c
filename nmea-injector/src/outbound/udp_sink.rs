/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
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

use super::{OutboundFrame, OutboundSink};
use crate::error::SinkError;
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Sends every frame as one datagram to a fixed autopilot endpoint.
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Binds an ephemeral local port and connects it to `target`.
    pub async fn connect(target: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl OutboundSink for UdpSink {
    async fn send(&self, frame: &OutboundFrame) -> Result<(), SinkError> {
        let expected = frame.payload().len();
        let written = self.socket.send(frame.payload()).await?;
        if written != expected {
            return Err(SinkError::ShortWrite { written, expected });
        }
        Ok(())
    }
}
