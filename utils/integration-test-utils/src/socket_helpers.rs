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


use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Upper bound used by tests waiting on asynchronous delivery.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A UDP port that was free a moment ago.
pub fn free_udp_port() -> u16 {
    std::net::UdpSocket::bind((LOOPBACK, 0))
        .and_then(|socket| socket.local_addr())
        .map(|addr| addr.port())
        .expect("unable to find a free UDP port")
}

/// A TCP port that was free a moment ago.
pub fn free_tcp_port() -> u16 {
    std::net::TcpListener::bind((LOOPBACK, 0))
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("unable to find a free TCP port")
}

/// Sends one datagram to `port` on loopback.
pub async fn send_udp(port: u16, payload: &[u8]) {
    let socket = UdpSocket::bind((LOOPBACK, 0))
        .await
        .expect("unable to bind UDP sender");
    socket
        .send_to(payload, SocketAddr::new(LOOPBACK, port))
        .await
        .expect("unable to send datagram");
}

/// Connects to `port` on loopback.
pub async fn connect_tcp(port: u16) -> TcpStream {
    TcpStream::connect((LOOPBACK, port))
        .await
        .expect("unable to connect TCP peer")
}
