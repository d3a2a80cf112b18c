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


use super::listener::ListenerContext;
use crate::error::ListenerError;
use tokio::net::UdpSocket;
use tokio::sync::watch;

/// Largest possible UDP payload.
const MAX_DATAGRAM_LEN: usize = 65_535;

/// Receives datagrams until stopped. Each datagram is framed on its own.
pub(crate) async fn receive_loop(
    context: &ListenerContext,
    socket: UdpSocket,
    mut stop: watch::Receiver<bool>,
) -> Result<(), ListenerError> {
    let mut framer = context.framer();
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];

    loop {
        let (len, peer) = tokio::select! {
            biased;
            _ = stop.changed() => return Ok(()),
            received = socket.recv_from(&mut buf) => {
                received.map_err(|source| ListenerError::Receive {
                    key: context.key(),
                    source,
                })?
            }
        };

        if context
            .forward(&mut framer, &buf[..len], peer, &stop)
            .await?
            .is_break()
        {
            return Ok(());
        }
    }
}
