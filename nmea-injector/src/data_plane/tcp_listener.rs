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
use crate::observability::{events, fields};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const COMPONENT: &str = "tcp_listener";
const READ_CHUNK_LEN: usize = 4_096;

/// Accepts peers until stopped, servicing each on its own task with its own
/// stream framer. Peers beyond `max_tcp_peers` are closed right away.
pub(crate) async fn accept_loop(
    context: Arc<ListenerContext>,
    listener: TcpListener,
    mut stop: watch::Receiver<bool>,
) -> Result<(), ListenerError> {
    let mut peers = JoinSet::new();

    let result = loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break Ok(()),
            Some(joined) = peers.join_next(), if !peers.is_empty() => {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => break Err(error),
                    Err(join_err) => {
                        break Err(ListenerError::Aborted {
                            key: context.key(),
                            reason: join_err.to_string(),
                        })
                    }
                }
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(err) if is_peer_error(&err) => {
                        debug!(
                            event = events::TCP_PEER_READ_FAILED,
                            component = COMPONENT,
                            listener_id = context.listener_id.as_str(),
                            port = context.descriptor.port(),
                            err = %err,
                            "peer went away during accept"
                        );
                        continue;
                    }
                    Err(source) => {
                        break Err(ListenerError::Accept {
                            key: context.key(),
                            source,
                        })
                    }
                };

                if peers.len() >= context.settings.max_tcp_peers {
                    info!(
                        event = events::TCP_PEER_REFUSED,
                        component = COMPONENT,
                        listener_id = context.listener_id.as_str(),
                        port = context.descriptor.port(),
                        peer = %peer,
                        max_tcp_peers = context.settings.max_tcp_peers,
                        reason = fields::REASON_PEER_LIMIT,
                        "refusing peer"
                    );
                    drop(stream);
                    continue;
                }

                info!(
                    event = events::TCP_PEER_ACCEPTED,
                    component = COMPONENT,
                    listener_id = context.listener_id.as_str(),
                    port = context.descriptor.port(),
                    peer = %peer,
                    "peer connected"
                );
                peers.spawn(read_peer(context.clone(), stream, peer, stop.clone()));
            }
        }
    };

    peers.shutdown().await;
    result
}

/// Accept errors that concern one half-open connection, not the socket.
fn is_peer_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}

/// Reads one peer until EOF, a read error or the stop signal. A read error only
/// closes this peer.
async fn read_peer(
    context: Arc<ListenerContext>,
    mut stream: TcpStream,
    peer: SocketAddr,
    mut stop: watch::Receiver<bool>,
) -> Result<(), ListenerError> {
    let mut framer = context.framer();
    let mut buf = [0u8; READ_CHUNK_LEN];

    loop {
        let read = tokio::select! {
            biased;
            _ = stop.changed() => return Ok(()),
            read = stream.read(&mut buf) => read,
        };

        match read {
            Ok(0) => {
                info!(
                    event = events::TCP_PEER_CLOSED,
                    component = COMPONENT,
                    listener_id = context.listener_id.as_str(),
                    port = context.descriptor.port(),
                    peer = %peer,
                    reason = fields::REASON_PEER_EOF,
                    "peer disconnected"
                );
                return Ok(());
            }
            Ok(len) => {
                if context
                    .forward(&mut framer, &buf[..len], peer, &stop)
                    .await?
                    .is_break()
                {
                    return Ok(());
                }
            }
            Err(err) => {
                warn!(
                    event = events::TCP_PEER_READ_FAILED,
                    component = COMPONENT,
                    listener_id = context.listener_id.as_str(),
                    port = context.descriptor.port(),
                    peer = %peer,
                    err = %err,
                    "closing peer after read error"
                );
                return Ok(());
            }
        }
    }
}
