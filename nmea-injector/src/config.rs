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

use crate::error::ConfigError;
use crate::framing::Terminator;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

const DEFAULT_QUEUE_SIZE: usize = 256;
const DEFAULT_INJECT_TIMEOUT_MS: u64 = 100;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_BIND_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_MAX_TCP_PEERS: usize = 1;
const DEFAULT_MAX_SENTENCE_LEN: usize = 1_024;
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Tunables of a [`TrafficController`](crate::TrafficController).
///
/// Every field has a default, so an empty json5 object `{}` is a valid config.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Capacity of the outbound queue shared by all listeners.
    pub queue_size: usize,
    /// How long a listener waits for room in a full outbound queue.
    pub inject_timeout_ms: u64,
    /// Upper bound of a single outbound sink write.
    pub write_timeout_ms: u64,
    /// Upper bound of a socket bind attempt.
    pub bind_timeout_ms: u64,
    /// Concurrently connected peers per TCP socket; 1 means one connection at a time.
    pub max_tcp_peers: usize,
    /// Longest sentence accepted, terminator excluded.
    pub max_sentence_len: usize,
    pub terminator: Terminator,
    pub bind_address: IpAddr,
    /// Capacity of the lifecycle event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            inject_timeout_ms: DEFAULT_INJECT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            bind_timeout_ms: DEFAULT_BIND_TIMEOUT_MS,
            max_tcp_peers: DEFAULT_MAX_TCP_PEERS,
            max_sentence_len: DEFAULT_MAX_SENTENCE_LEN,
            terminator: Terminator::default(),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("queue_size", self.queue_size),
            ("max_tcp_peers", self.max_tcp_peers),
            ("max_sentence_len", self.max_sentence_len),
            ("event_capacity", self.event_capacity),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::MustBePositive(name));
            }
        }
        Ok(())
    }

    pub fn inject_timeout(&self) -> Duration {
        Duration::from_millis(self.inject_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn bind_timeout(&self) -> Duration {
        Duration::from_millis(self.bind_timeout_ms)
    }
}
