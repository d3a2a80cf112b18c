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


//! # nmea-injector
//!
//! `nmea-injector` bridges NMEA0183 sentences arriving on runtime-registered UDP
//! and TCP sockets into a single outbound autopilot stream, each sentence
//! tagged with the identity of the socket it came in on.
//!
//! The API is centered on [`TrafficController`] and [`SocketDescriptor`]. The
//! outbound protocol is pluggable through [`outbound::SentenceTransform`] and
//! [`outbound::OutboundSink`].
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use nmea_injector::outbound::{MavlinkGpsInputTransform, UdpSink};
//! use nmea_injector::{ControllerConfig, SocketDescriptor, SocketKind, TrafficController};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let sink = UdpSink::connect("127.0.0.1:14550".parse().unwrap()).await.unwrap();
//! let controller = TrafficController::new(
//!     "quick-start",
//!     ControllerConfig::default(),
//!     Arc::new(MavlinkGpsInputTransform::new(1)),
//!     Arc::new(sink),
//! )
//! .unwrap();
//!
//! let gps = SocketDescriptor::new(SocketKind::Udp, 27125, 220);
//! controller.register(gps).await.unwrap();
//! assert_eq!(controller.list().await, vec![gps]);
//!
//! controller.deregister(gps).await.unwrap();
//! assert!(controller.list().await.is_empty());
//! controller.shutdown().await;
//! # });
//! ```
//!
//! ## Registry contract
//!
//! - At most one socket per `(kind, port)`; a duplicate is
//!   [`RegisterError::AlreadyRegistered`] and never replaces the active entry.
//! - A socket the OS will not grant is [`RegisterError::BindFailure`]; nothing is
//!   inserted.
//! - Deregistering an unknown key is [`DeregisterError::NotFound`].
//! - `deregister` returns after the listener has terminated and its socket is
//!   closed.
//! - A listener that fails on its own is removed and reported as
//!   [`ControllerEvent::ListenerFailed`]. It is not restarted.
//!
//! ## Internal architecture map
//!
//! - API facade: [`TrafficController`] and [`SocketDescriptor`]
//! - Control plane: socket table, register / deregister lifecycle, failure supervisor
//! - Data plane: UDP and TCP listeners, injector queue, outbound writer
//! - Framing: datagram and stream sentence extraction
//! - Outbound: transforms and sinks for the autopilot stream
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events with canonical names from `observability::events`
//! and does not initialize a global subscriber. Binaries and tests are
//! responsible for one-time `tracing_subscriber` initialization.

mod config;
pub use config::ControllerConfig;

mod controller_event;
pub use controller_event::ControllerEvent;

mod control_plane;
mod data_plane;

mod error;
pub use error::{
    ConfigError, DeregisterError, InjectError, ListenerError, RegisterError, SinkError,
    TransformError,
};

pub mod framing;

#[doc(hidden)]
pub mod observability;

pub mod outbound;

mod socket_descriptor;
pub use socket_descriptor::{SocketDescriptor, SocketKey, SocketKind};

mod traffic_controller;
pub use traffic_controller::TrafficController;
