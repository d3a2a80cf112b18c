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


//! Data-plane layer.
//!
//! Owns the per-socket listeners and the injector path to the outbound stream.
//! Listeners turn socket reads into sentences; the injector wraps them and a
//! single writer task puts them on the outbound sink.
//!
//! ```
//! use std::sync::Arc;
//! use nmea_injector::outbound::RawSentenceTransform;
//! use nmea_injector::{ControllerConfig, SocketDescriptor, SocketKind, TrafficController};
//! # use async_trait::async_trait;
//! # use nmea_injector::outbound::{OutboundFrame, OutboundSink};
//! # use nmea_injector::SinkError;
//! #
//! # struct NullSink;
//! #
//! # #[async_trait]
//! # impl OutboundSink for NullSink {
//! #     async fn send(&self, _frame: &OutboundFrame) -> Result<(), SinkError> {
//! #         Ok(())
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let controller = TrafficController::new(
//!     "data-plane-doc",
//!     ControllerConfig::default(),
//!     Arc::new(RawSentenceTransform),
//!     Arc::new(NullSink),
//! )
//! .unwrap();
//!
//! // Registering spawns a listener; deregistering waits for it to terminate.
//! let gps = SocketDescriptor::new(SocketKind::Udp, 27123, 220);
//! controller.register(gps).await.unwrap();
//! controller.deregister(gps).await.unwrap();
//! controller.shutdown().await;
//! # });
//! ```

pub(crate) mod injector;
pub(crate) mod listener;
pub(crate) mod outbound_writer;
pub(crate) mod tcp_listener;
pub(crate) mod udp_listener;
