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


//! Control-plane layer.
//!
//! Owns the active registry and the register / deregister / failure-cleanup
//! transitions. Every transition runs under the single registry lock, so at most
//! one listener exists per `(kind, port)` whatever the interleaving of callers.
//!
//! ```
//! use std::sync::Arc;
//! use nmea_injector::outbound::RawSentenceTransform;
//! use nmea_injector::{
//!     ControllerConfig, DeregisterError, RegisterError, SocketDescriptor, SocketKind,
//!     TrafficController,
//! };
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
//!     "control-plane-doc",
//!     ControllerConfig::default(),
//!     Arc::new(RawSentenceTransform),
//!     Arc::new(NullSink),
//! )
//! .unwrap();
//! let gps = SocketDescriptor::new(SocketKind::Udp, 27124, 220);
//!
//! // Duplicate registrations and unknown deregistrations are distinct errors.
//! controller.register(gps).await.unwrap();
//! let duplicate = SocketDescriptor::new(SocketKind::Udp, 27124, 221);
//! assert!(matches!(
//!     controller.register(duplicate).await,
//!     Err(RegisterError::AlreadyRegistered(_))
//! ));
//! controller.deregister(gps).await.unwrap();
//! assert!(matches!(
//!     controller.deregister(gps).await,
//!     Err(DeregisterError::NotFound(_))
//! ));
//! controller.shutdown().await;
//! # });
//! ```

pub(crate) mod failure_supervisor;
pub(crate) mod socket_lifecycle;
pub(crate) mod socket_table;
