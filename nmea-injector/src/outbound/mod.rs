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

//! Outbound collaborators.
//!
//! The controller does not know the outbound protocol. A [`SentenceTransform`]
//! wraps each sentence for it and an [`OutboundSink`] carries the resulting
//! [`OutboundFrame`] to the autopilot.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use nmea_injector::outbound::{
//!     OutboundFrame, OutboundSink, RawSentenceTransform, SentenceTransform,
//! };
//! use nmea_injector::framing::Sentence;
//! use nmea_injector::SinkError;
//!
//! struct StdoutSink;
//!
//! #[async_trait]
//! impl OutboundSink for StdoutSink {
//!     async fn send(&self, frame: &OutboundFrame) -> Result<(), SinkError> {
//!         println!("{} -> {:?}", frame.identity(), frame.payload());
//!         Ok(())
//!     }
//! }
//!
//! let transform = RawSentenceTransform;
//! let sentence = Sentence::from_frame(b"$GPGGA,123519*47").unwrap();
//! let frame = transform.wrap(220, &sentence).unwrap().unwrap();
//! assert_eq!(frame.payload(), b"$GPGGA,123519*47\r\n");
//! let _sink: Arc<dyn OutboundSink> = Arc::new(StdoutSink);
//! ```

mod mavlink_gps_input;
mod raw_sentence;
mod udp_sink;

pub use mavlink_gps_input::MavlinkGpsInputTransform;
pub use raw_sentence::RawSentenceTransform;
pub use udp_sink::UdpSink;

use crate::error::{SinkError, TransformError};
use crate::framing::Sentence;
use async_trait::async_trait;

/// One message ready for the outbound stream, tagged with its sender identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutboundFrame {
    identity: u8,
    payload: Vec<u8>,
}

impl OutboundFrame {
    pub fn new(identity: u8, payload: Vec<u8>) -> Self {
        Self { identity, payload }
    }

    pub fn identity(&self) -> u8 {
        self.identity
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Wraps an inbound sentence for the outbound protocol.
///
/// `Ok(None)` declines the sentence: it is valid input but the outbound protocol
/// has nothing to carry it in.
pub trait SentenceTransform: Send + Sync {
    fn wrap(
        &self,
        identity: u8,
        sentence: &Sentence,
    ) -> Result<Option<OutboundFrame>, TransformError>;
}

/// The single downstream telemetry channel.
///
/// Calls are serialized by the injector's writer task, so implementations never
/// see two frames in flight at once.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn send(&self, frame: &OutboundFrame) -> Result<(), SinkError>;
}
