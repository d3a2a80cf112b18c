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

//! Sentence boundary extraction.
//!
//! One capability, two variants: [`SentenceFramer::Datagram`] trusts datagram
//! boundaries and only splits inside a datagram, [`SentenceFramer::Stream`]
//! buffers a byte stream and emits a sentence each time a terminator is seen,
//! keeping the unterminated tail for the next read.
//!
//! ```
//! use nmea_injector::framing::{SentenceFramer, Terminator};
//! use nmea_injector::SocketKind;
//!
//! let mut framer = SentenceFramer::for_kind(SocketKind::Tcp, Terminator::LineFeed, 128);
//!
//! assert!(framer.push(b"$GPGGA,1").is_empty());
//! let sentences = framer.push(b"23519*47\r\n$GPRMC,");
//! assert_eq!(sentences.len(), 1);
//! assert_eq!(sentences[0].as_str(), "$GPGGA,123519*47");
//! ```

use crate::socket_descriptor::SocketKind;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Sentence terminator convention of the inbound protocol.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// `\n`, with a preceding `\r` tolerated. Accepts both NMEA `\r\n` and bare newlines.
    #[default]
    LineFeed,
    /// Strict `\r\n`.
    CrLf,
    /// Any single byte.
    Custom(u8),
}

impl Terminator {
    /// Finds the first terminator in `haystack`, returning `(offset, terminator_len)`.
    fn find(&self, haystack: &[u8]) -> Option<(usize, usize)> {
        match self {
            Terminator::LineFeed => haystack.iter().position(|b| *b == b'\n').map(|pos| (pos, 1)),
            Terminator::CrLf => haystack
                .windows(2)
                .position(|pair| pair == b"\r\n")
                .map(|pos| (pos, 2)),
            Terminator::Custom(byte) => {
                haystack.iter().position(|b| b == byte).map(|pos| (pos, 1))
            }
        }
    }
}

/// One discrete unit of the inbound textual protocol, terminator stripped.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Sentence(String);

impl Sentence {
    /// Builds a sentence from a raw frame. Surrounding whitespace is trimmed; blank
    /// frames yield `None`.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(frame);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Sentence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Datagram framing: every datagram is a self-contained batch of sentences.
#[derive(Clone, Debug)]
pub struct DatagramFramer {
    terminator: Terminator,
    max_sentence_len: usize,
    discarded_bytes: usize,
}

impl DatagramFramer {
    pub fn new(terminator: Terminator, max_sentence_len: usize) -> Self {
        Self {
            terminator,
            max_sentence_len,
            discarded_bytes: 0,
        }
    }

    fn push(&mut self, datagram: &[u8], out: &mut Vec<Sentence>) {
        let mut rest = datagram;
        loop {
            let (frame, next) = match self.terminator.find(rest) {
                Some((pos, len)) => (&rest[..pos], Some(&rest[pos + len..])),
                None => (rest, None),
            };

            if frame.len() > self.max_sentence_len {
                self.discarded_bytes += frame.len();
            } else if let Some(sentence) = Sentence::from_frame(frame) {
                out.push(sentence);
            }

            match next {
                Some(next) => rest = next,
                None => break,
            }
        }
    }
}

/// Byte-stream framing with a bounded reassembly buffer.
#[derive(Clone, Debug)]
pub struct StreamFramer {
    terminator: Terminator,
    max_sentence_len: usize,
    buffer: Vec<u8>,
    // Set after an overflow: bytes are dropped up to the next terminator.
    discarding: bool,
    discarded_bytes: usize,
}

impl StreamFramer {
    pub fn new(terminator: Terminator, max_sentence_len: usize) -> Self {
        Self {
            terminator,
            max_sentence_len,
            buffer: Vec::new(),
            discarding: false,
            discarded_bytes: 0,
        }
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn push(&mut self, bytes: &[u8], out: &mut Vec<Sentence>) {
        self.buffer.extend_from_slice(bytes);

        let mut consumed = 0;
        while let Some((pos, len)) = self.terminator.find(&self.buffer[consumed..]) {
            let frame = &self.buffer[consumed..consumed + pos];
            if self.discarding {
                self.discarding = false;
                self.discarded_bytes += frame.len();
            } else if frame.len() > self.max_sentence_len {
                self.discarded_bytes += frame.len();
            } else if let Some(sentence) = Sentence::from_frame(frame) {
                out.push(sentence);
            }
            consumed += pos + len;
        }
        self.buffer.drain(..consumed);

        // A `\r` may be the first half of a `\r\n` split across reads, so the
        // bound leaves room for it.
        if self.buffer.len() > self.max_sentence_len + 1 {
            self.discarded_bytes += self.buffer.len();
            self.buffer.clear();
            self.discarding = true;
        }
    }
}

/// Produces discrete sentences from a transport, one variant per socket kind.
#[derive(Clone, Debug)]
pub enum SentenceFramer {
    Datagram(DatagramFramer),
    Stream(StreamFramer),
}

impl SentenceFramer {
    pub fn for_kind(kind: SocketKind, terminator: Terminator, max_sentence_len: usize) -> Self {
        match kind {
            SocketKind::Udp => {
                SentenceFramer::Datagram(DatagramFramer::new(terminator, max_sentence_len))
            }
            SocketKind::Tcp => {
                SentenceFramer::Stream(StreamFramer::new(terminator, max_sentence_len))
            }
        }
    }

    /// Feeds one read (a datagram or a stream chunk) and returns the completed sentences
    /// in receipt order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        match self {
            SentenceFramer::Datagram(framer) => framer.push(bytes, &mut sentences),
            SentenceFramer::Stream(framer) => framer.push(bytes, &mut sentences),
        }
        sentences
    }

    /// Bytes dropped so far because a sentence exceeded the length bound.
    pub fn discarded_bytes(&self) -> usize {
        match self {
            SentenceFramer::Datagram(framer) => framer.discarded_bytes,
            SentenceFramer::Stream(framer) => framer.discarded_bytes,
        }
    }
}
