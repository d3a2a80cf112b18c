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

//! Canonical structured field keys and value-format helpers.

use crate::framing::Sentence;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const LISTENER_ID: &str = "listener_id";
pub const KIND: &str = "kind";
pub const PORT: &str = "port";
pub const IDENTITY: &str = "identity";
pub const PEER: &str = "peer";
pub const TALKER: &str = "talker";
pub const SENTENCE: &str = "sentence";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_STOP_SIGNAL: &str = "stop_signal";
pub const REASON_PEER_LIMIT: &str = "peer_limit";
pub const REASON_PEER_EOF: &str = "peer_eof";
pub const REASON_GENERATION_MISMATCH: &str = "generation_mismatch";

const MAX_LOGGED_SENTENCE_LEN: usize = 96;

/// Returns the `$GPGGA`-style address field of an NMEA sentence, or [`NONE`].
pub fn format_talker(sentence: &Sentence) -> &str {
    let text = sentence.as_str();
    let Some(body) = text.strip_prefix('$').or_else(|| text.strip_prefix('!')) else {
        return NONE;
    };
    let address = body.split(',').next().unwrap_or_default();
    if address.is_empty() || !address.bytes().all(|b| b.is_ascii_alphanumeric()) {
        NONE
    } else {
        address
    }
}

/// Bounded rendering of a sentence for log lines.
pub fn format_sentence(sentence: &Sentence) -> String {
    let text = sentence.as_str();
    match text.char_indices().nth(MAX_LOGGED_SENTENCE_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
