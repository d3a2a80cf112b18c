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

//! Pass-through transform for outbound links that accept NMEA text directly.

use crate::error::TransformError;
use crate::framing::Sentence;
use crate::outbound::{OutboundFrame, SentenceTransform};

/// Forwards the sentence unchanged, re-terminated with `\r\n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawSentenceTransform;

impl SentenceTransform for RawSentenceTransform {
    fn wrap(
        &self,
        identity: u8,
        sentence: &Sentence,
    ) -> Result<Option<OutboundFrame>, TransformError> {
        let mut payload = Vec::with_capacity(sentence.as_bytes().len() + 2);
        payload.extend_from_slice(sentence.as_bytes());
        payload.extend_from_slice(b"\r\n");
        Ok(Some(OutboundFrame::new(identity, payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::RawSentenceTransform;
    use crate::framing::Sentence;
    use crate::outbound::SentenceTransform;

    #[test]
    fn wrap_keeps_text_and_identity() {
        let sentence = Sentence::from_frame(b"$GPVTG,054.7,T,,M,005.5,N,010.2,K*48")
            .expect("non-blank sentence");

        let frame = RawSentenceTransform
            .wrap(221, &sentence)
            .expect("raw wrap never fails")
            .expect("raw wrap never declines");

        assert_eq!(frame.identity(), 221);
        assert_eq!(
            frame.payload(),
            b"$GPVTG,054.7,T,,M,005.5,N,010.2,K*48\r\n".as_slice()
        );
    }
}
