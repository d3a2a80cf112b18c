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


//! Injector: wraps sentences for the outbound protocol and queues them for the
//! single outbound writer.

use crate::error::InjectError;
use crate::framing::Sentence;
use crate::observability::{events, fields};
use crate::outbound::{OutboundFrame, SentenceTransform};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tracing::debug;

const COMPONENT: &str = "injector";

/// Cloneable handle shared by every listener.
///
/// The transform runs on the caller's task. Frames then go through one bounded
/// FIFO drained by a single writer, so frames from one listener keep their
/// receipt order and no two frames are ever interleaved on the outbound stream.
#[derive(Clone)]
pub(crate) struct Injector {
    transform: Arc<dyn SentenceTransform>,
    queue: mpsc::Sender<OutboundFrame>,
    inject_timeout: Duration,
}

impl Injector {
    /// Creates the injector and the receiving half for the outbound writer.
    pub(crate) fn channel(
        transform: Arc<dyn SentenceTransform>,
        queue_size: usize,
        inject_timeout: Duration,
    ) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (queue, receiver) = mpsc::channel(queue_size);
        (
            Self {
                transform,
                queue,
                inject_timeout,
            },
            receiver,
        )
    }

    /// Wraps `sentence` tagged with `identity` and queues it.
    ///
    /// Waits at most `inject_timeout` for room in the queue. A declined sentence
    /// is not an error.
    pub(crate) async fn inject(
        &self,
        identity: u8,
        sentence: &Sentence,
    ) -> Result<(), InjectError> {
        let Some(frame) = self.transform.wrap(identity, sentence)? else {
            debug!(
                event = events::INJECT_DECLINED,
                component = COMPONENT,
                identity,
                talker = fields::format_talker(sentence),
                "sentence declined by transform"
            );
            return Ok(());
        };

        match self.queue.send_timeout(frame, self.inject_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(InjectError::QueueFull(self.inject_timeout)),
            Err(SendTimeoutError::Closed(_)) => Err(InjectError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Injector;
    use crate::error::InjectError;
    use crate::framing::Sentence;
    use crate::outbound::RawSentenceTransform;
    use std::sync::Arc;
    use std::time::Duration;

    fn sentence(text: &str) -> Sentence {
        Sentence::from_frame(text.as_bytes()).expect("non-blank sentence")
    }

    #[tokio::test]
    async fn frames_are_queued_in_injection_order() {
        let (injector, mut receiver) =
            Injector::channel(Arc::new(RawSentenceTransform), 8, Duration::from_millis(50));

        injector
            .inject(220, &sentence("$GPGGA,1*00"))
            .await
            .expect("first inject");
        injector
            .inject(221, &sentence("$GPRMC,2*00"))
            .await
            .expect("second inject");

        let first = receiver.recv().await.expect("first frame");
        let second = receiver.recv().await.expect("second frame");
        assert_eq!(first.identity(), 220);
        assert_eq!(first.payload(), b"$GPGGA,1*00\r\n");
        assert_eq!(second.identity(), 221);
        assert_eq!(second.payload(), b"$GPRMC,2*00\r\n");
    }

    #[tokio::test]
    async fn full_queue_times_out_instead_of_blocking() {
        let (injector, _receiver) =
            Injector::channel(Arc::new(RawSentenceTransform), 1, Duration::from_millis(20));
        injector
            .inject(220, &sentence("$A*00"))
            .await
            .expect("first inject fits");

        let result = injector.inject(220, &sentence("$B*00")).await;

        assert!(matches!(result, Err(InjectError::QueueFull(_))));
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (injector, receiver) =
            Injector::channel(Arc::new(RawSentenceTransform), 4, Duration::from_millis(20));
        drop(receiver);

        let result = injector.inject(220, &sentence("$A*00")).await;

        assert!(matches!(result, Err(InjectError::Closed)));
    }

    #[tokio::test]
    async fn declined_sentence_is_not_queued() {
        let (injector, mut receiver) = Injector::channel(
            Arc::new(crate::outbound::MavlinkGpsInputTransform::new(1)),
            4,
            Duration::from_millis(20),
        );

        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        injector
            .inject(220, &sentence(rmc))
            .await
            .expect("declined sentence is not an error");

        assert!(receiver.try_recv().is_err());
    }
}
