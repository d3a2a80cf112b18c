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


//! Single writer task draining the injector queue into the outbound sink.

use crate::controller_event::ControllerEvent;
use crate::error::SinkError;
use crate::observability::events;
use crate::outbound::{OutboundFrame, OutboundSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const COMPONENT: &str = "outbound_writer";

/// Spawns the writer task. It exits once every [`Injector`](super::injector::Injector)
/// clone is dropped and the queue is drained.
pub(crate) fn spawn_outbound_writer(
    receiver: mpsc::Receiver<OutboundFrame>,
    sink: Arc<dyn OutboundSink>,
    write_timeout: Duration,
    notifier: broadcast::Sender<ControllerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(outbound_write_loop(receiver, sink, write_timeout, notifier))
}

/// Sends each queued frame, one at a time, with a bounded write. Failures are
/// reported and the frame is dropped.
pub(crate) async fn outbound_write_loop(
    mut receiver: mpsc::Receiver<OutboundFrame>,
    sink: Arc<dyn OutboundSink>,
    write_timeout: Duration,
    notifier: broadcast::Sender<ControllerEvent>,
) {
    while let Some(frame) = receiver.recv().await {
        debug!(
            event = events::OUTBOUND_SEND_ATTEMPT,
            component = COMPONENT,
            identity = frame.identity(),
            len = frame.payload().len(),
            "attempting outbound send"
        );

        let result = match tokio::time::timeout(write_timeout, sink.send(&frame)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::TimedOut(write_timeout)),
        };

        match result {
            Ok(()) => {
                debug!(
                    event = events::OUTBOUND_SEND_OK,
                    component = COMPONENT,
                    identity = frame.identity(),
                    "outbound send succeeded"
                );
            }
            Err(err) => {
                warn!(
                    event = events::OUTBOUND_SEND_FAILED,
                    component = COMPONENT,
                    identity = frame.identity(),
                    err = %err,
                    "outbound send failed"
                );
                // No subscribers is fine.
                let _ = notifier.send(ControllerEvent::WriteFailed {
                    identity: frame.identity(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        event = events::OUTBOUND_QUEUE_CLOSED,
        component = COMPONENT,
        "outbound queue closed; stopping writer"
    );
}

#[cfg(test)]
mod tests {
    use super::outbound_write_loop;
    use crate::controller_event::ControllerEvent;
    use crate::error::SinkError;
    use crate::outbound::{OutboundFrame, OutboundSink};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::{broadcast, mpsc};

    #[derive(Default)]
    struct CollectingSink {
        frames: Mutex<Vec<OutboundFrame>>,
    }

    #[async_trait]
    impl OutboundSink for CollectingSink {
        async fn send(&self, frame: &OutboundFrame) -> Result<(), SinkError> {
            self.frames
                .lock()
                .expect("sink lock poisoned")
                .push(frame.clone());
            Ok(())
        }
    }

    struct StalledSink;

    #[async_trait]
    impl OutboundSink for StalledSink {
        async fn send(&self, _frame: &OutboundFrame) -> Result<(), SinkError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_loop_flushes_queued_frames_after_close() {
        let sink = Arc::new(CollectingSink::default());
        let (events, _) = broadcast::channel(4);
        let (sender, receiver) = mpsc::channel(4);
        sender
            .send(OutboundFrame::new(220, b"a".to_vec()))
            .await
            .expect("queue first");
        sender
            .send(OutboundFrame::new(221, b"b".to_vec()))
            .await
            .expect("queue second");
        drop(sender);

        outbound_write_loop(receiver, sink.clone(), Duration::from_secs(1), events).await;

        let frames = sink.frames.lock().expect("sink lock poisoned");
        let identities: Vec<u8> = frames.iter().map(OutboundFrame::identity).collect();
        assert_eq!(identities, vec![220, 221]);
    }

    #[tokio::test]
    async fn stalled_write_times_out_and_is_reported() {
        let (events, mut subscriber) = broadcast::channel(4);
        let (sender, receiver) = mpsc::channel(4);
        sender
            .send(OutboundFrame::new(221, b"a".to_vec()))
            .await
            .expect("queue frame");
        drop(sender);

        outbound_write_loop(
            receiver,
            Arc::new(StalledSink),
            Duration::from_millis(20),
            events,
        )
        .await;

        match subscriber.try_recv() {
            Ok(ControllerEvent::WriteFailed { identity, error }) => {
                assert_eq!(identity, 221);
                assert!(error.contains("timed out"));
            }
            other => panic!("expected a write failure event, got {other:?}"),
        }
    }
}
