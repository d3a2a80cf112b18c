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


use async_trait::async_trait;
use nmea_injector::outbound::{OutboundFrame, OutboundSink};
use nmea_injector::SinkError;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

/// Sink that keeps every frame it is given, in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<OutboundFrame>>,
    arrived: Notify,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn frames(&self) -> Vec<OutboundFrame> {
        self.frames.lock().await.clone()
    }

    /// Payloads as text, for sinks fed by the raw sentence transform.
    pub async fn texts(&self) -> Vec<String> {
        self.frames
            .lock()
            .await
            .iter()
            .map(|frame| String::from_utf8_lossy(frame.payload()).into_owned())
            .collect()
    }

    /// Waits until at least `count` frames arrived or `timeout` elapsed, then
    /// returns what was recorded.
    pub async fn wait_for_frames(&self, count: usize, timeout: Duration) -> Vec<OutboundFrame> {
        let _ = tokio::time::timeout(timeout, async {
            loop {
                let notified = self.arrived.notified();
                if self.frames.lock().await.len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await;
        self.frames().await
    }
}

#[async_trait]
impl OutboundSink for RecordingSink {
    async fn send(&self, frame: &OutboundFrame) -> Result<(), SinkError> {
        debug!(identity = frame.identity(), len = frame.payload().len(), "recording frame");
        self.frames.lock().await.push(frame.clone());
        self.arrived.notify_waiters();
        Ok(())
    }
}

/// Sink that rejects every frame.
#[derive(Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OutboundSink for FailingSink {
    async fn send(&self, _frame: &OutboundFrame) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(SinkError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "autopilot link is down",
        )))
    }
}

/// Sink whose writes never complete, to back up the outbound queue.
#[derive(Default)]
pub struct StalledSink {
    attempts: AtomicUsize,
}

impl StalledSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OutboundSink for StalledSink {
    async fn send(&self, _frame: &OutboundFrame) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        std::future::pending::<()>().await;
        Ok(())
    }
}
