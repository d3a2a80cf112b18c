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


use crate::data_plane::injector::Injector;
use crate::data_plane::listener::ListenerHandle;
use crate::socket_descriptor::{SocketDescriptor, SocketKey};
use std::collections::HashMap;

/// Registry entry: the descriptor and the listener it owns.
pub(crate) struct ActiveSocket {
    pub(crate) descriptor: SocketDescriptor,
    pub(crate) generation: u64,
    pub(crate) listener: ListenerHandle,
}

/// The active registry, keyed by `(kind, port)`.
///
/// Always accessed under the controller's registry lock. The injector lives here
/// too, so dropping it at shutdown and refusing new sockets happen atomically.
pub(crate) struct SocketTable {
    sockets: HashMap<SocketKey, ActiveSocket>,
    next_generation: u64,
    injector: Option<Injector>,
}

impl SocketTable {
    pub(crate) fn new(injector: Injector) -> Self {
        Self {
            sockets: HashMap::new(),
            next_generation: 0,
            injector: Some(injector),
        }
    }

    pub(crate) fn contains(&self, key: &SocketKey) -> bool {
        self.sockets.contains_key(key)
    }

    /// `None` once the table has been closed.
    pub(crate) fn injector(&self) -> Option<&Injector> {
        self.injector.as_ref()
    }

    /// Hands out a fresh generation for the next listener. Generations are never
    /// reused, so a late failure report can be matched to its own entry.
    pub(crate) fn allocate_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Inserts an entry. Returns `false` if the key is taken.
    pub(crate) fn insert(&mut self, socket: ActiveSocket) -> bool {
        let key = socket.descriptor.key();
        if self.sockets.contains_key(&key) {
            return false;
        }
        self.sockets.insert(key, socket);
        true
    }

    pub(crate) fn remove(&mut self, key: &SocketKey) -> Option<ActiveSocket> {
        self.sockets.remove(key)
    }

    /// Removes the entry for `key` only if it still belongs to `generation`.
    pub(crate) fn remove_generation(
        &mut self,
        key: &SocketKey,
        generation: u64,
    ) -> Option<ActiveSocket> {
        match self.sockets.get(key) {
            Some(socket) if socket.generation == generation => self.sockets.remove(key),
            _ => None,
        }
    }

    /// Snapshot ordered by kind then port.
    pub(crate) fn descriptors(&self) -> Vec<SocketDescriptor> {
        let mut descriptors: Vec<SocketDescriptor> = self
            .sockets
            .values()
            .map(|socket| socket.descriptor)
            .collect();
        descriptors.sort_by_key(SocketDescriptor::key);
        descriptors
    }

    pub(crate) fn len(&self) -> usize {
        self.sockets.len()
    }

    /// Drops the injector and hands back every entry. Later registrations see a
    /// closed table.
    pub(crate) fn close(&mut self) -> Vec<ActiveSocket> {
        self.injector = None;
        self.sockets.drain().map(|(_, socket)| socket).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ActiveSocket, SocketTable};
    use crate::data_plane::injector::Injector;
    use crate::data_plane::listener::{BoundSocket, ListenerHandle, ListenerSettings};
    use crate::outbound::RawSentenceTransform;
    use crate::{ControllerConfig, SocketDescriptor, SocketKind};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn injector() -> Injector {
        let (injector, _receiver) =
            Injector::channel(Arc::new(RawSentenceTransform), 4, Duration::from_millis(10));
        injector
    }

    async fn active_socket(
        table: &mut SocketTable,
        descriptor: SocketDescriptor,
    ) -> ActiveSocket {
        let socket = BoundSocket::bind(SocketKind::Udp, "127.0.0.1:0".parse().expect("addr"))
            .await
            .expect("bind ephemeral socket");
        let generation = table.allocate_generation();
        let (failures, _) = mpsc::unbounded_channel();
        ActiveSocket {
            descriptor,
            generation,
            listener: ListenerHandle::spawn(
                socket,
                descriptor,
                generation,
                injector(),
                ListenerSettings::from(&ControllerConfig::default()),
                failures,
            ),
        }
    }

    #[tokio::test]
    async fn insert_rejects_a_taken_key() {
        let mut table = SocketTable::new(injector());
        let first =
            active_socket(&mut table, SocketDescriptor::new(SocketKind::Udp, 27000, 220)).await;
        let second =
            active_socket(&mut table, SocketDescriptor::new(SocketKind::Udp, 27000, 221)).await;

        assert!(table.insert(first));
        assert!(!table.insert(second));
        assert_eq!(
            table.descriptors(),
            vec![SocketDescriptor::new(SocketKind::Udp, 27000, 220)]
        );
    }

    #[tokio::test]
    async fn stale_generation_does_not_remove_newer_entry() {
        let mut table = SocketTable::new(injector());
        let descriptor = SocketDescriptor::new(SocketKind::Tcp, 10110, 221);
        let old = active_socket(&mut table, descriptor).await;
        let old_generation = old.generation;
        assert!(table.insert(old));
        let removed = table.remove(&descriptor.key()).expect("entry present");
        removed.listener.stop().await.expect("listener joins");

        let new = active_socket(&mut table, descriptor).await;
        assert!(table.insert(new));

        assert!(table
            .remove_generation(&descriptor.key(), old_generation)
            .is_none());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn close_drops_injector_and_drains_entries() {
        let mut table = SocketTable::new(injector());
        let socket =
            active_socket(&mut table, SocketDescriptor::new(SocketKind::Udp, 5000, 220)).await;
        assert!(table.insert(socket));

        let drained = table.close();

        assert_eq!(drained.len(), 1);
        assert!(table.injector().is_none());
        assert_eq!(table.len(), 0);
        for socket in drained {
            socket.listener.stop().await.expect("listener joins");
        }
    }
}
