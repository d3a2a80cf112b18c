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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Transport kind of an input socket.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketKind {
    Udp,
    Tcp,
}

impl Display for SocketKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketKind::Udp => write!(f, "UDP"),
            SocketKind::Tcp => write!(f, "TCP"),
        }
    }
}

///
/// [`SocketDescriptor`] identifies one input endpoint: the transport kind, the
/// listening port and the identity (MAVLink component id) used to tag every
/// sentence injected from it.
///
/// Two descriptors that share `(kind, port)` occupy the same registration slot,
/// whatever their identity. See [`SocketKey`].
///
/// # Examples
///
/// ```
/// use nmea_injector::{SocketDescriptor, SocketKind};
///
/// let gps = SocketDescriptor::new(SocketKind::Udp, 27000, 220);
/// let same_slot = SocketDescriptor::new(SocketKind::Udp, 27000, 221);
///
/// assert_ne!(gps, same_slot);
/// assert_eq!(gps.key(), same_slot.key());
///
/// let record: SocketDescriptor =
///     serde_json::from_str(r#"{"kind": "tcp", "port": 10110, "component_id": 221}"#).unwrap();
/// assert_eq!(record.kind(), SocketKind::Tcp);
/// assert_eq!(record.identity(), 221);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SocketDescriptor {
    pub(crate) kind: SocketKind,
    pub(crate) port: u16,
    #[serde(alias = "component_id")]
    pub(crate) identity: u8,
}

impl SocketDescriptor {
    pub fn new(kind: SocketKind, port: u16, identity: u8) -> Self {
        Self {
            kind,
            port,
            identity,
        }
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn identity(&self) -> u8 {
        self.identity
    }

    /// Registration slot of this descriptor.
    pub fn key(&self) -> SocketKey {
        SocketKey {
            kind: self.kind,
            port: self.port,
        }
    }
}

impl Display for SocketDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} (identity {})", self.kind, self.port, self.identity)
    }
}

/// Deduplication key of the active registry: `(kind, port)`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct SocketKey {
    pub kind: SocketKind,
    pub port: u16,
}

impl SocketKey {
    pub fn new(kind: SocketKind, port: u16) -> Self {
        Self { kind, port }
    }
}

impl Display for SocketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.port)
    }
}

impl From<SocketDescriptor> for SocketKey {
    fn from(descriptor: SocketDescriptor) -> Self {
        descriptor.key()
    }
}

impl From<&SocketDescriptor> for SocketKey {
    fn from(descriptor: &SocketDescriptor) -> Self {
        descriptor.key()
    }
}

#[cfg(test)]
mod tests {
    use super::{SocketDescriptor, SocketKey, SocketKind};
    use std::collections::HashSet;

    #[test]
    fn key_ignores_identity_but_keeps_kind() {
        let udp_220 = SocketDescriptor::new(SocketKind::Udp, 5000, 220);
        let udp_221 = SocketDescriptor::new(SocketKind::Udp, 5000, 221);
        let tcp_220 = SocketDescriptor::new(SocketKind::Tcp, 5000, 220);

        assert_eq!(udp_220.key(), udp_221.key());
        assert_ne!(udp_220.key(), tcp_220.key());

        let keys: HashSet<SocketKey> = [udp_220, udp_221, tcp_220]
            .iter()
            .map(SocketKey::from)
            .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn descriptor_record_round_trips_through_json() {
        let descriptor = SocketDescriptor::new(SocketKind::Udp, 27000, 220);
        let json = serde_json::to_value(descriptor).expect("descriptor should serialize");

        assert_eq!(
            json,
            serde_json::json!({ "kind": "udp", "port": 27000, "identity": 220 })
        );
    }

    #[test]
    fn descriptor_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<SocketDescriptor>(
            r#"{"kind": "udp", "port": 27000, "identity": 220, "extra": true}"#,
        );

        assert!(parsed.is_err());
    }

    #[test]
    fn display_is_operator_friendly() {
        let descriptor = SocketDescriptor::new(SocketKind::Tcp, 10110, 221);

        assert_eq!(descriptor.to_string(), "TCP:10110 (identity 221)");
        assert_eq!(descriptor.key().to_string(), "TCP:10110");
    }
}
