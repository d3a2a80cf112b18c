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

use nmea_injector::{ControllerConfig, SocketDescriptor, SocketKind};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Component id used for sockets given with `--udp`.
pub(crate) const UDP_GPS_COMPONENT_ID: u8 = 220;
/// Component id used for sockets given with `--tcp`.
pub(crate) const TCP_GPS_COMPONENT_ID: u8 = 221;

const DEFAULT_AUTOPILOT_PORT: u16 = 14550;

#[derive(Debug, Error)]
pub enum ServiceConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub(crate) controller: ControllerConfig,
    pub(crate) outbound: OutboundConfig,
    pub(crate) sockets: Vec<SocketDescriptor>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutboundConfig {
    pub(crate) mode: OutboundMode,
    /// Autopilot endpoint receiving the outbound datagrams.
    pub(crate) address: SocketAddr,
    /// MAVLink system id stamped on generated frames.
    pub(crate) system_id: u8,
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            mode: OutboundMode::default(),
            address: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_AUTOPILOT_PORT)),
            system_id: 1,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutboundMode {
    #[default]
    MavlinkGpsInput,
    RawSentence,
}

impl ServiceConfig {
    /// Reads the json5 file at `path`, or falls back to built-in defaults when
    /// no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ServiceConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        json5::from_str(&contents).map_err(|source| ServiceConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Appends the ports given on the command line to the startup sockets.
    pub fn with_cli_ports(mut self, udp_ports: &[u16], tcp_ports: &[u16]) -> Self {
        let udp = udp_ports
            .iter()
            .map(|port| SocketDescriptor::new(SocketKind::Udp, *port, UDP_GPS_COMPONENT_ID));
        let tcp = tcp_ports
            .iter()
            .map(|port| SocketDescriptor::new(SocketKind::Tcp, *port, TCP_GPS_COMPONENT_ID));
        self.sockets.extend(udp.chain(tcp));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{OutboundMode, ServiceConfig, ServiceConfigError};
    use nmea_injector::{SocketDescriptor, SocketKind};
    use std::path::Path;

    #[test]
    fn missing_path_yields_defaults() {
        let config = ServiceConfig::load(None).expect("defaults");

        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.outbound.mode, OutboundMode::MavlinkGpsInput);
        assert_eq!(config.outbound.address.to_string(), "127.0.0.1:14550");
        assert!(config.sockets.is_empty());
    }

    #[test]
    fn bundled_default_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.json5");
        let config = ServiceConfig::load(Some(&path)).expect("bundled config should parse");

        assert_eq!(
            config.sockets,
            vec![
                SocketDescriptor::new(SocketKind::Udp, 27000, 220),
                SocketDescriptor::new(SocketKind::Tcp, 10110, 221),
            ]
        );
        assert_eq!(config.controller.max_tcp_peers, 1);
    }

    #[test]
    fn raw_sentence_mode_and_partial_sections() {
        let config: ServiceConfig =
            json5::from_str(r#"{ outbound: { mode: "raw_sentence", address: "10.0.0.2:5760" } }"#)
                .expect("partial config should parse");

        assert_eq!(config.outbound.mode, OutboundMode::RawSentence);
        assert_eq!(config.outbound.system_id, 1);
        assert_eq!(config.controller.queue_size, 256);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(json5::from_str::<ServiceConfig>("{ transports: {} }").is_err());
    }

    #[test]
    fn cli_ports_use_gps_component_ids() {
        let config = ServiceConfig::default().with_cli_ports(&[27000], &[10110]);

        assert_eq!(
            config.sockets,
            vec![
                SocketDescriptor::new(SocketKind::Udp, 27000, 220),
                SocketDescriptor::new(SocketKind::Tcp, 10110, 221),
            ]
        );
    }

    #[test]
    fn unreadable_file_reports_path() {
        let error = ServiceConfig::load(Some(Path::new("/nonexistent/injector.json5")))
            .expect_err("missing file");

        assert!(matches!(error, ServiceConfigError::Read { .. }));
        assert!(error.to_string().contains("injector.json5"));
    }
}
