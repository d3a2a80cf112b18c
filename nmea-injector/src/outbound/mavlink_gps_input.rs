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

//! NMEA fixes wrapped as MAVLink v2 `GPS_INPUT` messages.
//!
//! GGA carries position, altitude and satellite count; RMC and VTG carry speed
//! and course. They are merged per identity, so a `GPS_INPUT` is emitted for
//! every recognised sentence once a position is known. The identity is placed
//! in the MAVLink header as the component id. Each identity also gets its own
//! `gps_id`, numbered from 0 in the order identities are first seen, so two
//! sources never feed the same autopilot GPS instance.

use super::{OutboundFrame, SentenceTransform};
use crate::error::TransformError;
use crate::framing::Sentence;
use mavlink::common::{GpsInputIgnoreFlags, MavMessage, GPS_INPUT_DATA};
use mavlink::MavHeader;
use nmea0183::{ParseResult, Parser};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

const KNOTS_TO_METERS_PER_SECOND: f32 = 0.514_444;
const MAVLINK_V2_MAX_FRAME_LEN: usize = 280;
const FIX_TYPE_2D: u8 = 2;
const FIX_TYPE_3D: u8 = 3;

/// Merged state of the sentences seen for one identity.
#[derive(Clone, Copy, Debug, Default)]
struct FixState {
    gps_id: u8,
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f32>,
    satellites: Option<u8>,
    speed: Option<f32>,
    course: Option<f32>,
}

impl FixState {
    fn update_from_gga(&mut self, gga: &nmea0183::GGA) {
        self.latitude = Some(gga.latitude.as_f64());
        self.longitude = Some(gga.longitude.as_f64());
        self.altitude = Some(gga.altitude.meters);
        self.satellites = Some(gga.sat_in_use);
    }

    fn update_from_rmc(&mut self, rmc: &nmea0183::RMC) {
        self.speed = Some(rmc.speed.as_knots() * KNOTS_TO_METERS_PER_SECOND);
        if let Some(course) = &rmc.course {
            self.course = Some(course.degrees);
        }
    }

    fn update_from_vtg(&mut self, vtg: &nmea0183::VTG) {
        self.speed = Some(vtg.speed.as_knots() * KNOTS_TO_METERS_PER_SECOND);
        if let Some(course) = &vtg.course {
            self.course = Some(course.degrees);
        }
    }

    fn to_gps_input(self, time_usec: u64) -> Option<GPS_INPUT_DATA> {
        let latitude = self.latitude?;
        let longitude = self.longitude?;

        let mut ignore_flags = GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_HDOP
            | GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VDOP
            | GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VEL_VERT
            | GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_SPEED_ACCURACY
            | GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_HORIZONTAL_ACCURACY
            | GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VERTICAL_ACCURACY;

        let (vn, ve) = match (self.speed, self.course) {
            (Some(speed), Some(course)) => {
                let heading = course.to_radians();
                (speed * heading.cos(), speed * heading.sin())
            }
            _ => {
                ignore_flags |= GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VEL_HORIZ;
                (0.0, 0.0)
            }
        };

        let alt = match self.altitude {
            Some(altitude) => altitude,
            None => {
                ignore_flags |= GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_ALT;
                0.0
            }
        };
        let fix_type = if alt.abs() > 0.01 {
            FIX_TYPE_3D
        } else {
            FIX_TYPE_2D
        };

        Some(GPS_INPUT_DATA {
            time_usec,
            lat: (latitude * 1e7) as i32,
            lon: (longitude * 1e7) as i32,
            alt,
            vn,
            ve,
            ignore_flags,
            fix_type,
            satellites_visible: self.satellites.unwrap_or(0),
            gps_id: self.gps_id,
            ..Default::default()
        })
    }
}

/// Converts position sentences into MAVLink `GPS_INPUT` frames.
///
/// Sentences that carry no fix data, or that arrive before the first position
/// for their identity, are declined.
pub struct MavlinkGpsInputTransform {
    system_id: u8,
    sequence: AtomicU8,
    fixes: Mutex<HashMap<u8, FixState>>,
}

impl MavlinkGpsInputTransform {
    pub fn new(system_id: u8) -> Self {
        Self {
            system_id,
            sequence: AtomicU8::new(0),
            fixes: Mutex::new(HashMap::new()),
        }
    }

    pub fn system_id(&self) -> u8 {
        self.system_id
    }

    /// Feeds `sentence` into the state of `identity` and returns the merged fix,
    /// or `None` when the sentence updated nothing.
    fn merge(&self, identity: u8, sentence: &Sentence) -> Option<FixState> {
        let mut line = Vec::with_capacity(sentence.as_bytes().len() + 2);
        line.extend_from_slice(sentence.as_bytes());
        line.extend_from_slice(b"\r\n");

        let mut fixes = self.fixes.lock().unwrap_or_else(PoisonError::into_inner);
        let next_gps_id = u8::try_from(fixes.len()).unwrap_or(u8::MAX);
        let state = fixes.entry(identity).or_insert_with(|| FixState {
            gps_id: next_gps_id,
            ..FixState::default()
        });
        let mut updated = false;

        let mut parser = Parser::new();
        for byte in line {
            match parser.parse_from_byte(byte) {
                Some(Ok(ParseResult::GGA(Some(gga)))) => {
                    state.update_from_gga(&gga);
                    updated = true;
                }
                Some(Ok(ParseResult::RMC(Some(rmc)))) => {
                    state.update_from_rmc(&rmc);
                    updated = true;
                }
                Some(Ok(ParseResult::VTG(Some(vtg)))) => {
                    state.update_from_vtg(&vtg);
                    updated = true;
                }
                // Checksum mismatches and unsupported sentence types land here too.
                _ => {}
            }
        }

        updated.then_some(*state)
    }
}

impl SentenceTransform for MavlinkGpsInputTransform {
    fn wrap(
        &self,
        identity: u8,
        sentence: &Sentence,
    ) -> Result<Option<OutboundFrame>, TransformError> {
        if !sentence.as_str().starts_with(['$', '!']) {
            return Err(TransformError::Malformed(format!(
                "missing start delimiter in {:?}",
                sentence.as_str()
            )));
        }

        let time_usec = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or_default();
        let Some(data) = self
            .merge(identity, sentence)
            .and_then(|state| state.to_gps_input(time_usec))
        else {
            return Ok(None);
        };

        let header = MavHeader {
            system_id: self.system_id,
            component_id: identity,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        let mut buf = Cursor::new(Vec::with_capacity(MAVLINK_V2_MAX_FRAME_LEN));
        mavlink::write_v2_msg(&mut buf, header, &MavMessage::GPS_INPUT(data))
            .map_err(|e| TransformError::Encode(format!("{e:?}")))?;

        Ok(Some(OutboundFrame::new(identity, buf.into_inner())))
    }
}

#[cfg(test)]
mod tests {
    use super::MavlinkGpsInputTransform;
    use crate::error::TransformError;
    use crate::framing::Sentence;
    use crate::outbound::{OutboundFrame, SentenceTransform};
    use mavlink::common::{GpsInputIgnoreFlags, MavMessage, GPS_INPUT_DATA};
    use mavlink::peek_reader::PeekReader;
    use mavlink::MavHeader;
    use std::io::Cursor;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GSV: &str = "$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75";

    fn sentence(text: &str) -> Sentence {
        Sentence::from_frame(text.as_bytes()).expect("test sentence is not blank")
    }

    fn decode(frame: &OutboundFrame) -> (MavHeader, GPS_INPUT_DATA) {
        let mut reader = PeekReader::new(Cursor::new(frame.payload()));
        match mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
            Ok((header, MavMessage::GPS_INPUT(data))) => (header, data),
            other => panic!("expected a GPS_INPUT frame, got {other:?}"),
        }
    }

    #[test]
    fn gga_becomes_gps_input_tagged_with_identity() {
        let transform = MavlinkGpsInputTransform::new(1);

        let frame = transform
            .wrap(220, &sentence(GGA))
            .expect("GGA should be accepted")
            .expect("GGA carries a position");

        let payload = frame.payload();
        assert_eq!(payload[0], 0xFD);
        assert_eq!(payload[5], 1);
        assert_eq!(payload[6], 220);
        assert_eq!(&payload[7..10], &[232, 0, 0]);

        let (header, data) = decode(&frame);
        assert_eq!(header.component_id, 220);
        assert_eq!(data.satellites_visible, 8);
        assert_eq!(data.fix_type, 3);
        assert!((data.lat - 481_173_000).abs() < 10);
        assert!((data.lon - 115_166_666).abs() < 10);
        assert!((data.alt - 545.4).abs() < 0.01);
        assert!(data
            .ignore_flags
            .contains(GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VEL_HORIZ));
    }

    #[test]
    fn rmc_before_any_position_is_declined() {
        let transform = MavlinkGpsInputTransform::new(1);

        let result = transform
            .wrap(221, &sentence(RMC))
            .expect("RMC is well formed");

        assert!(result.is_none());
    }

    #[test]
    fn rmc_after_gga_adds_horizontal_velocity() {
        let transform = MavlinkGpsInputTransform::new(1);
        let first = transform
            .wrap(221, &sentence(GGA))
            .expect("GGA should be accepted")
            .expect("GGA carries a position");

        let second = transform
            .wrap(221, &sentence(RMC))
            .expect("RMC should be accepted")
            .expect("position is known");

        let (first_header, _) = decode(&first);
        let (second_header, data) = decode(&second);
        assert_eq!(second_header.sequence, first_header.sequence.wrapping_add(1));
        assert!(!data
            .ignore_flags
            .contains(GpsInputIgnoreFlags::GPS_INPUT_IGNORE_FLAG_VEL_HORIZ));
        let speed = (data.vn * data.vn + data.ve * data.ve).sqrt();
        assert!((speed - 11.52).abs() < 0.1);
        assert!(data.ve > data.vn);
    }

    #[test]
    fn fixes_are_tracked_per_identity() {
        let transform = MavlinkGpsInputTransform::new(1);
        transform
            .wrap(220, &sentence(GGA))
            .expect("GGA should be accepted");

        let other_identity = transform
            .wrap(221, &sentence(RMC))
            .expect("RMC is well formed");

        assert!(other_identity.is_none());
    }

    #[test]
    fn unsupported_sentence_type_is_declined() {
        let transform = MavlinkGpsInputTransform::new(1);
        transform
            .wrap(220, &sentence(GGA))
            .expect("GGA should be accepted");

        let result = transform
            .wrap(220, &sentence(GSV))
            .expect("GSV is not malformed");

        assert!(result.is_none());
    }

    #[test]
    fn text_without_start_delimiter_is_rejected() {
        let transform = MavlinkGpsInputTransform::new(1);

        let result = transform.wrap(220, &sentence("hello world"));

        assert!(matches!(result, Err(TransformError::Malformed(_))));
    }

    #[test]
    fn each_identity_gets_its_own_gps_instance() {
        let transform = MavlinkGpsInputTransform::new(1);

        let first = transform
            .wrap(221, &sentence(GGA))
            .expect("GGA should be accepted")
            .expect("GGA carries a position");
        let second = transform
            .wrap(220, &sentence(GGA))
            .expect("GGA should be accepted")
            .expect("GGA carries a position");
        let first_again = transform
            .wrap(221, &sentence(GGA))
            .expect("GGA should be accepted")
            .expect("GGA carries a position");

        assert_eq!(decode(&first).1.gps_id, 0);
        assert_eq!(decode(&second).1.gps_id, 1);
        assert_eq!(decode(&first_again).1.gps_id, 0);
    }
}
