use crate::decode::cpr::CPRFormat;
use crate::decode::KT_TO_MS;
use deku::bitvec::{BitSlice, Msb0};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/**
 * ## Surface Position (BDS 0,6)
 *
 * Broadcast by aircraft on the ground (TC=5..=8). Instead of an
 * altitude, the message carries the ground movement and track:
 *
 * | TC | MOV | S | TRK | T | F | LAT-CPR | LON-CPR |
 * | -- | --- | - | --- | - | - | ------- | ------- |
 * | 5  |  7  | 1 |  7  | 1 | 1 |   17    |   17    |
 *
 * The movement field is a 7-bit piecewise linear code with finer steps
 * at taxi speeds; the track angle divides the circle into 128 sectors
 * of 2.8125° each. The CPR fields use the surface encoding, whose zones
 * are a quarter of the airborne ones.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct SurfacePosition {
    #[deku(bits = "5")]
    #[serde(skip)]
    /// The type code (between 5 and 8)
    pub tc: u8,

    #[deku(reader = "read_movement(deku::rest)")]
    /// MOV: the ground speed in knots, None when unavailable or
    /// reserved
    pub groundspeed: Option<f64>,

    #[deku(bits = "1")]
    #[serde(skip)]
    /// S: the ground track validity
    pub track_status: bool,

    #[deku(
        bits = "7",
        map = "|value: u8| -> Result<_, DekuError> {
            if *track_status {
                Ok(Some(f64::from(value) * 360. / 128.))
            } else {
                Ok(None)
            }
        }"
    )]
    /// TRK: the ground track in degrees clockwise from true north,
    /// None when the status bit declares it invalid
    pub track: Option<f64>,

    #[deku(bits = "1")]
    #[serde(skip)]
    /// T: UTC time synchronization
    pub t: bool,

    /// F: the CPR format (odd or even)
    pub parity: CPRFormat,

    #[deku(bits = "17", endian = "big")]
    /// The 17-bit CPR encoded latitude (surface encoding)
    pub lat_cpr: u32,

    #[deku(bits = "17", endian = "big")]
    /// The 17-bit CPR encoded longitude (surface encoding)
    pub lon_cpr: u32,

    #[deku(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    /// The decoded latitude in degrees, once a CPR decoding succeeded
    pub latitude: Option<f64>,

    #[deku(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    /// The decoded longitude in degrees, once a CPR decoding succeeded
    pub longitude: Option<f64>,
}

impl SurfacePosition {
    /// The navigation uncertainty category (NUCp), directly based on
    /// the type code
    pub fn nuc_p(&self) -> u8 {
        14 - self.tc
    }

    /// The ground speed in m/s, None when unavailable
    pub fn groundspeed_ms(&self) -> Option<f64> {
        self.groundspeed.map(|kt| kt * KT_TO_MS)
    }
}

/// Decode the 7-bit movement field, a piecewise linear encoding with
/// quantization steps growing with the speed:
///
/// | Code    | Ground speed     | Step     |
/// | ------- | ---------------- | -------- |
/// | 0       | not available    |          |
/// | 1       | stopped          |          |
/// | 2..=8   | 0.125 – 1 kt     | 0.125 kt |
/// | 9..=12  | 1 – 2 kt         | 0.25 kt  |
/// | 13..=38 | 2 – 15 kt        | 0.5 kt   |
/// | 39..=93 | 15 – 70 kt       | 1 kt     |
/// | 94..=108| 70 – 100 kt      | 2 kt     |
/// | 109..=123| 100 – 175 kt    | 5 kt     |
/// | 124     | above 175 kt     |          |
/// | 125..=127| reserved        |          |
fn read_movement(
    rest: &BitSlice<u8, Msb0>,
) -> Result<(&BitSlice<u8, Msb0>, Option<f64>), DekuError> {
    let (rest, mov) =
        u8::read(rest, (deku::ctx::Endian::Big, deku::ctx::BitSize(7)))?;
    let value = match mov {
        0 => None,
        1 => Some(0.),
        2..=8 => Some(0.125 + f64::from(mov - 2) * 0.125),
        9..=12 => Some(1. + f64::from(mov - 9) * 0.25),
        13..=38 => Some(2. + f64::from(mov - 13) * 0.5),
        39..=93 => Some(15. + f64::from(mov - 39) * 1.),
        94..=108 => Some(70. + f64::from(mov - 94) * 2.),
        109..=123 => Some(100. + f64::from(mov - 109) * 5.),
        124 => Some(175.),
        _ => {
            debug!("reserved movement code {}", mov);
            None
        }
    };
    Ok((rest, value))
}

impl fmt::Display for SurfacePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Surface position (BDS 0,6)")?;
        let groundspeed = self
            .groundspeed
            .map_or_else(|| "None".to_string(), |gs| format!("{gs} kts"));
        let track = self
            .track
            .map_or_else(|| "None".to_string(), |track| format!("{track}°"));
        writeln!(f, "  Groundspeed:   {groundspeed}")?;
        writeln!(f, "  Track angle:   {track}")?;
        writeln!(f, "  CPR parity:    {}", self.parity)?;
        writeln!(f, "  CPR latitude:  ({})", self.lat_cpr)?;
        writeln!(f, "  CPR longitude: ({})", self.lon_cpr)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use hexlit::hex;

    #[test]
    fn test_surface_position() {
        let bytes = hex!("8c4841753a9a153237aef0f275be");
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS06(me) = adsb.message {
                assert_eq!(me.tc, 7);
                assert_eq!(me.track, Some(92.8125));
                assert_eq!(me.groundspeed, Some(17.));
                assert_eq!(me.parity, CPRFormat::Odd);
                assert_eq!(me.lat_cpr, 39195);
                assert_eq!(me.lon_cpr, 110320);
                assert_eq!(me.nuc_p(), 7);
                let ms = me.groundspeed_ms().unwrap();
                assert!((ms - 8.745).abs() < 1e-2);
                return;
            }
        }
        unreachable!();
    }

    #[test]
    fn test_movement_steps() {
        // movement code 41, 15-70 kt range with 1 kt steps
        let bytes = hex!("8c4841753a9a153237aef0f275be");
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS06(me) = adsb.message {
                assert_eq!(me.groundspeed, Some(17.));
            }
        }
        // movement code 25, 2-15 kt range with 0.5 kt steps
        let bytes = hex!("8c3461cf399d6059814ea81483a9");
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS06(me) = adsb.message {
                assert_eq!(me.groundspeed, Some(8.0));
            }
        }
        // movement code 0, no information
        let bytes = hex!("8c3944f8400002acb23cda192b95");
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS06(me) = adsb.message {
                assert_eq!(me.groundspeed, None);
            }
        }
    }

    #[test]
    fn test_track_invalid() {
        // a stopped vehicle over TIS-B, with no valid track
        let bytes = hex!("903a33ff40100858d34ff3cce976");
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let TisB { cf, .. } = msg.df {
            if let ME::BDS06(me) = cf.me {
                assert_eq!(me.track, None);
                assert_eq!(me.groundspeed, Some(0.0));
                return;
            }
        }
        unreachable!();
    }
}
