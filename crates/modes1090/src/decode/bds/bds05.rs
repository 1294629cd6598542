use crate::decode::cpr::CPRFormat;
use crate::decode::{decode_id13, gray_to_feet, FT_TO_M};
use deku::bitvec::{BitSlice, Msb0};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Airborne Position (BDS 0,5)
 *
 * Broadcast with barometric altitude (TC=9..=18) or geometric height
 * (TC=20..=22):
 *
 * | TC | SS | SAF/NICb | ALT | T | F | LAT-CPR | LON-CPR |
 * | -- | -- | -------- | --- | - | - | ------- | ------- |
 * | 5  | 2  |    1     | 12  | 1 | 1 |   17    |   17    |
 *
 * The encoded latitude and longitude are compact position reporting
 * (CPR) values: a position only comes out of a pair of odd and even
 * frames, or of one frame and a reference position (see
 * [`crate::decode::cpr`]). The `latitude` and `longitude` fields are
 * placeholders filled by the CPR tracker.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct AirbornePosition {
    #[deku(bits = "5")]
    #[serde(skip)]
    /// The type code (between 9 and 18, or between 20 and 22)
    pub tc: u8,

    #[serde(skip)]
    /// SS: the surveillance status
    pub ss: SurveillanceStatus,

    #[deku(
        bits = "1",
        map = "|v: u8| -> Result<_, DekuError> {
            if *tc < 19 { Ok(Some(v)) } else { Ok(None) }
        }"
    )]
    #[serde(rename = "NICb", skip_serializing_if = "Option::is_none")]
    /// NIC supplement B in ADS-B version 2 (for the barometric type
    /// codes; the same bit is the single antenna flag for TC 20..=22)
    pub nic_b: Option<u8>,

    #[deku(reader = "read_altitude(deku::rest)")]
    #[serde(rename = "altitude")]
    /// The altitude in feet (12-bit code), None when unavailable
    pub alt: Option<i32>,

    #[deku(reader = "read_source(deku::rest, *tc)")]
    /// Whether the altitude is barometric or geometric, from the
    /// type code
    pub source: AltitudeSource,

    #[deku(bits = "1")]
    #[serde(skip)]
    /// T: UTC time synchronization
    pub t: bool,

    /// F: the CPR format (odd or even)
    pub parity: CPRFormat,

    #[deku(bits = "17", endian = "big")]
    /// The 17-bit CPR encoded latitude
    pub lat_cpr: u32,

    #[deku(bits = "17", endian = "big")]
    /// The 17-bit CPR encoded longitude
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

impl AirbornePosition {
    /// The navigation uncertainty category (NUCp), directly based on
    /// the type code (ADS-B version 0)
    pub fn nuc_p(&self) -> u8 {
        match self.tc {
            tc if tc < 19 => 18 - tc,
            20 | 21 => 29 - self.tc,
            _ => 0,
        }
    }

    /// The altitude in metres, None when unavailable
    pub fn altitude_m(&self) -> Option<f64> {
        self.alt.map(|ft| f64::from(ft) * FT_TO_M)
    }

    /// The horizontal containment radius limit Rc in metres, the DO-260B
    /// version 2 integrity lookup over the type code and the NIC
    /// supplements. NIC supplement A comes from the latest operational
    /// status of the same aircraft; None when Rc is unknown (TC 18, 22).
    pub fn horizontal_containment_radius(&self, nic_a: bool) -> Option<f64> {
        let nic_b = self.nic_b == Some(1);
        match self.tc {
            9 | 20 => Some(7.5),
            10 | 21 => Some(25.),
            11 => Some(if nic_a && nic_b { 75. } else { 185.2 }),
            12 => Some(370.4),
            13 if !nic_b => Some(926.),
            13 if nic_a => Some(1111.2),
            13 => Some(555.6),
            14 => Some(1852.),
            15 => Some(3704.),
            16 => Some(if nic_a && nic_b { 7408. } else { 14_816. }),
            17 => Some(37_040.),
            _ => None,
        }
    }
}

/// Decode the 12-bit AC field: with the Q bit set, a 25 ft resolution
/// integer code; otherwise a Gillham coded altitude.
fn read_altitude(
    rest: &BitSlice<u8, Msb0>,
) -> Result<(&BitSlice<u8, Msb0>, Option<i32>), DekuError> {
    let (rest, num) =
        u16::read(rest, (deku::ctx::Endian::Big, deku::ctx::BitSize(12)))?;

    if num == 0 {
        return Ok((rest, None));
    }
    if num & 0x10 != 0 {
        let n = ((num & 0x0fe0) >> 1) | (num & 0x000f);
        return Ok((rest, Some(i32::from(n) * 25 - 1000)));
    }
    // reinsert a zero M bit and decode as Gillham
    let gillham = decode_id13(((num & 0x0fc0) << 1) | (num & 0x003f));
    Ok((rest, gray_to_feet(gillham).ok()))
}

fn read_source(
    rest: &BitSlice<u8, Msb0>,
    tc: u8,
) -> Result<(&BitSlice<u8, Msb0>, AltitudeSource), DekuError> {
    let source = if tc < 19 {
        AltitudeSource::Barometric
    } else {
        AltitudeSource::Gnss
    };
    Ok((rest, source))
}

impl fmt::Display for AirbornePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Airborne position (BDS 0,5)")?;
        let altitude = self.alt.map_or_else(
            || "None".to_string(),
            |altitude| format!("{altitude} ft"),
        );
        writeln!(f, "  Altitude:      {} {}", altitude, self.source)?;
        writeln!(f, "  CPR parity:    {}", self.parity)?;
        writeln!(f, "  CPR latitude:  ({})", self.lat_cpr)?;
        writeln!(f, "  CPR longitude: ({})", self.lon_cpr)?;
        Ok(())
    }
}

/// SS field (ADS-B version 2)
#[derive(Debug, PartialEq, Eq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "2")]
#[serde(rename_all = "snake_case")]
pub enum SurveillanceStatus {
    NoCondition = 0,
    PermanentAlert = 1,
    TemporaryAlert = 2,
    SpiCondition = 3,
}

#[derive(Debug, PartialEq, Eq, Serialize, Copy, Clone)]
pub enum AltitudeSource {
    #[serde(rename = "barometric")]
    Barometric,
    #[serde(rename = "GNSS")]
    Gnss,
}

impl fmt::Display for AltitudeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Barometric => "barometric",
                Self::Gnss => "GNSS",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_airborne_position_fields() {
        let msg =
            Message::from_hex("8D40058B58C901375147EFD09357").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS05(me) = adsb.message {
                assert_eq!(me.tc, 11);
                assert_eq!(me.alt, Some(39000));
                assert_eq!(me.source, AltitudeSource::Barometric);
                assert_eq!(me.parity, CPRFormat::Even);
                assert_eq!(me.lat_cpr, 39848);
                assert_eq!(me.lon_cpr, 83951);
                assert_eq!(me.nuc_p(), 7);
                // TC 11, NIC supplements clear
                assert_eq!(
                    me.horizontal_containment_radius(false),
                    Some(185.2)
                );
                return;
            }
        }
        unreachable!();
    }

    #[test]
    fn test_geometric_altitude_source() {
        // same layout, type code 20 switches the altitude source
        let mut bytes = hex::decode("8D40058B58C901375147EFD09357").unwrap();
        bytes[4] = (20 << 3) | (bytes[4] & 0x7);
        // the parity is now stale, zero it out so the frame is accepted
        bytes[11] = 0;
        bytes[12] = 0;
        bytes[13] = 0;
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS05(me) = adsb.message {
                assert_eq!(me.source, AltitudeSource::Gnss);
                assert_eq!(me.nic_b, None);
                return;
            }
        }
        unreachable!();
    }
}
