use crate::decode::KT_TO_MS;
use deku::prelude::*;
use serde::ser::SerializeStruct;
use serde::Serialize;
use std::fmt;

/// ft/min to m/s
const FTMIN_TO_MS: f64 = 0.00508;

/**
 * ## Airborne Velocity (BDS 0,9)
 *
 * All velocities come with type code 19; the subtype (bits 6 to 8)
 * picks one of two layouts. Subtypes 1 and 2 report the ground speed
 * as signed north/south and east/west components; subtypes 3 and 4
 * report the airspeed and the magnetic heading, used when no GNSS
 * position is available. Subtypes 2 and 4 are the supersonic variants
 * with a 4 kt resolution instead of 1 kt.
 *
 * The trailer is shared by all subtypes: a 9-bit vertical rate in
 * 64 ft/min units with its source (barometric or GNSS), and the signed
 * difference between the GNSS height and the barometric altitude.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
pub struct AirborneVelocity {
    #[deku(bits = "3")]
    #[serde(skip)]
    /// The subtype (1 or 2 for ground speed, 3 or 4 for airspeed)
    pub subtype: u8,

    #[deku(bits = "1")]
    #[serde(skip)]
    /// The intent change flag
    pub intent_change: bool,

    #[deku(bits = "1")]
    #[serde(skip)]
    /// The IFR capability flag
    pub ifr_capability: bool,

    #[deku(bits = "3")]
    #[serde(rename = "NACv")]
    /// The navigation accuracy category for velocity (a NUCv in
    /// ADS-B version 0)
    pub nac_v: u8,

    #[deku(ctx = "*subtype")]
    #[serde(flatten)]
    /// Ground speed or airspeed depending on the subtype
    pub velocity: AirborneVelocitySubType,

    /// The source of the vertical rate measurement
    pub vrate_src: VerticalRateSource,

    #[serde(skip)]
    /// The sign of the vertical rate
    pub vrate_sign: Sign,

    #[deku(
        endian = "big",
        bits = "9",
        map = "|v: u16| -> Result<_, DekuError> {
            if v == 0 { Ok(None) }
            else {
                Ok(Some(i32::from(vrate_sign.value()) * (i32::from(v) - 1) * 64))
            }
        }"
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    /// The vertical rate in ft/min, None when unavailable
    pub vertical_rate: Option<i32>,

    #[deku(bits = "2")]
    #[serde(skip)]
    pub reserved: u8,

    #[serde(skip)]
    /// The sign of the GNSS height minus barometric altitude difference
    pub gnss_sign: Sign,

    #[deku(
        bits = "7",
        map = "|v: u8| -> Result<_, DekuError> {
            if v < 2 { Ok(None) }
            else {
                Ok(Some(i32::from(gnss_sign.value()) * (i32::from(v) - 1) * 25))
            }
        }"
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    /// The difference between the GNSS height and the barometric
    /// altitude in ft, None when unavailable
    pub geo_minus_baro: Option<i32>,
}

impl AirborneVelocity {
    /// The ground speed in knots (subtypes 1 and 2 only)
    pub fn groundspeed(&self) -> Option<f64> {
        match &self.velocity {
            AirborneVelocitySubType::GroundSpeed(gs) => Some(gs.groundspeed),
            _ => None,
        }
    }

    /// The ground speed in m/s (subtypes 1 and 2 only)
    pub fn groundspeed_ms(&self) -> Option<f64> {
        self.groundspeed().map(|kt| kt * KT_TO_MS)
    }

    /// The track angle (subtypes 1 and 2) or the magnetic heading
    /// (subtypes 3 and 4) in degrees, in [0, 360)
    pub fn track_or_heading(&self) -> Option<f64> {
        match &self.velocity {
            AirborneVelocitySubType::GroundSpeed(gs) => Some(gs.track),
            AirborneVelocitySubType::Airspeed(airspeed) => airspeed.heading,
            _ => None,
        }
    }

    /// The vertical rate in m/s, None when unavailable
    pub fn vertical_rate_ms(&self) -> Option<f64> {
        self.vertical_rate.map(|v| f64::from(v) * FTMIN_TO_MS)
    }
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[deku(ctx = "subtype: u8", id = "subtype")]
#[serde(untagged)]
pub enum AirborneVelocitySubType {
    #[deku(id = "0")]
    #[serde(skip)]
    Reserved0(#[deku(bits = "22")] u32),

    #[deku(id_pat = "1..=2")]
    GroundSpeed(#[deku(ctx = "subtype")] GroundSpeedDecoding),

    #[deku(id_pat = "3..=4")]
    Airspeed(#[deku(ctx = "subtype")] AirspeedDecoding),

    #[deku(id_pat = "5..=7")]
    #[serde(skip)]
    Reserved1(#[deku(bits = "22")] u32),
}

/// The sign bit of a signed-magnitude velocity component
#[derive(Debug, PartialEq, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "1")]
pub enum Sign {
    Positive = 0,
    Negative = 1,
}

impl Sign {
    #[must_use]
    pub fn value(&self) -> i16 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// Ground speed from its signed east/west and north/south components.
/// The supersonic subtype carries the same layout with a 4 kt
/// quantization.
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
#[deku(ctx = "subtype: u8")]
pub struct GroundSpeedDecoding {
    #[serde(skip)]
    pub ew_sign: Sign,
    #[deku(
        endian = "big",
        bits = "10",
        map = "|v: u16| -> Result<_, DekuError> {
            let scale = if subtype == 2 { 4. } else { 1. };
            Ok(scale * f64::from((v as i16 - 1) * ew_sign.value()))
        }"
    )]
    #[serde(skip)]
    /// The east/west velocity component in knots, positive eastwards
    pub ew_vel: f64,
    #[serde(skip)]
    pub ns_sign: Sign,
    #[deku(
        endian = "big",
        bits = "10",
        map = "|v: u16| -> Result<_, DekuError> {
            let scale = if subtype == 2 { 4. } else { 1. };
            Ok(scale * f64::from((v as i16 - 1) * ns_sign.value()))
        }"
    )]
    #[serde(skip)]
    /// The north/south velocity component in knots, positive northwards
    pub ns_vel: f64,
    #[deku(skip, default = "libm::hypot(*ew_vel, *ns_vel)")]
    /// The ground speed in knots
    pub groundspeed: f64,
    #[deku(
        skip,
        default = "
        let h = libm::atan2(*ew_vel, *ns_vel).to_degrees();
        if h < 0.0 { h + 360. } else { h }
        "
    )]
    /// The track angle in degrees clockwise from true north
    pub track: f64,
}

/// Airspeed and magnetic heading (subtypes 3 and 4). The supersonic
/// subtype carries the same layout with a 4 kt quantization.
#[derive(Debug, PartialEq, DekuRead, Clone)]
#[deku(ctx = "subtype: u8")]
pub struct AirspeedDecoding {
    #[deku(bits = "1")]
    /// The magnetic heading availability
    pub status_heading: bool,

    #[deku(
        endian = "big",
        bits = "10",
        map = "|v: u16| -> Result<_, DekuError> {
            if *status_heading { Ok(Some(f64::from(v) * 360. / 1024.)) }
            else { Ok(None) }
        }"
    )]
    /// The magnetic heading in degrees, None when unavailable
    pub heading: Option<f64>,

    /// Whether the airspeed is indicated (IAS) or true (TAS)
    pub airspeed_type: AirspeedType,

    #[deku(
        endian = "big",
        bits = "10",
        map = "|v: u16| -> Result<_, DekuError> {
            if v == 0 { return Ok(None) }
            let scale = if subtype == 4 { 4 } else { 1 };
            Ok(Some(scale * (v - 1)))
        }"
    )]
    /// The airspeed in knots, None when unavailable
    pub airspeed: Option<u16>,
}

impl Serialize for AirspeedDecoding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut state = serializer.serialize_struct("Message", 2)?;
        if let Some(heading) = &self.heading {
            state.serialize_field("heading", heading)?;
        }
        if let Some(airspeed) = &self.airspeed {
            match &self.airspeed_type {
                AirspeedType::IAS => state.serialize_field("IAS", airspeed)?,
                AirspeedType::TAS => state.serialize_field("TAS", airspeed)?,
            }
        }
        state.end()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, DekuRead)]
#[deku(type = "u8", bits = "1")]
pub enum AirspeedType {
    IAS = 0,
    TAS = 1,
}

impl fmt::Display for AirspeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::IAS => "IAS",
                Self::TAS => "TAS",
            }
        )
    }
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "1")]
pub enum VerticalRateSource {
    #[serde(rename = "barometric")]
    BarometricPressureAltitude = 0,

    #[serde(rename = "GNSS")]
    GeometricAltitude = 1,
}

impl fmt::Display for VerticalRateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::BarometricPressureAltitude => "barometric",
                Self::GeometricAltitude => "GNSS",
            }
        )
    }
}

impl fmt::Display for AirborneVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Airborne velocity over ground (BDS 0,9)")?;
        match &self.velocity {
            AirborneVelocitySubType::GroundSpeed(v) => {
                writeln!(f, "  Track angle:   {}°", libm::round(v.track))?;
                writeln!(
                    f,
                    "  Groundspeed:   {} kt",
                    libm::round(v.groundspeed)
                )?;
            }
            AirborneVelocitySubType::Airspeed(v) => {
                if let Some(value) = v.airspeed {
                    writeln!(f, "  {}:           {} kt", v.airspeed_type, value)?;
                }
                if let Some(value) = v.heading {
                    writeln!(f, "  Heading:       {}°", libm::round(value))?;
                }
            }
            AirborneVelocitySubType::Reserved0(_)
            | AirborneVelocitySubType::Reserved1(_) => {}
        }
        if let Some(vr) = &self.vertical_rate {
            writeln!(f, "  Vertical rate: {} ft/min {}", vr, &self.vrate_src)?;
        }
        writeln!(f, "  NACv:          {}", &self.nac_v)?;
        if let Some(value) = &self.geo_minus_baro {
            writeln!(f, "  GNSS delta:    {value} ft")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_groundspeed_velocity() {
        let msg = Message::from_hex("8D485020994409940838175B284F").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS09(velocity) = adsb.message {
                assert_relative_eq!(
                    velocity.groundspeed().unwrap(),
                    159.,
                    max_relative = 1e-2
                );
                assert_relative_eq!(
                    velocity.track_or_heading().unwrap(),
                    182.88,
                    max_relative = 1e-2
                );
                assert_eq!(velocity.vertical_rate, Some(-832));
                assert_eq!(velocity.geo_minus_baro, Some(550));
                assert_eq!(
                    velocity.vrate_src,
                    VerticalRateSource::BarometricPressureAltitude
                );
                assert_relative_eq!(
                    velocity.groundspeed_ms().unwrap(),
                    81.9,
                    max_relative = 1e-3
                );
                assert_relative_eq!(
                    velocity.vertical_rate_ms().unwrap(),
                    -4.226,
                    max_relative = 1e-3
                );
                return;
            }
        }
        unreachable!();
    }

    #[test]
    fn test_airspeed_velocity() {
        let msg = Message::from_hex("8DA05F219B06B6AF189400CBC33F").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS09(velocity) = adsb.message {
                if let AirborneVelocitySubType::Airspeed(airspeed) =
                    &velocity.velocity
                {
                    assert_eq!(airspeed.airspeed, Some(375));
                    assert_eq!(airspeed.airspeed_type, AirspeedType::TAS);
                    assert_relative_eq!(
                        airspeed.heading.unwrap(),
                        244.,
                        max_relative = 1e-2
                    );
                    assert_eq!(velocity.vertical_rate, Some(-2304));
                    return;
                }
            }
        }
        unreachable!();
    }

    #[test]
    fn test_format_groundspeed() {
        let msg = Message::from_hex("8D485020994409940838175B284F").unwrap();
        assert_eq!(
            format!("{msg}"),
            r#" DF17. Extended Squitter
  Address:       485020
  Air/Ground:    airborne
  Airborne velocity over ground (BDS 0,9)
  Track angle:   183°
  Groundspeed:   159 kt
  Vertical rate: -832 ft/min barometric
  NACv:          0
  GNSS delta:    550 ft
"#
        )
    }
}
