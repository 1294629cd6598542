pub mod adsb;
pub mod bds;
pub mod commb;
pub mod cpr;
pub mod crc;

use adsb::{ExtendedSquitter, ME};
use commb::DataSelector;
use deku::bitvec::{BitSlice, Msb0};
use deku::prelude::*;
use serde::ser::{Serialize, Serializer};
use std::fmt;

const MODES_LONG_MSG_BYTES: usize = 14;
const MODES_SHORT_MSG_BYTES: usize = 7;

/// Feet to metres
pub(crate) const FT_TO_M: f64 = 0.3048;
/// Knots to metres per second
pub(crate) const KT_TO_MS: f64 = 0.514_444;

/**
 * DF stands for Downlink Format, the 5-bit field opening every Mode S
 * downlink transmission. It selects both the message layout and the
 * length of the frame: formats below 16 are 56-bit, the others 112-bit.
 *
 * |  [`DF`]  |  Name                                  |  Section    |
 * | -------- | -------------------------------------- | ----------- |
 * | 0        | [`DF::ShortAirAirSurveillance`]        | 3.1.2.8.2   |
 * | 4        | [`DF::SurveillanceAltitudeReply`]      | 3.1.2.6.5   |
 * | 5        | [`DF::SurveillanceIdentityReply`]      | 3.1.2.6.7   |
 * | 11       | [`DF::AllCallReply`]                   | 2.1.2.5.2.2 |
 * | 16       | [`DF::LongAirAirSurveillance`]         | 3.1.2.8.3   |
 * | 17       | [`DF::ADSB`]                           | 3.1.2.8.6   |
 * | 18       | [`DF::TisB`]                           | 3.1.2.8.7   |
 * | 20       | [`DF::CommBAltitudeReply`]             | 3.1.2.6.6   |
 * | 21       | [`DF::CommBIdentityReply`]             | 3.1.2.6.8   |
 * | 24..=31  | [`DF::CommDExtendedLengthMessage`]     | 3.1.2.7.3   |
 *
 * Any other well-formed format is kept raw in [`DF::UnknownFormat`].
 */
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Clone)]
#[deku(type = "u8", bits = "5", ctx = "crc: u32")]
#[serde(tag = "DF")]
pub enum DF {
    /// DF=0: Short Air-Air Surveillance (3.1.2.8.2)
    #[deku(id = "0")]
    #[serde(rename = "DF0")]
    ShortAirAirSurveillance {
        /// VS: vertical status (0 airborne, 1 on ground)
        #[deku(bits = "1")]
        vs: u8,
        /// CC: crosslink capability
        #[deku(bits = "1")]
        #[serde(skip)]
        cc: u8,
        #[deku(bits = "1")]
        #[serde(skip)]
        unused: u8,
        /// SL: sensitivity level, ACAS (0 when inoperative)
        #[deku(bits = "3")]
        #[serde(skip)]
        sl: u8,
        #[deku(bits = "2")]
        #[serde(skip)]
        unused1: u8,
        /// RI: reply information
        #[deku(bits = "4")]
        #[serde(skip)]
        ri: u8,
        #[deku(bits = "2")]
        #[serde(skip)]
        unused2: u8,
        /// AC: altitude code on 13 bits
        #[serde(rename = "altitude")]
        ac: AC13Field,
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=4: Surveillance Altitude Reply (3.1.2.6.5)
    #[deku(id = "4")]
    #[serde(rename = "DF4")]
    SurveillanceAltitudeReply {
        /// FS: flight status
        #[serde(skip)]
        fs: FlightStatus,
        /// DR: downlink request
        #[serde(skip)]
        dr: DownlinkRequest,
        /// UM: utility message
        #[serde(skip)]
        um: UtilityMessage,
        /// AC: altitude code on 13 bits
        #[serde(rename = "altitude")]
        ac: AC13Field,
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=5: Surveillance Identity Reply (3.1.2.6.7)
    #[deku(id = "5")]
    #[serde(rename = "DF5")]
    SurveillanceIdentityReply {
        /// FS: flight status
        fs: FlightStatus,
        /// DR: downlink request
        #[serde(skip)]
        dr: DownlinkRequest,
        /// UM: utility message
        #[serde(skip)]
        um: UtilityMessage,
        /// ID: the Mode A identity code (squawk)
        squawk: IdentityCode,
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=11: All-call reply (2.1.2.5.2.2)
    #[deku(id = "11")]
    #[serde(rename = "DF11")]
    AllCallReply {
        /// CA: capability
        capability: Capability,
        /// AA: address announced
        #[serde(rename = "icao24")]
        icao: ICAO,
        /// PI: parity/interrogator identifier
        #[serde(skip)]
        p_icao: ICAO,
    },

    /// DF=16: Long Air-Air Surveillance (3.1.2.8.3)
    #[deku(id = "16")]
    #[serde(rename = "DF16")]
    LongAirAirSurveillance {
        /// VS: vertical status (0 airborne, 1 on ground)
        #[deku(bits = "1")]
        vs: u8,
        #[deku(bits = "2")]
        #[serde(skip)]
        reserved1: u8,
        /// SL: sensitivity level, ACAS (0 when inoperative)
        #[deku(bits = "3")]
        sl: u8,
        #[deku(bits = "2")]
        #[serde(skip)]
        reserved2: u8,
        /// RI: reply information
        #[deku(bits = "4")]
        ri: u8,
        #[deku(bits = "2")]
        #[serde(skip)]
        reserved3: u8,
        /// AC: altitude code on 13 bits
        #[serde(rename = "altitude")]
        ac: AC13Field,
        /// MV: message, ACAS (the BDS register requested in UF=0)
        #[serde(skip)]
        mv: [u8; 7],
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=17: Extended Squitter, ADS-B (3.1.2.8.6)
    #[deku(id = "17")]
    #[serde(rename = "ADSB")]
    ADSB(ExtendedSquitter),

    /// DF=18: Extended Squitter, supplementary (3.1.2.8.7)
    ///
    /// Non-transponder-based ADS-B transmitting subsystems and TIS-B
    /// transmitting equipment, i.e. equipment that cannot be interrogated.
    #[deku(id = "18")]
    #[serde(rename = "TISB")]
    TisB {
        /// CF: control field qualifying the message
        #[serde(flatten)]
        cf: ControlField,
        /// PI: parity/interrogator identifier
        #[serde(skip)]
        pi: ICAO,
    },

    /// DF=20: Comm-B Altitude Reply (3.1.2.6.6)
    #[deku(id = "20")]
    #[serde(rename = "DF20")]
    CommBAltitudeReply {
        /// FS: flight status
        #[serde(skip)]
        fs: FlightStatus,
        /// DR: downlink request
        #[serde(skip)]
        dr: DownlinkRequest,
        /// UM: utility message
        #[serde(skip)]
        um: UtilityMessage,
        /// AC: altitude code on 13 bits
        #[serde(rename = "altitude")]
        ac: AC13Field,
        /// MB: message, Comm-B
        #[serde(flatten)]
        bds: DataSelector,
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=21: Comm-B Identity Reply (3.1.2.6.8)
    #[deku(id = "21")]
    #[serde(rename = "DF21")]
    CommBIdentityReply {
        /// FS: flight status
        #[serde(skip)]
        fs: FlightStatus,
        /// DR: downlink request
        #[serde(skip)]
        dr: DownlinkRequest,
        /// UM: utility message
        #[serde(skip)]
        um: UtilityMessage,
        /// ID: the Mode A identity code (squawk)
        squawk: IdentityCode,
        /// MB: message, Comm-B
        #[serde(flatten)]
        bds: DataSelector,
        /// AP: address/parity
        #[serde(rename = "icao24")]
        #[deku(ctx = "crc")]
        ap: IcaoParity,
    },

    /// DF=24..=31: Comm-D Extended Length Message (3.1.2.7.3)
    ///
    /// Only the first two bits of the format field are assigned, so all
    /// values from 24 to 31 land here. The 80-bit MD field is kept raw
    /// (ELM segment reassembly is up to the caller).
    #[deku(id_pat = "24..=31")]
    #[serde(skip)]
    CommDExtendedLengthMessage {
        #[deku(bits = "2")]
        df: u8,
        #[deku(bits = "1")]
        spare: u8,
        /// KE: control, ELM
        ke: KE,
        /// ND: number of D-segment
        #[deku(bits = "4")]
        nd: u8,
        /// MD: message, Comm-D, 80 bits
        md: [u8; 10],
        /// AP: address/parity
        parity: ICAO,
    },

    /// Any well-formed downlink format without a decoder (1–3, 6–10,
    /// 12–15, 19, 22, 23), kept raw for forward compatibility.
    #[deku(id_pat = "_")]
    #[serde(skip)]
    UnknownFormat {
        #[deku(bits = "5")]
        df: u8,
        #[deku(reader = "read_remaining(deku::rest)")]
        data: Vec<u8>,
    },
}

/// Consume whatever is left of the frame, byte by byte.
fn read_remaining(
    rest: &BitSlice<u8, Msb0>,
) -> Result<(&BitSlice<u8, Msb0>, Vec<u8>), DekuError> {
    let mut rest = rest;
    let mut data = Vec::with_capacity(rest.len() / 8);
    while rest.len() >= 8 {
        let (r, byte) = u8::read(rest, deku::ctx::BitSize(8))?;
        data.push(byte);
        rest = r;
    }
    Ok((rest, data))
}

/// The entry point to Mode S and ADS-B decoding.
///
/// Use `Message::from_bytes()` on a 7 or 14-byte frame, or
/// [`Message::from_hex`] on its hex representation.
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Clone)]
pub struct Message {
    /// The checksum of the whole frame: zero for extended squitters,
    /// the transmitter address for address/parity overlaid formats,
    /// the interrogator identifier for all-call replies.
    #[deku(reader = "Self::read_crc(deku::input_bits)")]
    #[serde(skip)]
    pub crc: u32,

    /// The downlink format encoded in the first 5 bits
    #[serde(flatten)]
    #[deku(ctx = "*crc")]
    pub df: DF,
}

impl Message {
    /// Decode a frame from its hex representation: 14 nibbles for short
    /// frames, 28 for long ones, case insensitive, no separator.
    pub fn from_hex(frame: &str) -> Result<Self, DekuError> {
        let bytes = hex::decode(frame).map_err(|e| {
            DekuError::Assertion(format!("Invalid hex frame: {e}"))
        })?;
        let (_, msg) = Self::from_bytes((&bytes, 0))?;
        Ok(msg)
    }

    /// Validate the frame length against the downlink format, then
    /// compute the Mode S checksum over the whole frame. The field
    /// consumes no bit: the parity bytes are read again by the variants.
    fn read_crc(
        rest: &BitSlice<u8, Msb0>,
    ) -> Result<(&BitSlice<u8, Msb0>, u32), DekuError> {
        let (_, bytes, _) = rest.domain().region().ok_or_else(|| {
            DekuError::Assertion("Empty frame".to_string())
        })?;

        let df = bytes[0] >> 3;
        let expected = if df & 0x10 != 0 {
            MODES_LONG_MSG_BYTES
        } else {
            MODES_SHORT_MSG_BYTES
        };
        if bytes.len() != expected {
            return Err(DekuError::Assertion(format!(
                "Frame length {} does not match DF{}",
                bytes.len(),
                df
            )));
        }

        let crc = crc::modes_checksum(bytes, expected * 8)?;
        // Extended squitters carry a pure CRC in their parity field
        if let (17 | 18, c) = (df, crc) {
            if c > 0 && !crc::parity_is_zero(bytes) {
                return Err(DekuError::Assertion(format!(
                    "Invalid CRC in extended squitter: {c:06x}"
                )));
            }
        }
        Ok((rest, crc))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let crc = self.crc;
        match &self.df {
            DF::ShortAirAirSurveillance { vs, ac, .. } => {
                writeln!(f, " DF0. Short Air-Air Surveillance")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                if *vs == 0 {
                    writeln!(f, "  Air/Ground:    airborne")?;
                } else {
                    writeln!(f, "  Air/Ground:    ground")?;
                }
                if let Some(altitude) = ac.feet() {
                    writeln!(f, "  Altitude:      {altitude} ft barometric")?;
                }
            }
            DF::SurveillanceAltitudeReply { fs, ac, .. } => {
                writeln!(f, " DF4. Surveillance, Altitude Reply")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                writeln!(f, "  Air/Ground:    {fs}")?;
                if let Some(altitude) = ac.feet() {
                    writeln!(f, "  Altitude:      {altitude} ft barometric")?;
                }
            }
            DF::SurveillanceIdentityReply { fs, squawk, .. } => {
                writeln!(f, " DF5. Surveillance, Identity Reply")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                writeln!(f, "  Air/Ground:    {fs}")?;
                writeln!(f, "  Squawk:        {squawk}")?;
            }
            DF::AllCallReply {
                capability, icao, ..
            } => {
                writeln!(f, " DF11. All Call Reply")?;
                writeln!(f, "  ICAO Address:  {icao}")?;
                writeln!(f, "  Air/Ground:    {capability}")?;
            }
            DF::LongAirAirSurveillance { vs, ac, .. } => {
                writeln!(f, " DF16. Long Air-Air ACAS")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                if *vs == 0 {
                    writeln!(f, "  Air/Ground:    airborne")?;
                } else {
                    writeln!(f, "  Air/Ground:    ground")?;
                }
                if let Some(altitude) = ac.feet() {
                    writeln!(f, "  Baro altitude: {altitude} ft")?;
                }
            }
            DF::ADSB(msg) => {
                write!(f, "{msg}")?;
            }
            DF::TisB { cf, .. } => {
                write!(f, "{cf}")?;
            }
            DF::CommBAltitudeReply { ac, bds, .. } => {
                writeln!(f, " DF20. Comm-B, Altitude Reply")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                if let Some(altitude) = ac.feet() {
                    writeln!(f, "  Altitude:      {altitude} ft")?;
                }
                write!(f, "{bds}")?;
            }
            DF::CommBIdentityReply { squawk, bds, .. } => {
                writeln!(f, " DF21. Comm-B, Identity Reply")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
                writeln!(f, "  Squawk:        {squawk}")?;
                write!(f, "{bds}")?;
            }
            DF::CommDExtendedLengthMessage { .. } => {
                writeln!(f, " DF24. Comm-D Extended Length Message")?;
                writeln!(f, "  ICAO Address:  {crc:06x}")?;
            }
            DF::UnknownFormat { df, .. } => {
                writeln!(f, " DF{df}. Unknown downlink format")?;
            }
        }
        Ok(())
    }
}

/// A Mode S frame with the timestamp of its reception, in seconds from
/// any monotonic epoch (only differences are ever taken).
#[derive(Debug, PartialEq, serde::Serialize, Clone)]
pub struct TimedMessage {
    pub timestamp: f64,
    #[serde(skip)]
    pub frame: Vec<u8>,
    #[serde(flatten)]
    pub message: Option<Message>,
}

/// ICAO 24-bit transponder address, the identity of an airframe
#[derive(PartialEq, Eq, PartialOrd, DekuRead, Hash, Copy, Clone, Ord)]
pub struct ICAO(#[deku(bits = 24, endian = "big")] pub u32);

impl fmt::Debug for ICAO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl fmt::Display for ICAO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl Serialize for ICAO {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:06x}", &self.0))
    }
}

impl core::str::FromStr for ICAO {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(u32::from_str_radix(s, 16)?))
    }
}

/// The ICAO 24-bit address recovered from an address/parity field.
///
/// The trailing 24 bits were already folded into the checksum when the
/// frame was opened, so the reader discards what it reads and keeps the
/// residue passed down as context instead.
#[derive(PartialEq, Eq, PartialOrd, DekuRead, Hash, Copy, Clone, Ord)]
#[deku(ctx = "crc: u32")]
pub struct IcaoParity(
    #[deku(bits = 24, map = "|_v: u32| -> Result<_, DekuError> { Ok(crc) }")]
    pub u32,
);

impl fmt::Debug for IcaoParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl fmt::Display for IcaoParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl Serialize for IcaoParity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:06x}", &self.0))
    }
}

/// 13-bit identity code, i.e. the 4096-code Mode A squawk
///
/// The inner value is the hex number whose four nibbles happen to spell
/// the four octal digits of the code, e.g. `0x1200` for squawk 1200.
#[derive(PartialEq, Eq, DekuRead, Copy, Clone)]
pub struct IdentityCode(#[deku(reader = "Self::read(deku::rest)")] pub u16);

impl IdentityCode {
    fn read(
        rest: &BitSlice<u8, Msb0>,
    ) -> Result<(&BitSlice<u8, Msb0>, u16), DekuError> {
        let (rest, num) =
            u16::read(rest, (deku::ctx::Endian::Big, deku::ctx::BitSize(13)))?;
        Ok((rest, decode_id13(num)))
    }

    /// The four octal digits A, B, C, D of the identity code,
    /// each between 0 and 7
    pub fn digits(&self) -> [u8; 4] {
        [
            (self.0 >> 12) as u8 & 0x7,
            (self.0 >> 8) as u8 & 0x7,
            (self.0 >> 4) as u8 & 0x7,
            self.0 as u8 & 0x7,
        ]
    }
}

impl fmt::Debug for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl Serialize for IdentityCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:04x}", &self.0))
    }
}

/// 13-bit altitude code (AC field of DF 0, 4, 16, 20)
///
/// Bit layout: C1 A1 C2 A2 C4 A4 M B1 Q B2 D2 B4 D4.
/// With Q set, the remaining 11 bits form an integer n and the altitude
/// is 25·n − 1000 ft; with Q clear the bits carry a Gillham code. The M
/// bit selects a metric encoding, unused in practice and decoded as
/// unavailable. Corrupted Gillham codes decode as unavailable too.
#[derive(Debug, PartialEq, Eq, serde::Serialize, DekuRead, Copy, Clone)]
pub struct AC13Field(
    #[deku(reader = "Self::read(deku::rest)")] pub Option<i32>,
);

impl AC13Field {
    fn read(
        rest: &BitSlice<u8, Msb0>,
    ) -> Result<(&BitSlice<u8, Msb0>, Option<i32>), DekuError> {
        let (rest, field) =
            u16::read(rest, (deku::ctx::Endian::Big, deku::ctx::BitSize(13)))?;

        if field == 0 {
            return Ok((rest, None)); // not available
        }
        if field & 0x0040 != 0 {
            return Ok((rest, None)); // metric encoding, not assigned
        }
        if field & 0x0010 != 0 {
            // Q=1, 11-bit integer once Q and M are squeezed out
            let n = ((field & 0x1f80) >> 2)
                | ((field & 0x0020) >> 1)
                | (field & 0x000f);
            return Ok((rest, Some(i32::from(n) * 25 - 1000)));
        }
        // Q=0, Gillham-coded altitude
        let altitude = gray_to_feet(decode_id13(field)).ok();
        Ok((rest, altitude))
    }

    /// The decoded altitude in feet, if available
    pub fn feet(&self) -> Option<i32> {
        self.0
    }

    /// The decoded altitude in metres, if available
    pub fn meters(&self) -> Option<f64> {
        self.0.map(|ft| f64::from(ft) * FT_TO_M)
    }
}

/// Transponder level and additional information (3.1.2.5.2.2.1)
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
pub enum Capability {
    /// Level 1 transponder (surveillance only), airborne or on the ground
    #[deku(id = "0x00")]
    #[serde(rename = "level1")]
    Level1,
    #[deku(id_pat = "0x01..=0x03")]
    #[serde(rename = "reserved")]
    Reserved {
        #[deku(bits = "3")]
        ca: u8,
    },
    /// Level 2 or above transponder, on the ground
    #[deku(id = "0x04")]
    #[serde(rename = "ground")]
    Ground,
    /// Level 2 or above transponder, airborne
    #[deku(id = "0x05")]
    #[serde(rename = "airborne")]
    Airborne,
    /// Level 2 or above transponder, airborne or on the ground
    #[deku(id = "0x06")]
    #[serde(rename = "ground/airborne")]
    GroundAirborne,
    /// The DR field is not 0, or the FS field is 2 to 5,
    /// airborne or on the ground
    #[deku(id = "0x07")]
    #[serde(rename = "DR0")]
    Dr0,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Level1 => "Level 1",
                Self::Reserved { .. } => "reserved",
                Self::Ground => "ground",
                Self::Airborne => "airborne",
                Self::GroundAirborne => "ground/airborne",
                Self::Dr0 => "DR0",
            }
        )
    }
}

/// Alert, SPI and airborne/ground status (in DF 4, 5, 20 and 21)
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    NoAlertNoSpiAirborne = 0b000,
    NoAlertNoSpiOnGround = 0b001,
    AlertNoSpiAirborne = 0b010,
    AlertNoSpiOnGround = 0b011,
    AlertSpiAirborneGround = 0b100,
    NoAlertSpiAirborneGround = 0b101,
    Reserved = 0b110,
    NotAssigned = 0b111,
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::NoAlertNoSpiAirborne | Self::AlertNoSpiAirborne =>
                    "airborne",
                Self::NoAlertNoSpiOnGround | Self::AlertNoSpiOnGround =>
                    "ground",
                Self::AlertSpiAirborneGround
                | Self::NoAlertSpiAirborneGround => "airborne/ground",
                _ => "reserved",
            }
        )
    }
}

/// The downlink request (in DF 4, 5, 20 and 21)
#[derive(Debug, PartialEq, Eq, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "5")]
pub enum DownlinkRequest {
    #[deku(id = "0b00000")]
    None,
    #[deku(id = "0b00001")]
    RequestSendCommB,
    #[deku(id = "0b00100")]
    CommBBroadcastMsg1,
    #[deku(id = "0b00101")]
    CommBBroadcastMsg2,
    #[deku(id_pat = "_")]
    Unknown {
        #[deku(bits = "5")]
        dr: u8,
    },
}

/// The utility message (in DF 4, 5, 20 and 21)
#[derive(Debug, PartialEq, Eq, DekuRead, Copy, Clone)]
pub struct UtilityMessage {
    /// IIS: the interrogator identifier subfield
    #[deku(bits = "4")]
    pub iis: u8,
    /// IDS: the type of the reservation made by the interrogator
    pub ids: UtilityMessageType,
}

#[derive(Debug, PartialEq, Eq, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "2")]
pub enum UtilityMessageType {
    NoInformation = 0b00,
    CommB = 0b01,
    CommC = 0b10,
    CommD = 0b11,
}

/// The control field in DF18 frames
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Clone)]
pub struct ControlField {
    #[serde(skip)]
    pub t: ControlFieldType,
    /// AA: address announced
    #[serde(rename = "icao24")]
    pub aa: ICAO,
    /// ME: message, extended squitter
    #[serde(flatten)]
    pub me: ME,
}

impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " DF18. Extended Squitter {}", self.t)?;
        writeln!(f, "  Address:       {}", self.aa)?;
        write!(f, "{}", self.me)
    }
}

/// The addressing scheme of a DF18 extended squitter
#[derive(Debug, PartialEq, serde::Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
pub enum ControlFieldType {
    /// ADS-B message from a non-transponder device
    #[deku(id = "0")]
    AdsbEsNt,
    /// Reserved for ADS-B ES/NT devices in an alternate address space
    #[deku(id = "1")]
    AdsbEsNtAlt,
    /// Fine format TIS-B message
    #[deku(id = "2")]
    TisbFine,
    /// Coarse format TIS-B message
    #[deku(id = "3")]
    TisbCoarse,
    /// TIS-B management message
    #[deku(id = "4")]
    TisbManage,
    /// TIS-B relay of an ADS-B message with an anonymous 24-bit address
    #[deku(id = "5")]
    TisbRelay,
    /// ADS-B rebroadcast with the same type codes as DF=17
    #[deku(id = "6")]
    AdsbRebroadcast,
    /// Reserved
    #[deku(id = "7")]
    Reserved,
}

impl fmt::Display for ControlFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::AdsbEsNt | Self::AdsbEsNtAlt => "(ADS-B)",
                Self::TisbFine | Self::TisbCoarse | Self::TisbRelay =>
                    "(TIS-B)",
                Self::TisbManage | Self::AdsbRebroadcast => "(ADS-R)",
                Self::Reserved => "(unknown addressing scheme)",
            }
        )
    }
}

/// Uplink or downlink ELM control (DF 24)
#[derive(Debug, PartialEq, Eq, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "1")]
pub enum KE {
    DownlinkELMTx = 0,
    UplinkELMAck = 1,
}

/// Reorder an interleaved 13-bit identity or altitude field into
/// [Gillham](https://en.wikipedia.org/wiki/Gillham_code) nibble form.
///
/// On the wire (message bits 20 to 32) the bits come as
/// C1 A1 C2 A2 C4 A4 X B1 D1 B2 D2 B4 D4; the returned value groups
/// them as the hex number 0xABCD where every nibble holds one octal
/// digit (the X bit, M or spare depending on the field, is dropped).
#[rustfmt::skip]
pub fn decode_id13(field: u16) -> u16 {
    let mut gillham: u16 = 0;

    if field & 0x1000 != 0 { gillham |= 0x0010; } // Bit 12 = C1
    if field & 0x0800 != 0 { gillham |= 0x1000; } // Bit 11 = A1
    if field & 0x0400 != 0 { gillham |= 0x0020; } // Bit 10 = C2
    if field & 0x0200 != 0 { gillham |= 0x2000; } // Bit  9 = A2
    if field & 0x0100 != 0 { gillham |= 0x0040; } // Bit  8 = C4
    if field & 0x0080 != 0 { gillham |= 0x4000; } // Bit  7 = A4
    // bit 6 is X (or M), never part of the code
    if field & 0x0020 != 0 { gillham |= 0x0100; } // Bit  5 = B1
    if field & 0x0010 != 0 { gillham |= 0x0001; } // Bit  4 = D1 (or Q)
    if field & 0x0008 != 0 { gillham |= 0x0200; } // Bit  3 = B2
    if field & 0x0004 != 0 { gillham |= 0x0002; } // Bit  2 = D2
    if field & 0x0002 != 0 { gillham |= 0x0400; } // Bit  1 = B4
    if field & 0x0001 != 0 { gillham |= 0x0004; } // Bit  0 = D4

    gillham
}

/// Convert a Gillham code (in nibble form, see [`decode_id13`]) to an
/// altitude in feet, between −1200 and 126 700 ft. Anything outside
/// that range, or any unassigned code, marks a corrupted transmission.
#[rustfmt::skip]
pub fn gray_to_feet(gray: u16) -> Result<i32, &'static str> {
    let mut five_hundreds: u32 = 0;
    let mut one_hundreds: u32 = 0;

    // D1 and the unassigned bits must be clear, C1..C4 must not be all zero
    if (gray & 0x8889) != 0 || (gray & 0x00f0) == 0 {
        return Err("Invalid altitude code");
    }

    if gray & 0x0010 != 0 { one_hundreds ^= 0x007; } // C1
    if gray & 0x0020 != 0 { one_hundreds ^= 0x003; } // C2
    if gray & 0x0040 != 0 { one_hundreds ^= 0x001; } // C4

    // remove 7s (make 7 -> 5, and 5 -> 7)
    if (one_hundreds & 5) == 5 { one_hundreds ^= 2; }
    // only codes 1 to 5 are assigned
    if one_hundreds > 5 { return Err("Invalid altitude code"); }

    if gray & 0x0002 != 0 { five_hundreds ^= 0x0ff; } // D2
    if gray & 0x0004 != 0 { five_hundreds ^= 0x07f; } // D4
    if gray & 0x1000 != 0 { five_hundreds ^= 0x03f; } // A1
    if gray & 0x2000 != 0 { five_hundreds ^= 0x01f; } // A2
    if gray & 0x4000 != 0 { five_hundreds ^= 0x00f; } // A4
    if gray & 0x0100 != 0 { five_hundreds ^= 0x007; } // B1
    if gray & 0x0200 != 0 { five_hundreds ^= 0x003; } // B2
    if gray & 0x0400 != 0 { five_hundreds ^= 0x001; } // B4

    // the one_hundreds sequence reverses on odd five_hundreds
    if five_hundreds & 1 != 0 && one_hundreds <= 6 {
        one_hundreds = 6 - one_hundreds;
    }

    let feet = (five_hundreds * 5 + one_hundreds) as i32 * 100 - 1300;
    if (-1200..=126_700).contains(&feet) {
        Ok(feet)
    } else {
        Err("Altitude out of range")
    }
}
