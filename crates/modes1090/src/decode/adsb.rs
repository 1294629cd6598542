use super::bds::{bds05, bds06, bds08, bds09, bds61, bds65};
use super::{Capability, ICAO};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * An ADS-B frame is 112 bits long and breaks down into five parts:
 *
 * +----------+----------+-------------+------------------------+-----------+
 * |  DF (5)  |  CA (3)  |  ICAO (24)  |         ME (56)        |  PI (24)  |
 * +----------+----------+-------------+------------------------+-----------+
 *
 * The 56-bit ME field is itself dispatched on its 5 leading bits, the
 * type code.
 */
#[derive(Debug, PartialEq, DekuRead, Clone, Serialize)]
pub struct ExtendedSquitter {
    /// CA: transponder capability
    #[serde(skip)]
    pub capability: Capability,

    /// AA: the transmitter ICAO address
    pub icao24: ICAO,

    /// ME: the message, dispatched on its type code
    #[serde(flatten)]
    pub message: ME,

    /// PI: parity/interrogator identifier
    #[serde(skip)]
    pub parity: ICAO,
}

impl fmt::Display for ExtendedSquitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " DF17. Extended Squitter")?;
        writeln!(f, "  Address:       {}", &self.icao24)?;
        writeln!(f, "  Air/Ground:    {}", &self.capability)?;
        write!(f, "{}", &self.message)
    }
}

/*
 * |  Type code  |  Content                      |  Register |
 * | ----------- | ----------------------------- | --------- |
 * | 1..=4       | [`ME::BDS08`] identification  |  0,8      |
 * | 5..=8       | [`ME::BDS06`] surface pos.    |  0,6      |
 * | 9..=18      | [`ME::BDS05`] airborne (baro) |  0,5      |
 * | 19          | [`ME::BDS09`] velocity        |  0,9      |
 * | 20..=22     | [`ME::BDS05`] airborne (GNSS) |  0,5      |
 * | 28          | [`ME::BDS61`] aircraft status |  6,1      |
 * | 31          | [`ME::BDS65`] operct. status  |  6,5      |
 * | others      | [`ME::Unknown`], kept raw     |           |
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[deku(type = "u8", bits = "5")]
#[serde(tag = "BDS")]
pub enum ME {
    #[deku(id_pat = "1..=4")]
    #[serde(rename = "0,8")]
    BDS08(bds08::AircraftIdentification),

    #[deku(id_pat = "5..=8")]
    #[serde(rename = "0,6")]
    BDS06(bds06::SurfacePosition),

    #[deku(id_pat = "9..=18 | 20..=22")]
    #[serde(rename = "0,5")]
    BDS05(bds05::AirbornePosition),

    #[deku(id = "19")]
    #[serde(rename = "0,9")]
    BDS09(bds09::AirborneVelocity),

    #[deku(id = "28")]
    #[serde(rename = "6,1")]
    BDS61(bds61::AircraftStatus),

    #[deku(id = "31")]
    #[serde(rename = "6,5")]
    BDS65(bds65::OperationStatus),

    /// Type codes without a decoder (0, 23..=27, 29, 30), among which
    /// target state and status (29) and the military applications; the
    /// raw ME bits are preserved for forward compatibility.
    #[deku(id_pat = "_")]
    #[serde(skip)]
    Unknown(UnknownExtendedSquitter),
}

/// The raw content of an extended squitter without a decoder
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct UnknownExtendedSquitter {
    #[deku(bits = "5")]
    pub type_code: u8,
    /// ME bits 6 to 53
    pub me: [u8; 6],
    /// ME bits 54 to 56
    #[deku(bits = "3")]
    pub trailing: u8,
}

impl fmt::Display for ME {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ME::BDS05(me) => write!(f, "{me}"),
            ME::BDS06(me) => write!(f, "{me}"),
            ME::BDS08(me) => write!(f, "{me}"),
            ME::BDS09(me) => write!(f, "{me}"),
            ME::BDS61(me) => write!(f, "{me}"),
            ME::BDS65(me) => write!(f, "{me}"),
            ME::Unknown(me) => {
                writeln!(f, "  Unknown type code ({})", me.type_code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Message, DF};
    use hexlit::hex;

    #[test]
    fn test_icao24() {
        let bytes = hex!("8D406B902015A678D4D220AA4BDA");
        let msg = Message::from_bytes((&bytes, 0)).unwrap().1;
        if let DF::ADSB(msg) = msg.df {
            assert_eq!(format!("{}", msg.icao24), "406b90");
            return;
        }
        unreachable!();
    }

    #[test]
    fn test_unknown_type_code() {
        // a type code 29 (target state and status) survives undecoded
        let bytes = hex!("8DA05629EA21485CBF3F8CADAEEB");
        let msg = Message::from_bytes((&bytes, 0)).unwrap().1;
        if let DF::ADSB(msg) = msg.df {
            if let ME::Unknown(raw) = msg.message {
                assert_eq!(raw.type_code, 29);
                assert_eq!(raw.me, [0x44, 0x29, 0x0b, 0x97, 0xe7, 0xf1]);
                assert_eq!(raw.trailing, 4);
                return;
            }
        }
        unreachable!();
    }
}
