use super::bds08;
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Aircraft Identification (BDS 2,0)
 *
 * The Comm-B side of the identification: the same eight 6-bit
 * characters as the extended squitter identification (BDS 0,8), behind
 * the register selector byte 0x20.
 *
 * | BDS | C1 | C2 | C3 | C4 | C5 | C6 | C7 | C8 |
 * | --- | -- | -- | -- | -- | -- | -- | -- | -- |
 * | 8   | 6  | 6  | 6  | 6  | 6  | 6  | 6  | 6  |
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[serde(tag = "bds", rename = "20")]
pub struct AircraftIdentification {
    /// The register selector, always 0x20
    #[deku(bits = "8", map = "fail_if_not20")]
    #[serde(skip)]
    pub bds: u8,

    /// The eight characters of the callsign, trailing spaces included
    #[deku(reader = "bds08::callsign_read(deku::rest)")]
    pub callsign: String,
}

fn fail_if_not20(value: u8) -> Result<u8, DekuError> {
    if value == 0x20 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "First byte must be 0x20 in BDS 2,0".into(),
        ))
    }
}

impl fmt::Display for AircraftIdentification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Aircraft identification (BDS 2,0)")?;
        writeln!(f, "  Callsign:      {}", self.callsign.trim_end())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_valid_bds20() {
        let msg = Message::from_hex("a0001838201584f23468207cdfa5").unwrap();
        if let CommBAltitudeReply { bds, .. } = msg.df {
            assert_eq!(
                bds.bds20,
                Some(super::AircraftIdentification {
                    bds: 32,
                    callsign: "EXS2MF  ".to_string()
                })
            );
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_crafted_bds20() {
        // DF21 whose MB carries register 2,0 with callsign GNH2015
        let msg = Message::from_hex("a8001c09201ce232c31d60dd95e1").unwrap();
        match msg.df {
            CommBIdentityReply { squawk, bds, ap, .. } => {
                assert_eq!(format!("{squawk}"), "1234");
                assert_eq!(ap.0, 0x4ca7b5);
                assert_eq!(
                    bds.bds20.map(|id| id.callsign),
                    Some("GNH2015 ".to_string())
                );
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_other_selector_byte() {
        let msg = Message::from_hex("a800178d10010080f50000d5893c").unwrap();
        if let CommBIdentityReply { bds, .. } = msg.df {
            assert_eq!(bds.bds20, None);
        } else {
            unreachable!();
        }
    }
}
