use super::bds30::ResolutionAdvisory;
use crate::decode::IdentityCode;
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Aircraft Status (BDS 6,1 / TC=28)
 *
 * Extended squitter message with two assigned subtypes: subtype 1
 * carries the emergency/priority status together with the Mode A
 * code, subtype 2 rebroadcasts the active ACAS resolution advisory
 * (the 48-bit record of register 3,0, without its selector byte).
 *
 * | TC | SUBTYPE | content                        |
 * | -- | ------- | ------------------------------ |
 * | 5  | 3       | 48                             |
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[deku(type = "u8", bits = "3")]
#[serde(untagged)]
pub enum AircraftStatus {
    #[deku(id = "1")]
    EmergencyPriority(EmergencyPriorityStatus),

    #[deku(id = "2")]
    ACASRaBroadcast(ResolutionAdvisory),

    /// Subtype 0 (no information) and the reserved subtypes, kept raw
    #[deku(id_pat = "_")]
    #[serde(skip)]
    NoInformation {
        #[deku(bits = "3")]
        subtype: u8,
        data: [u8; 6],
    },
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct EmergencyPriorityStatus {
    /// The emergency state
    pub emergency_state: EmergencyState,

    /// The Mode A identity code (squawk)
    pub squawk: IdentityCode,

    #[deku(bits = "32")]
    #[serde(skip)]
    pub reserved: u32,
}

/// The 3-bit emergency state of subtype 1. The states tied to the
/// conventional Mode A codes are set whenever the matching code (7500,
/// 7600, 7700) is provided to the transponder.
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
#[serde(rename_all = "snake_case")]
pub enum EmergencyState {
    None = 0,
    General = 1,
    Medical = 2,
    MinimumFuel = 3,
    NoCommunication = 4,
    UnlawfulInterference = 5,
    DownedAircraft = 6,
    Reserved = 7,
}

impl fmt::Display for EmergencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "No emergency",
            Self::General => "General emergency (7700)",
            Self::Medical => "Lifeguard/medical emergency",
            Self::MinimumFuel => "Minimum fuel",
            Self::NoCommunication => "No communication (7600)",
            Self::UnlawfulInterference => "Unlawful interference (7500)",
            Self::DownedAircraft => "Downed aircraft",
            Self::Reserved => "Reserved",
        };
        write!(f, "{text}")
    }
}

impl fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Aircraft status (BDS 6,1)")?;
        match self {
            Self::EmergencyPriority(status) => {
                writeln!(f, "  Squawk:        {}", status.squawk)?;
                writeln!(f, "  Emergency:     {}", status.emergency_state)?;
            }
            Self::ACASRaBroadcast(advisory) => {
                write!(f, "{advisory}")?;
            }
            Self::NoInformation { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_emergency_priority() {
        // crafted: subtype 1, unlawful interference, squawk 1234
        let msg = Message::from_hex("8d4ca7b5e1bc0900000000c3cd64").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS61(AircraftStatus::EmergencyPriority(status)) =
                adsb.message
            {
                assert_eq!(
                    status.emergency_state,
                    EmergencyState::UnlawfulInterference
                );
                assert_eq!(format!("{}", status.squawk), "1234");
                return;
            }
        }
        unreachable!();
    }

    #[test]
    fn test_ra_broadcast() {
        // crafted: subtype 2 carrying the 3,0 advisory record
        let msg = Message::from_hex("8d3c6dd0e2c60085329ed4d533d8").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS61(AircraftStatus::ACASRaBroadcast(advisory)) =
                adsb.message
            {
                assert!(advisory.has_ra());
                assert!(!advisory.terminated);
                assert!(advisory.no_turn_left);
                return;
            }
        }
        unreachable!();
    }
}
