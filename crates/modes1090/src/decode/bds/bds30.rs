use crate::decode::{AC13Field, ICAO};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## ACAS Active Resolution Advisory (BDS 3,0)
 *
 * Reports the resolution advisories (RA) currently generated by the
 * ACAS equipment. The register holds the selector byte followed by the
 * 48-bit advisory record; the same record is broadcast without the
 * selector in extended squitter aircraft status messages (type code
 * 28, subtype 2).
 *
 * | BDS | ARA | RAC | RAT | MTE | TTI | TID |
 * | --- | --- | --- | --- | --- | --- | --- |
 * | 8   | 14  | 4   | 1   | 1   | 2   | 26  |
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[serde(tag = "bds", rename = "30")]
pub struct ACASResolutionAdvisory {
    /// The register selector, always 0x30
    #[deku(bits = "8", map = "fail_if_not30")]
    #[serde(skip)]
    pub bds: u8,

    #[serde(flatten)]
    pub advisory: ResolutionAdvisory,
}

fn fail_if_not30(value: u8) -> Result<u8, DekuError> {
    if value == 0x30 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "First byte must be 0x30 in BDS 3,0".into(),
        ))
    }
}

/**
 * The 48-bit active RA record.
 *
 * The 14 ARA bits carry two overlapping encodings selected by the
 * leading bit together with the multiple-threat flag; the raw field is
 * kept as transmitted and [`ResolutionAdvisory::advisory`] returns the
 * discriminated interpretation, so the two readings cannot be mixed up.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
pub struct ResolutionAdvisory {
    /// ARA: the active resolution advisory register, raw
    #[deku(bits = "14", endian = "big")]
    pub active_ra: u16,

    /// RAC: do not pass below
    #[deku(bits = "1")]
    pub no_pass_below: bool,
    /// RAC: do not pass above
    #[deku(bits = "1")]
    pub no_pass_above: bool,
    /// RAC: do not turn left
    #[deku(bits = "1")]
    pub no_turn_left: bool,
    /// RAC: do not turn right
    #[deku(bits = "1")]
    pub no_turn_right: bool,

    /// RAT: the advisory was terminated by the ACAS
    #[deku(bits = "1")]
    pub terminated: bool,

    /// MTE: more than one threat is being processed
    #[deku(bits = "1")]
    pub multiple_threats: bool,

    /// TTI and the threat identity data
    #[serde(flatten)]
    pub threat: ThreatIdentity,
}

impl ResolutionAdvisory {
    /// Whether an advisory is currently active
    pub fn has_ra(&self) -> bool {
        self.active_ra & 0x2000 != 0 || self.multiple_threats
    }

    /// The active interpretation of the ARA bits 41 to 47
    pub fn advisory(&self) -> ActiveResolutionAdvisory {
        let bit = |mask: u16| self.active_ra & mask != 0;
        if bit(0x2000) {
            // one threat, or several with advisories in a common direction
            ActiveResolutionAdvisory::SingleThreat {
                corrective: bit(0x1000),
                downward_sense: bit(0x0800),
                increased_rate: bit(0x0400),
                sense_reversal: bit(0x0200),
                altitude_crossing: bit(0x0100),
                positive: bit(0x0080),
            }
        } else if self.multiple_threats {
            ActiveResolutionAdvisory::MultipleThreats {
                upward_correction: bit(0x1000),
                positive_climb: bit(0x0800),
                downward_correction: bit(0x0400),
                positive_descent: bit(0x0200),
                altitude_crossing: bit(0x0100),
                sense_reversal: bit(0x0080),
            }
        } else {
            ActiveResolutionAdvisory::None
        }
    }
}

/// The discriminated reading of the ARA bits: the same bits mean
/// different things depending on the leading ARA bit and the
/// multiple-threat flag.
#[derive(Debug, PartialEq, Eq, Serialize, Copy, Clone)]
pub enum ActiveResolutionAdvisory {
    /// No advisory is active
    None,
    /// One threat, or several threats treated in the same direction
    /// (ARA bit 41 set)
    SingleThreat {
        /// Corrective (true) or preventive (false)
        corrective: bool,
        /// Downward sense (true) or upward sense (false)
        downward_sense: bool,
        /// The advisory requires an increased rate
        increased_rate: bool,
        /// The advisory reversed the sense of an earlier one
        sense_reversal: bool,
        /// The advisory crosses the threat altitude
        altitude_crossing: bool,
        /// Positive advisory (true) or vertical speed limit (false)
        positive: bool,
    },
    /// Several threats with advisories in different directions
    /// (ARA bit 41 clear, MTE set)
    MultipleThreats {
        /// Requires a correction in the upward sense
        upward_correction: bool,
        /// Requires a positive climb
        positive_climb: bool,
        /// Requires a correction in the downward sense
        downward_correction: bool,
        /// Requires a positive descent
        positive_descent: bool,
        /// Requires crossing the threat altitude
        altitude_crossing: bool,
        /// The advisory reversed the sense of an earlier one
        sense_reversal: bool,
    },
}

/// TTI and the 26-bit threat identity data. The reserved indicator
/// value 3 has no variant: it fails the whole record, as do non-zero
/// padding bits.
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[deku(type = "u8", bits = "2")]
#[serde(untagged)]
pub enum ThreatIdentity {
    /// No identity data
    #[deku(id = "0")]
    None {
        #[deku(bits = "26", endian = "big", assert_eq = "0")]
        #[serde(skip)]
        zeros: u32,
    },

    /// The threat is named by its Mode S address
    #[deku(id = "1")]
    AircraftAddress {
        #[serde(rename = "threat_identity")]
        address: ICAO,
        #[deku(bits = "2", assert_eq = "0")]
        #[serde(skip)]
        zeros: u8,
    },

    /// The threat is located by altitude, range and bearing
    #[deku(id = "2")]
    BearingRangeAltitude(ThreatLocation),
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct ThreatLocation {
    /// The threat altitude, a 13-bit altitude code
    #[serde(rename = "threat_altitude")]
    pub altitude: AC13Field,

    /// The most recent threat range from the ACAS, in NM: 0.05 for the
    /// first code, then a 0.1 NM resolution, saturating above 12.55
    #[deku(
        bits = "7",
        map = "|n: u8| -> Result<_, DekuError> {
            Ok(match n {
                0 => None,
                1 => Some(0.05),
                127 => Some(12.55),
                n => Some(f64::from(n - 1) / 10.),
            })
        }"
    )]
    #[serde(rename = "threat_range")]
    pub range: Option<f64>,

    /// The most recent threat bearing relative to own heading, in
    /// degrees at the middle of a 6° sector; codes above 60 unassigned
    #[deku(
        bits = "6",
        map = "|n: u8| -> Result<_, DekuError> {
            Ok(match n {
                1..=60 => Some(6. * (f64::from(n) - 0.5)),
                _ => None,
            })
        }"
    )]
    #[serde(rename = "threat_bearing")]
    pub bearing: Option<f64>,
}

impl fmt::Display for ACASResolutionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  ACAS active resolution advisory (BDS 3,0)")?;
        write!(f, "{}", self.advisory)
    }
}

impl fmt::Display for ResolutionAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.advisory() {
            ActiveResolutionAdvisory::None => {
                writeln!(f, "  No active resolution advisory")?;
            }
            ActiveResolutionAdvisory::SingleThreat {
                corrective,
                downward_sense,
                ..
            } => {
                writeln!(
                    f,
                    "  Active RA:     {} {}",
                    if corrective { "corrective" } else { "preventive" },
                    if downward_sense { "descend" } else { "climb" },
                )?;
            }
            ActiveResolutionAdvisory::MultipleThreats { .. } => {
                writeln!(f, "  Active RA:     multiple threats")?;
            }
        }
        if self.terminated {
            writeln!(f, "  RA terminated")?;
        }
        Ok(())
    }
}
