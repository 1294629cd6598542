use deku::bitvec::{BitSlice, Msb0};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Aircraft Identification and Category (BDS 0,8)
 *
 * Broadcasts the identification (the callsign) and the wake vortex
 * category of the aircraft.
 *
 * | TC  | CA  | C1  | C2  | C3  | C4  | C5  | C6  | C7  | C8  |
 * | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |
 * | 5   | 3   | 6   | 6   | 6   | 6   | 6   | 6   | 6   | 6   |
 *
 * TC: type code, CA: aircraft category, C*: one 6-bit character
 */
#[derive(Debug, PartialEq, DekuRead, Serialize, Clone)]
pub struct AircraftIdentification {
    /// The type code, naming one of the category sets A to D
    #[serde(skip)]
    pub tc: CategorySet,

    /// The category of the aircraft within its set
    #[deku(bits = "3")]
    #[serde(skip)]
    pub ca: u8,

    /// The emitter category, from the {type code, category} pair
    #[deku(reader = "emitter_category(deku::rest, *tc, *ca)")]
    pub category: EmitterCategory,

    /// The eight characters of the callsign, trailing spaces included
    #[deku(reader = "callsign_read(deku::rest)")]
    pub callsign: String,
}

#[derive(Debug, PartialEq, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "5")]
pub enum CategorySet {
    /// Reserved
    D = 1,
    /// Surface vehicles and obstructions
    C = 2,
    /// Gliders, lighter-than-air, ultralights, UAV, space vehicles
    B = 3,
    /// Aircraft, by increasing weight class
    A = 4,
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::D => "D",
                Self::C => "C",
                Self::B => "B",
                Self::A => "A",
            }
        )
    }
}

/**
 * The ADS-B emitter category (DO-260B Table 2-13), distinct from the
 * ICAO wake turbulence category used in flight plans. The mapping to
 * WTC goes: L is (A, 1), M is (A, 2) or (A, 3), H and J are (A, 5).
 */
#[derive(Debug, PartialEq, Serialize, Copy, Clone)]
pub enum EmitterCategory {
    #[serde(rename = "n/a")]
    NoInformation,
    Reserved,

    // set A
    #[serde(rename = "Light (< 15500 lbs)")]
    Light,
    #[serde(rename = "Small (15500 to 75000 lbs)")]
    Small,
    #[serde(rename = "Large (75000 to 300000 lbs)")]
    Large,
    #[serde(rename = "High vortex large")]
    HighVortexLarge,
    #[serde(rename = "Heavy (> 300000 lbs)")]
    Heavy,
    #[serde(rename = "High performance")]
    HighPerformance,
    Rotorcraft,

    // set B
    Glider,
    #[serde(rename = "Lighter than air")]
    LighterThanAir,
    Parachutist,
    Ultralight,
    #[serde(rename = "UAV")]
    Unmanned,
    Space,

    // set C
    #[serde(rename = "Surface emergency vehicle")]
    EmergencyVehicle,
    #[serde(rename = "Surface service vehicle")]
    ServiceVehicle,
    Obstruction,
}

impl fmt::Display for EmitterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match &self {
            Self::NoInformation => "No category information",
            Self::Reserved => "Reserved",
            Self::Light => "Light aircraft (less than 15500 lbs)",
            Self::Small => "Small aircraft (15500 to 75000 lbs)",
            Self::Large => "Large aircraft (75000 to 300000 lbs)",
            Self::HighVortexLarge => "High vortex large aircraft",
            Self::Heavy => "Heavy aircraft (larger than 300000 lbs)",
            Self::HighPerformance => {
                "High performance (>5 g) and high speed (>400 kt)"
            }
            Self::Rotorcraft => "Rotorcraft",
            Self::Glider => "Glider, sailplane",
            Self::LighterThanAir => "Lighter than air",
            Self::Parachutist => "Parachutist, skydiver",
            Self::Ultralight => "Ultralight, hang-glider, paraglider",
            Self::Unmanned => "Unmanned aerial vehicle",
            Self::Space => "Space or transatmospheric vehicle",
            Self::EmergencyVehicle => "Surface emergency vehicle",
            Self::ServiceVehicle => "Surface service vehicle",
            Self::Obstruction => "Ground obstruction",
        };
        write!(f, "{text}")
    }
}

pub fn emitter_category(
    rest: &BitSlice<u8, Msb0>,
    tc: CategorySet,
    ca: u8,
) -> Result<(&BitSlice<u8, Msb0>, EmitterCategory), DekuError> {
    let category = match (tc, ca) {
        (CategorySet::D, _) => EmitterCategory::Reserved,
        (_, 0) => EmitterCategory::NoInformation,
        (CategorySet::A, 1) => EmitterCategory::Light,
        (CategorySet::A, 2) => EmitterCategory::Small,
        (CategorySet::A, 3) => EmitterCategory::Large,
        (CategorySet::A, 4) => EmitterCategory::HighVortexLarge,
        (CategorySet::A, 5) => EmitterCategory::Heavy,
        (CategorySet::A, 6) => EmitterCategory::HighPerformance,
        (CategorySet::A, 7) => EmitterCategory::Rotorcraft,
        (CategorySet::B, 1) => EmitterCategory::Glider,
        (CategorySet::B, 2) => EmitterCategory::LighterThanAir,
        (CategorySet::B, 3) => EmitterCategory::Parachutist,
        (CategorySet::B, 4) => EmitterCategory::Ultralight,
        (CategorySet::B, 6) => EmitterCategory::Unmanned,
        (CategorySet::B, 7) => EmitterCategory::Space,
        (CategorySet::C, 1) => EmitterCategory::EmergencyVehicle,
        (CategorySet::C, 3) => EmitterCategory::ServiceVehicle,
        (CategorySet::C, 4..=7) => EmitterCategory::Obstruction,
        _ => EmitterCategory::Reserved,
    };
    Ok((rest, category))
}

/// 6-bit character mapping of ICAO Annex 10 Vol IV Table 3-7: 1 to 26
/// for the letters, 48 to 57 for the digits, 32 for space. Unassigned
/// codes come out as '#'.
const CHAR_LOOKUP: &[u8; 64] =
    b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ##### ###############0123456789######";

/// Read the eight 6-bit characters of a callsign. Unused character
/// positions are transmitted as spaces and kept, so the string is
/// always 8 characters long.
pub fn callsign_read(
    rest: &BitSlice<u8, Msb0>,
) -> Result<(&BitSlice<u8, Msb0>, String), DekuError> {
    let mut inside_rest = rest;
    let mut callsign = String::with_capacity(8);
    for _ in 0..8 {
        let (for_rest, c) = u8::read(inside_rest, deku::ctx::BitSize(6))?;
        callsign.push(CHAR_LOOKUP[c as usize] as char);
        inside_rest = for_rest;
    }
    Ok((inside_rest, callsign))
}

impl fmt::Display for AircraftIdentification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Aircraft identification and category (BDS 0,8)")?;
        writeln!(f, "  Callsign:      {}", self.callsign.trim_end())?;
        writeln!(f, "  Category:      {}", &self.category)?;
        Ok(())
    }
}
