use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Aircraft Operational Status (BDS 6,5 / TC=31)
 *
 * Capability classes and current operational modes of the ATC-related
 * applications on board, together with the ADS-B version and the
 * accuracy/integrity indicators attached to it (DO-260B 2.2.3.2.7.2).
 *
 * | TC | SUB | CC/CC+LW | OM | VER | NICa | NACp | GVA | SIL | ... |
 * | -- | --- | -------- | -- | --- | ---- | ---- | --- | --- | --- |
 * | 5  | 3   | 16 / 20  | 16 | 3   | 1    | 4    | 2   | 2   | 5   |
 *
 * Subtype 0 is the airborne layout, subtype 1 the surface one (no
 * capability for target state reports, but length/width codes and the
 * GPS antenna offset instead).
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
#[serde(untagged)]
pub enum OperationStatus {
    #[deku(id = "0")]
    Airborne(OperationStatusAirborne),

    #[deku(id = "1")]
    Surface(OperationStatusSurface),

    #[deku(id_pat = "_")]
    #[serde(skip)]
    Reserved {
        #[deku(bits = "3")]
        subtype: u8,
        data: [u8; 6],
    },
}

impl OperationStatus {
    /// The ADS-B version advertised in bits 41 to 43: 0 for DO-260,
    /// 1 for DO-260A, 2 for DO-260B
    pub fn version(&self) -> Option<u8> {
        let version = match self {
            Self::Airborne(status) => &status.version,
            Self::Surface(status) => &status.version,
            Self::Reserved { .. } => return None,
        };
        match version {
            ADSBVersion::V0(_) => Some(0),
            ADSBVersion::V1(_) => Some(1),
            ADSBVersion::V2(_) => Some(2),
            ADSBVersion::Unsupported { version, .. } => Some(*version),
        }
    }

    /// The NIC supplement A bit, feeding the containment radius lookup
    /// of the airborne position messages (version 2 only)
    pub fn nic_supplement_a(&self) -> Option<u8> {
        let version = match self {
            Self::Airborne(status) => &status.version,
            Self::Surface(status) => &status.version,
            Self::Reserved { .. } => return None,
        };
        match version {
            ADSBVersion::V2(v2) => Some(v2.nic_a),
            _ => None,
        }
    }

    /// Whether the aircraft can receive ADS-B on 1090 MHz extended
    /// squitter
    pub fn has_1090es_in(&self) -> bool {
        match self {
            Self::Airborne(status) => status.capability_class.es1090_in,
            Self::Surface(status) => status.capability_class.es1090_in,
            Self::Reserved { .. } => false,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct OperationStatusAirborne {
    /// CC: the airborne capability class
    #[serde(flatten)]
    pub capability_class: CapabilityClassAirborne,

    /// OM: the operational mode
    #[serde(skip)]
    pub operational_mode: OperationalMode,

    /// The version and its accuracy/integrity indicators; the byte
    /// before is the reserved half of the OM field
    #[deku(pad_bytes_before = "1")]
    #[serde(flatten)]
    pub version: ADSBVersion,
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct CapabilityClassAirborne {
    #[deku(bits = "2", assert_eq = "0")]
    #[serde(skip)]
    pub reserved0: u8,

    /// TCAS operational
    #[deku(bits = "1")]
    #[serde(rename = "ACAS")]
    pub acas: bool,

    /// 1090ES IN: reception of ADS-B on 1090 MHz extended squitter
    #[deku(bits = "1")]
    #[serde(rename = "1090ES")]
    pub es1090_in: bool,

    #[deku(bits = "2", assert_eq = "0")]
    #[serde(skip)]
    pub reserved1: u8,

    /// Air-referenced velocity report capability
    #[deku(bits = "1")]
    #[serde(rename = "ARV")]
    pub arv: bool,

    /// Target state report capability
    #[deku(bits = "1")]
    #[serde(rename = "TS")]
    pub ts: bool,

    /// Target trajectory change report capability: 0 for none, 1 for
    /// TC+0 only, 2 for multiple reports, 3 reserved
    #[deku(bits = "2")]
    #[deku(pad_bits_after = "6")]
    #[serde(rename = "TC")]
    pub tc: u8,
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct OperationStatusSurface {
    /// CC: the surface capability class
    #[serde(flatten)]
    pub capability_class: CapabilityClassSurface,

    /// The length/width code of the airframe (2.2.3.2.7.2.12)
    #[deku(bits = "4")]
    #[serde(rename = "L/W")]
    pub lw_codes: u8,

    /// OM: the operational mode
    #[serde(skip)]
    pub operational_mode: OperationalMode,

    /// The longitudinal distance of the GPS antenna from the nose, in
    /// the second half of the surface OM field (2.2.3.2.7.2.4.7)
    #[serde(skip)]
    pub gps_antenna_offset: u8,

    /// The version and its accuracy/integrity indicators
    #[serde(flatten)]
    pub version: ADSBVersion,
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct CapabilityClassSurface {
    #[deku(bits = "2", assert_eq = "0")]
    #[serde(skip)]
    pub reserved0: u8,

    /// Position offset applied
    #[deku(bits = "1")]
    #[serde(rename = "POA")]
    pub poa: bool,

    /// 1090ES IN: reception of ADS-B on 1090 MHz extended squitter
    #[deku(bits = "1")]
    #[deku(pad_bits_after = "2")]
    #[serde(rename = "1090ES")]
    pub es1090_in: bool,

    /// Class B2 ground vehicle transmitting with less than 70 W
    #[deku(bits = "1")]
    #[serde(rename = "B2low")]
    pub b2_low: bool,

    /// Reception of ADS-B on the UAT band
    #[deku(bits = "1")]
    #[serde(rename = "UATin")]
    pub uat_in: bool,

    /// Navigation accuracy category for velocity (versions 1 and 2)
    #[deku(bits = "3")]
    #[serde(rename = "NACv")]
    pub nac_v: u8,

    /// NIC supplement C, used on the surface
    #[deku(bits = "1")]
    #[serde(rename = "NICc")]
    pub nic_c: u8,
}

/// The first half of the OM field, common to both subtypes
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct OperationalMode {
    #[deku(bits = "2", assert_eq = "0")]
    #[serde(skip)]
    pub reserved: u8,

    /// TCAS resolution advisory active
    #[deku(bits = "1")]
    pub tcas_ra_active: bool,

    /// IDENT switch active
    #[deku(bits = "1")]
    pub ident_switch_active: bool,

    /// Reserved for the receiving ATC services flag
    #[deku(bits = "1")]
    pub reserved_recv_atc_service: bool,

    /// Single antenna flag
    #[deku(bits = "1")]
    pub single_antenna_flag: bool,

    /// System design assurance
    #[deku(bits = "2")]
    pub system_design_assurance: u8,
}

/**
 * The ADS-B version (ICAO Doc 9871, 5.3.2.3) and the indicator bits
 * whose meaning shifted between versions: 0 for DO-260 (for which
 * register 6,5 was undefined, so it is never transmitted), 1 for
 * DO-260A, 2 for DO-260B.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
#[deku(type = "u8", bits = "3")]
#[serde(tag = "version")]
pub enum ADSBVersion {
    #[deku(id = "0")]
    #[serde(rename = "0")]
    V0(IndicatorsV0),
    #[deku(id = "1")]
    #[serde(rename = "1")]
    V1(IndicatorsV1),
    #[deku(id = "2")]
    #[serde(rename = "2")]
    V2(IndicatorsV2),
    #[deku(id_pat = "_")]
    #[serde(skip)]
    Unsupported {
        #[deku(bits = "3")]
        version: u8,
        #[deku(bits = "13", endian = "big")]
        data: u16,
    },
}

/// Version 0 carries no indicator; the 13 bits are kept raw
#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct IndicatorsV0 {
    #[deku(bits = "13", endian = "big")]
    #[serde(skip)]
    pub data: u16,
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct IndicatorsV1 {
    #[deku(bits = "1")]
    #[serde(rename = "NICs")]
    /// The NIC supplement bit
    pub nic_s: u8,

    #[deku(bits = "4")]
    #[serde(rename = "NACp")]
    /// Navigation accuracy category for position
    pub nac_p: u8,

    #[deku(bits = "2")]
    #[serde(rename = "BAQ")]
    /// Barometric altitude quality
    pub baq: u8,

    #[deku(bits = "2")]
    #[serde(rename = "SIL")]
    /// Surveillance integrity level
    pub sil: u8,

    #[deku(bits = "1")]
    #[serde(rename = "BAI")]
    /// Barometric altitude integrity
    pub nic_baro: u8,

    #[deku(bits = "1")]
    #[deku(pad_bits_after = "2")]
    #[serde(rename = "HRD")]
    /// Heading reference: 1 for magnetic, 0 for true north
    pub hrd: u8,
}

#[derive(Debug, PartialEq, Serialize, DekuRead, Copy, Clone)]
pub struct IndicatorsV2 {
    #[deku(bits = "1")]
    #[serde(rename = "NICa")]
    /// The NIC supplement A bit
    pub nic_a: u8,

    #[deku(bits = "4")]
    #[serde(rename = "NACp")]
    /// Navigation accuracy category for position
    pub nac_p: u8,

    #[deku(bits = "2")]
    #[serde(rename = "GVA")]
    /// Geometric vertical accuracy
    pub gva: u8,

    #[deku(bits = "2")]
    #[serde(rename = "SIL")]
    /// Source integrity level
    pub sil: u8,

    #[deku(bits = "1")]
    #[serde(rename = "BAI")]
    /// Barometric altitude integrity
    pub nic_baro: u8,

    #[deku(bits = "1")]
    #[serde(rename = "HRD")]
    /// Heading reference: 1 for magnetic, 0 for true north
    pub hrd: u8,

    #[deku(bits = "1")]
    #[deku(pad_bits_after = "1")]
    #[serde(rename = "SILs")]
    /// SIL supplement: 0 per hour, 1 per sample
    pub sil_s: u8,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Aircraft operational status (BDS 6,5)")?;
        if let Some(version) = self.version() {
            writeln!(f, "  ADS-B version: {version}")?;
        }
        match self {
            Self::Airborne(status) => {
                let cc = &status.capability_class;
                write!(f, "  Capability:   ")?;
                if cc.acas {
                    write!(f, " ACAS")?;
                }
                if cc.es1090_in {
                    write!(f, " 1090ES_IN")?;
                }
                if cc.arv {
                    write!(f, " ARV")?;
                }
                if cc.ts {
                    write!(f, " TS")?;
                }
                writeln!(f)?;
            }
            Self::Surface(status) => {
                let cc = &status.capability_class;
                writeln!(f, "  NICc:          {}", cc.nic_c)?;
                writeln!(f, "  NACv:          {}", cc.nac_v)?;
            }
            Self::Reserved { subtype, .. } => {
                writeln!(f, "  Reserved subtype {subtype}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_airborne_operational_status() {
        // crafted: subtype 0, ACAS + 1090ES IN, version 2, NICa set,
        // NACp 10, GVA 2, SIL 3, NICbaro set
        let msg = Message::from_hex("8d4840d6f8300000005ab8260f8d").unwrap();
        if let ADSB(adsb) = msg.df {
            if let ME::BDS65(status) = adsb.message {
                assert_eq!(status.version(), Some(2));
                assert_eq!(status.nic_supplement_a(), Some(1));
                assert!(status.has_1090es_in());
                if let OperationStatus::Airborne(airborne) = status {
                    assert!(airborne.capability_class.acas);
                    assert!(!airborne.capability_class.arv);
                    if let ADSBVersion::V2(v2) = airborne.version {
                        assert_eq!(v2.nac_p, 10);
                        assert_eq!(v2.gva, 2);
                        assert_eq!(v2.sil, 3);
                        assert_eq!(v2.nic_baro, 1);
                        return;
                    }
                }
            }
        }
        unreachable!();
    }
}
