use deku::prelude::*;
use serde::Serialize;
use std::fmt;

/**
 * ## Data Link Capability Report (BDS 1,0)
 *
 * Comm-B register reporting the capabilities of the Mode S transponder
 * and data link installation (ICAO Annex 10 Vol IV, 3.1.2.6.10.2).
 *
 * | BDS | CON | RES | OCC | ACAS | SUBNET | LEV5 | MSS | UEL | DEL | rest |
 * | --- | --- | --- | --- | ---- | ------ | ---- | --- | --- | --- | ---- |
 * | 8   | 1   | 5   | 1   | 1    | 7      | 1    | 1   | 3   | 4   | 24   |
 *
 * The reserved bits must be zero and the ELM throughput codes must not
 * take a reserved value; any violation rejects the register, which is
 * what makes the hypothesis-based Comm-B identification workable.
 */
#[derive(Debug, PartialEq, Serialize, DekuRead, Clone)]
#[serde(tag = "bds", rename = "10")]
pub struct DataLinkCapability {
    /// The register selector, always 0x10
    #[deku(bits = "8", map = "fail_if_not10")]
    #[serde(skip)]
    pub bds: u8,

    /// Continuation flag: the next register (1,1 up to 1,6) holds more
    #[deku(bits = "1")]
    pub continuation: bool,

    #[deku(bits = "5", map = "fail_if_not0")]
    #[serde(skip)]
    pub reserved: u8,

    /// Overlay command capability: BDS overlay (data parity) supported
    #[deku(bits = "1")]
    pub ovc: bool,

    /// ACAS operating
    #[deku(bits = "1")]
    pub acas: bool,

    /// Mode S subnetwork version: 0 when not available, 1 to 5 for the
    /// successive ICAO Doc 9688/9871 editions, above 5 reserved
    #[deku(bits = "7")]
    pub subnet: u8,

    /// Transponder enhanced protocol indicator (level 5 instead of 2-4)
    #[deku(bits = "1")]
    pub level5: bool,

    /// Mode S specific services capability
    #[deku(bits = "1")]
    pub mode_s: bool,

    /// Uplink ELM average throughput: 0 for none, 1 to 6 for 16 UELM
    /// segments in 1 s down to 30 ms; 7 is reserved and rejected
    #[deku(bits = "3", map = "fail_if_uelm_reserved")]
    pub uplink_elm: u8,

    /// Downlink ELM throughput: the number of segments the transponder
    /// can deliver on a single UF=24 interrogation; above 6 reserved
    /// and rejected
    #[deku(bits = "4", map = "fail_if_delm_reserved")]
    pub downlink_elm: u8,

    /// Aircraft identification (callsign) available
    #[deku(bits = "1")]
    pub identification: bool,

    /// Squitter capability subfield: registers 0,5 and 0,6 were both
    /// updated within the last 10 s
    #[deku(bits = "1")]
    pub squitter: bool,

    /// Surveillance identifier code capability
    #[deku(bits = "1")]
    pub sic: bool,

    /// Toggled each time the common usage GICB report (1,7) changes
    #[deku(bits = "1")]
    pub gicb: bool,

    /// ACAS hybrid surveillance fitted and operational
    #[deku(bits = "1")]
    pub acas_hybrid: bool,

    /// ACAS generating both TAs and RAs (not TAs only)
    #[deku(bits = "1")]
    pub acas_ra: bool,

    /// RTCA DO-185 version of the ACAS; 3 is reserved and rejected
    #[deku(bits = "2", map = "fail_if_rtca_reserved")]
    #[serde(skip)]
    pub acas_rtca: u8,

    /// Support status of the DTE sub-addresses 0 to 15, one bit each
    #[deku(bits = "16")]
    pub dte: u16,
}

fn fail_if_not10(value: u8) -> Result<u8, DekuError> {
    if value == 0x10 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "First byte must be 0x10 in BDS 1,0".into(),
        ))
    }
}

fn fail_if_not0(value: u8) -> Result<u8, DekuError> {
    if value == 0 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "Reserved bits must be 0 in BDS 1,0".into(),
        ))
    }
}

fn fail_if_uelm_reserved(value: u8) -> Result<u8, DekuError> {
    if value < 7 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "Reserved UELM throughput code in BDS 1,0".into(),
        ))
    }
}

fn fail_if_delm_reserved(value: u8) -> Result<u8, DekuError> {
    if value <= 6 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "Reserved DELM throughput code in BDS 1,0".into(),
        ))
    }
}

fn fail_if_rtca_reserved(value: u8) -> Result<u8, DekuError> {
    if value < 3 {
        Ok(value)
    } else {
        Err(DekuError::Assertion(
            "Reserved ACAS RTCA version in BDS 1,0".into(),
        ))
    }
}

impl fmt::Display for DataLinkCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Data link capability report (BDS 1,0)")?;
        writeln!(f, "  Subnetwork:    version {}", self.subnet)?;
        writeln!(
            f,
            "  ACAS:          {}operating",
            if self.acas { "" } else { "not " }
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_valid_bds10() {
        let msg = Message::from_hex("a800178d10010080f50000d5893c").unwrap();
        if let CommBIdentityReply { bds, .. } = msg.df {
            assert_eq!(
                bds.bds10,
                Some(DataLinkCapability {
                    bds: 16,
                    continuation: false,
                    reserved: 0,
                    ovc: false,
                    acas: true,
                    subnet: 0,
                    level5: false,
                    mode_s: true,
                    uplink_elm: 0,
                    downlink_elm: 0,
                    identification: true,
                    squitter: true,
                    sic: true,
                    gicb: true,
                    acas_hybrid: false,
                    acas_ra: true,
                    acas_rtca: 1,
                    dte: 0
                })
            );
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_other_selector_byte() {
        // the payload starts with 0x20, no capability report here
        let msg = Message::from_hex("a0001838201584f23468207cdfa5").unwrap();
        if let CommBAltitudeReply { bds, .. } = msg.df {
            assert_eq!(bds.bds10, None);
        } else {
            unreachable!();
        }
    }
}
