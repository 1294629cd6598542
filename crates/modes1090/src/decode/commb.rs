use super::bds::bds10::DataLinkCapability;
use super::bds::bds20::AircraftIdentification;
use super::bds::bds30::ACASResolutionAdvisory;
use deku::bitvec::{BitSlice, Msb0};
use deku::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/**
 * ## Comm-B Data Selector (BDS)
 *
 * A Comm-B reply (DF 20/21) does not say which register its 56-bit MB
 * field holds: the ground station knows what it asked for, a passive
 * listener does not. The registers of the ELS service (1,0, 2,0 and
 * 3,0) open with their selector value, so the selector byte picks the
 * candidate parser and the register's own consistency rules (reserved
 * bits, character set) confirm or reject it.
 *
 * The raw MB field is always preserved: a caller that knows what was
 * interrogated can run its own parser over it.
 */
#[derive(Debug, PartialEq, Serialize, Clone, Default)]
pub struct DataSelector {
    /// The raw 56-bit MB field
    #[serde(skip)]
    pub mb: [u8; 7],

    /// All zeros, nothing to parse
    #[serde(skip)]
    pub is_empty: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bds10: Option<DataLinkCapability>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bds20: Option<AircraftIdentification>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bds30: Option<ACASResolutionAdvisory>,
}

impl<'a> DekuRead<'a> for DataSelector {
    fn read(
        input: &'a BitSlice<u8, Msb0>,
        _ctx: (),
    ) -> Result<(&'a BitSlice<u8, Msb0>, Self), DekuError> {
        let mut rest = input;
        let mut mb = [0u8; 7];
        for slot in mb.iter_mut() {
            let (r, byte) = u8::read(rest, deku::ctx::BitSize(8))?;
            *slot = byte;
            rest = r;
        }

        let mut selector = Self {
            mb,
            ..Self::default()
        };
        if mb.iter().all(|&b| b == 0) {
            selector.is_empty = true;
            return Ok((rest, selector));
        }

        match mb[0] {
            0x10 => match DataLinkCapability::try_from(&mb[..]) {
                Ok(bds10) => selector.bds10 = Some(bds10),
                Err(e) => debug!("BDS 1,0 rejected: {e}"),
            },
            0x20 => match AircraftIdentification::try_from(&mb[..]) {
                Ok(bds20) => selector.bds20 = Some(bds20),
                Err(e) => debug!("BDS 2,0 rejected: {e}"),
            },
            0x30 => match ACASResolutionAdvisory::try_from(&mb[..]) {
                Ok(bds30) => selector.bds30 = Some(bds30),
                Err(e) => debug!("BDS 3,0 rejected: {e}"),
            },
            selector => debug!("no parser for BDS selector {selector:#04x}"),
        }
        Ok((rest, selector))
    }
}

impl fmt::Display for DataSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(bds10) = &self.bds10 {
            write!(f, "{bds10}")?;
        }
        if let Some(bds20) = &self.bds20 {
            write!(f, "{bds20}")?;
        }
        if let Some(bds30) = &self.bds30 {
            write!(f, "{bds30}")?;
        }
        if self.bds10.is_none()
            && self.bds20.is_none()
            && self.bds30.is_none()
        {
            writeln!(f, "  Comm-B format: unknown format")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_selector_dispatch() {
        let msg = Message::from_hex("a0001838201584f23468207cdfa5").unwrap();
        if let CommBAltitudeReply { ac, bds, .. } = msg.df {
            assert_eq!(ac.feet(), Some(38000));
            assert!(bds.bds20.is_some());
            assert!(bds.bds10.is_none());
            assert!(bds.bds30.is_none());
            assert_eq!(bds.mb[0], 0x20);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_empty_payload() {
        // all-zero MB field: nothing to identify
        let mut bytes =
            hex::decode("a8001c0900000000000000000000").unwrap();
        let residue = crate::decode::crc::compute(&bytes) ^ 0x4ca7b5;
        bytes[11] = (residue >> 16) as u8;
        bytes[12] = (residue >> 8) as u8;
        bytes[13] = residue as u8;
        let (_, msg) = Message::from_bytes((&bytes, 0)).unwrap();
        if let CommBIdentityReply { bds, .. } = msg.df {
            assert!(bds.is_empty);
            assert!(bds.bds10.is_none());
        } else {
            unreachable!();
        }
    }
}
