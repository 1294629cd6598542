use deku::error::NeedSize;
use deku::prelude::*;
use once_cell::sync::Lazy;

/// Generator of the Mode S cyclic redundancy check,
/// x²⁴ + x²³ + ... + x¹⁰ + x³ + 1 (ICAO Annex 10 Vol IV, 3.1.2.3.3)
const GENERATOR: u32 = 0xfff409;

/// Byte-wise lookup table for the polynomial division, filled on first use.
static CRC_TABLE: Lazy<[u32; 256]> = Lazy::new(|| {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut crc = (i as u32) << 16;
        for _ in 0..8 {
            crc = if crc & 0x80_0000 != 0 {
                ((crc << 1) ^ GENERATOR) & 0xff_ffff
            } else {
                (crc << 1) & 0xff_ffff
            };
        }
        *entry = crc;
    }
    table
});

/// 24-bit residue of the polynomial division of a frame, the trailing
/// 3 bytes (which carry the transmitted parity) excluded.
pub fn compute(frame: &[u8]) -> u32 {
    let mut crc = 0u32;
    for byte in &frame[..frame.len() - 3] {
        let index = ((crc >> 16) ^ u32::from(*byte)) & 0xff;
        crc = ((crc << 8) ^ CRC_TABLE[index as usize]) & 0xff_ffff;
    }
    crc
}

/// Residue XORed with the transmitted parity field.
///
/// Zero for an uncorrupted DF 11/17/18 frame (modulo the interrogator
/// identifier in DF 11); the transmitter ICAO address for the
/// address/parity overlaid formats (DF 0, 4, 5, 16, 20, 21).
pub fn modes_checksum(frame: &[u8], bits: usize) -> Result<u32, DekuError> {
    let len = bits / 8;
    if frame.len() < len || len < 4 {
        return Err(DekuError::Incomplete(NeedSize::new(bits)));
    }
    let parity = u32::from(frame[len - 3]) << 16
        | u32::from(frame[len - 2]) << 8
        | u32::from(frame[len - 1]);
    Ok(compute(&frame[..len]) ^ parity)
}

/// Some receivers zero the parity field once they have checked it
/// themselves; such frames are accepted unconditionally.
pub fn parity_is_zero(frame: &[u8]) -> bool {
    frame.len() >= 4 && frame[frame.len() - 3..].iter().all(|&b| b == 0)
}

/// Parity predicate for a frame against a known transmitter address:
/// true when the residue matches the parity field directly, or when the
/// address XORed into the residue accounts for the difference.
pub fn check(frame: &[u8], address: u32) -> bool {
    if parity_is_zero(frame) {
        return true;
    }
    let len = frame.len();
    let parity = u32::from(frame[len - 3]) << 16
        | u32::from(frame[len - 2]) << 8
        | u32::from(frame[len - 1]);
    let residue = compute(frame);
    residue == parity || (residue ^ parity) == (address & 0xff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexlit::hex;

    #[test]
    fn residue_is_zero_for_clean_adsb() {
        let bytes = hex!("8D406B902015A678D4D220AA4BDA");
        assert_eq!(modes_checksum(&bytes, 112).unwrap(), 0);
    }

    #[test]
    fn address_recovery_on_overlaid_parity() {
        // DF20 frame: the residue XOR parity is the transmitter address
        let bytes = hex!("a0001838201584f23468207cdfa5");
        assert_eq!(modes_checksum(&bytes, 112).unwrap(), 0x40655a);
    }

    #[test]
    fn overlaying_computed_parity_yields_zero() {
        let mut bytes = hex!("8D4840D6202CC371C32CE0000000");
        let residue = compute(&bytes);
        bytes[11] = (residue >> 16) as u8;
        bytes[12] = (residue >> 8) as u8;
        bytes[13] = residue as u8;
        assert_eq!(modes_checksum(&bytes, 112).unwrap(), 0);

        // the same property on an arbitrary payload
        let mut bytes = hex!("a000181036e0a8000000002b2b2b");
        let residue = compute(&bytes);
        bytes[11] = (residue >> 16) as u8;
        bytes[12] = (residue >> 8) as u8;
        bytes[13] = residue as u8;
        assert_eq!(modes_checksum(&bytes, 112).unwrap(), 0);
    }

    #[test]
    fn zeroed_parity_is_accepted() {
        let bytes = hex!("8D4840D6202CC371C32CE0000000");
        assert!(parity_is_zero(&bytes));
        assert!(check(&bytes, 0x4840d6));
        let bytes = hex!("8D4840D6202CC371C32CE0576098");
        assert!(!parity_is_zero(&bytes));
        assert!(check(&bytes, 0x4840d6));
    }

    #[test]
    fn short_frames_are_rejected() {
        let bytes = hex!("8D4840D6");
        assert!(modes_checksum(&bytes, 112).is_err());
    }
}
