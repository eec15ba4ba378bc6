//! CRC-16/CCITT checksum as used by the RCT Power serial protocol.
//!
//! Every request and response frame carries a trailing 16-bit checksum computed
//! over the frame body (everything between the start marker and the checksum
//! itself). The device uses the CCITT variant: polynomial `0x1021`, register
//! initialized to `0xFFFF`, bits processed most-significant first.
//!
//! The engine operates on whole bytes. Callers that assemble frame bodies from
//! integer values must render them into an explicit byte buffer first (padding
//! an odd nibble count with a trailing zero nibble); all buffers produced by
//! [`crate::protocol`] are whole-byte by construction.

/// Initial value of the checksum register.
pub const INITIAL: u16 = 0xFFFF;
/// CCITT generator polynomial.
pub const POLYNOMIAL: u16 = 0x1021;

/// Computes the CRC-16/CCITT checksum of `bytes`.
///
/// Deterministic and pure; the empty input yields [`INITIAL`].
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc = INITIAL;
    for byte in bytes {
        for bit in (0..8).rev() {
            let feedback = ((crc >> 15) & 1 == 1) ^ ((byte >> bit) & 1 == 1);
            crc <<= 1;
            if feedback {
                crc ^= POLYNOMIAL;
            }
        }
    }
    crc
}
