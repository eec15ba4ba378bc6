//! Frame encoding and decoding for the RCT Power serial protocol.
//!
//! A read request is a fixed 9-byte frame:
//!
//! | Offset | Field        | Size | Notes                                  |
//! |--------|--------------|------|----------------------------------------|
//! | 0      | start marker | 1    | always [`START_BYTE`]                  |
//! | 1      | command      | 1    | [`READ_COMMAND`] is the only one used  |
//! | 2      | length       | 1    | always 4, the register id width        |
//! | 3      | register id  | 4    | big-endian                             |
//! | 7      | checksum     | 2    | CRC over bytes 1..7, big-endian        |
//!
//! The device answers with the header echoed back (command, length, register
//! id — no start marker), a variable-length payload and a trailing CRC over
//! header and payload. The payload width is inferred from the total response
//! size, not from the echoed length byte.

use crate::Error;
use crate::checksum::crc16;

/// Start marker of every request frame ('+'). Not echoed in responses.
pub const START_BYTE: u8 = 0x2B;
/// The read command, the only command the device is known to answer.
pub const READ_COMMAND: u8 = 0x01;
/// Value of the length byte for read requests: the register id width.
pub const REGISTER_ID_LENGTH: u8 = 0x04;

/// Total size of an encoded read request.
pub const REQUEST_FRAME_LENGTH: usize = 9;
/// Size of the header echoed in responses: command, length, register id.
pub const RESPONSE_HEADER_LENGTH: usize = 6;
/// Size of the trailing checksum.
pub const CHECKSUM_LENGTH: usize = 2;
/// Smallest valid response: echoed header plus checksum, empty payload.
pub const MIN_RESPONSE_LENGTH: usize = RESPONSE_HEADER_LENGTH + CHECKSUM_LENGTH;

/// Builds the wire frame for a read request.
///
/// `command` is passed through structurally; only [`READ_COMMAND`] carries the
/// fixed header shape encoded here (write commands are not supported).
pub fn encode_read_request(command: u8, register_id: u32) -> [u8; REQUEST_FRAME_LENGTH] {
    let mut frame = [0u8; REQUEST_FRAME_LENGTH];
    frame[0] = START_BYTE;
    frame[1] = command;
    frame[2] = REGISTER_ID_LENGTH;
    frame[3..7].copy_from_slice(&register_id.to_be_bytes());
    let checksum = crc16(&frame[1..7]);
    frame[7..9].copy_from_slice(&checksum.to_be_bytes());
    frame
}

/// Validates a response frame and extracts its payload.
///
/// Checks the minimal length and the trailing checksum, then strips the
/// 6-byte echoed header. An empty payload is valid and decodes to a
/// [`RawValue`] of zero.
pub fn decode_response(response: &[u8]) -> Result<RawValue, Error> {
    if response.len() < MIN_RESPONSE_LENGTH {
        log::warn!(
            "Response too short - required={} received={}",
            MIN_RESPONSE_LENGTH,
            response.len()
        );
        return Err(Error::FrameTooShort(response.len()));
    }
    let (body, trailer) = response.split_at(response.len() - CHECKSUM_LENGTH);
    let received = u16::from_be_bytes([trailer[0], trailer[1]]);
    let computed = crc16(body);
    if computed != received {
        log::warn!(
            "Checksum mismatch - computed={computed:#06X} received={received:#06X} body={body:02X?}"
        );
        return Err(Error::ChecksumMismatch { computed, received });
    }
    Ok(RawValue::new(body[RESPONSE_HEADER_LENGTH..].to_vec()))
}

/// The undecoded payload of a response, big-endian, carried as an explicit
/// byte buffer so the width is never inferred from a textual representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(Vec<u8>);

impl RawValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The payload bytes in wire order (most significant first).
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every payload byte is zero (the empty payload counts as zero).
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The payload interpreted as a big-endian unsigned integer.
    ///
    /// An empty payload yields 0. Payloads wider than 8 bytes (string
    /// registers) fail with [`Error::PayloadTooWide`].
    pub fn to_u64(&self) -> Result<u64, Error> {
        if self.0.len() > std::mem::size_of::<u64>() {
            return Err(Error::PayloadTooWide(self.0.len()));
        }
        Ok(self.0.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }
}
