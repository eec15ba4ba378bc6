use crate::float::FloatSpec;

/// Errors raised by the protocol codec and the value decoders.
///
/// Transport-level errors (connect, retry exhaustion) live in
/// [`crate::client::Error`], which wraps this type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The response is shorter than the echoed header plus the trailing
    /// checksum and cannot be validated.
    #[error("response of {0} bytes is shorter than the minimal frame")]
    FrameTooShort(usize),

    /// The checksum computed over the response body disagrees with the
    /// trailing checksum sent by the device.
    #[error("checksum mismatch: computed {computed:#06X}, received {received:#06X}")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// The value does not fit into the bit width declared by its float layout.
    #[error("value {value:#X} does not fit into {bits} bits")]
    ValueOutOfRange { value: u64, bits: u32 },

    /// The float layout has an unsupported shape (sign width other than one
    /// bit, or a total width beyond 64 bits).
    #[error("unsupported float layout {0:?}")]
    UnsupportedFloatLayout(FloatSpec),

    /// The payload carries more bytes than fit into a 64-bit integer.
    #[error("payload of {0} bytes is too wide for an integer conversion")]
    PayloadTooWide(usize),
}
