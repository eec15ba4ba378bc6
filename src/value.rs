//! Typed conversion of raw register payloads.
//!
//! Every register in the catalog declares a [`ValueKind`]; [`convert`] turns
//! the undecoded payload returned by the transport into the matching
//! [`TypedValue`].

use crate::Error;
use crate::float::{self, FloatSpec};
use crate::protocol::RawValue;
use std::fmt;

/// The value kind a register is declared with in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Text, e.g. device name or serial number registers.
    String,
    /// Single-precision float, the most common telemetry kind.
    Float,
    /// Plain unsigned integer.
    UnsignedInt,
    /// Flag register, nonzero means true.
    Bool,
    /// Catalog kinds without a decoder (enums, signed ints); the payload is
    /// passed through undecoded.
    Unknown,
}

impl ValueKind {
    /// Maps a catalog tag to a kind.
    ///
    /// Width-suffixed unsigned tags (`uint8`, `uint16`, ...) all map to
    /// [`ValueKind::UnsignedInt`]; anything unrecognized becomes
    /// [`ValueKind::Unknown`] so the payload is passed through undecoded.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => ValueKind::String,
            "float" => ValueKind::Float,
            "bool" => ValueKind::Bool,
            _ if tag.starts_with("uint") => ValueKind::UnsignedInt,
            _ => ValueKind::Unknown,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ValueKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(ValueKind::from_tag(&tag))
    }
}

/// A decoded register value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Float(f64),
    UnsignedInt(u64),
    Bool(bool),
    /// Fallback for [`ValueKind::Unknown`], the payload untouched.
    Raw(RawValue),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypedValue::Text(text) => write!(f, "{text}"),
            TypedValue::Float(value) => write!(f, "{value}"),
            TypedValue::UnsignedInt(value) => write!(f, "{value}"),
            TypedValue::Bool(value) => write!(f, "{value}"),
            TypedValue::Raw(raw) => write!(f, "{:02X?}", raw.as_bytes()),
        }
    }
}

/// Converts a raw payload according to its declared kind.
///
/// Float registers are decoded with [`FloatSpec::SINGLE`]. Kind mismatches
/// surface as [`Error::PayloadTooWide`] or [`Error::ValueOutOfRange`] from the
/// underlying decoders.
pub fn convert(raw: &RawValue, kind: ValueKind) -> Result<TypedValue, Error> {
    match kind {
        ValueKind::String => Ok(TypedValue::Text(decode_text(raw))),
        ValueKind::Float => Ok(TypedValue::Float(float::decode(
            raw.to_u64()?,
            &FloatSpec::SINGLE,
        )?)),
        ValueKind::UnsignedInt => Ok(TypedValue::UnsignedInt(raw.to_u64()?)),
        ValueKind::Bool => Ok(TypedValue::Bool(!raw.is_zero())),
        ValueKind::Unknown => Ok(TypedValue::Raw(raw.clone())),
    }
}

/// Decodes a string register payload.
///
/// The device delivers string characters least-significant byte first, so the
/// big-endian payload is consumed back to front. This matches the observed
/// device behavior even though it inverts the wire's byte order.
fn decode_text(raw: &RawValue) -> String {
    raw.as_bytes().iter().rev().map(|b| *b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn bool_zero_is_false_nonzero_is_true() {
        let zero = RawValue::new(vec![0x00, 0x00, 0x00, 0x00]);
        let one = RawValue::new(vec![0x00, 0x00, 0x00, 0x01]);
        let high = RawValue::new(vec![0x80, 0x00, 0x00, 0x00]);
        assert_eq!(convert(&zero, ValueKind::Bool).unwrap(), TypedValue::Bool(false));
        assert_eq!(convert(&one, ValueKind::Bool).unwrap(), TypedValue::Bool(true));
        assert_eq!(convert(&high, ValueKind::Bool).unwrap(), TypedValue::Bool(true));
    }

    #[test]
    fn string_bytes_are_reversed() {
        // Wire value 0x434241 ("CBA" big-endian) reads as "ABC".
        let raw = RawValue::new(vec![0x43, 0x42, 0x41]);
        assert_eq!(
            convert(&raw, ValueKind::String).unwrap(),
            TypedValue::Text("ABC".to_string())
        );
    }

    #[test]
    fn float_uses_single_precision_layout() {
        let raw = RawValue::new(vec![0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            convert(&raw, ValueKind::Float).unwrap(),
            TypedValue::Float(1.0)
        );
    }

    #[test]
    fn uint_passes_through_unchanged() {
        let raw = RawValue::new(vec![0x00, 0x00, 0x04, 0xD2]);
        assert_eq!(
            convert(&raw, ValueKind::UnsignedInt).unwrap(),
            TypedValue::UnsignedInt(1234)
        );
    }

    #[test]
    fn unknown_kind_passes_raw_through() {
        let raw = RawValue::new(vec![0x01, 0x02]);
        assert_eq!(
            convert(&raw, ValueKind::Unknown).unwrap(),
            TypedValue::Raw(raw.clone())
        );
    }

    #[test]
    fn float_kind_rejects_oversized_payload() {
        let raw = RawValue::new(vec![0xFF; 9]);
        assert_matches!(
            convert(&raw, ValueKind::Float),
            Err(Error::PayloadTooWide(9))
        );
    }

    #[test]
    fn float_kind_rejects_payload_wider_than_layout() {
        // Five payload bytes fit in a u64 but not in the 32-bit layout.
        let raw = RawValue::new(vec![0x01, 0x00, 0x00, 0x00, 0x00]);
        assert_matches!(
            convert(&raw, ValueKind::Float),
            Err(Error::ValueOutOfRange { .. })
        );
    }

    #[test]
    fn kind_tags() {
        assert_eq!(ValueKind::from_tag("string"), ValueKind::String);
        assert_eq!(ValueKind::from_tag("float"), ValueKind::Float);
        assert_eq!(ValueKind::from_tag("bool"), ValueKind::Bool);
        assert_eq!(ValueKind::from_tag("uint"), ValueKind::UnsignedInt);
        assert_eq!(ValueKind::from_tag("uint16"), ValueKind::UnsignedInt);
        assert_eq!(ValueKind::from_tag("enum"), ValueKind::Unknown);
    }

    #[test]
    fn display_formats() {
        assert_eq!(TypedValue::Float(48.25).to_string(), "48.25");
        assert_eq!(TypedValue::Bool(true).to_string(), "true");
        assert_eq!(TypedValue::Text("RCT".into()).to_string(), "RCT");
        assert_eq!(TypedValue::UnsignedInt(7).to_string(), "7");
    }
}
