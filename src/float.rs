//! Generic fixed-width floating-point decoding.
//!
//! Float registers carry their value as an unsigned integer in an
//! IEEE-754-style layout described by a [`FloatSpec`]. The device uses
//! ordinary single precision ([`FloatSpec::SINGLE`]), but the decoder accepts
//! any one-sign-bit layout up to 64 bits total.
//!
//! Two quirks of the device encoding are preserved deliberately:
//!
//! - Under an all-ones exponent, only an *all-ones* mantissa decodes to NaN;
//!   every other mantissa decodes to signed infinity. Standard IEEE-754 treats
//!   any nonzero mantissa as NaN.
//! - Subnormals keep the full `-bias` exponent, so the smallest positive
//!   single-precision subnormal decodes to 2^-150 rather than 2^-149.
//!
//! Results are computed in `f64`; precision loss for very large mantissa
//! widths is an accepted limitation.

use crate::Error;

/// Bit layout of a fixed-width floating-point encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatSpec {
    /// Number of sign bits; only 1 is supported.
    pub sign_bits: u32,
    /// Number of exponent bits.
    pub exponent_bits: u32,
    /// Number of mantissa bits.
    pub mantissa_bits: u32,
}

impl FloatSpec {
    /// 32-bit single precision, the layout used by the device's float
    /// registers.
    pub const SINGLE: FloatSpec = FloatSpec {
        sign_bits: 1,
        exponent_bits: 8,
        mantissa_bits: 23,
    };

    /// Total width of the encoding in bits.
    pub fn total_bits(&self) -> u32 {
        self.sign_bits + self.exponent_bits + self.mantissa_bits
    }
}

impl Default for FloatSpec {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Decodes `n` as a floating-point value with the layout given by `spec`.
///
/// Fails with [`Error::UnsupportedFloatLayout`] for layouts the decoder cannot
/// express and with [`Error::ValueOutOfRange`] if `n` carries bits above the
/// declared width.
pub fn decode(n: u64, spec: &FloatSpec) -> Result<f64, Error> {
    let total_bits = spec.total_bits();
    if spec.sign_bits != 1 || total_bits > u64::BITS {
        return Err(Error::UnsupportedFloatLayout(*spec));
    }
    if total_bits < u64::BITS && n >= 1u64 << total_bits {
        return Err(Error::ValueOutOfRange {
            value: n,
            bits: total_bits,
        });
    }

    let negative = (n >> (spec.exponent_bits + spec.mantissa_bits)) & 1 == 1;
    let exponent_all_ones = (1u64 << spec.exponent_bits) - 1;
    let mantissa_all_ones = (1u64 << spec.mantissa_bits) - 1;
    let exponent_field = (n >> spec.mantissa_bits) & exponent_all_ones;
    let mantissa_field = n & mantissa_all_ones;

    if exponent_field == exponent_all_ones {
        if mantissa_field == mantissa_all_ones {
            return Ok(f64::NAN);
        }
        // The device marks infinity with any non-all-ones mantissa.
        return Ok(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let bias = (1i64 << (spec.exponent_bits - 1)) - 1;
    let exponent = exponent_field as i64 - bias;

    // Gradual underflow: no hidden leading one when the exponent field is zero.
    let mut mantissa = if exponent_field == 0 { 0.0 } else { 1.0 };
    for bit in 0..spec.mantissa_bits {
        if mantissa_field & (1u64 << bit) != 0 {
            mantissa += (-((spec.mantissa_bits - bit) as f64)).exp2();
        }
    }

    let magnitude = (exponent as f64).exp2() * mantissa;
    Ok(if negative { -magnitude } else { magnitude })
}
