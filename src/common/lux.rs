// src/common/lux.rs

//! Conversion between lux and the device's exponent/mantissa encoding,
//! used by the result register and both limit registers:
//!
//! `lux = 0.01 * 2^exponent * mantissa`

const EXPONENT_SHIFT: u16 = 12;
const MANTISSA_MASK: u16 = 0x0FFF;

/// Largest mantissa the 12-bit field holds.
pub const MANTISSA_MAX: u16 = 4095;
/// Largest exponent the encoder will choose. The field is 4 bits wide but the
/// device never reports more than 11.
pub const EXPONENT_MAX: u8 = 11;

/// Highest lux value the encoding can express: 0.01 * 2^11 * 4095.
pub const LUX_MAX: f64 = 83_865.6;

/// Decodes an exponent/mantissa pair into lux.
///
/// Exponent is taken modulo 16 and mantissa modulo 4096, matching the field widths.
pub fn decode_lux(exponent: u8, mantissa: u16) -> f64 {
    let counts = f64::from(mantissa & MANTISSA_MASK) * f64::from(1u32 << (exponent & 0x0F));
    counts / 100.0
}

/// Encodes a lux value using the smallest exponent whose mantissa still fits
/// in 12 bits, i.e. the finest resolution available for that value.
///
/// Saturates at (11, 4095) above [`LUX_MAX`]; negative and NaN inputs encode as (0, 0).
pub fn encode_lux(lux: f64) -> (u8, u16) {
    // Also catches NaN.
    if !(lux > 0.0) {
        return (0, 0);
    }

    let counts = lux * 100.0;
    for exponent in 0..=EXPONENT_MAX {
        let quotient = counts / f64::from(1u32 << exponent);
        // floor(q) <= 4095 <=> q < 4096
        if quotient < f64::from(MANTISSA_MAX) + 1.0 {
            // Non-negative, so truncation is floor.
            return (exponent, quotient as u16);
        }
    }

    (EXPONENT_MAX, MANTISSA_MAX)
}

/// A raw reading split into its fields.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawLux {
    pub exponent: u8,
    pub mantissa: u16,
}

impl RawLux {
    pub const fn new(exponent: u8, mantissa: u16) -> Self {
        RawLux {
            exponent: exponent & 0x0F,
            mantissa: mantissa & MANTISSA_MASK,
        }
    }

    /// Splits a result or limit register value.
    pub const fn from_register(raw: u16) -> Self {
        RawLux {
            exponent: (raw >> EXPONENT_SHIFT) as u8,
            mantissa: raw & MANTISSA_MASK,
        }
    }

    pub const fn to_register(self) -> u16 {
        ((self.exponent as u16 & 0x0F) << EXPONENT_SHIFT) | (self.mantissa & MANTISSA_MASK)
    }

    pub fn from_lux(lux: f64) -> Self {
        let (exponent, mantissa) = encode_lux(lux);
        RawLux { exponent, mantissa }
    }

    pub fn lux(&self) -> f64 {
        decode_lux(self.exponent, self.mantissa)
    }

    /// Size of one mantissa step at this exponent, in lux.
    pub fn resolution(&self) -> f64 {
        decode_lux(self.exponent, 1)
    }
}

impl From<RawLux> for (u8, u16) {
    fn from(raw: RawLux) -> Self {
        (raw.exponent, raw.mantissa)
    }
}
