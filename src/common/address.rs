// src/common/address.rs

use super::error::Opt3001Error;
use core::convert::TryFrom;
use core::fmt;

/// 7-bit bus address of an OPT3001, selected by what the ADDR pin is tied to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Opt3001Addr(u8);

impl Opt3001Addr {
    /// ADDR pin tied to GND.
    pub const GND: Opt3001Addr = Opt3001Addr(0x44);
    /// ADDR pin tied to VDD.
    pub const VDD: Opt3001Addr = Opt3001Addr(0x45);
    /// ADDR pin tied to SDA.
    pub const SDA: Opt3001Addr = Opt3001Addr(0x46);
    /// ADDR pin tied to SCL.
    pub const SCL: Opt3001Addr = Opt3001Addr(0x47);

    pub const DEFAULT_ADDRESS: Opt3001Addr = Self::GND;

    /// Creates a new `Opt3001Addr` if the given value is one of the four
    /// strappable addresses. Validation cannot fail on I/O, hence `E = ()`.
    pub fn new(address: u8) -> Result<Self, Opt3001Error<()>> {
        if Self::is_valid_address(address) {
            Ok(Opt3001Addr(address))
        } else {
            Err(Opt3001Error::InvalidAddress(address))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid_address(address: u8) -> bool {
        matches!(address, 0x44..=0x47)
    }
}

impl Default for Opt3001Addr {
    fn default() -> Self {
        Self::DEFAULT_ADDRESS
    }
}

impl TryFrom<u8> for Opt3001Addr {
    type Error = Opt3001Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Opt3001Addr> for u8 {
    fn from(value: Opt3001Addr) -> Self {
        value.0
    }
}

impl fmt::Display for Opt3001Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
