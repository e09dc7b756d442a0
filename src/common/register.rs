// src/common/register.rs

//! OPT3001 register map and the configuration register bit layout.
//!
//! All registers are 16 bits wide and transferred most-significant byte first.

/// Register pointer values.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Exponent(4) | mantissa(12), read only.
    Result = 0x00,
    Configuration = 0x01,
    LowLimit = 0x02,
    HighLimit = 0x03,
    ManufacturerId = 0x7E,
    DeviceId = 0x7F,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// "TI" in ASCII.
pub const MANUFACTURER_ID: u16 = 0x5449;
pub const DEVICE_ID: u16 = 0x3001;

// --- Configuration register fields ---
pub const CONFIG_RN: u16 = 0xF000;
pub const CONFIG_CT: u16 = 0x0800;
pub const CONFIG_M: u16 = 0x0600;
pub const CONFIG_OVF: u16 = 0x0100;
pub const CONFIG_CRF: u16 = 0x0080;
pub const CONFIG_FH: u16 = 0x0040;
pub const CONFIG_FL: u16 = 0x0020;
pub const CONFIG_L: u16 = 0x0010;
pub const CONFIG_POL: u16 = 0x0008;
pub const CONFIG_ME: u16 = 0x0004;
pub const CONFIG_FC: u16 = 0x0003;

const RN_SHIFT: u16 = 12;
const CT_SHIFT: u16 = 11;
const M_SHIFT: u16 = 9;

/// Range number that selects automatic full-scale range.
pub const RANGE_AUTO: u16 = 0b1100;

/// Operating mode, bits 10-9. Exactly one is active at a time.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Shutdown = 0b00,
    SingleShot = 0b01,
    #[default]
    Continuous = 0b10,
}

impl Mode {
    /// Decodes the two mode bits. The device reports 0b11 for continuous as well.
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Mode::Shutdown,
            0b01 => Mode::SingleShot,
            _ => Mode::Continuous,
        }
    }
}

/// Conversion time, bit 11.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionTime {
    Ms100 = 0,
    #[default]
    Ms800 = 1,
}

/// Range field selection. Only automatic ranging is exposed; `Manual` writes
/// range number 0 (40.95 lux full scale).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeSelect {
    #[default]
    Auto,
    Manual,
}

impl From<bool> for RangeSelect {
    fn from(range_auto: bool) -> Self {
        if range_auto {
            RangeSelect::Auto
        } else {
            RangeSelect::Manual
        }
    }
}

/// Settings written to the configuration register.
///
/// Writing a `Config` overwrites the whole register: fault count, latch,
/// polarity and mask-exponent all go back to zero.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub mode: Mode,
    pub conversion_time: ConversionTime,
    pub range: RangeSelect,
}

impl Config {
    pub const fn new(mode: Mode, conversion_time: ConversionTime, range: RangeSelect) -> Self {
        Config { mode, conversion_time, range }
    }

    pub const fn with_mode(self, mode: Mode) -> Self {
        Config { mode, ..self }
    }

    pub const fn with_conversion_time(self, conversion_time: ConversionTime) -> Self {
        Config { conversion_time, ..self }
    }

    pub const fn with_range(self, range: RangeSelect) -> Self {
        Config { range, ..self }
    }

    /// Composes the configuration register word.
    pub const fn bits(&self) -> u16 {
        let range = match self.range {
            RangeSelect::Auto => RANGE_AUTO << RN_SHIFT,
            RangeSelect::Manual => 0,
        };
        range | ((self.conversion_time as u16) << CT_SHIFT) | ((self.mode as u16) << M_SHIFT)
    }
}

/// Decoded view of a configuration register read, including the read-only flags.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigStatus {
    pub range_number: u8,
    pub conversion_time: ConversionTime,
    pub mode: Mode,
    pub overflow: bool,
    pub conversion_ready: bool,
    pub flag_high: bool,
    pub flag_low: bool,
    pub latch: bool,
    pub polarity: bool,
    pub mask_exponent: bool,
    pub fault_count: u8,
}

impl ConfigStatus {
    pub const fn from_bits(bits: u16) -> Self {
        ConfigStatus {
            range_number: ((bits & CONFIG_RN) >> RN_SHIFT) as u8,
            conversion_time: if bits & CONFIG_CT != 0 {
                ConversionTime::Ms800
            } else {
                ConversionTime::Ms100
            },
            mode: Mode::from_bits((bits & CONFIG_M) >> M_SHIFT),
            overflow: bits & CONFIG_OVF != 0,
            conversion_ready: bits & CONFIG_CRF != 0,
            flag_high: bits & CONFIG_FH != 0,
            flag_low: bits & CONFIG_FL != 0,
            latch: bits & CONFIG_L != 0,
            polarity: bits & CONFIG_POL != 0,
            mask_exponent: bits & CONFIG_ME != 0,
            fault_count: (bits & CONFIG_FC) as u8,
        }
    }

    #[inline]
    pub const fn is_auto_range(&self) -> bool {
        self.range_number as u16 == RANGE_AUTO
    }
}
