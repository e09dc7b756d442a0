// src/lib.rs

//! Platform-agnostic driver for the TI OPT3001 ambient light sensor,
//! built on the `embedded-hal` 1.0 I2C traits.
//!
//! ```ignore
//! let mut sensor = Opt3001::new(i2c, timer, Opt3001Addr::GND)?;
//! let lux = sensor.read_lux()?;
//! let once = sensor.single_shot()?;
//! sensor.shutdown()?;
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod common;
pub mod driver;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use common::{
    decode_lux, encode_lux, Config, ConfigStatus, ConversionTime, Mode, Opt3001Addr, Opt3001Error,
    Opt3001Timer, RangeSelect, RawLux, Register,
};
pub use driver::Opt3001;

#[cfg(feature = "async")]
pub use common::Opt3001TimerAsync;
#[cfg(feature = "async")]
pub use driver::AsyncOpt3001;

#[cfg(feature = "std")]
pub use common::StdTimer;
