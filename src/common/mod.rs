// src/common/mod.rs

pub mod address;
pub mod error;
pub mod hal_traits;
pub mod lux;
pub mod register;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

pub use address::Opt3001Addr;

pub use error::Opt3001Error;

pub use hal_traits::{Opt3001Timer, TimerInstant};

pub use lux::{decode_lux, encode_lux, RawLux};

pub use register::{Config, ConfigStatus, ConversionTime, Mode, RangeSelect, Register};

// timing constants are reached as common::timing::*

#[cfg(feature = "async")]
pub use hal_traits::Opt3001TimerAsync;

#[cfg(feature = "std")]
pub use hal_traits::StdTimer;
