// src/driver/mod.rs

// Blocking driver
pub mod sync_driver;

// Asynchronous driver (feature-gated)
#[cfg(feature = "async")]
pub mod async_driver;

pub use sync_driver::Opt3001;

#[cfg(feature = "async")]
pub use async_driver::AsyncOpt3001;
