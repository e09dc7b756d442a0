// src/driver/sync_driver/mod.rs

use crate::common::{
    address::Opt3001Addr,
    error::Opt3001Error,
    hal_traits::Opt3001Timer,
    lux::{encode_lux, RawLux},
    register::{Config, ConfigStatus, ConversionTime, Mode, RangeSelect, Register, CONFIG_CRF, DEVICE_ID, MANUFACTURER_ID},
    timing,
};
use embedded_hal::i2c::I2c;
use log::{debug, warn};

mod io_helpers;

/// Blocking OPT3001 driver.
///
/// Owns its bus handle. To put several sensors on one physical bus, hand each
/// driver an `embedded-hal-bus` device (`MutexDevice`, `RefCellDevice`, ...);
/// every register access is a single bus transaction, so access from
/// different drivers interleaves only at transaction boundaries.
///
/// The driver keeps no copy of the device state: every read goes to the bus.
#[derive(Debug)]
pub struct Opt3001<I2C, T> {
    i2c: I2C,
    timer: T,
    address: Opt3001Addr,
    // Scratch space for transfers, meaningless between calls.
    buffer: [u8; 2],
}

impl<I2C, T> Opt3001<I2C, T>
where
    I2C: I2c,
    T: Opt3001Timer,
{
    /// Verifies the device identity, configures continuous conversion at
    /// 800 ms with automatic range, and waits for the first conversion.
    ///
    /// Fails with `DeviceNotFound` when the identity registers do not read back
    /// as an OPT3001, so an absent or miswired sensor is caught here.
    pub fn new(i2c: I2C, timer: T, address: Opt3001Addr) -> Result<Self, Opt3001Error<I2C::Error>> {
        let mut sensor = Self::attach(i2c, timer, address);

        let (manufacturer_id, device_id) = sensor.read_ids();
        if manufacturer_id != Some(MANUFACTURER_ID) || device_id != Some(DEVICE_ID) {
            debug!(
                "opt3001 {}: identity mismatch (manufacturer {:?}, device {:?})",
                address, manufacturer_id, device_id
            );
            return Err(Opt3001Error::DeviceNotFound { manufacturer_id, device_id });
        }

        sensor.apply(Config::default())?;
        sensor
            .timer
            .delay_ms(timing::FIRST_CONVERSION_WAIT.as_millis() as u32);

        debug!("opt3001 {}: initialized", address);
        Ok(sensor)
    }

    /// [`Opt3001::new`] at the default address (ADDR to GND).
    pub fn new_default(i2c: I2C, timer: T) -> Result<Self, Opt3001Error<I2C::Error>> {
        Self::new(i2c, timer, Opt3001Addr::DEFAULT_ADDRESS)
    }

    /// Wraps a bus without touching the device: no identity check, no configuration.
    pub fn attach(i2c: I2C, timer: T, address: Opt3001Addr) -> Self {
        Opt3001 {
            i2c,
            timer,
            address,
            buffer: [0; 2],
        }
    }

    /// Destroy driver instance, return the bus and timer.
    pub fn destroy(self) -> (I2C, T) {
        (self.i2c, self.timer)
    }

    #[inline]
    pub fn address(&self) -> Opt3001Addr {
        self.address
    }

    // --- Identity ---

    /// True iff the manufacturer and device id registers read 0x5449 and 0x3001.
    ///
    /// Bus failures count as "not an OPT3001" instead of being returned.
    pub fn check_identity(&mut self) -> bool {
        self.read_ids() == (Some(MANUFACTURER_ID), Some(DEVICE_ID))
    }

    pub fn read_manufacturer_id(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::ManufacturerId)
    }

    pub fn read_device_id(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::DeviceId)
    }

    fn read_ids(&mut self) -> (Option<u16>, Option<u16>) {
        let manufacturer_id = self.read_bus(Register::ManufacturerId).ok();
        let device_id = self.read_bus(Register::DeviceId).ok();
        (manufacturer_id, device_id)
    }

    // --- Configuration ---

    /// Writes mode, conversion time and range selection.
    ///
    /// The whole configuration register is overwritten: latch, polarity,
    /// mask-exponent and fault count are reset to zero on every call.
    pub fn configure(
        &mut self,
        mode: Mode,
        conversion_time: ConversionTime,
        range_auto: bool,
    ) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::new(mode, conversion_time, RangeSelect::from(range_auto)))
    }

    /// Writes a prepared [`Config`]. Same overwrite semantics as [`Opt3001::configure`].
    pub fn apply(&mut self, config: Config) -> Result<(), Opt3001Error<I2C::Error>> {
        debug!("opt3001 {}: configure {:?}", self.address, config);
        self.write_register(Register::Configuration, config.bits())
    }

    /// Raw configuration register, including the read-only flag bits.
    pub fn read_config(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::Configuration)
    }

    pub fn read_status(&mut self) -> Result<ConfigStatus, Opt3001Error<I2C::Error>> {
        Ok(ConfigStatus::from_bits(self.read_config()?))
    }

    // --- Readings ---

    /// Reads the result register as exponent and mantissa.
    pub fn read_raw(&mut self) -> Result<RawLux, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::Result)?))
    }

    /// Reads the most recent result in lux. Always a fresh bus read.
    pub fn read_lux(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(self.read_raw()?.lux())
    }

    /// Same as [`Opt3001::read_lux`].
    #[inline]
    pub fn lux(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        self.read_lux()
    }

    /// Tests the conversion-ready flag. The device clears the flag when the
    /// configuration register is read, so each call reads it again.
    pub fn is_conversion_ready(&mut self) -> Result<bool, Opt3001Error<I2C::Error>> {
        Ok((self.read_config()? & CONFIG_CRF) != 0)
    }

    // --- Single shot ---

    /// Arms exactly one conversion (800 ms, automatic range).
    pub fn start_single_shot(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::default().with_mode(Mode::SingleShot))
    }

    /// Non-blocking check on a conversion armed with [`Opt3001::start_single_shot`].
    /// Returns `WouldBlock` until the conversion-ready flag is set, then the reading.
    pub fn poll_single_shot(&mut self) -> nb::Result<f64, Opt3001Error<I2C::Error>> {
        if self.is_conversion_ready()? {
            Ok(self.read_lux()?)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Triggers one conversion and blocks until it is ready.
    ///
    /// Sleeps 10 ms between polls. Fails with `Timeout` once more than one
    /// second has passed since the conversion was armed.
    pub fn single_shot(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        let start = self.timer.now();
        self.start_single_shot()?;

        let result = self.execute_blocking_with_timeout(
            start,
            timing::SINGLE_SHOT_TIMEOUT,
            |sensor| sensor.poll_single_shot(),
        );
        if matches!(result, Err(Opt3001Error::Timeout)) {
            warn!("opt3001 {}: single-shot conversion timed out", self.address);
        }
        result
    }

    // --- Limits ---

    pub fn set_low_limit(&mut self, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        self.write_limit(Register::LowLimit, lux)
    }

    pub fn set_high_limit(&mut self, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        self.write_limit(Register::HighLimit, lux)
    }

    pub fn read_low_limit(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::LowLimit)?).lux())
    }

    pub fn read_high_limit(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::HighLimit)?).lux())
    }

    fn write_limit(&mut self, register: Register, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        let (exponent, mantissa) = encode_lux(lux);
        self.write_register(register, RawLux::new(exponent, mantissa).to_register())
    }

    // --- Power ---

    /// Puts the device in its low-power shutdown mode. The driver stays usable;
    /// a later `configure` starts conversions again.
    pub fn shutdown(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::default().with_mode(Mode::Shutdown))
    }

    #[inline]
    pub fn deinit(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.shutdown()
    }
}
