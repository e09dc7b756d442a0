// src/driver/async_driver.rs

use crate::common::{
    address::Opt3001Addr,
    error::Opt3001Error,
    hal_traits::Opt3001TimerAsync,
    lux::{encode_lux, RawLux},
    register::{Config, ConfigStatus, ConversionTime, Mode, RangeSelect, Register, CONFIG_CRF, DEVICE_ID, MANUFACTURER_ID},
    timing,
};
use core::time::Duration;
use embedded_hal_async::i2c::I2c;
use log::{debug, trace, warn};

/// Async OPT3001 driver (requires 'async' feature). Same surface and bus
/// behaviour as [`crate::Opt3001`]; the single-shot wait yields to the
/// executor between polls, provided the timer's delays do.
#[derive(Debug)]
pub struct AsyncOpt3001<I2C, T> {
    i2c: I2C,
    timer: T,
    address: Opt3001Addr,
    buffer: [u8; 2],
}

impl<I2C, T> AsyncOpt3001<I2C, T>
where
    I2C: I2c,
    T: Opt3001TimerAsync,
{
    pub async fn new(i2c: I2C, timer: T, address: Opt3001Addr) -> Result<Self, Opt3001Error<I2C::Error>> {
        let mut sensor = Self::attach(i2c, timer, address);

        let (manufacturer_id, device_id) = sensor.read_ids().await;
        if manufacturer_id != Some(MANUFACTURER_ID) || device_id != Some(DEVICE_ID) {
            debug!(
                "opt3001 {}: identity mismatch (manufacturer {:?}, device {:?})",
                address, manufacturer_id, device_id
            );
            return Err(Opt3001Error::DeviceNotFound { manufacturer_id, device_id });
        }

        sensor.apply(Config::default()).await?;
        sensor
            .timer
            .delay_ms(timing::FIRST_CONVERSION_WAIT.as_millis() as u32)
            .await;

        debug!("opt3001 {}: initialized", address);
        Ok(sensor)
    }

    pub async fn new_default(i2c: I2C, timer: T) -> Result<Self, Opt3001Error<I2C::Error>> {
        Self::new(i2c, timer, Opt3001Addr::DEFAULT_ADDRESS).await
    }

    pub fn attach(i2c: I2C, timer: T, address: Opt3001Addr) -> Self {
        AsyncOpt3001 {
            i2c,
            timer,
            address,
            buffer: [0; 2],
        }
    }

    pub fn destroy(self) -> (I2C, T) {
        (self.i2c, self.timer)
    }

    #[inline]
    pub fn address(&self) -> Opt3001Addr {
        self.address
    }

    // --- Register I/O ---

    pub async fn read_register(&mut self, register: Register) -> Result<u16, Opt3001Error<I2C::Error>> {
        Ok(self.read_bus(register).await?)
    }

    pub async fn write_register(
        &mut self,
        register: Register,
        value: u16,
    ) -> Result<(), Opt3001Error<I2C::Error>> {
        self.buffer = value.to_be_bytes();
        let frame = [register.addr(), self.buffer[0], self.buffer[1]];
        trace!("opt3001 {}: write {:?} <- {:#06x}", self.address, register, value);
        self.i2c.write(self.address.as_u8(), &frame).await?;
        Ok(())
    }

    async fn read_bus(&mut self, register: Register) -> Result<u16, I2C::Error> {
        self.i2c
            .write_read(self.address.as_u8(), &[register.addr()], &mut self.buffer)
            .await?;
        let value = u16::from_be_bytes(self.buffer);
        trace!("opt3001 {}: read {:?} -> {:#06x}", self.address, register, value);
        Ok(value)
    }

    // --- Identity ---

    pub async fn check_identity(&mut self) -> bool {
        self.read_ids().await == (Some(MANUFACTURER_ID), Some(DEVICE_ID))
    }

    pub async fn read_manufacturer_id(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::ManufacturerId).await
    }

    pub async fn read_device_id(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::DeviceId).await
    }

    async fn read_ids(&mut self) -> (Option<u16>, Option<u16>) {
        let manufacturer_id = self.read_bus(Register::ManufacturerId).await.ok();
        let device_id = self.read_bus(Register::DeviceId).await.ok();
        (manufacturer_id, device_id)
    }

    // --- Configuration ---

    pub async fn configure(
        &mut self,
        mode: Mode,
        conversion_time: ConversionTime,
        range_auto: bool,
    ) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::new(mode, conversion_time, RangeSelect::from(range_auto)))
            .await
    }

    pub async fn apply(&mut self, config: Config) -> Result<(), Opt3001Error<I2C::Error>> {
        debug!("opt3001 {}: configure {:?}", self.address, config);
        self.write_register(Register::Configuration, config.bits()).await
    }

    pub async fn read_config(&mut self) -> Result<u16, Opt3001Error<I2C::Error>> {
        self.read_register(Register::Configuration).await
    }

    pub async fn read_status(&mut self) -> Result<ConfigStatus, Opt3001Error<I2C::Error>> {
        Ok(ConfigStatus::from_bits(self.read_config().await?))
    }

    // --- Readings ---

    pub async fn read_raw(&mut self) -> Result<RawLux, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::Result).await?))
    }

    pub async fn read_lux(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(self.read_raw().await?.lux())
    }

    pub async fn lux(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        self.read_lux().await
    }

    pub async fn is_conversion_ready(&mut self) -> Result<bool, Opt3001Error<I2C::Error>> {
        Ok((self.read_config().await? & CONFIG_CRF) != 0)
    }

    // --- Single shot ---

    pub async fn start_single_shot(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::default().with_mode(Mode::SingleShot)).await
    }

    /// One check on an armed conversion: `WouldBlock` until the ready flag is set.
    pub async fn poll_single_shot(&mut self) -> nb::Result<f64, Opt3001Error<I2C::Error>> {
        if self.is_conversion_ready().await? {
            Ok(self.read_lux().await?)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Triggers one conversion and waits for it, giving up with `Timeout`
    /// once more than one second has passed since it was armed.
    pub async fn single_shot(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        let start = self.timer.now();
        self.start_single_shot().await?;

        let poll_ms = timing::READY_POLL_INTERVAL.as_millis() as u32;
        loop {
            match self.poll_single_shot().await {
                Ok(lux) => return Ok(lux),
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {
                    let now = self.timer.now();
                    let elapsed = if now > start { now - start } else { Duration::ZERO };
                    if elapsed > timing::SINGLE_SHOT_TIMEOUT {
                        warn!("opt3001 {}: single-shot conversion timed out", self.address);
                        return Err(Opt3001Error::Timeout);
                    }
                    self.timer.delay_ms(poll_ms).await;
                }
            }
        }
    }

    // --- Limits ---

    pub async fn set_low_limit(&mut self, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        self.write_limit(Register::LowLimit, lux).await
    }

    pub async fn set_high_limit(&mut self, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        self.write_limit(Register::HighLimit, lux).await
    }

    pub async fn read_low_limit(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::LowLimit).await?).lux())
    }

    pub async fn read_high_limit(&mut self) -> Result<f64, Opt3001Error<I2C::Error>> {
        Ok(RawLux::from_register(self.read_register(Register::HighLimit).await?).lux())
    }

    async fn write_limit(&mut self, register: Register, lux: f64) -> Result<(), Opt3001Error<I2C::Error>> {
        let (exponent, mantissa) = encode_lux(lux);
        self.write_register(register, RawLux::new(exponent, mantissa).to_register())
            .await
    }

    // --- Power ---

    pub async fn shutdown(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.apply(Config::default().with_mode(Mode::Shutdown)).await
    }

    pub async fn deinit(&mut self) -> Result<(), Opt3001Error<I2C::Error>> {
        self.shutdown().await
    }
}
