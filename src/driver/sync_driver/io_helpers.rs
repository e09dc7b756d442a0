// src/driver/sync_driver/io_helpers.rs

use super::Opt3001;
use crate::common::{
    error::Opt3001Error,
    hal_traits::Opt3001Timer,
    register::Register,
    timing,
};
use core::time::Duration;
use embedded_hal::i2c::I2c;
use log::trace;
use nb::Result as NbResult;

impl<I2C, T> Opt3001<I2C, T>
where
    I2C: I2c,
    T: Opt3001Timer,
{
    /// Reads a 16-bit register, most-significant byte first.
    ///
    /// One write-then-read bus transaction. When the bus is shared through an
    /// `embedded-hal-bus` device, its lock is held for exactly this transaction.
    pub fn read_register(&mut self, register: Register) -> Result<u16, Opt3001Error<I2C::Error>> {
        Ok(self.read_bus(register)?)
    }

    /// Writes a 16-bit register, most-significant byte first, as one write transaction.
    pub fn write_register(
        &mut self,
        register: Register,
        value: u16,
    ) -> Result<(), Opt3001Error<I2C::Error>> {
        self.buffer = value.to_be_bytes();
        let frame = [register.addr(), self.buffer[0], self.buffer[1]];
        trace!("opt3001 {}: write {:?} <- {:#06x}", self.address, register, value);
        self.i2c.write(self.address.as_u8(), &frame)?;
        Ok(())
    }

    /// Register read that keeps the bare bus error, so callers can tell a
    /// transport failure apart from every other error class.
    pub(super) fn read_bus(&mut self, register: Register) -> Result<u16, I2C::Error> {
        self.i2c
            .write_read(self.address.as_u8(), &[register.addr()], &mut self.buffer)?;
        let value = u16::from_be_bytes(self.buffer);
        trace!("opt3001 {}: read {:?} -> {:#06x}", self.address, register, value);
        Ok(value)
    }

    /// Calls `f` until it stops returning `WouldBlock`, sleeping
    /// `READY_POLL_INTERVAL` between attempts. Gives up with `Timeout` once more
    /// than `timeout` has passed since `start`.
    pub(super) fn execute_blocking_with_timeout<FN, R>(
        &mut self,
        start: T::Instant,
        timeout: Duration,
        mut f: FN,
    ) -> Result<R, Opt3001Error<I2C::Error>>
    where
        FN: FnMut(&mut Self) -> NbResult<R, Opt3001Error<I2C::Error>>,
    {
        let poll_ms = timing::READY_POLL_INTERVAL.as_millis() as u32;

        loop {
            match f(self) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if elapsed_since::<T>(&self.timer, start) > timeout {
                        return Err(Opt3001Error::Timeout);
                    }
                    self.timer.delay_ms(poll_ms);
                }
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }
}

#[inline]
fn elapsed_since<T: Opt3001Timer>(timer: &T, start: T::Instant) -> Duration {
    let now = timer.now();
    if now > start {
        now - start
    } else {
        Duration::ZERO
    }
}
