// src/test_support.rs

//! Test doubles: a virtual-time timer and a register-level simulated OPT3001.

use crate::common::{
    hal_traits::Opt3001Timer,
    register::{Mode, Register, CONFIG_CRF, CONFIG_FH, CONFIG_FL, CONFIG_M, CONFIG_OVF, DEVICE_ID, MANUFACTURER_ID},
};
use core::time::Duration;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

// --- Mock Instant ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Timer ---
/// Time only moves when the driver sleeps.
#[derive(Debug, Default, Clone)]
pub(crate) struct MockTimer {
    current_time_us: u64,
}

impl MockTimer {
    pub(crate) fn new() -> Self {
        MockTimer { current_time_us: 0 }
    }

    pub(crate) fn elapsed_us(&self) -> u64 {
        self.current_time_us
    }

    fn advance_time(&mut self, us: u64) {
        self.current_time_us = self.current_time_us.saturating_add(us);
    }
}

impl Opt3001Timer for MockTimer {
    type Instant = MockInstant;

    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_time(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_time((ms as u64) * 1000);
    }
}

#[cfg(feature = "async")]
impl crate::common::hal_traits::Opt3001TimerAsync for MockTimer {
    type Instant = MockInstant;

    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }

    async fn delay_us(&mut self, us: u32) {
        self.advance_time(us as u64);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.advance_time((ms as u64) * 1000);
    }
}

// --- Tokio timer ---
/// Async timer that really suspends the task. Use with a paused tokio clock.
#[cfg(feature = "async")]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TokioTimer;

#[cfg(feature = "async")]
impl crate::common::hal_traits::Opt3001TimerAsync for TokioTimer {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    async fn delay_us(&mut self, us: u32) {
        tokio::time::sleep(Duration::from_micros(us as u64)).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        tokio::time::sleep(Duration::from_millis(ms as u64)).await;
    }
}

// --- Simulated device ---

// Power-on values from the datasheet.
const RESET_CONFIG: u16 = 0xC810;
const RESET_LOW_LIMIT: u16 = 0xC000;
const RESET_HIGH_LIMIT: u16 = 0xBFFF;

const READ_ONLY_CONFIG_BITS: u16 = CONFIG_OVF | CONFIG_CRF | CONFIG_FH | CONFIG_FL;

/// Register file with an OPT3001's pointer semantics. Conversion-ready comes
/// up after a configurable number of configuration reads, or never.
#[derive(Debug, Clone)]
pub(crate) struct SimOpt3001 {
    address: u8,
    result: u16,
    config: u16,
    low_limit: u16,
    high_limit: u16,
    pointer: u8,
    ready_after: Option<u32>,
    polls_since_config: u32,
    transactions: usize,
}

impl SimOpt3001 {
    pub(crate) fn new() -> Self {
        SimOpt3001 {
            address: 0x44,
            result: 0,
            config: RESET_CONFIG,
            low_limit: RESET_LOW_LIMIT,
            high_limit: RESET_HIGH_LIMIT,
            pointer: 0,
            ready_after: None,
            polls_since_config: 0,
            transactions: 0,
        }
    }

    pub(crate) fn at_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub(crate) fn with_result(mut self, raw: u16) -> Self {
        self.result = raw;
        self
    }

    /// The ready flag shows up on configuration read `polls + 1` after a config write.
    pub(crate) fn ready_after_polls(mut self, polls: u32) -> Self {
        self.ready_after = Some(polls);
        self
    }

    pub(crate) fn never_ready(mut self) -> Self {
        self.ready_after = None;
        self
    }

    /// Sets a register directly, bypassing read-only masks.
    pub(crate) fn set_register(&mut self, register: Register, value: u16) {
        match register {
            Register::Result => self.result = value,
            Register::Configuration => self.config = value,
            Register::LowLimit => self.low_limit = value,
            Register::HighLimit => self.high_limit = value,
            Register::ManufacturerId | Register::DeviceId => {}
        }
    }

    /// Transactions addressed to this device.
    pub(crate) fn transaction_count(&self) -> usize {
        self.transactions
    }

    fn mode(&self) -> Mode {
        Mode::from_bits((self.config & CONFIG_M) >> 9)
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let Some((&pointer, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = pointer;
        if data.len() < 2 {
            return;
        }

        let value = u16::from_be_bytes([data[0], data[1]]);
        match pointer {
            0x01 => {
                self.config = (value & !READ_ONLY_CONFIG_BITS) | (self.config & CONFIG_OVF);
                self.polls_since_config = 0;
            }
            0x02 => self.low_limit = value,
            0x03 => self.high_limit = value,
            // Result and id registers are read only.
            _ => {}
        }
    }

    fn read_pointer(&mut self) -> u16 {
        match self.pointer {
            0x00 => self.result,
            0x01 => self.read_config(),
            0x02 => self.low_limit,
            0x03 => self.high_limit,
            0x7E => MANUFACTURER_ID,
            0x7F => DEVICE_ID,
            _ => 0,
        }
    }

    fn read_config(&mut self) -> u16 {
        self.polls_since_config = self.polls_since_config.saturating_add(1);

        let converting = self.mode() != Mode::Shutdown;
        let done = matches!(self.ready_after, Some(polls) if self.polls_since_config > polls);
        if !(converting && done) {
            return self.config;
        }

        let value = self.config | CONFIG_CRF;
        // A single-shot conversion drops the device back to shutdown; the
        // flag itself is cleared by this read.
        if self.mode() == Mode::SingleShot {
            self.config &= !CONFIG_M;
        }
        self.polls_since_config = 0;
        value
    }

    fn read_bytes(&mut self, buf: &mut [u8]) {
        let value = self.read_pointer().to_be_bytes();
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = value[i % 2];
        }
    }
}

impl ErrorType for SimOpt3001 {
    type Error = ErrorKind;
}

impl I2c for SimOpt3001 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        self.transactions += 1;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => self.write_bytes(bytes),
                Operation::Read(buf) => self.read_bytes(buf),
            }
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::i2c::I2c for SimOpt3001 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        I2c::transaction(self, address, operations)
    }
}
