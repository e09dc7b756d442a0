// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point in time as seen by an [`Opt3001Timer`]. Only differences matter,
/// so any monotonic tick counter works.
pub trait TimerInstant:
    Copy + Debug + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> TimerInstant for T where
    T: Copy + Debug + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Abstraction for the clock and delay operations the driver needs.
///
/// The bus transfers themselves go through `embedded_hal::i2c::I2c`; this is
/// only used to sleep between conversion-ready polls and to measure the
/// single-shot timeout against wall-clock time.
pub trait Opt3001Timer {
    type Instant: TimerInstant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

/// Async counterpart of [`Opt3001Timer`] (requires 'async' feature).
/// `now` stays synchronous, reading a clock never has to wait.
///
/// The delays must suspend the task, not the thread: `embassy_time::Timer`,
/// `tokio::time::sleep` and the like.
#[cfg(feature = "async")]
pub trait Opt3001TimerAsync {
    type Instant: TimerInstant;

    fn now(&self) -> Self::Instant;

    async fn delay_us(&mut self, us: u32);

    async fn delay_ms(&mut self, ms: u32);
}

/// Host timer built on `std::time::Instant` and `std::thread::sleep`.
/// Blocking driver only; it has no async implementation.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdTimer;

#[cfg(feature = "std")]
impl StdTimer {
    pub fn new() -> Self {
        StdTimer
    }
}

#[cfg(feature = "std")]
impl Opt3001Timer for StdTimer {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}
