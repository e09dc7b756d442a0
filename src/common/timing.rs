// src/common/timing.rs

use core::time::Duration;

// === Driver Timing ===

/// How long `new` waits after the initial configure so the first read has data.
pub const FIRST_CONVERSION_WAIT: Duration = Duration::from_millis(1000);

/// Sleep between conversion-ready polls during a single-shot acquisition.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wall-clock budget for a single-shot conversion, measured from the configure write.
pub const SINGLE_SHOT_TIMEOUT: Duration = Duration::from_millis(1000);
