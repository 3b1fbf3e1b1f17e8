#![deny(unsafe_code)]
//! Millisecond tick source

/// Monotonic millisecond counter with an epoch fixed at startup
///
/// The value wraps at `u32::MAX` (about 49.7 days); consumers compare
/// timestamps with wrapping arithmetic.
pub trait MillisClock {
    /// Milliseconds since the clock's epoch
    fn now_ms(&self) -> u32;
}

/// `MillisClock` backed by the embassy-time driver
///
/// The epoch is the instant the clock was created.
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy)]
pub struct EmbassyClock {
    epoch: embassy_time::Instant,
}

#[cfg(feature = "embassy-time")]
impl EmbassyClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self {
            epoch: embassy_time::Instant::now(),
        }
    }
}

#[cfg(feature = "embassy-time")]
impl Default for EmbassyClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embassy-time")]
impl MillisClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the documented wrap
        self.epoch.elapsed().as_millis() as u32
    }
}
