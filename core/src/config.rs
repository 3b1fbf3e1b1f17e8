#![deny(unsafe_code)]
//! Sampler configuration
//!
//! Runtime settings live in [`SamplerConfig`]; buffer sizes are compile-time
//! constants because every buffer is statically sized.

use crate::buffer::buffer_capacity;
use crate::encoder::Token;
use crate::error::SamplerError;
use crate::serializer::PAYLOAD_OVERHEAD;

/// Default sample rate
pub const SAMPLE_RATE_HZ: u32 = 50;

/// Default batch window
pub const WINDOW_SECS: u32 = 5;

/// Default samples per batch (one window at the default rate)
pub const SAMPLES_PER_BATCH: usize = (SAMPLE_RATE_HZ * WINDOW_SECS) as usize;

/// Worst-case token width across all three buffers
///
/// Readings are `i32` (11 chars at `i32::MIN`); timestamps are `u32`
/// (10 chars). One separator is added.
pub const MAX_TOKEN_LEN: usize = <i32 as Token>::MAX_TOKEN_LEN;

/// Per-buffer capacity for a default batch: 250 × 12 + 2 = 3002 bytes
pub const BUFFER_CAPACITY: usize = buffer_capacity(SAMPLES_PER_BATCH, MAX_TOKEN_LEN);

/// Payload capacity: three full buffers plus the JSON skeleton
pub const PAYLOAD_CAPACITY: usize = 3 * BUFFER_CAPACITY + PAYLOAD_OVERHEAD;

/// Ticks per throughput-estimate window
pub const RATE_WINDOW: u32 = 180;

/// Request path batches are posted to
pub const POST_PATH: &str = "/samples";

/// Channel A readings averaged at start-up
pub const BASELINE_SAMPLES: u8 = 32;

/// Sampling loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Target tick rate in Hz (1-1000)
    pub sample_rate_hz: u32,
    /// Ticks per batch
    pub samples_per_batch: usize,
    /// Ticks per throughput-estimate window (diagnostic only)
    pub rate_window: u32,
    /// Path handed to the transport with every batch
    pub post_path: &'static str,
    /// Channel A readings averaged by `Sampler::start` (0 disables)
    pub baseline_samples: u8,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ,
            samples_per_batch: SAMPLES_PER_BATCH,
            rate_window: RATE_WINDOW,
            post_path: POST_PATH,
            baseline_samples: BASELINE_SAMPLES,
        }
    }
}

impl SamplerConfig {
    /// Target tick period, e.g. 20 ms at 50 Hz
    pub fn tick_period_ms(&self) -> u32 {
        1000 / self.sample_rate_hz.max(1)
    }

    /// Check this configuration against buffer and payload capacities
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::InvalidConfig` naming the first violated bound.
    pub fn validate(
        &self,
        buffer_capacity_bytes: usize,
        payload_capacity_bytes: usize,
    ) -> Result<(), SamplerError> {
        if self.sample_rate_hz == 0 || self.sample_rate_hz > 1000 {
            return Err(SamplerError::InvalidConfig("sample rate must be 1-1000 Hz"));
        }
        if self.samples_per_batch == 0 {
            return Err(SamplerError::InvalidConfig("batch must hold at least one sample"));
        }
        if self.rate_window == 0 {
            return Err(SamplerError::InvalidConfig("rate window must be non-zero"));
        }
        let needed = self
            .samples_per_batch
            .checked_mul(MAX_TOKEN_LEN)
            .and_then(|n| n.checked_add(crate::buffer::DELIMITER_OVERHEAD))
            .ok_or(SamplerError::InvalidConfig("batch size overflows"))?;
        if needed > buffer_capacity_bytes {
            return Err(SamplerError::InvalidConfig("batch does not fit buffer capacity"));
        }
        if 3 * needed + PAYLOAD_OVERHEAD > payload_capacity_bytes {
            return Err(SamplerError::InvalidConfig("batch does not fit payload capacity"));
        }
        Ok(())
    }
}
