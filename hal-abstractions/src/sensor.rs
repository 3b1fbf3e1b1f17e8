#![deny(unsafe_code)]
//! Two-channel sample source
//!
//! Optical pulse sensors such as the MAX3010x family expose a small on-chip
//! FIFO. The driver copies up to a few samples from the chip into its own
//! buffer on `refill()`; the sampling core then reads the current sample and
//! calls `advance()` to move on.

/// FIFO-backed provider of (channel A, channel B) readings
///
/// Implementations must be non-blocking: `refill()` performs at most one bus
/// transaction and returns immediately. Reads of an empty buffer are never
/// issued by the core; it always checks `has_buffered_sample()` first.
///
/// # Example Implementation
/// ```ignore
/// impl SampleSource for Max30105<I2c> {
///     fn read_channel_a(&mut self) -> i32 { self.fifo.ir[self.tail] as i32 }
///     fn read_channel_b(&mut self) -> i32 { self.fifo.red[self.tail] as i32 }
///     fn has_buffered_sample(&mut self) -> bool { self.head != self.tail }
///     fn refill(&mut self) -> usize { self.check() }
///     fn advance(&mut self) { self.tail = (self.tail + 1) % FIFO_DEPTH; }
/// }
/// ```
pub trait SampleSource {
    /// Channel A (IR) value of the current sample
    fn read_channel_a(&mut self) -> i32;

    /// Channel B (red) value of the current sample
    fn read_channel_b(&mut self) -> i32;

    /// Whether a sample is waiting to be read
    fn has_buffered_sample(&mut self) -> bool;

    /// Pull new samples from the sensor, returning how many arrived
    fn refill(&mut self) -> usize;

    /// Discard the current sample so the next read returns a new one
    fn advance(&mut self);
}
