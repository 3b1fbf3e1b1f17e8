#![deny(unsafe_code)]
//! Bounded batch buffers
//!
//! A [`BatchBuffer`] holds one bracketed, comma-separated decimal list being
//! built up a token at a time. A [`Batch`] keeps the three buffers of one
//! window (timestamps, channel A, channel B) in lockstep.
//!
//! # Lifecycle
//!
//! ```text
//! reset()      "["
//! append(7)    "[7,"
//! append(-3)   "[7,-3,"
//! finalize()   "[7,-3]"    (read-only view, buffer sealed)
//! reset()      "["
//! ```

use heapless::String;

use crate::encoder::{self, Token, TOKEN_SEPARATOR};
use crate::error::SamplerError;

/// Opening delimiter of every buffer
pub const LIST_OPEN: char = '[';

/// Closing delimiter written by `finalize()`
pub const LIST_CLOSE: char = ']';

/// Bytes reserved per buffer beyond its tokens (opening delimiter plus the
/// terminator slot)
pub const DELIMITER_OVERHEAD: usize = 2;

/// Capacity needed for `samples` tokens of at most `max_token_len` bytes each
pub const fn buffer_capacity(samples: usize, max_token_len: usize) -> usize {
    samples * max_token_len + DELIMITER_OVERHEAD
}

/// Append-only decimal list with a fixed capacity
#[derive(Debug, Clone)]
pub struct BatchBuffer<const CAP: usize> {
    text: String<CAP>,
    tokens: usize,
    sealed: bool,
}

impl<const CAP: usize> BatchBuffer<CAP> {
    const FITS_DELIMITERS: () = assert!(CAP >= DELIMITER_OVERHEAD, "buffer too small");

    /// Create a buffer in the reset state
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_DELIMITERS;
        let mut buffer = Self {
            text: String::new(),
            tokens: 0,
            sealed: false,
        };
        buffer.reset();
        buffer
    }

    /// Discard all tokens and write the opening delimiter
    pub fn reset(&mut self) {
        self.text.clear();
        // CAP >= 2 is checked at compile time
        let _ = self.text.push(LIST_OPEN);
        self.tokens = 0;
        self.sealed = false;
    }

    /// Append one token
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - `SamplerError::BufferSealed` after `finalize()`
    /// - `SamplerError::CapacityExceeded` if the token might not fit
    pub fn append<T: Token>(&mut self, value: T) -> Result<usize, SamplerError> {
        if self.sealed {
            return Err(SamplerError::BufferSealed);
        }
        let written = encoder::encode(&mut self.text, value)?;
        self.tokens += 1;
        Ok(written)
    }

    /// Close the list and return its text
    ///
    /// The trailing separator is replaced by the closing delimiter. The
    /// returned view's length marks the end of valid data. Finalizing an
    /// already finalized buffer returns the same view.
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::EmptyBuffer` if no token was appended.
    pub fn finalize(&mut self) -> Result<&str, SamplerError> {
        if self.sealed {
            return Ok(self.text.as_str());
        }
        if self.tokens == 0 {
            return Err(SamplerError::EmptyBuffer);
        }

        if self.text.pop() != Some(TOKEN_SEPARATOR) {
            // Unreachable while every append goes through the encoder
            return Err(SamplerError::EmptyBuffer);
        }
        self.text
            .push(LIST_CLOSE)
            .map_err(|_| SamplerError::CapacityExceeded {
                needed: self.text.len() + 1,
                capacity: CAP,
            })?;
        self.sealed = true;
        Ok(self.text.as_str())
    }

    /// Current contents, delimiters included
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether no token has been appended since the last reset
    pub fn is_empty(&self) -> bool {
        self.tokens == 0
    }

    /// Number of tokens appended since the last reset
    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Declared capacity in bytes
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Whether `finalize()` has been called since the last reset
    pub fn is_finalized(&self) -> bool {
        self.sealed
    }
}

impl<const CAP: usize> Default for BatchBuffer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Finalized views of one completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizedBatch<'a> {
    /// Tick timestamps, e.g. `[1000,1020]`
    pub times: &'a str,
    /// Channel A (IR) readings
    pub channel_a: &'a str,
    /// Channel B (red) readings
    pub channel_b: &'a str,
}

/// The three buffers of one batch window
#[derive(Debug, Clone, Default)]
pub struct Batch<const CAP: usize> {
    times: BatchBuffer<CAP>,
    channel_a: BatchBuffer<CAP>,
    channel_b: BatchBuffer<CAP>,
}

impl<const CAP: usize> Batch<CAP> {
    /// Create an empty batch
    pub fn new() -> Self {
        Self {
            times: BatchBuffer::new(),
            channel_a: BatchBuffer::new(),
            channel_b: BatchBuffer::new(),
        }
    }

    /// Reset all three buffers
    pub fn reset(&mut self) {
        self.times.reset();
        self.channel_a.reset();
        self.channel_b.reset();
    }

    /// Append one tick's timestamp and reading
    ///
    /// On error the batch may be partially written and must be reset.
    pub fn push(&mut self, timestamp_ms: u32, a: i32, b: i32) -> Result<(), SamplerError> {
        self.times.append(timestamp_ms)?;
        self.channel_a.append(a)?;
        self.channel_b.append(b)?;
        Ok(())
    }

    /// Number of complete ticks recorded
    pub fn len(&self) -> usize {
        self.times
            .tokens()
            .min(self.channel_a.tokens())
            .min(self.channel_b.tokens())
    }

    /// Whether no tick has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finalize all three buffers
    pub fn finalize(&mut self) -> Result<FinalizedBatch<'_>, SamplerError> {
        let times = self.times.finalize()?;
        let channel_a = self.channel_a.finalize()?;
        let channel_b = self.channel_b.finalize()?;
        Ok(FinalizedBatch {
            times,
            channel_a,
            channel_b,
        })
    }

    /// Timestamp buffer
    pub fn times(&self) -> &BatchBuffer<CAP> {
        &self.times
    }

    /// Channel A buffer
    pub fn channel_a(&self) -> &BatchBuffer<CAP> {
        &self.channel_a
    }

    /// Channel B buffer
    pub fn channel_b(&self) -> &BatchBuffer<CAP> {
        &self.channel_b
    }
}
