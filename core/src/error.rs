#![deny(unsafe_code)]
//! Sampler error types

use pulse_hal::TransportError;

/// Sampling core errors
///
/// Everything here is recoverable: the loop logs the error, drops the batch
/// in progress where needed, and keeps sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerError {
    /// A token might not fit in its batch buffer
    CapacityExceeded {
        /// Bytes the worst-case token would bring the buffer to
        needed: usize,
        /// Declared buffer capacity
        capacity: usize,
    },
    /// `finalize()` on a buffer holding no tokens
    EmptyBuffer,
    /// Append to a finalized buffer before `reset()`
    BufferSealed,
    /// Serialized batch would not fit in the payload buffer
    PayloadOverflow {
        /// Bytes the payload needs
        needed: usize,
        /// Declared payload capacity
        capacity: usize,
    },
    /// Configuration does not fit the compiled-in capacities
    InvalidConfig(&'static str),
    /// Transport collaborator failed
    Transport(TransportError),
}

impl core::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CapacityExceeded { needed, capacity } => {
                write!(f, "Buffer capacity exceeded ({needed} > {capacity})")
            }
            Self::EmptyBuffer => write!(f, "Buffer holds no tokens"),
            Self::BufferSealed => write!(f, "Buffer already finalized"),
            Self::PayloadOverflow { needed, capacity } => {
                write!(f, "Payload overflow ({needed} > {capacity})")
            }
            Self::InvalidConfig(reason) => write!(f, "Invalid configuration: {reason}"),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
        }
    }
}

impl core::error::Error for SamplerError {}

impl From<TransportError> for SamplerError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}
