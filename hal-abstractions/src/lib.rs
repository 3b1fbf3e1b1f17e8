//! Hardware abstraction traits for pulse sampler firmware
//!
//! This crate defines the collaborators the sampling core talks to. Board
//! support packages implement these traits:
//! - **`sensor`**: `SampleSource`, a FIFO-backed two-channel reading provider
//! - **`transport`**: `Transport` for batch hand-off and `Connector` for
//!   byte streams
//! - **`clock`**: `MillisClock`, a wrapping millisecond tick source
//! - **`error`**: `TransportError`

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod sensor;
pub mod transport;

pub use clock::MillisClock;
#[cfg(feature = "embassy-time")]
pub use clock::EmbassyClock;
pub use error::TransportError;
pub use sensor::SampleSource;
pub use transport::{Connector, Transport};
