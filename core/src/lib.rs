//! Platform-agnostic sampling core for pulse sensor firmware
//!
//! Samples a two-channel optical sensor at a fixed rate, packs each reading
//! into bounded decimal buffers, and posts every completed batch as one JSON
//! document. It has NO hardware dependencies: the sensor, transport, clock
//! and delay are supplied through the traits in `pulse-hal` and
//! `embedded-hal-async`.
//!
//! ## Modules
//! - **`encoder`**: integer to decimal token, capacity-checked
//! - **`buffer`**: `BatchBuffer` and the lockstep three-buffer `Batch`
//! - **`serializer`**: `BatchSerializer` assembling the JSON payload
//! - **`governor`**: `RateGovernor` pacing each tick
//! - **`throughput`**: `ThroughputMeter` for the diagnostic Hz figure
//! - **`sampler`**: `Sampler`, the loop tying it all together
//! - **`http`**: `HttpTransport`, a `Transport` over any `Connector`
//! - **`config`**: `SamplerConfig` and the buffer size constants
//! - **`error`**: `SamplerError`
//!
//! ## Features
//! - `defmt`: log through `defmt` (needs a global logger at link time)
//! - `embassy-time`: enable `pulse_hal::EmbassyClock`

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod buffer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod governor;
pub mod http;
pub mod sampler;
pub mod serializer;
pub mod throughput;

#[cfg(test)]
mod testing;

pub use buffer::{Batch, BatchBuffer, FinalizedBatch};
pub use config::SamplerConfig;
pub use error::SamplerError;
pub use governor::{Pace, RateGovernor};
pub use http::{HttpConfig, HttpTransport};
pub use sampler::{FlushReport, Sampler, SamplerStats, TickOutcome};
pub use serializer::BatchSerializer;
pub use throughput::ThroughputMeter;

// Collaborator traits, re-exported so boards need only this crate
pub use pulse_hal::{Connector, MillisClock, SampleSource, Transport, TransportError};
