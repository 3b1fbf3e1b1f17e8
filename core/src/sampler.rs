#![deny(unsafe_code)]
//! Fixed-cadence sampling loop
//!
//! One [`Sampler`] owns everything the loop mutates: the three batch buffers,
//! the payload buffer, the batch and rate-display counters, and the
//! collaborators it was built with. Each `tick()`:
//!
//! 1. records the tick-start timestamp
//! 2. pulls one reading from the `SampleSource` (refilling if it is empty)
//! 3. appends timestamp, channel A and channel B to the batch
//! 4. flushes the batch through the `Transport` once it holds N ticks
//! 5. idles off the rest of the tick period via the `RateGovernor`
//!
//! The hand-off in step 4 runs inline, so a slow send delays the next tick.
//! That time is not recovered (see [`RateGovernor`]).
//!
//! # Example
//! ```ignore
//! let mut sampler: Sampler<_, _, _, _> = Sampler::new(
//!     SamplerConfig::default(),
//!     max30105,
//!     HttpTransport::new(connector, embassy_time::Delay, HttpConfig::default()),
//!     EmbassyClock::new(),
//!     embassy_time::Delay,
//! )?;
//! sampler.run().await
//! ```

use embedded_hal_async::delay::DelayNs;
use pulse_hal::{MillisClock, SampleSource, Transport, TransportError};

use crate::buffer::Batch;
use crate::config::{SamplerConfig, BUFFER_CAPACITY, PAYLOAD_CAPACITY};
use crate::error::SamplerError;
use crate::governor::RateGovernor;
use crate::serializer::BatchSerializer;
use crate::throughput::ThroughputMeter;

/// Polls allowed per wanted sample during baseline calibration
const BASELINE_POLL_FACTOR: u32 = 4;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Reading recorded at this 0-based position in the batch
    Sampled {
        /// Ordinal of the tick within its batch
        index: usize,
    },
    /// Reading recorded and the completed batch handed to the transport
    Flushed(FlushReport),
    /// Source had nothing buffered, even after a refill
    NoSample,
    /// Batch in progress was discarded
    Dropped(SamplerError),
}

/// Result of handing one batch to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushReport {
    /// Ticks in the batch
    pub samples: usize,
    /// Payload size in bytes
    pub bytes: usize,
    /// Transport outcome; failed batches are not retried
    pub result: Result<(), TransportError>,
}

/// Running counters, diagnostic only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerStats {
    /// Ticks run
    pub ticks: u32,
    /// Ticks that found no sample
    pub empty_ticks: u32,
    /// Batches the transport accepted
    pub batches_sent: u32,
    /// Batches the transport rejected
    pub batches_failed: u32,
    /// Batches discarded before reaching the transport
    pub batches_dropped: u32,
}

/// Batched sampling loop
///
/// `CAP` is the per-buffer capacity and `OUT` the payload capacity; both
/// default to the sizes for a 250-sample batch.
pub struct Sampler<
    S,
    T,
    C,
    D,
    const CAP: usize = BUFFER_CAPACITY,
    const OUT: usize = PAYLOAD_CAPACITY,
> {
    config: SamplerConfig,
    source: S,
    transport: T,
    clock: C,
    delay: D,
    batch: Batch<CAP>,
    serializer: BatchSerializer<OUT>,
    governor: RateGovernor,
    meter: ThroughputMeter,
    batch_started_ms: u32,
    baseline: Option<i32>,
    stats: SamplerStats,
}

impl<S, T, C, D, const CAP: usize, const OUT: usize> Sampler<S, T, C, D, CAP, OUT>
where
    S: SampleSource,
    T: Transport,
    C: MillisClock,
    D: DelayNs,
{
    /// Create a sampler with empty buffers
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::InvalidConfig` if a full batch could not fit
    /// `CAP` or `OUT`.
    pub fn new(
        config: SamplerConfig,
        source: S,
        transport: T,
        clock: C,
        delay: D,
    ) -> Result<Self, SamplerError> {
        config.validate(CAP, OUT)?;
        let now = clock.now_ms();
        Ok(Self {
            governor: RateGovernor::new(config.tick_period_ms()),
            meter: ThroughputMeter::new(config.rate_window, now),
            batch: Batch::new(),
            serializer: BatchSerializer::new(),
            batch_started_ms: now,
            baseline: None,
            stats: SamplerStats::default(),
            config,
            source,
            transport,
            clock,
            delay,
        })
    }

    /// Calibrate, reset the batch and prime the source
    pub fn start(&mut self) {
        info!(
            "Sampler starting: {} Hz, {} samples per batch",
            self.config.sample_rate_hz,
            self.config.samples_per_batch
        );

        self.baseline = self.calibrate();
        match self.baseline {
            Some(baseline) => info!("Channel A baseline: {}", baseline),
            None => warn!("Channel A baseline unavailable"),
        }

        self.batch.reset();
        let now = self.clock.now_ms();
        self.batch_started_ms = now;
        self.meter.restart(now);
        self.source.refill();
    }

    /// Run forever
    pub async fn run(&mut self) -> ! {
        self.start();
        loop {
            self.tick().await;
        }
    }

    /// Run one tick, including its idle wait
    pub async fn tick(&mut self) -> TickOutcome {
        let tick_start = self.clock.now_ms();
        let outcome = self.sample(tick_start).await;
        self.governor
            .pace(&self.clock, &mut self.delay, tick_start)
            .await;
        outcome
    }

    async fn sample(&mut self, tick_start: u32) -> TickOutcome {
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        if !self.source.has_buffered_sample() {
            self.source.refill();
            if !self.source.has_buffered_sample() {
                self.stats.empty_ticks = self.stats.empty_ticks.wrapping_add(1);
                debug!("No sample buffered at {}", tick_start);
                return TickOutcome::NoSample;
            }
        }

        let a = self.source.read_channel_a();
        let b = self.source.read_channel_b();
        self.source.advance();
        if !self.source.has_buffered_sample() {
            self.source.refill();
        }

        let hz = self.meter.record(self.clock.now_ms());
        debug!("R[{}] IR[{}] Hz[{}]", b, a, hz);

        if let Err(e) = self.batch.push(tick_start, a, b) {
            error!("Dropping batch after {} samples: {}", self.batch.len(), e);
            self.discard_batch();
            return TickOutcome::Dropped(e);
        }

        let filled = self.batch.len();
        if filled >= self.config.samples_per_batch {
            return self.flush().await;
        }
        TickOutcome::Sampled { index: filled - 1 }
    }

    async fn flush(&mut self) -> TickOutcome {
        let samples = self.batch.len();

        let outcome = match self.batch.finalize() {
            Ok(finalized) => match self.serializer.serialize(&finalized) {
                Ok(body) => {
                    let bytes = body.len();
                    info!(
                        "POST {} samples ({} bytes) to {}",
                        samples,
                        bytes,
                        self.config.post_path
                    );
                    let result = self.transport.send(self.config.post_path, body).await;
                    match result {
                        Ok(()) => {
                            self.stats.batches_sent = self.stats.batches_sent.wrapping_add(1);
                        }
                        Err(e) => {
                            self.stats.batches_failed = self.stats.batches_failed.wrapping_add(1);
                            warn!("Batch send failed, dropping batch: {}", e);
                        }
                    }
                    TickOutcome::Flushed(FlushReport {
                        samples,
                        bytes,
                        result,
                    })
                }
                Err(e) => {
                    error!("Batch serialization failed: {}", e);
                    self.stats.batches_dropped = self.stats.batches_dropped.wrapping_add(1);
                    TickOutcome::Dropped(e)
                }
            },
            Err(e) => {
                error!("Batch finalize failed: {}", e);
                self.stats.batches_dropped = self.stats.batches_dropped.wrapping_add(1);
                TickOutcome::Dropped(e)
            }
        };

        self.batch.reset();
        self.batch_started_ms = self.clock.now_ms();
        outcome
    }

    /// Drop the batch in progress after a rejected append
    ///
    /// `new` refuses configs whose full batch cannot fit `CAP`, so this only
    /// runs if a worst-case append is rejected anyway, for instance when the
    /// batch size changes after validation.
    fn discard_batch(&mut self) {
        self.batch.reset();
        self.batch_started_ms = self.clock.now_ms();
        self.stats.batches_dropped = self.stats.batches_dropped.wrapping_add(1);
    }

    /// Average `baseline_samples` channel A readings
    fn calibrate(&mut self) -> Option<i32> {
        let wanted = u32::from(self.config.baseline_samples);
        if wanted == 0 {
            return None;
        }

        let mut sum: i64 = 0;
        let mut got: u32 = 0;
        for _ in 0..wanted * BASELINE_POLL_FACTOR {
            if got == wanted {
                break;
            }
            if !self.source.has_buffered_sample() {
                self.source.refill();
                if !self.source.has_buffered_sample() {
                    continue;
                }
            }
            sum += i64::from(self.source.read_channel_a());
            self.source.advance();
            got += 1;
        }

        if got == 0 {
            return None;
        }
        i32::try_from(sum / i64::from(got)).ok()
    }

    /// Active configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Batch being filled
    pub fn batch(&self) -> &Batch<CAP> {
        &self.batch
    }

    /// Timestamp at which the current batch started
    pub fn batch_started_ms(&self) -> u32 {
        self.batch_started_ms
    }

    /// Rate governor, with its overrun and drift counters
    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    /// Channel A baseline measured by `start()`
    pub fn baseline(&self) -> Option<i32> {
        self.baseline
    }

    /// Running counters
    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    /// Sample source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Sample source, mutably
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
