#![deny(unsafe_code)]
//! Test doubles for the collaborator traits

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;
use pulse_hal::{MillisClock, SampleSource, Transport, TransportError};

/// Samples the mock sensor moves into its FIFO per refill
const REFILL_CHUNK: usize = 3;

/// Manually advanced clock; clones share one counter
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Rc<Cell<u32>>,
}

impl MockClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl MillisClock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Delay that records each millisecond wait and advances a `MockClock`
#[derive(Debug, Clone)]
pub struct MockDelay {
    clock: MockClock,
    calls: Rc<RefCell<Vec<u32>>>,
}

impl MockDelay {
    pub fn new(clock: &MockClock) -> Self {
        Self {
            clock: clock.clone(),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.borrow().clone()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls.borrow_mut().push(ms);
        self.clock.advance(ms);
    }
}

/// Sensor replaying a fixed list of readings through a small FIFO
///
/// Reading an empty FIFO panics, so a test fails if the loop ever reads
/// stale data.
#[derive(Debug)]
pub struct ScriptedSource {
    pending: VecDeque<(i32, i32)>,
    fifo: VecDeque<(i32, i32)>,
    read_cost: Option<(MockClock, u32)>,
    reads: usize,
    refills: usize,
}

impl ScriptedSource {
    pub fn new(readings: &[(i32, i32)]) -> Self {
        Self {
            pending: readings.iter().copied().collect(),
            fifo: VecDeque::new(),
            read_cost: None,
            reads: 0,
            refills: 0,
        }
    }

    /// Advance `clock` by `ms` on every channel A read
    pub fn with_read_cost(mut self, clock: &MockClock, ms: u32) -> Self {
        self.read_cost = Some((clock.clone(), ms));
        self
    }

    pub fn push(&mut self, a: i32, b: i32) {
        self.pending.push_back((a, b));
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn refills(&self) -> usize {
        self.refills
    }

    fn current(&self) -> (i32, i32) {
        *self.fifo.front().expect("read from empty FIFO")
    }
}

impl SampleSource for ScriptedSource {
    fn read_channel_a(&mut self) -> i32 {
        if let Some((clock, ms)) = &self.read_cost {
            clock.advance(*ms);
        }
        self.reads += 1;
        self.current().0
    }

    fn read_channel_b(&mut self) -> i32 {
        self.current().1
    }

    fn has_buffered_sample(&mut self) -> bool {
        !self.fifo.is_empty()
    }

    fn refill(&mut self) -> usize {
        self.refills += 1;
        let n = self.pending.len().min(REFILL_CHUNK);
        self.fifo.extend(self.pending.drain(..n));
        n
    }

    fn advance(&mut self) {
        self.fifo.pop_front();
    }
}

/// Transport recording every request, with scripted failures and latency
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Vec<(String, Vec<u8>)>,
    failures: VecDeque<TransportError>,
    latency: Option<(MockClock, u32)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next send with `error`
    pub fn fail_next(mut self, error: TransportError) -> Self {
        self.failures.push_back(error);
        self
    }

    /// Advance `clock` by `ms` on every send
    pub fn with_latency(mut self, clock: &MockClock, ms: u32) -> Self {
        self.latency = Some((clock.clone(), ms));
        self
    }

    pub fn sent(&self) -> &[(String, Vec<u8>)] {
        &self.sent
    }
}

impl Transport for MockTransport {
    async fn send(&mut self, path: &str, body: &[u8]) -> Result<(), TransportError> {
        if let Some((clock, ms)) = &self.latency {
            clock.advance(*ms);
        }
        self.sent.push((path.to_string(), body.to_vec()));
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Integers of the JSON array stored under `key` in a batch payload
pub fn json_array(payload: &str, key: &str) -> Vec<i64> {
    let marker = std::format!("\"{}\":[", key);
    let start = payload.find(&marker).expect("key not found") + marker.len();
    let end = start + payload[start..].find(']').expect("unterminated array");
    payload[start..end]
        .split(',')
        .map(|v| v.parse().expect("not an integer"))
        .collect()
}
