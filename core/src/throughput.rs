#![deny(unsafe_code)]
//! Rolling throughput estimate for the diagnostic line
//!
//! Has no bearing on correctness; the window restarts every `window` ticks so
//! the figure tracks recent behavior.

/// Sample-rate meter over a window of ticks
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    window: u32,
    count: u32,
    window_start_ms: u32,
}

impl ThroughputMeter {
    /// Create a meter whose first window starts at `now_ms`
    pub const fn new(window: u32, now_ms: u32) -> Self {
        Self {
            window,
            count: 0,
            window_start_ms: now_ms,
        }
    }

    /// Restart the window at `now_ms`
    pub fn restart(&mut self, now_ms: u32) {
        self.count = 0;
        self.window_start_ms = now_ms;
    }

    /// Count one tick and return the current rate in Hz
    ///
    /// Returns 0.0 while no time has elapsed in the window.
    pub fn record(&mut self, now_ms: u32) -> f32 {
        self.count += 1;
        let elapsed_ms = now_ms.wrapping_sub(self.window_start_ms);
        let hz = if elapsed_ms == 0 {
            0.0
        } else {
            self.count as f32 / (elapsed_ms as f32 / 1000.0)
        };
        if self.count >= self.window {
            self.restart(now_ms);
        }
        hz
    }

    /// Ticks counted in the current window
    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_estimate() {
        let mut meter = ThroughputMeter::new(180, 0);
        let mut hz = 0.0;
        for tick in 1..=50 {
            hz = meter.record(tick * 20);
        }
        assert!((hz - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_elapsed_reports_zero() {
        let mut meter = ThroughputMeter::new(180, 100);
        assert_eq!(meter.record(100), 0.0);
    }

    #[test]
    fn test_window_restarts() {
        let mut meter = ThroughputMeter::new(3, 0);
        meter.record(10);
        meter.record(20);
        assert_eq!(meter.count(), 2);
        meter.record(30);
        assert_eq!(meter.count(), 0);
        // new window started at 30
        assert!((meter.record(40) - 100.0).abs() < 0.01);
    }
}
