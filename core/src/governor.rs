#![deny(unsafe_code)]
//! Fixed-period rate governor
//!
//! Sleeps off whatever is left of a tick's budget. A tick that overruns its
//! period starts the next one immediately; the lost time is never made up,
//! so drift accumulates. The counters make that drift observable.

use embedded_hal_async::delay::DelayNs;
use pulse_hal::MillisClock;

/// Result of pacing one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pace {
    /// Tick finished early; idled for this many milliseconds (may be 0)
    Idled(u32),
    /// Tick took longer than the period by this many milliseconds
    Overran(u32),
}

/// Enforces a target tick period
#[derive(Debug, Clone)]
pub struct RateGovernor {
    period_ms: u32,
    overruns: u32,
    drift_ms: u64,
}

impl RateGovernor {
    /// Create a governor for `period_ms` ticks
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            overruns: 0,
            drift_ms: 0,
        }
    }

    /// Target tick period
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Decide how to pace a tick that has run for `elapsed_ms`
    pub fn plan(&self, elapsed_ms: u32) -> Pace {
        if elapsed_ms > self.period_ms {
            Pace::Overran(elapsed_ms - self.period_ms)
        } else {
            Pace::Idled(self.period_ms - elapsed_ms)
        }
    }

    /// Idle until `tick_start_ms + period`, or return at once if that is past
    pub async fn pace<C, D>(&mut self, clock: &C, delay: &mut D, tick_start_ms: u32) -> Pace
    where
        C: MillisClock,
        D: DelayNs,
    {
        let elapsed = clock.now_ms().wrapping_sub(tick_start_ms);
        let pace = self.plan(elapsed);
        match pace {
            Pace::Idled(0) => {}
            Pace::Idled(ms) => delay.delay_ms(ms).await,
            Pace::Overran(ms) => {
                self.overruns = self.overruns.saturating_add(1);
                self.drift_ms = self.drift_ms.saturating_add(u64::from(ms));
            }
        }
        pace
    }

    /// Ticks that overran their period
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Total milliseconds lost to overruns
    pub fn drift_ms(&self) -> u64 {
        self.drift_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockClock, MockDelay};
    use embassy_futures::block_on;

    #[test]
    fn test_plan_idles_remaining_budget() {
        let governor = RateGovernor::new(20);
        assert_eq!(governor.plan(0), Pace::Idled(20));
        assert_eq!(governor.plan(7), Pace::Idled(13));
        assert_eq!(governor.plan(20), Pace::Idled(0));
        assert_eq!(governor.plan(35), Pace::Overran(15));
    }

    #[test]
    fn test_pace_sleeps_remainder() {
        let clock = MockClock::new(1000);
        let mut delay = MockDelay::new(&clock);
        let mut governor = RateGovernor::new(20);

        clock.advance(5);
        let pace = block_on(governor.pace(&clock, &mut delay, 1000));
        assert_eq!(pace, Pace::Idled(15));
        assert_eq!(delay.calls(), vec![15]);
        assert_eq!(clock.now_ms(), 1020);
        assert_eq!(governor.overruns(), 0);
    }

    #[test]
    fn test_overrun_proceeds_without_idle() {
        let clock = MockClock::new(0);
        let mut delay = MockDelay::new(&clock);
        let mut governor = RateGovernor::new(20);

        clock.advance(50);
        assert_eq!(block_on(governor.pace(&clock, &mut delay, 0)), Pace::Overran(30));
        clock.advance(25);
        assert_eq!(block_on(governor.pace(&clock, &mut delay, 50)), Pace::Overran(5));

        assert!(delay.calls().is_empty());
        assert_eq!(governor.overruns(), 2);
        assert_eq!(governor.drift_ms(), 35);
    }

    #[test]
    fn test_exact_budget_does_not_call_delay() {
        let clock = MockClock::new(0);
        let mut delay = MockDelay::new(&clock);
        let mut governor = RateGovernor::new(20);

        clock.advance(20);
        assert_eq!(block_on(governor.pace(&clock, &mut delay, 0)), Pace::Idled(0));
        assert!(delay.calls().is_empty());
    }

    #[test]
    fn test_elapsed_across_clock_wrap() {
        let clock = MockClock::new(u32::MAX - 4);
        let mut delay = MockDelay::new(&clock);
        let mut governor = RateGovernor::new(20);

        clock.advance(10);
        let pace = block_on(governor.pace(&clock, &mut delay, u32::MAX - 4));
        assert_eq!(pace, Pace::Idled(10));
    }
}
