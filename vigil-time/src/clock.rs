// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Injectable scenario clocks

use crate::{Duration, Instant, Scaled};
use std::thread;

/// Source of elapsed scenario time.
///
/// Each call to [`Clock::advance`] moves on to the next tick. Implementations must
/// never report a smaller elapsed time than a previous call did.
pub trait Clock {
    /// Elapsed scenario time of the current tick
    fn elapsed(&self) -> Duration;

    /// Move to the next tick
    fn advance(&mut self);
}

/// Deterministic clock advancing by a fixed step per tick.
#[derive(Debug, Clone)]
pub struct StepClock {
    step: Duration,
    ticks: u32,
}

impl StepClock {
    /// Create a clock starting at zero
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn new(step: Duration) -> Self {
        assert!(!step.is_zero(), "step clock needs a non-zero step");
        Self { step, ticks: 0 }
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}

impl Clock for StepClock {
    fn elapsed(&self) -> Duration {
        self.step * self.ticks
    }

    fn advance(&mut self) {
        self.ticks += 1;
    }
}

/// Wall clock measuring vigil time since construction.
///
/// `advance` paces the caller to the configured tick period, scaled by the factor set
/// with [`crate::speed`].
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
    period: Duration,
    next_tick: Duration,
}

impl WallClock {
    pub fn start(period: Duration) -> Self {
        Self {
            start: Instant::now(),
            period,
            next_tick: period,
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn advance(&mut self) {
        let elapsed = self.elapsed();
        if let Some(remaining) = self.next_tick.checked_sub(elapsed) {
            thread::sleep(remaining.scaled());
        }
        // Skip tick boundaries that were already missed
        while self.next_tick <= self.elapsed() {
            self.next_tick += self.period;
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Clock, StepClock, WallClock};
    use crate::Duration;

    #[test]
    fn step_clock_is_exact() {
        let mut clock = StepClock::new(Duration::from_millis(50));
        for _ in 0..20 {
            clock.advance();
        }
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
        assert_eq!(clock.ticks(), 20);
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let mut clock = WallClock::start(Duration::from_millis(1));
        let mut previous = clock.elapsed();
        for _ in 0..5 {
            clock.advance();
            let now = clock.elapsed();
            assert!(now >= previous);
            previous = now;
        }
        assert!(previous >= Duration::from_millis(5));
    }
}
