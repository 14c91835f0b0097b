// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Vigil temporal quantification.
//!
//! Scenario logic never reads the host clock directly. It receives the elapsed scenario
//! time from a [`Clock`], which is either a [`WallClock`] (optionally sped up or slowed
//! down with [`speed`]) or a deterministic [`StepClock`] advancing by a fixed tick.
//!
//! ```
//! use vigil_time::{Clock, Duration, StepClock};
//!
//! let mut clock = StepClock::new(Duration::from_millis(50));
//! assert_eq!(clock.elapsed(), Duration::ZERO);
//! clock.advance();
//! assert_eq!(clock.elapsed(), Duration::from_millis(50));
//! ```

mod clock;

use std::error::Error;
use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{LazyLock, Once};
pub use std::time::Duration;
use std::{fmt, time};

pub use clock::{Clock, StepClock, WallClock};

/// "1970-01-01 00:00:00 UTC" on all systems with respect to the system clock.
pub const UNIX_EPOCH: SystemTime = SystemTime(time::UNIX_EPOCH);

#[derive(Clone, Debug)]
pub struct SystemTimeError(Duration);

/// A monotonic instant, scaled by the factor set with [`speed`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(time::Instant);

/// A wall clock time, scaled by the factor set with [`speed`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemTime(time::SystemTime);

/// Initialization synchronization. Ensures that `speed` can be set only once.
static INIT: Once = Once::new();
/// Time scaling start timestamps
static START: LazyLock<(SystemTime, Instant)> = LazyLock::new(|| {
    (
        SystemTime(time::SystemTime::now()),
        Instant(time::Instant::now()),
    )
});
/// Factor on systemtime and instant if set via `speed`
static FACTOR: AtomicI32 = AtomicI32::new(0);

/// A trait for scaling durations based on the factor set by `speed`.
pub trait Scaled {
    /// Scale the duration for use with `std::thread::sleep` and friends, which run on
    /// unscaled host time. A positive factor shortens, a negative factor lengthens.
    fn scaled(&self) -> Self;
}

/// Set a speedup (positive) or slowdown (negative) factor on vigil time.
///
/// # Panics
///
/// Panics if called more than once.
pub fn speed(factor: i32) {
    assert!(!INIT.is_completed(), "speed can be set only once");
    INIT.call_once(|| ());

    // Pin the start timestamps before the factor becomes visible
    let _ = &*START;

    FACTOR.store(factor, Ordering::Relaxed);
}

/// Get the current speed factor if set. Otherwise return None.
pub fn get_speed() -> Option<i32> {
    let factor = FACTOR.load(Ordering::Relaxed);
    (factor != 0).then_some(factor)
}

/// Stretch or compress `elapsed` according to `factor`.
fn scale_elapsed(elapsed: Duration, factor: i32) -> Duration {
    if factor.is_positive() {
        elapsed * factor.unsigned_abs()
    } else {
        elapsed / factor.unsigned_abs()
    }
}

impl Instant {
    /// Returns an instant corresponding to "now" in vigil time.
    #[must_use]
    pub fn now() -> Instant {
        let now = Instant(time::Instant::now());

        let factor = FACTOR.load(Ordering::Relaxed);
        if factor == 0 {
            return now;
        }

        let start = START.1;
        let elapsed = scale_elapsed(now.duration_since(start), factor);
        start.checked_add(elapsed).expect("clock error")
    }

    /// Elapsed time from `earlier` to `self`, saturating at zero.
    #[must_use]
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        self.checked_duration_since(earlier).unwrap_or_default()
    }

    #[must_use]
    pub fn checked_duration_since(&self, earlier: Instant) -> Option<Duration> {
        self.0.checked_duration_since(earlier.0)
    }

    /// Elapsed vigil time since this instant.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Instant::now() - *self
    }

    pub fn checked_add(&self, duration: Duration) -> Option<Instant> {
        self.0.checked_add(duration).map(Instant)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, other: Duration) -> Instant {
        self.checked_add(other)
            .expect("overflow when adding duration to instant")
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, other: Instant) -> Duration {
        self.duration_since(other)
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl SystemTime {
    pub const UNIX_EPOCH: SystemTime = UNIX_EPOCH;

    pub fn now() -> SystemTime {
        let now = SystemTime(time::SystemTime::now());

        let factor = FACTOR.load(Ordering::Relaxed);
        if factor == 0 {
            return now;
        }

        let start = START.0;
        let since_start = now.duration_since(start).unwrap_or_default();
        start
            .checked_add(scale_elapsed(since_start, factor))
            .expect("clock error")
    }

    /// Returns the amount of time elapsed from an earlier point in time.
    pub fn duration_since(&self, earlier: Self) -> Result<Duration, SystemTimeError> {
        self.0.duration_since(earlier.0).map_err(Into::into)
    }

    pub fn elapsed(&self) -> Result<Duration, SystemTimeError> {
        SystemTime::now().duration_since(*self)
    }

    pub fn checked_add(&self, duration: Duration) -> Option<SystemTime> {
        self.0.checked_add(duration).map(SystemTime)
    }

    /// Seconds since the UNIX epoch as a float, as written into control logs.
    pub fn as_unix_secs_f64(&self) -> f64 {
        self.duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

impl fmt::Debug for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl SystemTimeError {
    /// How far the second system time was ahead of the first.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for SystemTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "second time provided was later than self")
    }
}

impl Error for SystemTimeError {}

impl From<time::SystemTimeError> for SystemTimeError {
    fn from(e: time::SystemTimeError) -> Self {
        SystemTimeError(e.duration())
    }
}

impl Scaled for Duration {
    fn scaled(&self) -> Self {
        match FACTOR.load(Ordering::Relaxed) {
            0 => *self,
            factor if factor.is_positive() => *self / factor.unsigned_abs(),
            factor => *self * factor.unsigned_abs(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{scale_elapsed, Duration};

    #[test]
    fn scale_elapsed_speeds_up_and_slows_down() {
        let second = Duration::from_secs(1);
        assert_eq!(scale_elapsed(second, 4), Duration::from_secs(4));
        assert_eq!(scale_elapsed(second, -4), Duration::from_millis(250));
    }
}
