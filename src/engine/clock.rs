//! Session clock management.
//!
//! Tracks elapsed session time at a fixed tick granularity. The clock
//! advances only when the engine is driven, so a session is fully
//! deterministic and replayable.

use serde::{Deserialize, Serialize};

use crate::engine::SimTime;

/// Fixed-tick session clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    /// Elapsed session time.
    elapsed: SimTime,
    /// Tick duration in nanoseconds.
    tick_nanos: u64,
    /// Number of ticks taken.
    tick_count: u64,
}

impl SessionClock {
    /// Create a new clock with the given tick granularity in seconds.
    ///
    /// # Panics
    ///
    /// Panics if the tick is not positive or not finite.
    #[must_use]
    pub fn new(tick_secs: f64) -> Self {
        assert!(tick_secs > 0.0, "tick must be positive");
        assert!(tick_secs.is_finite(), "tick must be finite");

        let tick_nanos = (tick_secs * 1_000_000_000.0) as u64;

        Self {
            elapsed: SimTime::ZERO,
            tick_nanos,
            tick_count: 0,
        }
    }

    /// Create a new clock with tick granularity in nanoseconds.
    #[must_use]
    pub const fn from_nanos(tick_nanos: u64) -> Self {
        Self {
            elapsed: SimTime::ZERO,
            tick_nanos,
            tick_count: 0,
        }
    }

    /// Elapsed session time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.elapsed
    }

    /// Tick duration as seconds.
    #[must_use]
    pub fn tick_secs(&self) -> f64 {
        self.tick_nanos as f64 / 1_000_000_000.0
    }

    /// Tick duration in nanoseconds.
    #[must_use]
    pub const fn tick_nanos(&self) -> u64 {
        self.tick_nanos
    }

    /// Number of ticks taken.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advance the clock by one full tick.
    ///
    /// Returns the new elapsed time.
    pub fn tick(&mut self) -> SimTime {
        self.step_by(self.tick_nanos)
    }

    /// Advance the clock by an arbitrary amount (used for the trailing
    /// partial tick of a drive interval).
    ///
    /// Returns the new elapsed time.
    pub fn step_by(&mut self, nanos: u64) -> SimTime {
        self.elapsed = self.elapsed.add_nanos(nanos);
        self.tick_count += 1;
        self.elapsed
    }

    /// Reset clock to session start.
    pub fn reset(&mut self) {
        self.elapsed = SimTime::ZERO;
        self.tick_count = 0;
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        // Default 100ms tick
        Self::from_nanos(100_000_000)
    }
}
