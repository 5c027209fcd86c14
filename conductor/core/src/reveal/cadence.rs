//! Reveal cadence
//!
//! Converts elapsed wall time into whole reveal ticks. Surfaces render at
//! their own frame rate; the remainder of each frame carries over so the
//! average tick rate matches the configured period.

use std::time::Duration;

/// Default time between two revealed words
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(20);

/// Upper bound on ticks reported for one `advance` call; any backlog past
/// it is dropped.
const MAX_TICKS_PER_ADVANCE: u32 = 64;

/// Fixed-period tick accumulator
#[derive(Clone, Debug)]
pub struct Cadence {
    period: Duration,
    carry: Duration,
}

impl Cadence {
    /// Create a cadence with the given period. A zero period is raised to
    /// one millisecond.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            carry: Duration::ZERO,
        }
    }

    /// Configured period
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Account for `elapsed` time and return how many ticks are now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.carry += elapsed;

        let mut ticks = 0;
        while self.carry >= self.period && ticks < MAX_TICKS_PER_ADVANCE {
            self.carry -= self.period;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_ADVANCE {
            self.carry = Duration::ZERO;
        }
        ticks
    }

    /// Drop any partially accumulated period
    pub fn reset(&mut self) {
        self.carry = Duration::ZERO;
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE)
    }
}
