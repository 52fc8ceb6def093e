//! Fixed-step accumulator.
//!
//! Hosts render at whatever rate they like; the battle logic should tick
//! at a steady step. [`FixedTimestep`] banks frame time and reports how
//! many whole steps are due.

use serde::{Deserialize, Serialize};

/// Frame-time accumulator for a fixed logic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedTimestep {
    step_ms: u64,
    accumulator_ms: u64,
}

impl FixedTimestep {
    /// Create an accumulator for `step_ms`. A zero step is treated as 1 ms.
    #[must_use]
    pub const fn new(step_ms: u64) -> Self {
        Self {
            step_ms: if step_ms == 0 { 1 } else { step_ms },
            accumulator_ms: 0,
        }
    }

    /// Logic step length.
    #[must_use]
    pub const fn step_ms(&self) -> u64 {
        self.step_ms
    }

    /// Time banked but not yet consumed.
    #[must_use]
    pub const fn pending_ms(&self) -> u64 {
        self.accumulator_ms
    }

    /// Bank `frame_ms` and return how many steps are now due.
    ///
    /// ```
    /// use arena_core::clock::FixedTimestep;
    ///
    /// let mut clock = FixedTimestep::new(33);
    /// assert_eq!(clock.advance(16), 0);
    /// assert_eq!(clock.advance(17), 1);
    /// assert_eq!(clock.advance(70), 2);
    /// assert_eq!(clock.pending_ms(), 4);
    /// ```
    pub fn advance(&mut self, frame_ms: u64) -> u64 {
        self.accumulator_ms = self.accumulator_ms.saturating_add(frame_ms);
        let steps = self.accumulator_ms / self.step_ms;
        self.accumulator_ms %= self.step_ms;
        steps
    }

    /// Drop banked time.
    pub fn reset(&mut self) {
        self.accumulator_ms = 0;
    }
}
