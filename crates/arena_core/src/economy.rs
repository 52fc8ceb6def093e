//! Elixir economy for the locally tracked side.
//!
//! Elixir regenerates continuously with simulated time and is capped at
//! a maximum. Only one side's elixir is tracked; the other side's deploys
//! are not gated locally.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// Elixir pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Elixir {
    /// Current amount, always within `[0, max]`.
    current: Fixed,
    /// Cap.
    max: Fixed,
    /// Milliseconds to generate one elixir.
    regen_ms: u32,
}

impl Elixir {
    /// Create a pool. `starting` is clamped into `[0, max]`.
    #[must_use]
    pub fn new(starting: Fixed, max: Fixed, regen_ms: u32) -> Self {
        Self {
            current: starting.clamp(Fixed::ZERO, max),
            max,
            regen_ms,
        }
    }

    /// Current amount.
    #[must_use]
    pub const fn current(&self) -> Fixed {
        self.current
    }

    /// The cap.
    #[must_use]
    pub const fn max(&self) -> Fixed {
        self.max
    }

    /// Regenerate for `delta_ms` of simulated time.
    ///
    /// Adds `delta_ms / regen_ms`, clamped to the cap.
    pub fn regenerate(&mut self, delta_ms: u64) {
        if self.current >= self.max || self.regen_ms == 0 {
            return;
        }
        let gained = Fixed::saturating_from_num(delta_ms) / Fixed::from_num(self.regen_ms);
        self.current = self.current.saturating_add(gained).min(self.max);
    }

    /// Force the pool to its cap.
    pub fn fill(&mut self) {
        self.current = self.max;
    }

    /// Check if a cost can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= Fixed::from_num(cost)
    }

    /// Spend elixir if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.current -= Fixed::from_num(cost);
            true
        } else {
            false
        }
    }
}
