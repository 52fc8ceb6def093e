//! Battle configuration.
//!
//! Every field has a default matching a standard three-minute match, so a
//! RON file only needs to list what it changes:
//!
//! ```
//! use arena_core::config::BattleConfig;
//!
//! let config = BattleConfig::from_ron("(test_mode: true, match_duration_ms: 60000)").unwrap();
//! assert!(config.test_mode);
//! assert_eq!(config.max_elixir, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::error::{BattleError, Result};

/// Tunable battle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Match length in milliseconds.
    pub match_duration_ms: u64,
    /// Elixir at match start.
    pub starting_elixir: u32,
    /// Elixir cap.
    pub max_elixir: u32,
    /// Milliseconds to regenerate one elixir.
    pub elixir_regen_ms: u32,
    /// Keep elixir pinned at the cap.
    pub test_mode: bool,
    /// Side whose elixir is tracked and gated.
    pub local_side: Side,
    /// Whether towers shoot back.
    pub tower_defense: bool,
    /// King tower health.
    pub king_tower_health: u32,
    /// Princess tower health.
    pub princess_tower_health: u32,
    /// Logic step used by [`crate::simulation::Battle::advance_frame`].
    pub logic_step_ms: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            match_duration_ms: 180_000,
            starting_elixir: 5,
            max_elixir: 10,
            elixir_regen_ms: 1400,
            test_mode: false,
            local_side: Side::Player,
            tower_defense: true,
            king_tower_health: 4000,
            princess_tower_health: 2500,
            logic_step_ms: 33,
        }
    }
}

impl BattleConfig {
    /// Sandbox configuration with elixir pinned at the cap.
    #[must_use]
    pub fn test_mode() -> Self {
        Self {
            test_mode: true,
            ..Self::default()
        }
    }

    /// Parse a configuration from RON. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns [`BattleError::DataParseError`] on malformed text and
    /// [`BattleError::InvalidConfig`] if the values are rejected.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| BattleError::DataParseError {
            source_name: "battle config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.match_duration_ms == 0 {
            return Err(BattleError::InvalidConfig(
                "match_duration_ms must be positive".to_string(),
            ));
        }
        if self.max_elixir == 0 {
            return Err(BattleError::InvalidConfig(
                "max_elixir must be positive".to_string(),
            ));
        }
        if self.starting_elixir > self.max_elixir {
            return Err(BattleError::InvalidConfig(format!(
                "starting_elixir {} exceeds max_elixir {}",
                self.starting_elixir, self.max_elixir
            )));
        }
        if self.elixir_regen_ms == 0 {
            return Err(BattleError::InvalidConfig(
                "elixir_regen_ms must be positive".to_string(),
            ));
        }
        if self.logic_step_ms == 0 {
            return Err(BattleError::InvalidConfig(
                "logic_step_ms must be positive".to_string(),
            ));
        }
        if self.king_tower_health == 0 || self.princess_tower_health == 0 {
            return Err(BattleError::InvalidConfig(
                "tower health must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
