//! Component definitions shared by every battlefield entity.
//!
//! Components are pure data with no behavior. Behavior lives in
//! [`crate::behavior`], [`crate::spell`] and [`crate::simulation`].

use serde::{Deserialize, Serialize};

// ============================================================================
// Ownership
// ============================================================================

/// Which half of the arena an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The bottom half, walking toward the top baseline.
    Player,
    /// The top half, walking toward the bottom baseline.
    Opponent,
}

impl Side {
    /// Derive a side from an owner identifier.
    ///
    /// Any id starting with `player` (case-insensitive) belongs to
    /// [`Side::Player`]; everything else is the opponent.
    ///
    /// ```
    /// use arena_core::components::Side;
    ///
    /// assert_eq!(Side::from_owner_id("player1"), Side::Player);
    /// assert_eq!(Side::from_owner_id("Player"), Side::Player);
    /// assert_eq!(Side::from_owner_id("opponent"), Side::Opponent);
    /// ```
    #[must_use]
    pub fn from_owner_id(owner_id: &str) -> Self {
        let is_player = owner_id
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("player"));
        if is_player {
            Self::Player
        } else {
            Self::Opponent
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opposing(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    /// Lowercase name used in tower ids and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Opponent => "opponent",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Deployed units, including stationary buildings placed from cards.
    Troop,
    /// Arena towers that score crowns when destroyed.
    Tower,
    /// Short-lived area effects.
    Spell,
}

// ============================================================================
// Targeting
// ============================================================================

/// How an entity moves, which also decides who can hit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementType {
    /// Walks, and must cross the river at a bridge.
    #[default]
    Ground,
    /// Flies point to point.
    Air,
}

/// Which movement types an attacker is able to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetFilter {
    /// Ground only.
    #[default]
    Ground,
    /// Air only.
    Air,
    /// Anything.
    Both,
}

impl TargetFilter {
    /// Check whether a target moving this way can be attacked.
    #[must_use]
    pub const fn allows(self, movement: MovementType) -> bool {
        match self {
            Self::Both => true,
            Self::Ground => matches!(movement, MovementType::Ground),
            Self::Air => matches!(movement, MovementType::Air),
        }
    }
}

/// Behavioral state reported to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Moving toward a target or the enemy baseline.
    #[default]
    Walk,
    /// Target in range, attacking.
    Fight,
    /// Standing still.
    Idle,
}

// ============================================================================
// Health
// ============================================================================

/// Health component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction so health never drops below zero.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }

    /// Mark as dead regardless of remaining health.
    pub fn kill(&mut self) {
        self.current = 0;
    }
}
