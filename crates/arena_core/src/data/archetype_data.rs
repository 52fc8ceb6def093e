//! Archetype data structures for data-driven stat tables.

use serde::{Deserialize, Serialize};

use crate::components::{MovementType, TargetFilter};
use crate::math::{fixed_decimal, option_fixed_decimal, Fixed};

/// Data-driven archetype definition.
///
/// Timing is expressed in animation terms. The derived per-second speed
/// and millisecond cooldowns live on [`crate::catalog::ArchetypeStats`].
///
/// # Example RON
///
/// ```ron
/// (
///     id: "Wizard",
///     health: 755,
///     walk_fps: 6.0,
///     fight_fps: 4.0,
///     move_per_frame: 4.5,
///     attack_frames: 8.0,
///     range: 30.0,
///     damage: 281,
///     target_filter: Both,
///     movement: Ground,
///     elixir_cost: 5,
///     radius: 0.0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeData {
    /// Canonical card identifier, e.g. `"MiniPEKKA"`.
    pub id: String,

    /// Alternate spellings that resolve to this entry.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Maximum health points.
    pub health: u32,

    /// Walk animation frames per second.
    #[serde(with = "fixed_decimal")]
    pub walk_fps: Fixed,

    /// Fight animation frames per second.
    #[serde(with = "fixed_decimal")]
    pub fight_fps: Fixed,

    /// Plane units covered per walk frame at the reference tile size.
    #[serde(with = "fixed_decimal")]
    pub move_per_frame: Fixed,

    /// Frames in one attack cycle.
    #[serde(with = "fixed_decimal")]
    pub attack_frames: Fixed,

    /// Frame of the attack cycle on which damage lands.
    #[serde(default, with = "option_fixed_decimal")]
    pub impact_frame: Option<Fixed>,

    /// Distance at which the unit stops walking; defaults to `range`.
    #[serde(default, with = "option_fixed_decimal")]
    pub stop_range: Option<Fixed>,

    /// Attack range in plane units at the reference tile size.
    #[serde(with = "fixed_decimal")]
    pub range: Fixed,

    /// Damage per hit.
    pub damage: u32,

    /// What this archetype can attack.
    #[serde(default)]
    pub target_filter: TargetFilter,

    /// How this archetype moves.
    #[serde(default)]
    pub movement: MovementType,

    /// Elixir cost to deploy.
    pub elixir_cost: u32,

    /// Collision radius in plane units.
    #[serde(with = "fixed_decimal")]
    pub radius: Fixed,

    /// Units per deploy. Carried for data completeness; deploys create one.
    #[serde(default = "default_spawn_count")]
    pub spawn_count: u32,
}

/// Default spawn count for archetypes without an explicit value.
const fn default_spawn_count() -> u32 {
    1
}

impl ArchetypeData {
    /// The low-power record used for identifiers missing from the table.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: "Unknown".to_string(),
            aliases: Vec::new(),
            health: 100,
            walk_fps: Fixed::from_num(5),
            fight_fps: Fixed::from_num(5),
            move_per_frame: Fixed::from_num(2),
            attack_frames: Fixed::from_num(10),
            impact_frame: None,
            stop_range: None,
            range: Fixed::from_num(20),
            damage: 10,
            target_filter: TargetFilter::Ground,
            movement: MovementType::Ground,
            elixir_cost: 1,
            radius: Fixed::from_num(20),
            spawn_count: 1,
        }
    }

    /// Check whether `name` refers to this archetype, canonically or by alias.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.id == name || self.aliases.iter().any(|alias| alias == name)
    }
}

/// A complete stat table as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchetypeTable {
    /// All archetype definitions.
    pub archetypes: Vec<ArchetypeData>,
}

impl ArchetypeTable {
    /// Get an archetype by canonical id or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArchetypeData> {
        self.archetypes.iter().find(|a| a.answers_to(name))
    }

    /// Validate the table for internal consistency.
    ///
    /// Checks that:
    /// - Identifiers and aliases are unique
    /// - Frame rates are positive
    /// - Health is non-zero
    /// - Impact frames fall inside the attack cycle
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for archetype in &self.archetypes {
            for name in std::iter::once(&archetype.id).chain(&archetype.aliases) {
                if seen.contains(&name.as_str()) {
                    errors.push(format!("Name '{name}' is defined more than once"));
                } else {
                    seen.push(name.as_str());
                }
            }

            if archetype.health == 0 {
                errors.push(format!("Archetype '{}' has zero health", archetype.id));
            }

            if archetype.fight_fps <= Fixed::ZERO {
                errors.push(format!(
                    "Archetype '{}' has non-positive fight_fps",
                    archetype.id
                ));
            }

            if archetype.walk_fps < Fixed::ZERO || archetype.move_per_frame < Fixed::ZERO {
                errors.push(format!("Archetype '{}' has negative walk speed", archetype.id));
            }

            if archetype.range < Fixed::ZERO || archetype.radius < Fixed::ZERO {
                errors.push(format!(
                    "Archetype '{}' has negative range or radius",
                    archetype.id
                ));
            }

            if let Some(impact) = archetype.impact_frame {
                if impact < Fixed::ZERO || impact > archetype.attack_frames {
                    errors.push(format!(
                        "Archetype '{}' lands its hit outside the attack cycle",
                        archetype.id
                    ));
                }
            }
        }

        errors
    }
}
