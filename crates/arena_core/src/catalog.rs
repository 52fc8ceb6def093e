//! Stat catalog: archetype identifier to combat stats.
//!
//! Lookups never fail. Identifiers missing from the table resolve to a
//! fixed low-power record so deploys and AI code always have stats to
//! work with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{MovementType, TargetFilter};
use crate::data::{ArchetypeData, ArchetypeTable, BUILTIN_ARCHETYPES};
use crate::error::{BattleError, Result};
use crate::math::Fixed;

/// Combat stats for one archetype, in simulation units.
///
/// Speeds and ranges are at the reference tile size; the simulation scales
/// them by the live layout every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    /// Canonical identifier.
    pub id: String,
    /// Maximum health.
    pub health: u32,
    /// Walk speed in plane units per second.
    pub speed: Fixed,
    /// Base attack range in plane units.
    pub range: Fixed,
    /// Minimum milliseconds between attacks.
    pub attack_cooldown_ms: u64,
    /// Milliseconds from swing start to impact, if the data defines one.
    pub impact_delay_ms: Option<u64>,
    /// Distance at which the unit stops walking, if different from range.
    pub stop_range: Option<Fixed>,
    /// Damage per hit.
    pub damage: u32,
    /// What this archetype can attack.
    pub target_filter: TargetFilter,
    /// How this archetype moves.
    pub movement: MovementType,
    /// Elixir cost.
    pub elixir_cost: u32,
    /// Collision radius.
    pub radius: Fixed,
    /// Units per deploy as authored.
    pub spawn_count: u32,
}

impl ArchetypeStats {
    /// Derive per-second and per-millisecond stats from animation data.
    #[must_use]
    pub fn from_data(data: &ArchetypeData) -> Self {
        let per_fight_frame_ms = Fixed::from_num(1000) / data.fight_fps;
        Self {
            id: data.id.clone(),
            health: data.health,
            speed: data.walk_fps * data.move_per_frame,
            range: data.range,
            attack_cooldown_ms: frames_to_ms(data.attack_frames, per_fight_frame_ms),
            impact_delay_ms: data
                .impact_frame
                .map(|frame| frames_to_ms(frame, per_fight_frame_ms)),
            stop_range: data.stop_range,
            damage: data.damage,
            target_filter: data.target_filter,
            movement: data.movement,
            elixir_cost: data.elixir_cost,
            radius: data.radius,
            spawn_count: data.spawn_count,
        }
    }
}

fn frames_to_ms(frames: Fixed, ms_per_frame: Fixed) -> u64 {
    (frames * ms_per_frame).round().to_num::<u64>()
}

/// Immutable archetype lookup table.
#[derive(Debug, Clone)]
pub struct StatCatalog {
    entries: Vec<ArchetypeStats>,
    /// Canonical ids and aliases, mapped to indices into `entries`.
    index: HashMap<String, usize>,
    fallback: ArchetypeStats,
}

impl StatCatalog {
    /// Build a catalog from a parsed table.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidData`] if the table fails validation.
    pub fn from_table(table: &ArchetypeTable) -> Result<Self> {
        let issues = table.validate();
        if !issues.is_empty() {
            return Err(BattleError::InvalidData(issues));
        }

        let mut entries = Vec::with_capacity(table.archetypes.len());
        let mut index = HashMap::new();
        for data in &table.archetypes {
            let slot = entries.len();
            entries.push(ArchetypeStats::from_data(data));
            index.insert(data.id.clone(), slot);
            for alias in &data.aliases {
                index.insert(alias.clone(), slot);
            }
        }

        Ok(Self {
            entries,
            index,
            fallback: ArchetypeStats::from_data(&ArchetypeData::fallback()),
        })
    }

    /// Parse a catalog from RON text.
    ///
    /// # Errors
    /// Returns [`BattleError::DataParseError`] on malformed text and
    /// [`BattleError::InvalidData`] if the table fails validation.
    pub fn from_ron(text: &str, source_name: &str) -> Result<Self> {
        let table: ArchetypeTable =
            ron::from_str(text).map_err(|e| BattleError::DataParseError {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        Self::from_table(&table)
    }

    /// The table shipped with the crate.
    ///
    /// # Errors
    /// Only fails if the embedded table is malformed.
    pub fn standard() -> Result<Self> {
        Self::from_ron(BUILTIN_ARCHETYPES, "archetypes.ron")
    }

    /// Look up stats by identifier or alias.
    ///
    /// Unknown identifiers get the fallback record.
    ///
    /// ```
    /// use arena_core::catalog::StatCatalog;
    ///
    /// let catalog = StatCatalog::standard().unwrap();
    /// assert_eq!(catalog.lookup("Barbarians").id, "Barbarian");
    /// assert_eq!(catalog.lookup("NotACard").elixir_cost, 1);
    /// ```
    #[must_use]
    pub fn lookup(&self, archetype_id: &str) -> &ArchetypeStats {
        match self.index.get(archetype_id) {
            Some(&slot) => &self.entries[slot],
            None => {
                tracing::warn!(archetype = archetype_id, "Unknown archetype, using fallback stats");
                &self.fallback
            }
        }
    }

    /// Check whether an identifier or alias is in the table.
    #[must_use]
    pub fn contains(&self, archetype_id: &str) -> bool {
        self.index.contains_key(archetype_id)
    }

    /// The record returned for unknown identifiers.
    #[must_use]
    pub const fn fallback(&self) -> &ArchetypeStats {
        &self.fallback
    }

    /// Iterate over every defined archetype in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ArchetypeStats> {
        self.entries.iter()
    }

    /// Number of defined archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no archetypes are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
