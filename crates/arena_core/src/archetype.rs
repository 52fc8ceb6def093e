//! Archetypes and the constructor table that turns a card into an entity.
//!
//! Every deployable card maps to one [`Archetype`]. Behavior differences
//! between archetypes are data ([`BehaviorProfile`]), so a single
//! targeting and movement routine serves them all.

use serde::{Deserialize, Serialize};

use crate::catalog::ArchetypeStats;
use crate::components::{BehaviorState, Health, Side};
use crate::entity::{
    initial_facing, Entity, EntityId, EntityKind, Spell, Troop, DEFAULT_RADIUS,
    DEFAULT_SPELL_DURATION_MS,
};
use crate::error::{BattleError, Result};
use crate::math::{Fixed, Vec2Fixed};

/// Deployable archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Ranged ground troop hitting air and ground.
    Archers,
    /// Melee ground troop.
    Barbarian,
    /// Slow tank that goes for buildings.
    Giant,
    /// Heavy melee with a delayed hit.
    MiniPekka,
    /// Melee ground troop.
    Valkyrie,
    /// Ranged ground troop hitting air and ground.
    Wizard,
    /// Flying ranged troop.
    BabyDragon,
    /// Stationary building placed from a card.
    InfernoTower,
    /// Area damage spell.
    Arrows,
    /// Anything the table does not know; built as a plain ground troop.
    Generic,
}

/// Per-archetype behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BehaviorProfile {
    /// Target towers while any enemy tower stands.
    pub prefers_buildings: bool,
    /// Schedule damage after the impact delay instead of hitting instantly.
    pub delayed_impact: bool,
    /// Never moves; only acquires targets already in range.
    pub stationary: bool,
}

impl Archetype {
    /// Every archetype, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Archers,
        Self::Barbarian,
        Self::Giant,
        Self::MiniPekka,
        Self::Valkyrie,
        Self::Wizard,
        Self::BabyDragon,
        Self::InfernoTower,
        Self::Arrows,
        Self::Generic,
    ];

    /// Resolve a card identifier. Unknown identifiers become [`Archetype::Generic`].
    ///
    /// ```
    /// use arena_core::archetype::Archetype;
    ///
    /// assert_eq!(Archetype::from_card_id("Barbarians"), Archetype::Barbarian);
    /// assert_eq!(Archetype::from_card_id("MiniPEKKA"), Archetype::MiniPekka);
    /// assert_eq!(Archetype::from_card_id("Rage"), Archetype::Generic);
    /// ```
    #[must_use]
    pub fn from_card_id(card_id: &str) -> Self {
        match card_id {
            "Archers" => Self::Archers,
            "Barbarian" | "Barbarians" => Self::Barbarian,
            "Giant" => Self::Giant,
            "MiniPEKKA" => Self::MiniPekka,
            "Valkyrie" => Self::Valkyrie,
            "Wizard" => Self::Wizard,
            "BabyDragon" => Self::BabyDragon,
            "InfernoTower" => Self::InfernoTower,
            "Arrows" => Self::Arrows,
            _ => Self::Generic,
        }
    }

    /// Behavior switches for this archetype.
    #[must_use]
    pub const fn profile(self) -> BehaviorProfile {
        match self {
            Self::Giant => BehaviorProfile {
                prefers_buildings: true,
                delayed_impact: false,
                stationary: false,
            },
            Self::MiniPekka => BehaviorProfile {
                prefers_buildings: false,
                delayed_impact: true,
                stationary: false,
            },
            Self::InfernoTower => BehaviorProfile {
                prefers_buildings: false,
                delayed_impact: false,
                stationary: true,
            },
            Self::Archers
            | Self::Barbarian
            | Self::Valkyrie
            | Self::Wizard
            | Self::BabyDragon
            | Self::Arrows
            | Self::Generic => BehaviorProfile {
                prefers_buildings: false,
                delayed_impact: false,
                stationary: false,
            },
        }
    }
}

/// The twelve cards of the deck, numbered the way the card table numbers them.
const CARD_NUMBERS: [(u8, &str); 12] = [
    (1, "Giant"),
    (2, "Valkyrie"),
    (3, "MiniPEKKA"),
    (4, "BabyDragon"),
    (5, "Archers"),
    (6, "Arrows"),
    (7, "Wizard"),
    (8, "Barbarians"),
    (9, "Cannon"),
    (10, "Rage"),
    (11, "InfernoTower"),
    (12, "Fireball"),
];

/// Card identifier for a card number.
#[must_use]
pub fn card_name(number: u8) -> Option<&'static str> {
    CARD_NUMBERS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, name)| *name)
}

/// Card number for a card identifier.
#[must_use]
pub fn card_number(card_id: &str) -> Option<u8> {
    CARD_NUMBERS
        .iter()
        .find(|(_, name)| *name == card_id)
        .map(|(n, _)| *n)
}

/// Builds an entity for one archetype. The id is assigned on insert.
pub type Constructor = fn(Archetype, Vec2Fixed, Side, &ArchetypeStats) -> Entity;

/// Archetype to constructor mapping, checked for completeness up front.
#[derive(Debug, Clone)]
pub struct ConstructorTable {
    entries: Vec<(Archetype, Constructor)>,
}

impl ConstructorTable {
    /// Build a table, failing if any archetype lacks a constructor.
    ///
    /// # Errors
    /// Returns [`BattleError::MissingConstructor`] naming the first gap.
    pub fn new(entries: Vec<(Archetype, Constructor)>) -> Result<Self> {
        for archetype in Archetype::ALL {
            if !entries.iter().any(|(a, _)| *a == archetype) {
                return Err(BattleError::MissingConstructor(format!("{archetype:?}")));
            }
        }
        Ok(Self { entries })
    }

    /// The shipped mapping: every troop archetype builds a troop, spells build spells.
    ///
    /// # Errors
    /// Only fails if the shipped mapping is incomplete.
    pub fn standard() -> Result<Self> {
        let troop: Constructor = build_troop;
        let spell: Constructor = build_spell;
        Self::new(
            Archetype::ALL
                .into_iter()
                .map(|archetype| match archetype {
                    Archetype::Arrows => (archetype, spell),
                    _ => (archetype, troop),
                })
                .collect(),
        )
    }

    /// Build an entity for `archetype`.
    ///
    /// Returns `None` only for a table built without [`ConstructorTable::new`]'s
    /// completeness check, which the public API does not allow.
    #[must_use]
    pub fn construct(
        &self,
        archetype: Archetype,
        position: Vec2Fixed,
        side: Side,
        stats: &ArchetypeStats,
    ) -> Option<Entity> {
        self.entries
            .iter()
            .find(|(a, _)| *a == archetype)
            .map(|(_, build)| build(archetype, position, side, stats))
    }
}

/// Build a troop-category entity from stats.
#[must_use]
pub fn build_troop(
    archetype: Archetype,
    position: Vec2Fixed,
    side: Side,
    stats: &ArchetypeStats,
) -> Entity {
    let windup_ms = if archetype.profile().delayed_impact {
        stats.impact_delay_ms
    } else {
        None
    };

    Entity {
        id: EntityId::default(),
        label: stats.id.clone(),
        side,
        position,
        health: Health::new(stats.health),
        radius: if stats.radius > Fixed::ZERO {
            stats.radius
        } else {
            Fixed::from_num(DEFAULT_RADIUS)
        },
        facing: initial_facing(side),
        kind: EntityKind::Troop(Troop {
            archetype,
            speed: stats.speed,
            range: stats.range,
            current_range: stats.range,
            stop_range: stats.stop_range,
            attack_cooldown_ms: stats.attack_cooldown_ms,
            windup_ms,
            damage: stats.damage,
            target_filter: stats.target_filter,
            movement: stats.movement,
            state: if archetype.profile().stationary {
                BehaviorState::Idle
            } else {
                BehaviorState::Walk
            },
            target: None,
            last_attack_ms: 0,
            pending_hit: None,
        }),
    }
}

/// Build a spell entity. The stat range doubles as the area radius.
#[must_use]
pub fn build_spell(
    _archetype: Archetype,
    position: Vec2Fixed,
    side: Side,
    stats: &ArchetypeStats,
) -> Entity {
    Entity {
        id: EntityId::default(),
        label: stats.id.clone(),
        side,
        position,
        health: Health::new(1),
        radius: Fixed::ZERO,
        facing: initial_facing(side),
        kind: EntityKind::Spell(Spell {
            radius: stats.range,
            damage: stats.damage,
            duration_ms: DEFAULT_SPELL_DURATION_MS,
            activated_at_ms: None,
        }),
    }
}
