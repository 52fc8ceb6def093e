//! Battlefield entities and the registry that owns them.
//!
//! Every entity shares the same header (id, side, position, health,
//! radius, facing). Category-specific state lives in [`EntityKind`].
//! Cross-entity references are plain [`EntityId`]s that are looked up
//! again each tick, so a pruned target simply stops resolving.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::archetype::Archetype;
use crate::components::{BehaviorState, Category, Health, MovementType, Side, TargetFilter};
use crate::math::{Fixed, Vec2Fixed};

/// Unique identifier for entities.
///
/// Ids are handed out in increasing order and never reused within a
/// battle, so ordering by id is insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A hit that has been swung but not yet landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingHit {
    /// Target locked in when the swing started.
    pub target: EntityId,
    /// Simulation time at which damage lands.
    pub lands_at_ms: u64,
    /// Damage to apply.
    pub damage: u32,
}

/// Per-troop combat and movement state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Troop {
    /// Which archetype this troop was built from.
    pub archetype: Archetype,
    /// Walk speed in plane units per second at the reference tile size.
    pub speed: Fixed,
    /// Base attack range at the reference tile size.
    pub range: Fixed,
    /// Range after tile scaling, refreshed every tick.
    pub current_range: Fixed,
    /// Distance at which walking stops, if configured.
    pub stop_range: Option<Fixed>,
    /// Minimum milliseconds between attacks.
    pub attack_cooldown_ms: u64,
    /// Swing-to-impact delay for delayed-hit archetypes.
    pub windup_ms: Option<u64>,
    /// Damage per hit.
    pub damage: u32,
    /// What this troop can attack.
    pub target_filter: TargetFilter,
    /// How this troop moves.
    pub movement: MovementType,
    /// Current behavior state.
    pub state: BehaviorState,
    /// Current target, re-resolved every tick.
    pub target: Option<EntityId>,
    /// Simulation time of the last attack.
    pub last_attack_ms: u64,
    /// Scheduled delayed hit, if any.
    pub pending_hit: Option<PendingHit>,
}

/// King or princess tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Central tower; destroying it ends the match.
    King,
    /// Lane tower.
    Princess,
}

impl TowerKind {
    /// Derive the kind from a tower name. Names containing `king` are kings.
    ///
    /// ```
    /// use arena_core::entity::TowerKind;
    ///
    /// assert_eq!(TowerKind::from_tower_name("opponent_king"), TowerKind::King);
    /// assert_eq!(TowerKind::from_tower_name("player_princess_left"), TowerKind::Princess);
    /// ```
    #[must_use]
    pub fn from_tower_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("king") {
            Self::King
        } else {
            Self::Princess
        }
    }
}

/// Per-tower combat state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tower {
    /// King or princess.
    pub kind: TowerKind,
    /// Attack range at the reference tile size.
    pub range: Fixed,
    /// Range after tile scaling, refreshed every tick.
    pub current_range: Fixed,
    /// Damage per shot.
    pub damage: u32,
    /// Minimum milliseconds between shots.
    pub attack_cooldown_ms: u64,
    /// Current behavior state.
    pub state: BehaviorState,
    /// Current target.
    pub target: Option<EntityId>,
    /// Simulation time of the last shot.
    pub last_attack_ms: u64,
    /// Set once by the battle when destruction has been scored.
    pub destroyed: bool,
}

/// Tower attack range in tiles.
pub const TOWER_RANGE_TILES: Fixed = Fixed::lit("5.5");
/// Tower damage per shot.
pub const TOWER_DAMAGE: u32 = 90;
/// Tower milliseconds between shots.
pub const TOWER_COOLDOWN_MS: u64 = 800;
/// Tower collision radius.
pub const TOWER_RADIUS: i32 = 50;
/// Default collision radius for entities without one.
pub const DEFAULT_RADIUS: i32 = 20;

/// Per-spell state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spell {
    /// Area radius at the reference tile size.
    pub radius: Fixed,
    /// Damage applied on activation.
    pub damage: u32,
    /// Milliseconds the spell lingers after activating.
    pub duration_ms: u64,
    /// Simulation time of activation, set on first update.
    pub activated_at_ms: Option<u64>,
}

/// Spell lifetime when the data gives none.
pub const DEFAULT_SPELL_DURATION_MS: u64 = 1000;

/// Category-specific entity state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Deployed unit or card building.
    Troop(Troop),
    /// Arena tower.
    Tower(Tower),
    /// Area effect.
    Spell(Spell),
}

/// Anything on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier, assigned on insert.
    pub id: EntityId,
    /// Archetype id for troops and spells, tower name for towers.
    pub label: String,
    /// Owning side.
    pub side: Side,
    /// Center position in plane units.
    pub position: Vec2Fixed,
    /// Health; zero means dead.
    pub health: Health,
    /// Collision radius.
    pub radius: Fixed,
    /// Unit direction the entity faces.
    pub facing: Vec2Fixed,
    /// Category-specific state.
    pub kind: EntityKind,
}

impl Entity {
    /// Build a tower. The king flag comes from the name.
    #[must_use]
    pub fn tower(name: impl Into<String>, position: Vec2Fixed, side: Side, health: u32) -> Self {
        let label = name.into();
        Self {
            id: EntityId::default(),
            side,
            position,
            health: Health::new(health),
            radius: Fixed::from_num(TOWER_RADIUS),
            facing: initial_facing(side),
            kind: EntityKind::Tower(Tower {
                kind: TowerKind::from_tower_name(&label),
                range: TOWER_RANGE_TILES * Fixed::from_num(crate::layout::REFERENCE_TILE_SIZE),
                current_range: TOWER_RANGE_TILES
                    * Fixed::from_num(crate::layout::REFERENCE_TILE_SIZE),
                damage: TOWER_DAMAGE,
                attack_cooldown_ms: TOWER_COOLDOWN_MS,
                state: BehaviorState::Idle,
                target: None,
                last_attack_ms: 0,
                destroyed: false,
            }),
            label,
        }
    }

    /// The broad category.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self.kind {
            EntityKind::Troop(_) => Category::Troop,
            EntityKind::Tower(_) => Category::Tower,
            EntityKind::Spell(_) => Category::Spell,
        }
    }

    /// Check if health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// How the entity moves. Towers and spells count as ground.
    #[must_use]
    pub const fn movement(&self) -> MovementType {
        match &self.kind {
            EntityKind::Troop(troop) => troop.movement,
            EntityKind::Tower(_) | EntityKind::Spell(_) => MovementType::Ground,
        }
    }

    /// Apply damage, returning the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health.apply_damage(amount)
    }

    /// Current behavior state, if the entity has one.
    #[must_use]
    pub const fn behavior_state(&self) -> Option<BehaviorState> {
        match &self.kind {
            EntityKind::Troop(troop) => Some(troop.state),
            EntityKind::Tower(tower) => Some(tower.state),
            EntityKind::Spell(_) => None,
        }
    }

    /// Troop state, if this is a troop.
    #[must_use]
    pub const fn as_troop(&self) -> Option<&Troop> {
        match &self.kind {
            EntityKind::Troop(troop) => Some(troop),
            _ => None,
        }
    }

    /// Tower state, if this is a tower.
    #[must_use]
    pub const fn as_tower(&self) -> Option<&Tower> {
        match &self.kind {
            EntityKind::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    /// Spell state, if this is a spell.
    #[must_use]
    pub const fn as_spell(&self) -> Option<&Spell> {
        match &self.kind {
            EntityKind::Spell(spell) => Some(spell),
            _ => None,
        }
    }

    /// Facing as an angle in radians, for renderers.
    #[must_use]
    pub fn facing_angle(&self) -> f32 {
        self.facing.angle()
    }
}

/// Player troops face up the arena, opponent troops face down.
#[must_use]
pub fn initial_facing(side: Side) -> Vec2Fixed {
    match side {
        Side::Player => Vec2Fixed::new(Fixed::ZERO, -Fixed::ONE),
        Side::Opponent => Vec2Fixed::new(Fixed::ZERO, Fixed::ONE),
    }
}

/// Storage for all entities in a battle.
///
/// Backed by a `BTreeMap` keyed by monotonically increasing ids, so
/// iteration is insertion order and identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStorage {
    /// Map of entity ID to entity data.
    entities: BTreeMap<EntityId, Entity>,
    /// Next entity ID to assign.
    next_id: u64,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity, assigning it a fresh id.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterate over all entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterate mutably over all entities in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Remove every dead entity, returning their ids in order.
    pub fn prune_dead(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.is_alive())
            .map(|e| e.id)
            .collect();
        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }
}
