//! Battle root: registry, economy, clock and victory.
//!
//! The battle is driven entirely by the host. Each call to
//! [`Battle::tick`] advances simulated time by the supplied delta and runs
//! one update pass over the registry in insertion order.
//!
//! # Determinism
//!
//! - No floating-point math in the simulation (uses fixed-point via [`Fixed`])
//! - No randomness and no wall clock
//! - Registry iteration is insertion order
//! - Same inputs always produce the same [`Battle::state_hash`]
//!
//! # Example
//!
//! ```
//! use arena_core::config::BattleConfig;
//! use arena_core::math::Vec2Fixed;
//! use arena_core::simulation::Battle;
//!
//! let mut battle = Battle::new(BattleConfig::default()).unwrap();
//! let towers = battle.layout().standard_towers();
//! battle.spawn_towers(&towers);
//! battle.start();
//!
//! let archers = battle.deploy_card("Archers", Vec2Fixed::from_ints(143, 800), "player");
//! assert!(archers.is_some());
//!
//! battle.tick(33, 33);
//! assert_eq!(battle.state().remaining_ms, 180_000 - 33);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::archetype::{Archetype, ConstructorTable};
use crate::behavior::{update_tower, update_troop, CombatContext, Hit, TowerUpdate, TroopUpdate};
use crate::catalog::StatCatalog;
use crate::clock::FixedTimestep;
use crate::components::{BehaviorState, Side};
use crate::config::BattleConfig;
use crate::economy::Elixir;
use crate::entity::{Entity, EntityId, EntityKind, EntityStorage, TowerKind};
use crate::error::{BattleError, Result};
use crate::layout::{ArenaLayout, TowerPlacement};
use crate::math::{Fixed, Vec2Fixed};
use crate::spell::{update_spell, SpellUpdate};
use crate::victory::{resolve_winner, Outcome, Scoreboard, SurvivingTowers, VictoryReason};

/// Drift between the local clock and an external one worth reporting.
const CLOCK_DRIFT_WARN_MS: u64 = 2000;

/// A tower whose destruction was scored this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerDestroyed {
    /// The tower.
    pub id: EntityId,
    /// Side that lost it.
    pub side: Side,
    /// King or princess.
    pub kind: TowerKind,
}

/// Events generated during a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Entities removed at the end of the tick.
    pub killed: Vec<EntityId>,
    /// Towers scored this tick.
    pub towers_destroyed: Vec<TowerDestroyed>,
    /// Set on the tick the match ended.
    pub match_ended: Option<Outcome>,
}

impl TickEvents {
    /// Fold a later tick's events into this one.
    pub fn merge(&mut self, later: Self) {
        self.killed.extend(later.killed);
        self.towers_destroyed.extend(later.towers_destroyed);
        if later.match_ended.is_some() {
            self.match_ended = later.match_ended;
        }
    }
}

/// Read-only summary of the battle for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    /// Elixir of the locally tracked side.
    pub elixir: Fixed,
    /// Elixir cap.
    pub max_elixir: Fixed,
    /// The match has started.
    pub started: bool,
    /// The match has ended.
    pub ended: bool,
    /// Final outcome once ended.
    pub outcome: Option<Outcome>,
    /// Why the match ended.
    pub reason: Option<VictoryReason>,
    /// Crowns and lost towers per side.
    pub score: Scoreboard,
    /// Simulated milliseconds since start.
    pub elapsed_ms: u64,
    /// Milliseconds left on the match clock.
    pub remaining_ms: u64,
}

impl BattleState {
    /// Winning side, if the match ended with one.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(Outcome::winner)
    }
}

enum Update {
    Troop(TroopUpdate),
    Tower(TowerUpdate),
    Spell(SpellUpdate),
}

/// The battle simulation.
///
/// Owns every entity, the local side's elixir, the match clock and the
/// score. Nothing is global; two battles never share state.
///
/// # Tick Order
///
/// 1. Clock, ending the match on timeout
/// 2. Elixir regeneration
/// 3. Troop, tower and spell updates in registry order
/// 4. Tower destruction scan and victory checks
/// 5. Removal of dead entities
#[derive(Debug, Clone)]
pub struct Battle {
    config: BattleConfig,
    catalog: StatCatalog,
    constructors: ConstructorTable,
    layout: ArenaLayout,
    entities: EntityStorage,
    elixir: Elixir,
    clock: FixedTimestep,
    started: bool,
    ended: bool,
    elapsed_ms: u64,
    score: Scoreboard,
    towers_spawned: [u32; 2],
    outcome: Option<Outcome>,
    reason: Option<VictoryReason>,
}

const fn side_slot(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Opponent => 1,
    }
}

impl Battle {
    /// Create a battle with the built-in stat table.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidConfig`] for a rejected config, or a
    /// data error if the built-in table fails to load.
    pub fn new(config: BattleConfig) -> Result<Self> {
        Self::with_catalog(config, StatCatalog::standard()?)
    }

    /// Create a battle with a custom stat table.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidConfig`] for a rejected config and
    /// [`BattleError::MissingConstructor`] if the constructor table is
    /// incomplete.
    pub fn with_catalog(config: BattleConfig, catalog: StatCatalog) -> Result<Self> {
        config.validate()?;
        let constructors = ConstructorTable::standard()?;

        let mut elixir = Elixir::new(
            Fixed::from_num(config.starting_elixir),
            Fixed::from_num(config.max_elixir),
            config.elixir_regen_ms,
        );
        if config.test_mode {
            elixir.fill();
        }

        Ok(Self {
            clock: FixedTimestep::new(config.logic_step_ms),
            config,
            catalog,
            constructors,
            layout: ArenaLayout::default(),
            entities: EntityStorage::new(),
            elixir,
            started: false,
            ended: false,
            elapsed_ms: 0,
            score: Scoreboard::default(),
            towers_spawned: [0; 2],
            outcome: None,
            reason: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The configuration this battle runs with.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The stat catalog.
    #[must_use]
    pub const fn catalog(&self) -> &StatCatalog {
        &self.catalog
    }

    /// Current arena geometry.
    #[must_use]
    pub const fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    /// Replace the arena geometry. Takes effect on the next tick.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidLayout`] and keeps the current
    /// geometry if `layout` is rejected.
    pub fn set_layout(&mut self, layout: ArenaLayout) -> Result<()> {
        if let Err(err) = layout.validate() {
            tracing::warn!(error = %err, "Layout rejected");
            return Err(err);
        }
        self.layout = layout;
        Ok(())
    }

    /// Read-only view of every entity, in insertion order.
    #[must_use]
    pub const fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Elixir of the locally tracked side.
    #[must_use]
    pub const fn elixir(&self) -> Fixed {
        self.elixir.current()
    }

    /// Crowns and lost towers per side.
    #[must_use]
    pub const fn score(&self) -> &Scoreboard {
        &self.score
    }

    /// Whether the match has ended.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Milliseconds left on the match clock.
    #[must_use]
    pub const fn remaining_ms(&self) -> u64 {
        self.config.match_duration_ms.saturating_sub(self.elapsed_ms)
    }

    /// Summary snapshot.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        BattleState {
            elixir: self.elixir.current(),
            max_elixir: self.elixir.max(),
            started: self.started,
            ended: self.ended,
            outcome: self.outcome,
            reason: self.reason,
            score: self.score,
            elapsed_ms: self.elapsed_ms,
            remaining_ms: self.remaining_ms(),
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Add one tower. Health comes from the config by kind.
    pub fn add_tower(&mut self, name: &str, position: Vec2Fixed, side: Side) -> EntityId {
        let health = match TowerKind::from_tower_name(name) {
            TowerKind::King => self.config.king_tower_health,
            TowerKind::Princess => self.config.princess_tower_health,
        };
        self.towers_spawned[side_slot(side)] += 1;
        self.entities
            .insert(Entity::tower(name, position, side, health))
    }

    /// Add a set of towers, typically [`ArenaLayout::standard_towers`].
    pub fn spawn_towers(&mut self, placements: &[TowerPlacement]) -> Vec<EntityId> {
        placements
            .iter()
            .map(|placement| self.add_tower(&placement.name, placement.position, placement.side))
            .collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the match clock.
    pub fn start(&mut self) {
        if self.started || self.ended {
            return;
        }
        self.started = true;
        tracing::info!(
            duration_ms = self.config.match_duration_ms,
            local_side = %self.config.local_side,
            towers = self.towers_spawned.iter().sum::<u32>(),
            "Match started"
        );
    }

    /// Adopt an externally supplied elapsed time, ending the match if it
    /// has run out.
    pub fn sync_elapsed(&mut self, elapsed_ms: u64) {
        if self.ended {
            return;
        }
        let drift = self.elapsed_ms.abs_diff(elapsed_ms);
        if drift > CLOCK_DRIFT_WARN_MS && self.elapsed_ms > 0 {
            tracing::warn!(
                local_ms = self.elapsed_ms,
                external_ms = elapsed_ms,
                "Match clock drifted"
            );
        }
        self.elapsed_ms = elapsed_ms;
        // Banked frame time belongs to the clock being replaced.
        self.clock.reset();
        if self.elapsed_ms >= self.config.match_duration_ms {
            self.end_game();
        }
    }

    /// End the match now, resolving the winner by tiebreak.
    pub fn force_end_game(&mut self) {
        self.end_game();
    }

    /// Bank a variable frame time and run as many fixed logic steps as
    /// are due. Events from every step are merged.
    pub fn advance_frame(&mut self, time_ms: u64, frame_ms: u64) -> TickEvents {
        let mut events = TickEvents::default();
        if !self.started || self.ended {
            return events;
        }
        let step_ms = self.clock.step_ms();
        for _ in 0..self.clock.advance(frame_ms) {
            events.merge(self.tick(time_ms, step_ms));
        }
        events
    }

    /// Advance the battle by `delta_ms` of simulated time.
    ///
    /// `time_ms` is the host's simulated timestamp, used for attack
    /// cooldowns and spell timing. Does nothing before [`Battle::start`]
    /// or after the match has ended.
    pub fn tick(&mut self, time_ms: u64, delta_ms: u64) -> TickEvents {
        let mut events = TickEvents::default();
        if !self.started || self.ended {
            return events;
        }

        // 1. Clock
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.elapsed_ms >= self.config.match_duration_ms {
            self.end_game();
            events.match_ended = self.outcome;
            return events;
        }

        // 2. Elixir
        if self.config.test_mode {
            self.elixir.fill();
        } else {
            self.elixir.regenerate(delta_ms);
        }

        // 3. Combat pass
        for id in self.entities.ids() {
            self.update_entity(id, time_ms, delta_ms);
        }

        // 4. Tower destruction
        self.scan_towers(&mut events);
        if self.ended {
            events.match_ended = self.outcome;
        }

        // 5. Prune
        events.killed = self.entities.prune_dead();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(elapsed_ms = self.elapsed_ms, state_hash = hash, "Battle state hash");
        }

        events
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Deploy a card for `owner_id` at `position`.
    ///
    /// Deploys for the locally tracked side cost elixir and are refused
    /// with `None` if it cannot be paid; the other side is not gated.
    /// Unknown card ids deploy a plain ground troop with default stats.
    pub fn deploy_card(
        &mut self,
        card_id: &str,
        position: Vec2Fixed,
        owner_id: &str,
    ) -> Option<&Entity> {
        if self.ended {
            return None;
        }

        let side = Side::from_owner_id(owner_id);
        let stats = self.catalog.lookup(card_id);
        let gated = side == self.config.local_side;

        if gated && !self.elixir.can_afford(stats.elixir_cost) {
            tracing::debug!(
                card = card_id,
                elixir = %self.elixir.current(),
                cost = stats.elixir_cost,
                "Deploy rejected"
            );
            return None;
        }

        // TODO: fan out spawn_count units around the drop point; one entity is built per deploy.
        let archetype = Archetype::from_card_id(card_id);
        let mut entity = self
            .constructors
            .construct(archetype, position, side, stats)?;
        if !self.catalog.contains(card_id) {
            entity.label = card_id.to_string();
        }
        if gated {
            self.elixir.spend(stats.elixir_cost);
        }

        let id = self.entities.insert(entity);
        tracing::debug!(
            card = card_id,
            %id,
            %side,
            elixir = %self.elixir.current(),
            "Card deployed"
        );
        self.entities.get(id)
    }

    /// Damage an entity directly. Returns the damage actually dealt.
    ///
    /// # Errors
    /// Returns [`BattleError::EntityNotFound`] if no entity has this id.
    pub fn apply_damage(&mut self, id: EntityId, amount: u32) -> Result<u32> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(BattleError::EntityNotFound(id.0))?;
        if self.ended {
            return Ok(0);
        }
        Ok(entity.take_damage(amount))
    }

    /// Score a fallen tower and end the match if it was decisive.
    ///
    /// Called once per tower by the destruction scan in [`Battle::tick`].
    /// A no-op once the match has ended.
    pub fn on_tower_destroyed(&mut self, is_king: bool, owner: Side) {
        if self.ended {
            return;
        }
        let kind = if is_king {
            TowerKind::King
        } else {
            TowerKind::Princess
        };
        if let Some(reason) = self.score.record_tower_destroyed(owner, kind) {
            self.reason = Some(reason);
            self.end_game();
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn update_entity(&mut self, id: EntityId, time_ms: u64, delta_ms: u64) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if !entity.is_alive() {
            return;
        }

        let ctx = CombatContext {
            time_ms,
            delta_ms,
            entities: &self.entities,
            layout: &self.layout,
        };
        let update = match &entity.kind {
            EntityKind::Troop(troop) => Update::Troop(update_troop(entity, troop, &ctx)),
            EntityKind::Tower(tower) if self.config.tower_defense => {
                Update::Tower(update_tower(entity, tower, &ctx))
            }
            EntityKind::Tower(_) => return,
            EntityKind::Spell(spell) => Update::Spell(update_spell(entity, spell, &ctx)),
        };

        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let hits = match update {
            Update::Troop(update) => {
                entity.position = update.position;
                entity.facing = update.facing;
                entity.kind = EntityKind::Troop(update.troop);
                update.hits
            }
            Update::Tower(update) => {
                entity.facing = update.facing;
                entity.kind = EntityKind::Tower(update.tower);
                update.hits
            }
            Update::Spell(update) => {
                entity.kind = EntityKind::Spell(update.spell);
                if update.expired {
                    entity.health.kill();
                }
                update.hits
            }
        };
        self.apply_hits(id, &hits);
    }

    fn apply_hits(&mut self, attacker: EntityId, hits: &[Hit]) {
        for hit in hits {
            let Some(target) = self.entities.get_mut(hit.target) else {
                continue;
            };
            let was_alive = target.is_alive();
            target.take_damage(hit.damage);
            if was_alive && !target.is_alive() {
                tracing::debug!(
                    %attacker,
                    target = %hit.target,
                    label = %target.label,
                    "Entity killed"
                );
            }
        }
    }

    fn scan_towers(&mut self, events: &mut TickEvents) {
        let fallen: Vec<TowerDestroyed> = self
            .entities
            .iter()
            .filter_map(|entity| match &entity.kind {
                EntityKind::Tower(tower) if !tower.destroyed && !entity.is_alive() => {
                    Some(TowerDestroyed {
                        id: entity.id,
                        side: entity.side,
                        kind: tower.kind,
                    })
                }
                _ => None,
            })
            .collect();

        for destroyed in fallen {
            if let Some(EntityKind::Tower(tower)) =
                self.entities.get_mut(destroyed.id).map(|e| &mut e.kind)
            {
                tower.destroyed = true;
            }
            tracing::info!(
                tower = %destroyed.id,
                side = %destroyed.side,
                kind = ?destroyed.kind,
                "Tower destroyed"
            );
            events.towers_destroyed.push(destroyed);
            self.on_tower_destroyed(destroyed.kind == TowerKind::King, destroyed.side);
        }
    }

    fn surviving_towers(&self, side: Side) -> SurvivingTowers {
        self.entities
            .iter()
            .filter(|e| e.side == side && e.is_alive() && e.as_tower().is_some())
            .fold(SurvivingTowers::default(), |acc, e| {
                acc.with_tower(e.health.current)
            })
    }

    /// Finish the match. Idempotent.
    fn end_game(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        for entity in self.entities.iter_mut() {
            if let EntityKind::Troop(troop) = &mut entity.kind {
                troop.state = BehaviorState::Idle;
            }
        }

        let player = self.surviving_towers(Side::Player);
        let opponent = self.surviving_towers(Side::Opponent);
        self.score.player.towers_destroyed = self.towers_spawned[side_slot(Side::Player)]
            .saturating_sub(player.count);
        self.score.opponent.towers_destroyed = self.towers_spawned[side_slot(Side::Opponent)]
            .saturating_sub(opponent.count);

        let (outcome, tiebreak) = resolve_winner(&self.score, player, opponent);
        self.outcome = Some(outcome);
        let reason = *self.reason.get_or_insert(tiebreak);

        tracing::info!(
            winner = ?outcome.winner(),
            %reason,
            player_crowns = self.score.player.crowns,
            opponent_crowns = self.score.opponent.crowns,
            elapsed_ms = self.elapsed_ms,
            "Match ended"
        );
    }

    /// Hash of the full battle state.
    ///
    /// Two battles fed the same inputs produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.elapsed_ms.hash(&mut hasher);
        self.started.hash(&mut hasher);
        self.ended.hash(&mut hasher);
        self.elixir.hash(&mut hasher);
        self.score.hash(&mut hasher);
        self.outcome.hash(&mut hasher);

        self.entities.len().hash(&mut hasher);
        for entity in self.entities.iter() {
            entity.hash(&mut hasher);
        }

        hasher.finish()
    }
}
