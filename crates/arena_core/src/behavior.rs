//! Troop and tower combat behavior.
//!
//! One routine drives every troop archetype; per-archetype differences come
//! from [`BehaviorProfile`](crate::archetype::BehaviorProfile) and the
//! troop's own stats. Updates read the registry immutably and return the
//! new state plus the hits to apply, so the battle can write everything
//! back in registry order.

use crate::components::{BehaviorState, Category, TargetFilter};
use crate::entity::{Entity, EntityId, EntityStorage, PendingHit, Tower, Troop};
use crate::layout::ArenaLayout;
use crate::math::{Fixed, Vec2Fixed};
use crate::pathfinding::{march_destination, steer_point, step_toward};

/// Extra reach granted while already fighting, so targets at the edge of
/// range do not flicker between walking and fighting.
pub const FIGHT_HYSTERESIS: i32 = 5;

/// Everything an update can read about the current tick.
#[derive(Debug, Clone, Copy)]
pub struct CombatContext<'a> {
    /// Simulation time in milliseconds.
    pub time_ms: u64,
    /// Milliseconds since the previous tick.
    pub delta_ms: u64,
    /// The registry as it stood before this entity's update.
    pub entities: &'a EntityStorage,
    /// Live arena geometry.
    pub layout: &'a ArenaLayout,
}

/// Damage to apply to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Entity receiving the damage.
    pub target: EntityId,
    /// Amount of damage.
    pub damage: u32,
}

/// Result of one troop update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroopUpdate {
    /// New troop state.
    pub troop: Troop,
    /// New position.
    pub position: Vec2Fixed,
    /// New facing.
    pub facing: Vec2Fixed,
    /// Damage dealt this tick.
    pub hits: Vec<Hit>,
}

/// Result of one tower update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerUpdate {
    /// New tower state.
    pub tower: Tower,
    /// New facing.
    pub facing: Vec2Fixed,
    /// Damage dealt this tick.
    pub hits: Vec<Hit>,
}

// ============================================================================
// Queries
// ============================================================================

/// Line-of-sight check. The arena has no occluders.
#[must_use]
pub const fn can_see(_viewer: &Entity, _target: &Entity) -> bool {
    true
}

/// Check whether `target` is within `range` of `attacker`, measured
/// between collision edges. `fighting` adds [`FIGHT_HYSTERESIS`].
#[must_use]
pub fn within_reach(attacker: &Entity, range: Fixed, target: &Entity, fighting: bool) -> bool {
    let mut limit = range + attacker.radius + target.radius;
    if fighting {
        limit += Fixed::from_num(FIGHT_HYSTERESIS);
    }
    attacker.position.distance_squared(target.position) <= limit.saturating_mul(limit)
}

/// Enemies `attacker` is allowed to target: other side, alive, not a
/// spell, permitted by `filter` and visible.
pub fn hostile_candidates<'a>(
    attacker: &'a Entity,
    filter: TargetFilter,
    entities: &'a EntityStorage,
) -> impl Iterator<Item = &'a Entity> + 'a {
    entities.iter().filter(move |other| {
        other.side != attacker.side
            && other.is_alive()
            && other.category() != Category::Spell
            && filter.allows(other.movement())
            && can_see(attacker, other)
    })
}

/// Nearest candidate by distance. Ties keep the earlier candidate.
pub fn nearest<'a>(
    from: Vec2Fixed,
    candidates: impl Iterator<Item = &'a Entity>,
) -> Option<EntityId> {
    let mut best: Option<(EntityId, Fixed)> = None;
    for candidate in candidates {
        let dist_sq = from.distance_squared(candidate.position);
        match best {
            Some((_, best_dist)) if dist_sq >= best_dist => {}
            _ => best = Some((candidate.id, dist_sq)),
        }
    }
    best.map(|(id, _)| id)
}

fn face(from: Vec2Fixed, to: Vec2Fixed, current: Vec2Fixed) -> Vec2Fixed {
    let direction = (to - from).normalize();
    if direction == Vec2Fixed::ZERO {
        current
    } else {
        direction
    }
}

const fn cooldown_elapsed(time_ms: u64, last_attack_ms: u64, cooldown_ms: u64) -> bool {
    time_ms.saturating_sub(last_attack_ms) > cooldown_ms
}

// ============================================================================
// Troops
// ============================================================================

/// Run one tick of targeting, movement and attack for a troop.
#[must_use]
pub fn update_troop(entity: &Entity, troop: &Troop, ctx: &CombatContext<'_>) -> TroopUpdate {
    let profile = troop.archetype.profile();
    let mut troop = troop.clone();
    let mut position = entity.position;
    let mut facing = entity.facing;
    let mut hits = Vec::new();

    troop.current_range = troop.range * ctx.layout.scale();
    let range = troop.current_range;

    // A swing started on an earlier tick lands before anything else happens.
    if let Some(pending) = troop.pending_hit {
        if ctx.time_ms >= pending.lands_at_ms {
            troop.pending_hit = None;
            if ctx.entities.get(pending.target).is_some_and(Entity::is_alive) {
                hits.push(Hit {
                    target: pending.target,
                    damage: pending.damage,
                });
            }
        }
    }

    let fighting = troop.state == BehaviorState::Fight;
    troop.target = troop.target.filter(|id| {
        ctx.entities.get(*id).is_some_and(|target| {
            target.is_alive()
                && (!profile.stationary || within_reach(entity, range, target, fighting))
        })
    });

    if troop.target.is_none() {
        troop.target = acquire_target(entity, &troop, ctx);
    }

    match troop.target.and_then(|id| ctx.entities.get(id)) {
        Some(target) if within_reach(entity, range, target, fighting) => {
            troop.state = BehaviorState::Fight;
            facing = face(position, target.position, facing);

            if cooldown_elapsed(ctx.time_ms, troop.last_attack_ms, troop.attack_cooldown_ms) {
                match troop.windup_ms {
                    Some(windup_ms) if troop.pending_hit.is_none() => {
                        troop.pending_hit = Some(PendingHit {
                            target: target.id,
                            lands_at_ms: ctx.time_ms + windup_ms,
                            damage: troop.damage,
                        });
                        troop.last_attack_ms = ctx.time_ms;
                    }
                    Some(_) => {}
                    None => {
                        hits.push(Hit {
                            target: target.id,
                            damage: troop.damage,
                        });
                        troop.last_attack_ms = ctx.time_ms;
                    }
                }
            }
        }
        Some(target) => {
            let stop_reached = troop.stop_range.is_some_and(|stop| {
                let stop = stop * ctx.layout.scale();
                position.distance_squared(target.position) <= stop.saturating_mul(stop)
            });
            if profile.stationary || stop_reached {
                troop.state = BehaviorState::Idle;
            } else {
                troop.state = BehaviorState::Walk;
                let point = steer_point(position, target.position, troop.movement, ctx.layout);
                let step = step_toward(position, point, troop.speed, ctx.delta_ms, ctx.layout);
                position = step.position;
                if step.direction != Vec2Fixed::ZERO {
                    facing = step.direction;
                }
            }
        }
        None if profile.stationary => {
            troop.state = BehaviorState::Idle;
        }
        None => {
            troop.state = BehaviorState::Walk;
            let destination = march_destination(position, entity.side, troop.movement, ctx.layout);
            let point = steer_point(position, destination, troop.movement, ctx.layout);
            let step = step_toward(position, point, troop.speed, ctx.delta_ms, ctx.layout);
            position = step.position;
            if step.direction != Vec2Fixed::ZERO {
                facing = step.direction;
            }
        }
    }

    TroopUpdate {
        troop,
        position,
        facing,
        hits,
    }
}

/// Pick a new target for a troop holding none.
///
/// Building-preferring archetypes restrict the search to towers while any
/// hostile tower stands. Stationary archetypes only consider what is
/// already in reach.
fn acquire_target(entity: &Entity, troop: &Troop, ctx: &CombatContext<'_>) -> Option<EntityId> {
    let profile = troop.archetype.profile();
    let range = troop.current_range;
    let in_reach = |other: &&Entity| !profile.stationary || within_reach(entity, range, other, false);

    let towers_only = profile.prefers_buildings
        && hostile_candidates(entity, troop.target_filter, ctx.entities)
            .filter(in_reach)
            .any(|other| other.category() == Category::Tower);

    nearest(
        entity.position,
        hostile_candidates(entity, troop.target_filter, ctx.entities)
            .filter(in_reach)
            .filter(|other| !towers_only || other.category() == Category::Tower),
    )
}

// ============================================================================
// Towers
// ============================================================================

/// Run one tick of tower defense: shoot the nearest enemy troop in range.
#[must_use]
pub fn update_tower(entity: &Entity, tower: &Tower, ctx: &CombatContext<'_>) -> TowerUpdate {
    let mut tower = tower.clone();
    let mut facing = entity.facing;
    let mut hits = Vec::new();

    tower.current_range = tower.range * ctx.layout.scale();
    let range = tower.current_range;
    let fighting = tower.state == BehaviorState::Fight;

    tower.target = tower.target.filter(|id| {
        ctx.entities
            .get(*id)
            .is_some_and(|target| target.is_alive() && within_reach(entity, range, target, fighting))
    });

    if tower.target.is_none() {
        tower.target = nearest(
            entity.position,
            hostile_candidates(entity, TargetFilter::Both, ctx.entities).filter(|other| {
                other.category() == Category::Troop && within_reach(entity, range, other, false)
            }),
        );
    }

    match tower.target.and_then(|id| ctx.entities.get(id)) {
        Some(target) => {
            tower.state = BehaviorState::Fight;
            facing = face(entity.position, target.position, facing);
            if cooldown_elapsed(ctx.time_ms, tower.last_attack_ms, tower.attack_cooldown_ms) {
                hits.push(Hit {
                    target: target.id,
                    damage: tower.damage,
                });
                tower.last_attack_ms = ctx.time_ms;
            }
        }
        None => tower.state = BehaviorState::Idle,
    }

    TowerUpdate {
        tower,
        facing,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::{build_spell, build_troop, Archetype};
    use crate::catalog::StatCatalog;
    use crate::components::Side;

    fn troop_at(card: &str, x: i32, y: i32, side: Side) -> Entity {
        let catalog = StatCatalog::standard().unwrap();
        build_troop(
            Archetype::from_card_id(card),
            Vec2Fixed::from_ints(x, y),
            side,
            catalog.lookup(card),
        )
    }

    fn run_troop(storage: &EntityStorage, id: EntityId, time_ms: u64) -> TroopUpdate {
        let layout = ArenaLayout::default();
        let ctx = CombatContext {
            time_ms,
            delta_ms: 33,
            entities: storage,
            layout: &layout,
        };
        let entity = storage.get(id).unwrap();
        update_troop(entity, entity.as_troop().unwrap(), &ctx)
    }

    fn apply(storage: &mut EntityStorage, id: EntityId, update: TroopUpdate) {
        let entity = storage.get_mut(id).unwrap();
        entity.position = update.position;
        entity.facing = update.facing;
        entity.kind = crate::entity::EntityKind::Troop(update.troop);
    }

    #[test]
    fn test_holds_at_stop_distance_short_of_reach() {
        let mut storage = EntityStorage::new();
        let mut holder = troop_at("Barbarian", 100, 800, Side::Player);
        if let crate::entity::EntityKind::Troop(troop) = &mut holder.kind {
            troop.stop_range = Some(Fixed::from_num(100));
        }
        let me = storage.insert(holder);
        // 80 apart: past the 45 unit reach, inside the stop distance.
        let enemy = storage.insert(troop_at("Barbarian", 100, 720, Side::Opponent));

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.state, BehaviorState::Idle);
        assert_eq!(update.troop.target, Some(enemy));
        assert_eq!(update.position, Vec2Fixed::from_ints(100, 800));
        assert!(update.hits.is_empty());
    }

    #[test]
    fn test_acquires_nearest_enemy() {
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Barbarian", 100, 800, Side::Player));
        storage.insert(troop_at("Barbarian", 100, 780, Side::Player));
        let far = storage.insert(troop_at("Barbarian", 100, 600, Side::Opponent));
        let near = storage.insert(troop_at("Barbarian", 100, 700, Side::Opponent));

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.target, Some(near));
        assert_ne!(update.troop.target, Some(far));
        assert_eq!(update.troop.state, BehaviorState::Walk);
    }

    #[test]
    fn test_ties_go_to_earlier_entity() {
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Wizard", 200, 800, Side::Player));
        let first = storage.insert(troop_at("Barbarian", 100, 800, Side::Opponent));
        storage.insert(troop_at("Barbarian", 300, 800, Side::Opponent));

        assert_eq!(run_troop(&storage, me, 5000).troop.target, Some(first));
    }

    #[test]
    fn test_ignores_spells_and_filtered_movement() {
        let catalog = StatCatalog::standard().unwrap();
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Barbarian", 100, 800, Side::Player));
        storage.insert(build_spell(
            Archetype::Arrows,
            Vec2Fixed::from_ints(100, 790),
            Side::Opponent,
            catalog.lookup("Arrows"),
        ));
        storage.insert(troop_at("BabyDragon", 100, 780, Side::Opponent));

        assert_eq!(run_troop(&storage, me, 5000).troop.target, None);
    }

    #[test]
    fn test_giant_prefers_towers() {
        let mut storage = EntityStorage::new();
        let giant = storage.insert(troop_at("Giant", 143, 800, Side::Player));
        storage.insert(troop_at("Barbarian", 143, 760, Side::Opponent));
        let tower = storage.insert(Entity::tower(
            "opponent_princess_left",
            Vec2Fixed::from_ints(143, 297),
            Side::Opponent,
            2500,
        ));

        assert_eq!(run_troop(&storage, giant, 5000).troop.target, Some(tower));
    }

    #[test]
    fn test_giant_falls_back_to_troops_without_enemy_towers() {
        let mut storage = EntityStorage::new();
        let giant = storage.insert(troop_at("Giant", 143, 800, Side::Player));
        storage.insert(Entity::tower(
            "player_king",
            Vec2Fixed::from_ints(264, 781),
            Side::Player,
            4000,
        ));
        let enemy = storage.insert(troop_at("Barbarian", 143, 760, Side::Opponent));

        assert_eq!(run_troop(&storage, giant, 5000).troop.target, Some(enemy));
    }

    #[test]
    fn test_attacks_when_in_range_and_cooled_down() {
        let mut storage = EntityStorage::new();
        // Barbarian reach: 5 + 20 + 20 = 45
        let me = storage.insert(troop_at("Barbarian", 100, 800, Side::Player));
        let enemy = storage.insert(troop_at("Barbarian", 100, 760, Side::Opponent));

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.state, BehaviorState::Fight);
        assert_eq!(
            update.hits,
            vec![Hit {
                target: enemy,
                damage: 192
            }]
        );
        assert_eq!(update.troop.last_attack_ms, 5000);
        assert_eq!(update.facing, Vec2Fixed::from_ints(0, -1));
        apply(&mut storage, me, update);

        // Cooldown is 1000 ms and must be strictly exceeded.
        assert!(run_troop(&storage, me, 6000).hits.is_empty());
        assert_eq!(run_troop(&storage, me, 6001).hits.len(), 1);
    }

    #[test]
    fn test_fight_hysteresis_keeps_target_in_range() {
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Barbarian", 100, 800, Side::Player));
        // 48 apart: outside 45, inside 45 + 5.
        let enemy = storage.insert(troop_at("Barbarian", 100, 752, Side::Opponent));

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.state, BehaviorState::Walk);
        assert!(update.hits.is_empty());

        let mut fighting = update.troop.clone();
        fighting.state = BehaviorState::Fight;
        fighting.target = Some(enemy);
        let update = TroopUpdate {
            troop: fighting,
            position: Vec2Fixed::from_ints(100, 800),
            facing: update.facing,
            hits: Vec::new(),
        };
        apply(&mut storage, me, update);

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.state, BehaviorState::Fight);
        assert_eq!(update.hits.len(), 1);
    }

    #[test]
    fn test_heavy_melee_schedules_then_lands() {
        let mut storage = EntityStorage::new();
        let pekka = storage.insert(troop_at("MiniPEKKA", 100, 800, Side::Player));
        let enemy = storage.insert(troop_at("Barbarian", 100, 770, Side::Opponent));

        let update = run_troop(&storage, pekka, 5000);
        assert!(update.hits.is_empty());
        assert_eq!(
            update.troop.pending_hit,
            Some(PendingHit {
                target: enemy,
                lands_at_ms: 5600,
                damage: 500
            })
        );
        apply(&mut storage, pekka, update);

        let update = run_troop(&storage, pekka, 5599);
        assert!(update.hits.is_empty());
        apply(&mut storage, pekka, update);

        let update = run_troop(&storage, pekka, 5600);
        assert_eq!(
            update.hits,
            vec![Hit {
                target: enemy,
                damage: 500
            }]
        );
        assert_eq!(update.troop.pending_hit, None);
    }

    #[test]
    fn test_pending_hit_on_dead_target_is_dropped() {
        let mut storage = EntityStorage::new();
        let pekka = storage.insert(troop_at("MiniPEKKA", 100, 800, Side::Player));
        let enemy = storage.insert(troop_at("Barbarian", 100, 770, Side::Opponent));

        let update = run_troop(&storage, pekka, 5000);
        apply(&mut storage, pekka, update);
        storage.get_mut(enemy).unwrap().health.kill();

        let update = run_troop(&storage, pekka, 5600);
        assert!(update.hits.is_empty());
        assert_eq!(update.troop.pending_hit, None);
        assert_eq!(update.troop.target, None);
    }

    #[test]
    fn test_walks_toward_enemy_baseline_without_target() {
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Barbarian", 143, 800, Side::Player));

        let update = run_troop(&storage, me, 5000);
        assert_eq!(update.troop.state, BehaviorState::Walk);
        assert_eq!(update.position.x, Fixed::from_num(143));
        assert!(update.position.y < Fixed::from_num(800));
        assert_eq!(update.facing, Vec2Fixed::from_ints(0, -1));
    }

    #[test]
    fn test_stationary_idles_until_enemy_in_range() {
        let mut storage = EntityStorage::new();
        let inferno = storage.insert(troop_at("InfernoTower", 200, 800, Side::Player));
        storage.insert(troop_at("Barbarian", 200, 600, Side::Opponent));

        let update = run_troop(&storage, inferno, 5000);
        assert_eq!(update.troop.state, BehaviorState::Idle);
        assert_eq!(update.troop.target, None);
        assert_eq!(update.position, Vec2Fixed::from_ints(200, 800));

        // Fallback range 20 + radii 40 = 60
        let close = storage.insert(troop_at("Barbarian", 200, 750, Side::Opponent));
        let update = run_troop(&storage, inferno, 5000);
        assert_eq!(update.troop.target, Some(close));
        assert_eq!(update.troop.state, BehaviorState::Fight);
    }

    #[test]
    fn test_range_scales_with_tile_size() {
        let mut storage = EntityStorage::new();
        let me = storage.insert(troop_at("Wizard", 100, 800, Side::Player));
        let layout = ArenaLayout::with_scale(Vec2Fixed::ZERO, Fixed::from_num(44));
        let ctx = CombatContext {
            time_ms: 0,
            delta_ms: 0,
            entities: &storage,
            layout: &layout,
        };
        let entity = storage.get(me).unwrap();
        let update = update_troop(entity, entity.as_troop().unwrap(), &ctx);
        assert_eq!(update.troop.current_range, Fixed::from_num(60));
    }

    #[test]
    fn test_tower_shoots_nearest_troop_in_range() {
        let mut storage = EntityStorage::new();
        let tower_id = storage.insert(Entity::tower(
            "player_princess_left",
            Vec2Fixed::from_ints(143, 715),
            Side::Player,
            2500,
        ));
        storage.insert(troop_at("Barbarian", 143, 400, Side::Opponent));
        let close = storage.insert(troop_at("BabyDragon", 143, 600, Side::Opponent));

        let layout = ArenaLayout::default();
        let ctx = CombatContext {
            time_ms: 2000,
            delta_ms: 33,
            entities: &storage,
            layout: &layout,
        };
        let entity = storage.get(tower_id).unwrap();
        let update = update_tower(entity, entity.as_tower().unwrap(), &ctx);
        assert_eq!(update.tower.target, Some(close));
        assert_eq!(update.tower.state, BehaviorState::Fight);
        assert_eq!(
            update.hits,
            vec![Hit {
                target: close,
                damage: 90
            }]
        );
    }

    #[test]
    fn test_tower_idles_with_nothing_in_range() {
        let mut storage = EntityStorage::new();
        let tower_id = storage.insert(Entity::tower(
            "player_king",
            Vec2Fixed::from_ints(264, 803),
            Side::Player,
            4000,
        ));
        storage.insert(troop_at("Barbarian", 264, 300, Side::Opponent));

        let layout = ArenaLayout::default();
        let ctx = CombatContext {
            time_ms: 2000,
            delta_ms: 33,
            entities: &storage,
            layout: &layout,
        };
        let entity = storage.get(tower_id).unwrap();
        let update = update_tower(entity, entity.as_tower().unwrap(), &ctx);
        assert_eq!(update.tower.state, BehaviorState::Idle);
        assert!(update.hits.is_empty());
    }
}
