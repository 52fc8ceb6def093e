//! Area spells.
//!
//! A spell hits once, on its first update, then lingers for its duration
//! so renderers can show it before it expires.

use crate::behavior::{CombatContext, Hit};
use crate::components::Category;
use crate::entity::{Entity, Spell};

/// Result of one spell update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellUpdate {
    /// New spell state.
    pub spell: Spell,
    /// Damage dealt this tick.
    pub hits: Vec<Hit>,
    /// The duration has run out; the spell should be killed.
    pub expired: bool,
}

/// Run one tick for a spell.
///
/// On first update the activation time is recorded and every opposing,
/// living, non-spell entity within `radius * scale + its radius` is hit.
/// Later updates only check whether the duration has elapsed.
#[must_use]
pub fn update_spell(entity: &Entity, spell: &Spell, ctx: &CombatContext<'_>) -> SpellUpdate {
    let mut spell = spell.clone();
    let mut hits = Vec::new();

    let activated_at = match spell.activated_at_ms {
        Some(at) => at,
        None => {
            spell.activated_at_ms = Some(ctx.time_ms);
            let area = spell.radius * ctx.layout.scale();
            hits.extend(
                ctx.entities
                    .iter()
                    .filter(|other| {
                        other.side != entity.side
                            && other.is_alive()
                            && other.category() != Category::Spell
                    })
                    .filter(|other| {
                        let limit = area + other.radius;
                        entity.position.distance_squared(other.position)
                            <= limit.saturating_mul(limit)
                    })
                    .map(|other| Hit {
                        target: other.id,
                        damage: spell.damage,
                    }),
            );
            ctx.time_ms
        }
    };

    let expired = ctx.time_ms.saturating_sub(activated_at) > spell.duration_ms;
    SpellUpdate {
        spell,
        hits,
        expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::{build_spell, build_troop, Archetype};
    use crate::catalog::StatCatalog;
    use crate::components::Side;
    use crate::entity::{EntityKind, EntityStorage};
    use crate::layout::ArenaLayout;
    use crate::math::Vec2Fixed;

    fn setup() -> (EntityStorage, crate::entity::EntityId) {
        let catalog = StatCatalog::standard().unwrap();
        let mut storage = EntityStorage::new();
        let arrows = storage.insert(build_spell(
            Archetype::Arrows,
            Vec2Fixed::from_ints(200, 300),
            Side::Player,
            catalog.lookup("Arrows"),
        ));
        (storage, arrows)
    }

    fn troop(x: i32, y: i32, side: Side) -> Entity {
        let catalog = StatCatalog::standard().unwrap();
        build_troop(
            Archetype::Barbarian,
            Vec2Fixed::from_ints(x, y),
            side,
            catalog.lookup("Barbarian"),
        )
    }

    fn run(storage: &EntityStorage, id: crate::entity::EntityId, time_ms: u64) -> SpellUpdate {
        let layout = ArenaLayout::default();
        let ctx = CombatContext {
            time_ms,
            delta_ms: 33,
            entities: storage,
            layout: &layout,
        };
        let entity = storage.get(id).unwrap();
        update_spell(entity, entity.as_spell().unwrap(), &ctx)
    }

    #[test]
    fn test_hits_opposing_entities_in_area_once() {
        let (mut storage, arrows) = setup();
        // Area 20 + barbarian radius 20 = 40
        let inside = storage.insert(troop(200, 340, Side::Opponent));
        storage.insert(troop(200, 341, Side::Opponent));
        storage.insert(troop(200, 300, Side::Player));

        let update = run(&storage, arrows, 1000);
        assert_eq!(
            update.hits,
            vec![Hit {
                target: inside,
                damage: 10
            }]
        );
        assert_eq!(update.spell.activated_at_ms, Some(1000));
        assert!(!update.expired);

        storage.get_mut(arrows).unwrap().kind = EntityKind::Spell(update.spell);
        let update = run(&storage, arrows, 1500);
        assert!(update.hits.is_empty());
        assert!(!update.expired);
    }

    #[test]
    fn test_expires_after_duration() {
        let (mut storage, arrows) = setup();
        let update = run(&storage, arrows, 1000);
        storage.get_mut(arrows).unwrap().kind = EntityKind::Spell(update.spell);

        assert!(!run(&storage, arrows, 2000).expired);
        assert!(run(&storage, arrows, 2001).expired);
    }

    #[test]
    fn test_skips_dead_entities() {
        let (mut storage, arrows) = setup();
        let dead = storage.insert(troop(200, 310, Side::Opponent));
        storage.get_mut(dead).unwrap().health.kill();

        assert!(run(&storage, arrows, 1000).hits.is_empty());
    }
}
