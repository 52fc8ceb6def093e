//! Test fixtures and helpers.
//!
//! Pre-built battles and entity placements for consistent testing.

use arena_core::config::BattleConfig;
use arena_core::entity::EntityId;
use arena_core::layout::ArenaLayout;
use arena_core::math::{Fixed, Vec2Fixed};
use arena_core::simulation::Battle;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// Create a vector from integer coordinates.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// The reference layout: origin at zero, 22-unit tiles.
///
/// Handy coordinates at this scale:
/// - bridges at x = 143 and x = 385
/// - river band y in [484, 506)
/// - player princess towers at y = 693, king at y = 781
/// - opponent princess towers at y = 297, king at y = 209
#[must_use]
pub fn standard_layout() -> ArenaLayout {
    ArenaLayout::default()
}

/// A started battle with no towers.
///
/// # Panics
///
/// Panics if `config` is rejected.
#[must_use]
pub fn empty_battle(config: BattleConfig) -> Battle {
    let mut battle = Battle::new(config).expect("fixture config must be valid");
    battle.start();
    battle
}

/// A started battle with the six standard towers.
///
/// # Panics
///
/// Panics if `config` is rejected.
#[must_use]
pub fn battle_with_towers(config: BattleConfig) -> Battle {
    let mut battle = Battle::new(config).expect("fixture config must be valid");
    let towers = battle.layout().standard_towers();
    battle.spawn_towers(&towers);
    battle.start();
    battle
}

/// [`battle_with_towers`] with the default config.
#[must_use]
pub fn standard_battle() -> Battle {
    battle_with_towers(BattleConfig::default())
}

/// A standard battle with a handful of troops already marching on both
/// sides of both lanes. Elixir is pinned at a raised cap so the whole
/// opening hand can be paid for.
#[must_use]
pub fn skirmish_battle() -> Battle {
    let mut battle = battle_with_towers(BattleConfig {
        starting_elixir: 20,
        max_elixir: 20,
        ..BattleConfig::test_mode()
    });
    for (card, x, y, owner) in [
        ("Giant", 143, 800, "player"),
        ("Wizard", 160, 850, "player"),
        ("MiniPEKKA", 385, 780, "player"),
        ("BabyDragon", 300, 820, "player"),
        ("Valkyrie", 143, 200, "opponent"),
        ("Archers", 120, 150, "opponent"),
        ("Barbarians", 385, 220, "opponent"),
        ("Giant", 400, 150, "opponent"),
    ] {
        battle.deploy_card(card, vec2(x, y), owner);
    }
    battle
}

/// Find a tower by name.
#[must_use]
pub fn tower_id(battle: &Battle, name: &str) -> Option<EntityId> {
    battle
        .entities()
        .iter()
        .find(|e| e.as_tower().is_some() && e.label == name)
        .map(|e| e.id)
}

/// Tick `battle` `count` times with a fixed step, continuing from its
/// current elapsed time.
pub fn run_ticks(battle: &mut Battle, count: u64, step_ms: u64) {
    for _ in 0..count {
        crate::determinism::step_battle(battle, step_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_battle_has_six_towers() {
        let battle = standard_battle();
        assert_eq!(battle.entities().len(), 6);
        assert!(tower_id(&battle, "player_king").is_some());
        assert!(tower_id(&battle, "opponent_princess_right").is_some());
        assert!(battle.state().started);
    }

    #[test]
    fn test_skirmish_deploys_everything() {
        let battle = skirmish_battle();
        assert_eq!(battle.entities().len(), 14);
    }

    #[test]
    fn test_tower_positions_match_documented_coordinates() {
        let battle = standard_battle();
        let king = tower_id(&battle, "player_king").and_then(|id| battle.get(id));
        assert_eq!(king.map(|e| e.position), Some(vec2(264, 781)));
        let left = tower_id(&battle, "opponent_princess_left").and_then(|id| battle.get(id));
        assert_eq!(left.map(|e| e.position), Some(vec2(143, 297)));
    }
}
