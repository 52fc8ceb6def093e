//! River crossing tests.
//!
//! Ground troops may only be inside the river band when lined up with a
//! bridge; flyers ignore the river entirely.

use arena_core::layout::RiverSide;
use arena_core::prelude::*;
use arena_test_utils::determinism::strategies::{arb_frame_ms, arb_point_on_half, arb_side};
use arena_test_utils::fixtures::{empty_battle, fixed_f, run_ticks, standard_layout, vec2};
use proptest::prelude::*;

const GROUND_CARDS: [&str; 6] = [
    "Archers",
    "Barbarians",
    "Giant",
    "MiniPEKKA",
    "Valkyrie",
    "Wizard",
];

fn lone_troop(card: &str, position: Vec2Fixed, owner: &str) -> (Battle, EntityId) {
    let mut battle = empty_battle(BattleConfig::test_mode());
    let id = battle
        .deploy_card(card, position, owner)
        .map(|e| e.id)
        .expect("deploy should succeed in test mode");
    (battle, id)
}

fn position(battle: &Battle, id: EntityId) -> Vec2Fixed {
    battle.get(id).map(|e| e.position).expect("troop should be alive")
}

#[test]
fn test_ground_troop_crosses_at_nearer_bridge() {
    let layout = standard_layout();
    let (mut battle, id) = lone_troop("Wizard", vec2(300, 800), "player");

    for _ in 0..800 {
        run_ticks(&mut battle, 1, 50);
        let here = position(&battle, id);
        if layout.river_side(here.y) == RiverSide::Inside {
            assert_eq!(here.x, Fixed::from_num(385));
        }
    }

    assert_eq!(position(&battle, id), vec2(385, 0));
}

#[test]
fn test_opponent_troop_crosses_downward() {
    let layout = standard_layout();
    let (mut battle, id) = lone_troop("Valkyrie", vec2(100, 100), "opponent");

    let mut crossed = false;
    for _ in 0..1500 {
        run_ticks(&mut battle, 1, 50);
        let here = position(&battle, id);
        match layout.river_side(here.y) {
            RiverSide::Inside => assert_eq!(here.x, Fixed::from_num(143)),
            RiverSide::Below => crossed = true,
            RiverSide::Above => assert!(!crossed, "walked back over the river"),
        }
    }

    assert!(crossed);
    assert_eq!(position(&battle, id), vec2(143, 990));
}

#[test]
fn test_flyer_goes_straight_over_the_river() {
    let (mut battle, id) = lone_troop("BabyDragon", vec2(100, 800), "player");

    run_ticks(&mut battle, 100, 100);
    assert_eq!(position(&battle, id), vec2(100, 450));

    let facing = battle.get(id).map(|e| e.facing);
    assert_eq!(facing, Some(vec2(0, -1)));
}

#[test]
fn test_smaller_tiles_slow_troops_down() {
    let mut battle = empty_battle(BattleConfig::test_mode());
    battle
        .set_layout(ArenaLayout::with_scale(Vec2Fixed::ZERO, Fixed::from_num(11)))
        .expect("half-scale layout should be valid");
    let id = battle
        .deploy_card("BabyDragon", vec2(100, 400), "player")
        .map(|e| e.id)
        .unwrap();

    // 35 units per second at half scale.
    run_ticks(&mut battle, 10, 100);
    assert_eq!(position(&battle, id), vec2(100, 400) - Vec2Fixed::new(Fixed::ZERO, fixed_f(17.5)));
}

#[test]
fn test_troop_far_off_the_board_walks_back() {
    let start = vec2(50_000, 800);
    let (mut battle, id) = lone_troop("Barbarians", start, "player");

    run_ticks(&mut battle, 1, 33);
    let moved = position(&battle, id);
    assert!(moved.x < start.x);
    assert!(moved.distance_squared(start) > Fixed::ZERO);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_ground_troops_only_enter_river_at_bridges(
        card in proptest::sample::select(GROUND_CARDS.to_vec()),
        (side, start) in arb_side().prop_flat_map(|side| (Just(side), arb_point_on_half(side))),
        step_ms in arb_frame_ms(),
    ) {
        let layout = standard_layout();
        let (mut battle, id) = lone_troop(card, start, side.as_str());

        for _ in 0..300 {
            run_ticks(&mut battle, 1, step_ms);
            let here = position(&battle, id);
            if layout.river_side(here.y) == RiverSide::Inside {
                let bridge = layout.nearest_bridge_x(here.x);
                prop_assert!(
                    (here.x - bridge).abs() <= layout.half_tile(),
                    "{} at {:?} is in the river away from a bridge",
                    card,
                    here
                );
            }
        }
    }
}
