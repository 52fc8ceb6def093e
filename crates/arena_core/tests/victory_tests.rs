//! Victory condition tests.
//!
//! Tests for crowns, early finishes and the timeout tiebreak chain.

use arena_core::prelude::*;
use arena_core::victory::MAX_CROWNS;
use arena_test_utils::fixtures::{battle_with_towers, run_ticks, standard_battle, tower_id, vec2};
use arena_test_utils::logging::init_test_logging;

fn short_match() -> Battle {
    battle_with_towers(BattleConfig {
        match_duration_ms: 1000,
        ..BattleConfig::default()
    })
}

fn destroy(battle: &mut Battle, name: &str) -> EntityId {
    let id = tower_id(battle, name).expect("tower should exist");
    let health = battle.get(id).map_or(0, |e| e.health.current);
    battle.apply_damage(id, health).expect("tower should exist");
    id
}

// =============================================================================
// Early finishes
// =============================================================================

#[test]
fn test_king_tower_ends_match_immediately() {
    init_test_logging();
    let mut battle = standard_battle();
    let king = destroy(&mut battle, "opponent_king");

    let events = run_one(&mut battle);

    assert_eq!(events.match_ended, Some(Outcome::Winner(Side::Player)));
    assert_eq!(events.towers_destroyed.len(), 1);
    assert_eq!(events.towers_destroyed[0].id, king);
    assert_eq!(events.towers_destroyed[0].kind, TowerKind::King);
    assert!(events.killed.contains(&king));

    let state = battle.state();
    assert!(state.ended);
    assert_eq!(state.winner(), Some(Side::Player));
    assert_eq!(state.reason, Some(VictoryReason::KingTowerDestroyed));
    assert_eq!(state.score.player.crowns, MAX_CROWNS);
}

#[test]
fn test_losing_own_king_loses() {
    let mut battle = standard_battle();
    destroy(&mut battle, "player_king");
    run_one(&mut battle);

    assert_eq!(battle.state().winner(), Some(Side::Opponent));
    assert_eq!(battle.score().opponent.crowns, MAX_CROWNS);
}

#[test]
fn test_princess_tower_awards_one_crown() {
    let mut battle = standard_battle();
    destroy(&mut battle, "player_princess_right");

    let events = run_one(&mut battle);

    assert_eq!(events.match_ended, None);
    assert_eq!(events.towers_destroyed.len(), 1);
    assert_eq!(battle.score().opponent.crowns, 1);
    assert_eq!(battle.score().player.crowns, 0);
    assert!(!battle.is_ended());
}

#[test]
fn test_nothing_changes_after_the_end() {
    let mut battle = standard_battle();
    destroy(&mut battle, "opponent_king");
    run_one(&mut battle);
    let hash = battle.state_hash();

    assert!(battle.deploy_card("Giant", vec2(143, 800), "opponent").is_none());
    let tower = tower_id(&battle, "player_king").unwrap();
    assert_eq!(battle.apply_damage(tower, 500).ok(), Some(0));
    assert_eq!(run_one(&mut battle), TickEvents::default());
    assert_eq!(battle.state_hash(), hash);
}

// =============================================================================
// Timeout tiebreaks
// =============================================================================

#[test]
fn test_untouched_match_is_a_perfect_draw() {
    let mut battle = short_match();
    run_ticks(&mut battle, 10, 100);

    let state = battle.state();
    assert!(state.ended);
    assert_eq!(state.remaining_ms, 0);
    assert_eq!(state.outcome, Some(Outcome::Draw));
    assert_eq!(state.reason, Some(VictoryReason::PerfectDraw));
    assert_eq!(state.winner(), None);
}

#[test]
fn test_more_crowns_wins_at_timeout() {
    let mut battle = short_match();
    destroy(&mut battle, "opponent_princess_left");
    run_ticks(&mut battle, 10, 100);

    let state = battle.state();
    assert_eq!(state.winner(), Some(Side::Player));
    assert_eq!(state.reason, Some(VictoryReason::MoreCrowns));
    assert_eq!(state.score.opponent.towers_destroyed, 1);
}

#[test]
fn test_more_towers_standing_wins_at_timeout() {
    let mut battle = short_match();
    battle.add_tower("opponent_princess_center", vec2(264, 297), Side::Opponent);
    run_ticks(&mut battle, 10, 100);

    let state = battle.state();
    assert_eq!(state.winner(), Some(Side::Opponent));
    assert_eq!(state.reason, Some(VictoryReason::MoreTowersRemaining));
}

#[test]
fn test_weakest_tower_breaks_remaining_ties() {
    let mut battle = short_match();
    let tower = tower_id(&battle, "opponent_princess_right").unwrap();
    battle.apply_damage(tower, 100).unwrap();
    run_ticks(&mut battle, 10, 100);

    let state = battle.state();
    assert_eq!(state.winner(), Some(Side::Player));
    assert_eq!(state.reason, Some(VictoryReason::HigherTowerHealth));
}

#[test]
fn test_forced_end_uses_tiebreak() {
    let mut battle = standard_battle();
    let tower = tower_id(&battle, "player_king").unwrap();
    battle.apply_damage(tower, 1).unwrap();
    battle.force_end_game();

    let state = battle.state();
    assert!(state.ended);
    // Weakest towers are princesses on both sides, so king damage is moot.
    assert_eq!(state.reason, Some(VictoryReason::PerfectDraw));
}

#[test]
fn test_external_clock_can_end_match() {
    let mut battle = standard_battle();
    battle.sync_elapsed(battle.config().match_duration_ms);
    assert!(battle.is_ended());
    assert_eq!(battle.state().outcome, Some(Outcome::Draw));
}

fn run_one(battle: &mut Battle) -> TickEvents {
    let time_ms = battle.state().elapsed_ms + 33;
    battle.tick(time_ms, 33)
}
