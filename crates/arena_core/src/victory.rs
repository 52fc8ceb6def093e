//! Crowns, tower tallies and match outcome.
//!
//! Crowns are awarded as towers fall: one for a princess tower, three for
//! a king tower, capped at [`MAX_CROWNS`] per side. When the match ends
//! without a decisive event the winner is picked by tiebreak, see
//! [`resolve_winner`].

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::entity::TowerKind;

/// Crown cap per side.
pub const MAX_CROWNS: u32 = 3;

/// Why a match ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictoryReason {
    /// A king tower fell.
    KingTowerDestroyed,
    /// A side reached three crowns.
    ThreeCrowns,
    /// Time ran out and one side had more crowns.
    MoreCrowns,
    /// Crowns tied; one side had more towers standing.
    MoreTowersRemaining,
    /// Towers tied; one side's weakest tower was healthier.
    HigherTowerHealth,
    /// Nothing separated the sides.
    PerfectDraw,
    /// Neither side has a tower left.
    AllTowersDestroyed,
}

impl VictoryReason {
    /// Display text shown to players.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KingTowerDestroyed => "King Tower Destroyed!",
            Self::ThreeCrowns => "Three Crown Victory!",
            Self::MoreCrowns => "More Crowns",
            Self::MoreTowersRemaining => "More Towers Remaining",
            Self::HigherTowerHealth => "Higher Tower Health",
            Self::PerfectDraw => "Perfect Draw",
            Self::AllTowersDestroyed => "All Towers Destroyed",
        }
    }
}

impl std::fmt::Display for VictoryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// One side won.
    Winner(Side),
    /// Neither side won.
    Draw,
}

impl Outcome {
    /// The winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Winner(side) => Some(side),
            Self::Draw => None,
        }
    }
}

/// Crowns and lost towers for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideTally {
    /// Crowns earned, at most [`MAX_CROWNS`].
    pub crowns: u32,
    /// Towers this side has lost.
    pub towers_destroyed: u32,
}

/// Per-side tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Bottom side.
    pub player: SideTally,
    /// Top side.
    pub opponent: SideTally,
}

impl Scoreboard {
    /// Tally for one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideTally {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideTally {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Crowns for one side.
    #[must_use]
    pub const fn crowns(&self, side: Side) -> u32 {
        self.side(side).crowns
    }

    /// Score a fallen tower owned by `owner`.
    ///
    /// Returns the reason the match should end now, if any.
    ///
    /// ```
    /// use arena_core::components::Side;
    /// use arena_core::entity::TowerKind;
    /// use arena_core::victory::{Scoreboard, VictoryReason};
    ///
    /// let mut score = Scoreboard::default();
    /// assert_eq!(score.record_tower_destroyed(Side::Opponent, TowerKind::Princess), None);
    /// assert_eq!(score.crowns(Side::Player), 1);
    ///
    /// let reason = score.record_tower_destroyed(Side::Opponent, TowerKind::King);
    /// assert_eq!(reason, Some(VictoryReason::KingTowerDestroyed));
    /// assert_eq!(score.crowns(Side::Player), 3);
    /// ```
    pub fn record_tower_destroyed(&mut self, owner: Side, kind: TowerKind) -> Option<VictoryReason> {
        self.side_mut(owner).towers_destroyed += 1;

        let award = match kind {
            TowerKind::King => MAX_CROWNS,
            TowerKind::Princess => 1,
        };
        let scorer = self.side_mut(owner.opposing());
        scorer.crowns = (scorer.crowns + award).min(MAX_CROWNS);

        if kind == TowerKind::King {
            Some(VictoryReason::KingTowerDestroyed)
        } else if self.player.crowns >= MAX_CROWNS || self.opponent.crowns >= MAX_CROWNS {
            Some(VictoryReason::ThreeCrowns)
        } else {
            None
        }
    }
}

/// Towers a side still has standing when the match ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurvivingTowers {
    /// Number of towers standing.
    pub count: u32,
    /// Health of the weakest standing tower.
    pub min_health: Option<u32>,
}

impl SurvivingTowers {
    /// Fold one more standing tower in.
    #[must_use]
    pub fn with_tower(self, health: u32) -> Self {
        Self {
            count: self.count + 1,
            min_health: Some(self.min_health.map_or(health, |min| min.min(health))),
        }
    }
}

/// Pick the winner of a finished match.
///
/// Criteria, in order: more crowns, more towers standing, then the
/// healthier weakest tower. Anything still tied is a draw.
#[must_use]
pub fn resolve_winner(
    score: &Scoreboard,
    player: SurvivingTowers,
    opponent: SurvivingTowers,
) -> (Outcome, VictoryReason) {
    use std::cmp::Ordering;

    let pick = |ordering: Ordering| match ordering {
        Ordering::Greater => Some(Outcome::Winner(Side::Player)),
        Ordering::Less => Some(Outcome::Winner(Side::Opponent)),
        Ordering::Equal => None,
    };

    if let Some(outcome) = pick(score.player.crowns.cmp(&score.opponent.crowns)) {
        return (outcome, VictoryReason::MoreCrowns);
    }
    if let Some(outcome) = pick(player.count.cmp(&opponent.count)) {
        return (outcome, VictoryReason::MoreTowersRemaining);
    }
    match (player.min_health, opponent.min_health) {
        (Some(p), Some(o)) => pick(p.cmp(&o)).map_or(
            (Outcome::Draw, VictoryReason::PerfectDraw),
            |outcome| (outcome, VictoryReason::HigherTowerHealth),
        ),
        (None, None) => (Outcome::Draw, VictoryReason::AllTowersDestroyed),
        _ => (Outcome::Draw, VictoryReason::PerfectDraw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn towers(healths: &[u32]) -> SurvivingTowers {
        healths
            .iter()
            .fold(SurvivingTowers::default(), |acc, &h| acc.with_tower(h))
    }

    #[test]
    fn test_princess_awards_one_crown() {
        let mut score = Scoreboard::default();
        assert_eq!(
            score.record_tower_destroyed(Side::Player, TowerKind::Princess),
            None
        );
        assert_eq!(score.crowns(Side::Opponent), 1);
        assert_eq!(score.crowns(Side::Player), 0);
        assert_eq!(score.player.towers_destroyed, 1);
    }

    #[test]
    fn test_third_crown_ends_match() {
        let mut score = Scoreboard {
            player: SideTally {
                crowns: 2,
                towers_destroyed: 0,
            },
            ..Scoreboard::default()
        };
        assert_eq!(
            score.record_tower_destroyed(Side::Opponent, TowerKind::Princess),
            Some(VictoryReason::ThreeCrowns)
        );
        assert_eq!(score.crowns(Side::Player), 3);
    }

    #[test]
    fn test_king_after_princess_stays_capped() {
        let mut score = Scoreboard::default();
        score.record_tower_destroyed(Side::Opponent, TowerKind::Princess);
        score.record_tower_destroyed(Side::Opponent, TowerKind::King);
        assert_eq!(score.crowns(Side::Player), MAX_CROWNS);
        assert_eq!(score.opponent.towers_destroyed, 2);
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            VictoryReason::KingTowerDestroyed.to_string(),
            "King Tower Destroyed!"
        );
        assert_eq!(VictoryReason::ThreeCrowns.to_string(), "Three Crown Victory!");
        assert_eq!(VictoryReason::PerfectDraw.to_string(), "Perfect Draw");
    }

    #[test]
    fn test_more_crowns_wins() {
        let score = Scoreboard {
            opponent: SideTally {
                crowns: 1,
                towers_destroyed: 0,
            },
            ..Scoreboard::default()
        };
        assert_eq!(
            resolve_winner(&score, towers(&[100]), towers(&[100, 100, 100])),
            (Outcome::Winner(Side::Opponent), VictoryReason::MoreCrowns)
        );
    }

    #[test]
    fn test_more_towers_wins() {
        assert_eq!(
            resolve_winner(
                &Scoreboard::default(),
                towers(&[10, 10, 10]),
                towers(&[4000, 2500])
            ),
            (
                Outcome::Winner(Side::Player),
                VictoryReason::MoreTowersRemaining
            )
        );
    }

    #[test]
    fn test_weakest_tower_decides() {
        assert_eq!(
            resolve_winner(
                &Scoreboard::default(),
                towers(&[4000, 300, 2500]),
                towers(&[4000, 2000, 299])
            ),
            (
                Outcome::Winner(Side::Player),
                VictoryReason::HigherTowerHealth
            )
        );
    }

    #[test]
    fn test_full_tie_is_perfect_draw() {
        assert_eq!(
            resolve_winner(
                &Scoreboard::default(),
                towers(&[4000, 2500, 2500]),
                towers(&[2500, 4000, 2500])
            ),
            (Outcome::Draw, VictoryReason::PerfectDraw)
        );
    }

    #[test]
    fn test_no_towers_left() {
        assert_eq!(
            resolve_winner(&Scoreboard::default(), towers(&[]), towers(&[])),
            (Outcome::Draw, VictoryReason::AllTowersDestroyed)
        );
    }

    fn arb_destruction() -> impl Strategy<Value = (Side, TowerKind)> {
        (
            prop_oneof![Just(Side::Player), Just(Side::Opponent)],
            prop_oneof![Just(TowerKind::Princess), Just(TowerKind::King)],
        )
    }

    proptest! {
        #[test]
        fn prop_crowns_never_decrease_or_exceed_cap(
            events in proptest::collection::vec(arb_destruction(), 0..12)
        ) {
            let mut score = Scoreboard::default();
            for (owner, kind) in events {
                let before = score;
                score.record_tower_destroyed(owner, kind);
                for side in [Side::Player, Side::Opponent] {
                    prop_assert!(score.crowns(side) >= before.crowns(side));
                    prop_assert!(score.crowns(side) <= MAX_CROWNS);
                }
            }
        }
    }
}
