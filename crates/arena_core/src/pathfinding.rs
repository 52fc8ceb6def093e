//! River-aware steering for troops.
//!
//! The arena has one obstacle: a river band crossable only at two bridge
//! columns. Ground troops whose straight line to a destination would cross
//! the band are redirected through the nearer bridge; air troops fly
//! straight. There is no grid search and no troop-troop avoidance.
//!
//! All calculations use fixed-point math for deterministic results.

use crate::components::{MovementType, Side};
use crate::layout::{ArenaLayout, RiverSide};
use crate::math::{Fixed, Vec2Fixed};

/// Pick the point a troop should head for this tick on its way to
/// `destination`.
///
/// Ground troops that need to cross the river are sent first to the river
/// edge in line with the nearer bridge, then straight over it to just past
/// the far edge. Everything else heads straight for `destination`.
#[must_use]
pub fn steer_point(
    position: Vec2Fixed,
    destination: Vec2Fixed,
    movement: MovementType,
    layout: &ArenaLayout,
) -> Vec2Fixed {
    if movement == MovementType::Air {
        return destination;
    }

    let here = layout.river_side(position.y);
    let there = layout.river_side(destination.y);
    let must_cross = matches!(
        (here, there),
        (RiverSide::Inside, _) | (RiverSide::Above, RiverSide::Below) | (RiverSide::Below, RiverSide::Above)
    );
    if !must_cross {
        return destination;
    }

    let bridge_x = layout.nearest_bridge_x(position.x);
    let aligned = (position.x - bridge_x).abs() <= layout.half_tile();

    match here {
        RiverSide::Above if !aligned => Vec2Fixed::new(bridge_x, layout.river_top_y()),
        RiverSide::Below if !aligned => Vec2Fixed::new(bridge_x, layout.river_bottom_y()),
        _ => {
            let heading_down = match here {
                RiverSide::Above => true,
                RiverSide::Below => false,
                RiverSide::Inside => destination.y > position.y,
            };
            let exit_y = if heading_down {
                layout.river_bottom_y() + layout.half_tile()
            } else {
                layout.river_top_y() - layout.half_tile()
            };
            Vec2Fixed::new(bridge_x, exit_y)
        }
    }
}

/// Where a troop with nothing to fight walks: the enemy baseline, lined up
/// with the bridge on its half of the arena for ground troops.
#[must_use]
pub fn march_destination(
    position: Vec2Fixed,
    side: Side,
    movement: MovementType,
    layout: &ArenaLayout,
) -> Vec2Fixed {
    let y = layout.enemy_baseline_y(side);
    let x = match movement {
        MovementType::Air => position.x,
        MovementType::Ground => {
            let [left, right] = layout.bridge_xs();
            if position.x < layout.mid_x() {
                left
            } else {
                right
            }
        }
    };
    Vec2Fixed::new(x, y)
}

/// Result of a single movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Position after the step.
    pub position: Vec2Fixed,
    /// Unit direction moved in, or zero if already at the point.
    pub direction: Vec2Fixed,
}

/// Move from `position` toward `point` for `delta_ms`.
///
/// Distance covered is `speed * tile_scale * delta_ms / 1000`. The step
/// stops at `point` rather than overshooting it.
#[must_use]
pub fn step_toward(
    position: Vec2Fixed,
    point: Vec2Fixed,
    speed: Fixed,
    delta_ms: u64,
    layout: &ArenaLayout,
) -> Step {
    let offset = point - position;
    let remaining = offset.length();
    if remaining == Fixed::ZERO {
        return Step {
            position,
            direction: Vec2Fixed::ZERO,
        };
    }

    let direction = offset.normalize();
    let travel = (speed * layout.scale())
        .saturating_mul(Fixed::saturating_from_num(delta_ms))
        / Fixed::from_num(1000);

    let position = if travel >= remaining {
        point
    } else {
        position + direction.scale(travel)
    };
    Step {
        position,
        direction,
    }
}
