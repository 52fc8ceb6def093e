//! Arena geometry.
//!
//! The renderer owns the real pixel layout and may change it between
//! ticks (window resize, zoom). The simulation only needs the origin,
//! the tile size and the fixed grid facts: grid dimensions, the river
//! band and the two bridge columns.

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::error::{BattleError, Result};
use crate::math::{fixed_decimal, Fixed, Vec2Fixed};

/// Grid columns.
pub const COLS: u32 = 24;
/// Grid rows.
pub const ROWS: u32 = 45;
/// The river row.
pub const RIVER_ROW: u32 = 22;
/// Left bridge column.
pub const BRIDGE_LEFT_COL: u32 = 6;
/// Right bridge column.
pub const BRIDGE_RIGHT_COL: u32 = 17;
/// Tile size at which archetype speeds and ranges are authored.
pub const REFERENCE_TILE_SIZE: i32 = 22;

/// Rows between a river edge and the princess towers on that side.
const PRINCESS_ROW_OFFSET: u32 = 9;
/// Rows between a river edge and the king tower on that side.
const KING_ROW_OFFSET: u32 = 13;

/// Where a point sits relative to the river band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverSide {
    /// Rows above the band (opponent half).
    Above,
    /// Inside the band.
    Inside,
    /// Rows below the band (player half).
    Below,
}

/// Arena geometry supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaLayout {
    /// Top-left corner of the grid in plane units.
    pub origin: Vec2Fixed,
    /// Current tile size in plane units.
    #[serde(with = "fixed_decimal")]
    pub tile_size: Fixed,
    /// Grid columns.
    pub cols: u32,
    /// Grid rows.
    pub rows: u32,
    /// First river row.
    pub river_row_start: u32,
    /// Last river row (inclusive).
    pub river_row_end: u32,
    /// Bridge columns, left then right.
    pub bridge_cols: [u32; 2],
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            origin: Vec2Fixed::ZERO,
            tile_size: Fixed::from_num(REFERENCE_TILE_SIZE),
            cols: COLS,
            rows: ROWS,
            river_row_start: RIVER_ROW,
            river_row_end: RIVER_ROW,
            bridge_cols: [BRIDGE_LEFT_COL, BRIDGE_RIGHT_COL],
        }
    }
}

/// A named tower position produced by [`ArenaLayout::standard_towers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerPlacement {
    /// Tower name; names containing `king` are king towers.
    pub name: String,
    /// Owning side.
    pub side: Side,
    /// Center position.
    pub position: Vec2Fixed,
}

impl ArenaLayout {
    /// Default geometry with a different origin and tile size.
    #[must_use]
    pub fn with_scale(origin: Vec2Fixed, tile_size: Fixed) -> Self {
        Self {
            origin,
            tile_size,
            ..Self::default()
        }
    }

    /// Reject geometry the simulation cannot run on.
    ///
    /// # Errors
    /// Returns [`BattleError::InvalidLayout`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size <= Fixed::ZERO {
            return Err(BattleError::InvalidLayout(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.cols == 0 || self.rows == 0 {
            return Err(BattleError::InvalidLayout(
                "grid must have at least one row and column".to_string(),
            ));
        }
        if self.river_row_start > self.river_row_end || self.river_row_end >= self.rows {
            return Err(BattleError::InvalidLayout(format!(
                "river rows {}..={} do not fit in {} rows",
                self.river_row_start, self.river_row_end, self.rows
            )));
        }
        if let Some(col) = self.bridge_cols.iter().find(|&&col| col >= self.cols) {
            return Err(BattleError::InvalidLayout(format!(
                "bridge column {col} is outside {} columns",
                self.cols
            )));
        }
        Ok(())
    }

    /// Ratio of the current tile size to the reference tile size.
    #[must_use]
    pub fn scale(&self) -> Fixed {
        self.tile_size / Fixed::from_num(REFERENCE_TILE_SIZE)
    }

    /// Half a tile.
    #[must_use]
    pub fn half_tile(&self) -> Fixed {
        self.tile_size / Fixed::from_num(2)
    }

    /// Row index containing `y`. Rows above the grid are negative.
    #[must_use]
    pub fn row_of(&self, y: Fixed) -> i64 {
        y.saturating_sub(self.origin.y)
            .saturating_div(self.tile_size)
            .floor()
            .to_num::<i64>()
    }

    /// Center x of a column.
    #[must_use]
    pub fn column_center_x(&self, col: Fixed) -> Fixed {
        self.origin.x + col * self.tile_size + self.half_tile()
    }

    /// Center of a cell, allowing fractional columns and rows.
    #[must_use]
    pub fn cell_center(&self, col: Fixed, row: Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            self.column_center_x(col),
            self.origin.y + row * self.tile_size + self.half_tile(),
        )
    }

    /// Center x of both bridges, left then right.
    #[must_use]
    pub fn bridge_xs(&self) -> [Fixed; 2] {
        self.bridge_cols
            .map(|col| self.column_center_x(Fixed::from_num(col)))
    }

    /// Center x of the bridge nearest to `x`. Ties go to the left bridge.
    #[must_use]
    pub fn nearest_bridge_x(&self, x: Fixed) -> Fixed {
        let [left, right] = self.bridge_xs();
        if (x - left).abs() <= (x - right).abs() {
            left
        } else {
            right
        }
    }

    /// Classify a y coordinate against the river band.
    #[must_use]
    pub fn river_side(&self, y: Fixed) -> RiverSide {
        let row = self.row_of(y);
        if row < i64::from(self.river_row_start) {
            RiverSide::Above
        } else if row > i64::from(self.river_row_end) {
            RiverSide::Below
        } else {
            RiverSide::Inside
        }
    }

    /// Y of the top edge of the river band.
    #[must_use]
    pub fn river_top_y(&self) -> Fixed {
        self.origin.y + Fixed::from_num(self.river_row_start) * self.tile_size
    }

    /// Y of the bottom edge of the river band.
    #[must_use]
    pub fn river_bottom_y(&self) -> Fixed {
        self.origin.y + Fixed::from_num(self.river_row_end + 1) * self.tile_size
    }

    /// Y of the baseline a side walks toward when it has nothing to fight.
    #[must_use]
    pub fn enemy_baseline_y(&self, side: Side) -> Fixed {
        match side {
            Side::Player => self.origin.y,
            Side::Opponent => self.origin.y + Fixed::from_num(self.rows) * self.tile_size,
        }
    }

    /// Horizontal center of the grid.
    #[must_use]
    pub fn mid_x(&self) -> Fixed {
        self.origin.x + Fixed::from_num(self.cols) * self.tile_size / Fixed::from_num(2)
    }

    /// The six standard towers: a king and two princesses per side.
    ///
    /// Princess towers stand on the bridge columns; the king stands on the
    /// center line further back.
    #[must_use]
    pub fn standard_towers(&self) -> Vec<TowerPlacement> {
        let [left_col, right_col] = self.bridge_cols.map(Fixed::from_num);
        let center_col = Fixed::from_num(self.cols) / Fixed::from_num(2) - Fixed::lit("0.5");

        let top = i64::from(self.river_row_start);
        let bottom = i64::from(self.river_row_end);
        let princess = i64::from(PRINCESS_ROW_OFFSET);
        let king = i64::from(KING_ROW_OFFSET);

        let mut placements = Vec::with_capacity(6);
        for (side, princess_row, king_row) in [
            (Side::Player, bottom + princess, bottom + king),
            (Side::Opponent, top - princess, top - king),
        ] {
            let princess_row = Fixed::from_num(princess_row);
            let king_row = Fixed::from_num(king_row);
            placements.push(TowerPlacement {
                name: format!("{side}_king"),
                side,
                position: self.cell_center(center_col, king_row),
            });
            placements.push(TowerPlacement {
                name: format!("{side}_princess_left"),
                side,
                position: self.cell_center(left_col, princess_row),
            });
            placements.push(TowerPlacement {
                name: format!("{side}_princess_right"),
                side,
                position: self.cell_center(right_col, princess_row),
            });
        }
        placements
    }
}
