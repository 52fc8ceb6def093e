//! Fixed-point math utilities for deterministic simulation.
//!
//! Positions, ranges, speeds and elixir all live in fixed-point so a
//! battle fed the same inputs always lands on the same state. Floats
//! only appear at the edges: decimal values read from data files and
//! the facing angle handed to renderers.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 2D vector in arena plane units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_decimal")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_decimal")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers written as plain decimals.
///
/// Data files are authored by hand (`range: 5.5`), so values are read
/// as `f64` and converted once at load time.
pub mod fixed_decimal {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

/// Serde support for `Option<Fixed>` written as plain decimals.
pub mod option_fixed_decimal {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(|v| v.to_num::<f64>()).serialize(serializer)
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            Some(value) => Fixed::checked_from_num(value).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("{value} is out of fixed-point range"))
            }),
            None => Ok(None),
        }
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Length of the vector.
    ///
    /// Vectors whose squared length would not fit are measured on a copy
    /// scaled down by their largest component, so offsets far outside the
    /// arena still get a usable length and heading.
    #[must_use]
    pub fn length(self) -> Fixed {
        let span = self.x.saturating_abs().max(self.y.saturating_abs());
        if span <= EXACT_LENGTH_LIMIT {
            return fixed_sqrt(self.dot(self));
        }
        let unit = Self::new(self.x / span, self.y / span);
        span.saturating_mul(fixed_sqrt(unit.dot(unit)))
    }

    /// Dot product of two vectors. Saturates instead of overflowing.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x
            .saturating_mul(other.x)
            .saturating_add(self.y.saturating_mul(other.y))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }

    /// Angle of this vector in radians, measured from +x toward +y.
    ///
    /// Only meant for presentation; simulation code keeps directions
    /// as vectors.
    #[must_use]
    pub fn angle(self) -> f32 {
        let y: f64 = self.y.to_num();
        let x: f64 = self.x.to_num();
        #[allow(clippy::cast_possible_truncation)]
        let angle = y.atan2(x) as f32;
        angle
    }
}

/// Largest component for which [`Vec2Fixed::length`] squares directly.
const EXACT_LENGTH_LIMIT: Fixed = Fixed::lit("16384");

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..64 {
        let mid = low + (high - low) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}
