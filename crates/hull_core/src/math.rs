//! Fixed-point math utilities for deterministic hull queries.
//!
//! Hit tests run inside a lockstep simulation, so every coordinate and
//! damage value is fixed-point. Floating-point operations can produce
//! different results on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all hull math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `value`.
    #[must_use]
    pub const fn splat(value: Fixed) -> Self {
        Self { x: value, y: value }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        (self - other).length_squared()
    }

    /// Squared length of the vector.
    ///
    /// Saturates instead of overflowing for points far outside the hull.
    #[must_use]
    pub fn length_squared(self) -> Fixed {
        self.x
            .saturating_mul(self.x)
            .saturating_add(self.y.saturating_mul(self.y))
    }

    /// Length of the vector.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.length_squared())
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    for _ in 0..48 {
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

/// A 2D rotation stored as a unit facing vector.
///
/// Ships carry their heading as `(cos, sin)` rather than an angle so that
/// world/grid conversions need no trigonometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(with = "fixed_serde")]
    cos: Fixed,
    #[serde(with = "fixed_serde")]
    sin: Fixed,
}

impl Rotation {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        cos: Fixed::ONE,
        sin: Fixed::ZERO,
    };

    /// Rotation that maps the +X axis onto `direction`.
    ///
    /// A zero direction yields [`Rotation::IDENTITY`].
    #[must_use]
    pub fn from_direction(direction: Vec2Fixed) -> Self {
        let unit = direction.normalize();
        if unit == Vec2Fixed::ZERO {
            return Self::IDENTITY;
        }
        Self {
            cos: unit.x,
            sin: unit.y,
        }
    }

    /// Exact rotation by a multiple of 90 degrees.
    #[must_use]
    pub fn from_quarter_turns(turns: i32) -> Self {
        let (cos, sin) = match turns.rem_euclid(4) {
            0 => (Fixed::ONE, Fixed::ZERO),
            1 => (Fixed::ZERO, Fixed::ONE),
            2 => (-Fixed::ONE, Fixed::ZERO),
            _ => (Fixed::ZERO, -Fixed::ONE),
        };
        Self { cos, sin }
    }

    /// Cosine component.
    #[must_use]
    pub const fn cos(self) -> Fixed {
        self.cos
    }

    /// Sine component.
    #[must_use]
    pub const fn sin(self) -> Fixed {
        self.sin
    }

    /// The opposite rotation.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }

    /// Rotate a vector around the origin.
    #[must_use]
    pub fn rotate(self, v: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            v.x * self.cos - v.y * self.sin,
            v.x * self.sin + v.y * self.cos,
        )
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
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
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<Fixed> for Vec2Fixed {
    type Output = Self;

    fn mul(self, rhs: Fixed) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
