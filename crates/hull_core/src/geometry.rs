//! Continuous-space primitives shared by the hit tests.
//!
//! Everything here works in grid-local units (already un-rotated and
//! offset by the grid origin), where module footprints are axis-aligned
//! rectangles.

use crate::math::{Fixed, Vec2Fixed};

/// Closest point to `p` on the segment `a..b`.
#[must_use]
pub fn closest_point_on_segment(p: Vec2Fixed, a: Vec2Fixed, b: Vec2Fixed) -> Vec2Fixed {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == Fixed::ZERO {
        return a;
    }
    let t = (p - a)
        .dot(ab)
        .saturating_div(len_sq)
        .clamp(Fixed::ZERO, Fixed::ONE);
    a.lerp(b, t)
}

/// Squared distance from `p` to the segment `a..b`.
#[must_use]
pub fn segment_distance_squared(p: Vec2Fixed, a: Vec2Fixed, b: Vec2Fixed) -> Fixed {
    p.distance_squared(closest_point_on_segment(p, a, b))
}

/// True if a circle of `radius` around `center` touches the segment `a..b`.
#[must_use]
pub fn segment_touches_circle(a: Vec2Fixed, b: Vec2Fixed, center: Vec2Fixed, radius: Fixed) -> bool {
    segment_distance_squared(center, a, b) <= radius.saturating_mul(radius)
}

/// Axis-aligned rectangle in grid-local units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalRect {
    /// Top-left corner.
    pub min: Vec2Fixed,
    /// Bottom-right corner.
    pub max: Vec2Fixed,
}

impl LocalRect {
    /// Create a rectangle from its corners.
    #[must_use]
    pub const fn new(min: Vec2Fixed, max: Vec2Fixed) -> Self {
        Self { min, max }
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        self.min.lerp(self.max, Fixed::ONE / Fixed::from_num(2))
    }

    /// True if `p` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: Vec2Fixed) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Closest point of the rectangle to `p`.
    #[must_use]
    pub fn clamp_point(&self, p: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Squared distance from `p` to the rectangle (zero inside).
    #[must_use]
    pub fn distance_squared_to_point(&self, p: Vec2Fixed) -> Fixed {
        p.distance_squared(self.clamp_point(p))
    }

    /// True if a circle of `radius` around `center` overlaps the rectangle.
    #[must_use]
    pub fn overlaps_circle(&self, center: Vec2Fixed, radius: Fixed) -> bool {
        self.distance_squared_to_point(center) <= radius.saturating_mul(radius)
    }

    /// Clip the segment `a..b` to this rectangle (Liang-Barsky).
    ///
    /// Returns the clipped endpoints, or `None` if the segment misses.
    #[must_use]
    pub fn clip_segment(&self, a: Vec2Fixed, b: Vec2Fixed) -> Option<(Vec2Fixed, Vec2Fixed)> {
        let d = b - a;
        let mut t0 = Fixed::ZERO;
        let mut t1 = Fixed::ONE;

        let edges = [
            (-d.x, a.x - self.min.x),
            (d.x, self.max.x - a.x),
            (-d.y, a.y - self.min.y),
            (d.y, self.max.y - a.y),
        ];

        for (p, q) in edges {
            if p == Fixed::ZERO {
                if q < Fixed::ZERO {
                    return None;
                }
                continue;
            }
            let r = q.saturating_div(p);
            if p < Fixed::ZERO {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }

        Some((a.lerp(b, t0), a.lerp(b, t1)))
    }

    /// Squared distance between the segment `a..b` and the rectangle.
    #[must_use]
    pub fn segment_distance_squared(&self, a: Vec2Fixed, b: Vec2Fixed) -> Fixed {
        if self.clip_segment(a, b).is_some() {
            return Fixed::ZERO;
        }
        let corners = [
            self.min,
            Vec2Fixed::new(self.max.x, self.min.y),
            self.max,
            Vec2Fixed::new(self.min.x, self.max.y),
        ];
        corners
            .into_iter()
            .map(|c| segment_distance_squared(c, a, b))
            .chain([
                self.distance_squared_to_point(a),
                self.distance_squared_to_point(b),
            ])
            .min()
            .unwrap_or(Fixed::ZERO)
    }
}
