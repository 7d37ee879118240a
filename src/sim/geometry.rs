//! Arena geometry: static rectangles, circle contacts and line of sight
//!
//! All obstacles are axis-aligned rectangles in arena space (origin top-left,
//! +Y down). Vehicles are circles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Spacing of sample points when testing line of sight
pub const LOS_SAMPLE_SPACING: f32 = 40.0;

/// A static axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Contact between a circle and a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the surface toward the circle centre
    pub normal: Vec2,
    /// How far the circle has to move along `normal` to separate
    pub penetration: f32,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Strict interior test (edges don't count)
    pub fn contains_point(&self, p: Vec2) -> bool {
        let (lo, hi) = (self.min(), self.max());
        p.x > lo.x && p.x < hi.x && p.y > lo.y && p.y < hi.y
    }

    /// True if a circle of `radius` at `p` touches the rectangle's padded bounds
    pub fn overlaps_padded(&self, p: Vec2, radius: f32) -> bool {
        let (lo, hi) = (self.min() - Vec2::splat(radius), self.max() + Vec2::splat(radius));
        p.x > lo.x && p.x < hi.x && p.y > lo.y && p.y < hi.y
    }

    /// Closest point on (or in) the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Distance from `p` to the rectangle (0 when inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    /// Contact between a circle and this rectangle, if they overlap
    ///
    /// A centre outside the rectangle is pushed along the closest-point normal.
    /// A centre inside (or exactly on an edge) exits through the shallowest face
    /// that keeps the circle inside `bounds`; ties resolve to +X. Faces flush
    /// with the arena edge are only used when no other face is available.
    pub fn circle_contact(&self, center: Vec2, radius: f32, bounds: Vec2) -> Option<Contact> {
        let closest = self.closest_point(center);
        let offset = center - closest;
        let dist = offset.length();

        if dist > 0.0 {
            if dist >= radius {
                return None;
            }
            return Some(Contact {
                normal: offset / dist,
                penetration: radius - dist,
            });
        }

        let (lo, hi) = (self.min(), self.max());
        let faces = [
            (hi.x - center.x, Vec2::X, hi.x + radius <= bounds.x),
            (center.x - lo.x, Vec2::NEG_X, lo.x - radius >= 0.0),
            (hi.y - center.y, Vec2::Y, hi.y + radius <= bounds.y),
            (center.y - lo.y, Vec2::NEG_Y, lo.y - radius >= 0.0),
        ];
        let shallowest = |open_only: bool| {
            faces
                .iter()
                .filter(|f| f.2 || !open_only)
                .fold(None, |best: Option<(f32, Vec2)>, f| match best {
                    Some(b) if b.0 <= f.0 => Some(b),
                    _ => Some((f.0, f.1)),
                })
        };
        let (depth, normal) = shallowest(true).or_else(|| shallowest(false))?;

        Some(Contact {
            normal,
            penetration: depth + radius,
        })
    }

    /// Whether the segment a→b passes through the rectangle interior,
    /// sampled every [`LOS_SAMPLE_SPACING`] units
    pub fn blocks_segment(&self, a: Vec2, b: Vec2) -> bool {
        let steps = (a.distance(b) / LOS_SAMPLE_SPACING).ceil() as u32;
        if steps == 0 {
            return self.contains_point(a);
        }
        (0..=steps).any(|i| self.contains_point(a.lerp(b, i as f32 / steps as f32)))
    }
}

/// Unobstructed straight path between two points
pub fn has_line_of_sight(a: Vec2, b: Vec2, obstacles: &[Obstacle]) -> bool {
    !obstacles.iter().any(|o| o.blocks_segment(a, b))
}

/// True if a circle at `p` pokes out of the arena or into any obstacle
pub fn blocked(p: Vec2, radius: f32, bounds: Vec2, obstacles: &[Obstacle]) -> bool {
    if p.x < radius || p.y < radius || p.x > bounds.x - radius || p.y > bounds.y - radius {
        return true;
    }
    obstacles.iter().any(|o| o.overlaps_padded(p, radius))
}
