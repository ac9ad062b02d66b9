//! Axis-aligned bounding box collision
//!
//! Every body in the arena is a box: sprites are drawn as circles but collide
//! as their bounding squares. Overlap is strict, so boxes that only share an
//! edge do not collide.

use glam::Vec2;

use super::state::Direction;

/// Axis-aligned box stored as min/max corners (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given half extents
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// True if the interiors overlap
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// True if `other` lies entirely within this box (edges may touch)
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Center position that keeps a box with `half_extents` inside this box.
    ///
    /// Boxes larger than this one are pinned to the min edge.
    pub fn clamp_center(&self, center: Vec2, half_extents: Vec2) -> Vec2 {
        let lo = self.min + half_extents;
        let hi = (self.max - half_extents).max(lo);
        center.clamp(lo, hi)
    }

    /// Center offset that moves this box out of `solid`, backing up against
    /// the direction of travel.
    ///
    /// Moving left lands the box flush with the solid's right edge, and so on.
    /// Returns zero when the boxes do not overlap.
    pub fn push_out(&self, solid: &Aabb, moving: Direction) -> Vec2 {
        if !self.intersects(solid) {
            return Vec2::ZERO;
        }
        match moving {
            Direction::Left => Vec2::new(solid.max.x - self.min.x, 0.0),
            Direction::Right => Vec2::new(solid.min.x - self.max.x, 0.0),
            Direction::Up => Vec2::new(0.0, solid.max.y - self.min.y),
            Direction::Down => Vec2::new(0.0, solid.min.y - self.max.y),
        }
    }
}

/// The playable area
pub fn viewport_bounds() -> Aabb {
    Aabb::new(Vec2::ZERO, crate::viewport_size())
}
