//! Axis-aligned bounding boxes
//!
//! Pipes never rotate, so their box is just position and size. The player
//! tilts with its velocity; its box is the axis-aligned hull of the rotated
//! sprite, which is what the renderer would report for it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box with its bottom-left corner at `pos`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Hull of a `pos`/`size` rectangle rotated by `angle` about its centre
    pub fn from_rotated(pos: Vec2, size: Vec2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let half = 0.5
            * Vec2::new(
                size.x * cos.abs() + size.y * sin.abs(),
                size.x * sin.abs() + size.y * cos.abs(),
            );
        let center = pos + size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Overlap test. Touching edges count as a hit.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_pos_size(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::from_pos_size(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_separated_boxes_miss() {
        let a = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let right = Aabb::from_pos_size(Vec2::new(10.5, 0.0), Vec2::new(10.0, 10.0));
        let above = Aabb::from_pos_size(Vec2::new(0.0, 11.0), Vec2::new(10.0, 10.0));
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn test_unrotated_hull_matches_plain_box() {
        let pos = Vec2::new(-120.0, 4.0);
        let size = Vec2::new(36.0, 26.0);
        let plain = Aabb::from_pos_size(pos, size);
        let hull = Aabb::from_rotated(pos, size, 0.0);
        assert!((plain.min - hull.min).length() < 1e-4);
        assert!((plain.max - hull.max).length() < 1e-4);
    }

    #[test]
    fn test_quarter_turn_swaps_extents() {
        let hull = Aabb::from_rotated(Vec2::ZERO, Vec2::new(36.0, 26.0), -FRAC_PI_2);
        let size = hull.size();
        assert!((size.x - 26.0).abs() < 1e-3);
        assert!((size.y - 36.0).abs() < 1e-3);
        // Centre stays put
        let center = (hull.min + hull.max) * 0.5;
        assert!((center - Vec2::new(18.0, 13.0)).length() < 1e-3);
    }
}
