//! Shared geometric primitives used by contour extraction and BVT construction.

use glam::{Vec2, Vec3};

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb3d {
    /// Component-wise minimum corner.
    pub min: Vec3,
    /// Component-wise maximum corner.
    pub max: Vec3,
}

impl Aabb3d {
    /// Returns the union of `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// The extent of the box along each axis (`max - min`).
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// An axis-aligned bounding box on the xz-plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb2d {
    /// Component-wise minimum corner.
    pub min: Vec2,
    /// Component-wise maximum corner.
    pub max: Vec2,
}

/// Gets the standard width (x-axis) offset for the specified direction.
///
/// Directions are enumerated 0..3 clockwise starting from west.
/// \[Limits: 0 <= value < 4\]
#[inline]
pub(crate) fn dir_offset_x(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [-1, 0, 1, 0];
    OFFSET[direction as usize & 0x03]
}

/// Gets the standard height (z-axis) offset for the specified direction.
#[inline]
pub(crate) fn dir_offset_z(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [0, 1, 0, -1];
    OFFSET[direction as usize & 0x03]
}

/// Rotates a direction clockwise.
#[inline]
pub(crate) fn dir_rotate_cw(direction: u8) -> u8 {
    (direction + 1) & 0x03
}

/// Rotates a direction counter-clockwise.
#[inline]
pub(crate) fn dir_rotate_ccw(direction: u8) -> u8 {
    (direction + 3) & 0x03
}

/// Squared perpendicular distance from `point` to the segment `seg_a..seg_b`, on the xz-plane.
pub(crate) fn distance_point_to_segment_sq_2d(point: Vec2, seg_a: Vec2, seg_b: Vec2) -> f32 {
    let segment_delta = seg_b - seg_a;
    let point_delta = point - seg_a;

    let d = segment_delta.length_squared();
    let mut t = segment_delta.dot(point_delta);
    if d > 0.0 {
        t /= d;
    }
    t = t.clamp(0.0, 1.0);

    let closest = seg_a + segment_delta * t;
    (closest - point).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_offsets_are_4_connected() {
        for dir in 0..4 {
            let x = dir_offset_x(dir);
            let z = dir_offset_z(dir);
            assert_eq!(x.unsigned_abs() + z.unsigned_abs(), 1);
        }
    }

    #[test]
    fn dir_rotation_is_inverse() {
        for dir in 0..4 {
            assert_eq!(dir_rotate_ccw(dir_rotate_cw(dir)), dir);
        }
    }

    #[test]
    fn distance_to_segment_midpoint_is_zero() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let mid = Vec2::new(5.0, 0.0);
        assert!(distance_point_to_segment_sq_2d(mid, a, b) < 1e-6);
    }

    #[test]
    fn distance_perpendicular() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let p = Vec2::new(5.0, 3.0);
        assert!((distance_point_to_segment_sq_2d(p, a, b) - 9.0).abs() < 1e-4);
    }
}
