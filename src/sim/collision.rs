//! Collision detection and response for rectangular entities
//!
//! Every continuous-motion game uses axis-aligned boxes in percentage space.
//! Touching edges do not count as a hit.

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from an origin corner and a size
    pub fn from_rect(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    /// Zero-area boxes (e.g. a pipe half with no height) never collide
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

/// True if `subject` overlaps any non-empty box in `boxes`
pub fn hits_any(subject: &Aabb, boxes: impl IntoIterator<Item = Aabb>) -> bool {
    boxes
        .into_iter()
        .any(|b| !b.is_empty() && subject.overlaps(&b))
}

/// Reflect velocity off a surface with unit normal `normal`
pub fn reflect_velocity(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// Reflect only when moving into the surface, so a body resting past a wall
/// for one tick cannot flip back and forth
pub fn bounce(vel: Vec2, normal: Vec2) -> Option<Vec2> {
    (vel.dot(normal) < 0.0).then(|| reflect_velocity(vel, normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_basic() {
        let a = Aabb::from_rect(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
        let b = Aabb::from_rect(Vec2::new(4.0, 4.0), Vec2::new(5.0, 5.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_miss() {
        let a = Aabb::from_rect(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0));
        let b = Aabb::from_rect(Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_hits_any_skips_empty() {
        let bird = Aabb::from_rect(Vec2::new(15.0, 0.0), Vec2::new(7.0, 6.0));
        let empty = Aabb::from_rect(Vec2::new(10.0, 0.0), Vec2::new(12.0, 0.0));
        assert!(!hits_any(&bird, [empty]));
        let solid = Aabb::from_rect(Vec2::new(10.0, 0.0), Vec2::new(12.0, 3.0));
        assert!(hits_any(&bird, [empty, solid]));
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving down into the floor (normal pointing up the screen)
        let velocity = Vec2::new(0.6, 0.4);
        let normal = Vec2::new(0.0, -1.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - 0.6).abs() < 0.001);
        assert!((reflected.y + 0.4).abs() < 0.001);
    }

    #[test]
    fn test_bounce_only_when_approaching() {
        let normal = Vec2::new(0.0, 1.0);
        assert!(bounce(Vec2::new(0.0, -1.0), normal).is_some());
        assert!(bounce(Vec2::new(0.0, 1.0), normal).is_none());
    }
}
