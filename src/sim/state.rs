//! Shared game state types
//!
//! Entity bodies, run phase, id allocation and the events engines emit for
//! the host (sound cues, HUD flashes). Engines never play audio themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Mounted, waiting for the first input before anything moves
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended; the final score has been reported
    GameOver,
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jump,
    Land,
    Flap,
    /// An obstacle passed the player
    Pass,
    /// Ball hit a wall
    Bounce,
    PaddleHit,
    PointWon,
    PointLost,
    Eat,
    Rotate,
    /// Piece locked without clearing rows
    Lock,
    LinesCleared(u32),
    Merge,
    Collision,
    SpeedUp,
    LevelUp(u32),
}

/// Monotonic id allocator; ids are never reused within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next_id: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIds {
    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// A moving rectangle in percentage space
///
/// `pos` is the box origin corner; which corner depends on the game's y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    /// One fixed step: velocity first, then position with the new velocity
    pub fn integrate(&mut self, accel: Vec2) {
        self.vel += accel;
        self.pos += self.vel;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(self.pos, self.size)
    }
}

/// Floor a tenths accumulator to whole points
#[inline]
pub fn floor_tenths(tenths: u64) -> u64 {
    tenths / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_integrate_velocity_first() {
        let mut body = Body::new(Vec2::new(0.0, 5.0), Vec2::ONE);
        body.vel.y = 1.2;
        body.integrate(Vec2::new(0.0, -0.05));
        assert!((body.vel.y - 1.15).abs() < 1e-6);
        assert!((body.pos.y - 6.15).abs() < 1e-6);
    }

    #[test]
    fn test_floor_tenths() {
        assert_eq!(floor_tenths(0), 0);
        assert_eq!(floor_tenths(9), 0);
        assert_eq!(floor_tenths(5000), 500);
        assert_eq!(floor_tenths(5009), 500);
    }
}
