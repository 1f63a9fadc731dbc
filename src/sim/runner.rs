//! Endless runner: jump over ground obstacles while the world speeds up
//!
//! y grows upward from the floor. Score accrues 0.1 per tick, kept as integer
//! tenths so accumulation is exact, and is floored when reported.

use glam::Vec2;
use serde::Serialize;

use super::collision::Aabb;
use super::rng::SimRng;
use super::session::Simulation;
use super::spawn::GapSpawner;
use super::state::{Body, EntityIds, GameEvent, GamePhase, floor_tenths};
use super::tick::{InputEvent, Key, Step};
use crate::consts::GAME_WIDTH;
use crate::consts::runner::*;

/// A ground obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
}

impl Obstacle {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rect(
            Vec2::new(self.x, GROUND_Y),
            Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunnerGame {
    pub player: Body,
    pub jumping: bool,
    /// Live obstacles, oldest (leftmost) first
    pub obstacles: Vec<Obstacle>,
    pub speed: f32,
    /// Number of speed increments applied so far
    pub speed_steps: u32,
    pub phase: GamePhase,
    score_tenths: u64,
    #[serde(skip)]
    jump_requested: bool,
    #[serde(skip)]
    spawner: GapSpawner,
    #[serde(skip)]
    ids: EntityIds,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl RunnerGame {
    pub fn new(seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut ids = EntityIds::default();
        let spawner = GapSpawner::new(OBSTACLE_MIN_GAP, OBSTACLE_MAX_GAP, &mut rng);
        let first = Obstacle {
            id: ids.next_id(),
            x: FIRST_OBSTACLE_X,
        };
        Self {
            player: Body::new(
                Vec2::new(PLAYER_X, GROUND_Y),
                Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            ),
            jumping: false,
            obstacles: vec![first],
            speed: INITIAL_SPEED,
            speed_steps: 0,
            phase: GamePhase::Playing,
            score_tenths: 0,
            jump_requested: false,
            spawner,
            ids,
            rng,
            events: Vec::new(),
        }
    }

    /// Unfloored score in tenths of a point
    pub fn score_tenths(&self) -> u64 {
        self.score_tenths
    }

    fn game_over(&mut self) -> Step {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::Collision);
        let score = self.score();
        log::info!("Runner over: score={} speed={:.2}", score, self.speed);
        Step::Over { score }
    }

    /// Apply one increment per multiple of `SPEED_INTERVAL` crossed, and only once each
    fn apply_difficulty(&mut self) {
        let floored = self.score();
        while floored >= (self.speed_steps as u64 + 1) * SPEED_INTERVAL {
            self.speed_steps += 1;
            self.speed = INITIAL_SPEED + self.speed_steps as f32 * SPEED_INCREMENT;
            self.events.push(GameEvent::SpeedUp);
            log::debug!("Runner speed up: {:.2} at {}", self.speed, floored);
        }
    }
}

impl Simulation for RunnerGame {
    fn handle_input(&mut self, event: &InputEvent) {
        if matches!(
            event,
            InputEvent::KeyDown(Key::Space | Key::Up) | InputEvent::Tap
        ) {
            self.jump_requested = true;
        }
    }

    fn tick(&mut self, _dt_ms: f64) -> Step {
        if self.phase == GamePhase::GameOver {
            return Step::Over { score: self.score() };
        }

        if std::mem::take(&mut self.jump_requested) && !self.jumping {
            self.jumping = true;
            self.player.vel.y = JUMP_STRENGTH;
            self.events.push(GameEvent::Jump);
        }

        self.player.integrate(Vec2::new(0.0, -GRAVITY));
        if self.player.pos.y <= GROUND_Y {
            self.player.pos.y = GROUND_Y;
            self.player.vel.y = 0.0;
            if self.jumping {
                self.events.push(GameEvent::Land);
            }
            self.jumping = false;
        }

        let speed = self.speed;
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
        self.obstacles.retain(|o| o.x > -OBSTACLE_WIDTH);

        let player_box = self.player.aabb();
        if self.obstacles.iter().any(|o| o.aabb().overlaps(&player_box)) {
            return self.game_over();
        }

        let last_x = self.obstacles.last().map_or(0.0, |o| o.x);
        if self.spawner.should_spawn(GAME_WIDTH - last_x, &mut self.rng) {
            let id = self.ids.next_id();
            self.obstacles.push(Obstacle { id, x: GAME_WIDTH });
        }

        self.score_tenths += SCORE_TENTHS_PER_TICK;
        self.apply_difficulty();
        Step::Continue
    }

    fn score(&self) -> u64 {
        floor_tenths(self.score_tenths)
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
