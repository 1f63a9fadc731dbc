//! Flap-to-survive side-scroller
//!
//! y grows downward. Nothing moves until the first flap. Each pipe is two
//! boxes around a vertical opening; a point is scored when a pipe's leading
//! edge crosses the bird's fixed x position.

use glam::Vec2;
use serde::Serialize;

use super::collision::{Aabb, hits_any};
use super::rng::SimRng;
use super::session::Simulation;
use super::spawn::GapSpawner;
use super::state::{Body, EntityIds, GameEvent, GamePhase};
use super::tick::{InputEvent, Step};
use crate::consts::flappy::*;
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Top of the opening
    pub gap_top: f32,
}

impl Pipe {
    /// Above-gap and below-gap boxes
    pub fn boxes(&self) -> [Aabb; 2] {
        let gap_bottom = self.gap_top + PIPE_GAP;
        [
            Aabb::from_rect(Vec2::new(self.x, 0.0), Vec2::new(PIPE_WIDTH, self.gap_top)),
            Aabb::from_rect(
                Vec2::new(self.x, gap_bottom),
                Vec2::new(PIPE_WIDTH, GAME_HEIGHT - gap_bottom),
            ),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlappyGame {
    pub bird: Body,
    pub pipes: Vec<Pipe>,
    pub score: u64,
    pub phase: GamePhase,
    #[serde(skip)]
    flap_requested: bool,
    #[serde(skip)]
    spawner: GapSpawner,
    #[serde(skip)]
    ids: EntityIds,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl FlappyGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            bird: Body::new(
                Vec2::new(BIRD_X, BIRD_START_Y),
                Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
            ),
            pipes: Vec::new(),
            score: 0,
            phase: GamePhase::Ready,
            flap_requested: false,
            spawner: GapSpawner::fixed(PIPE_SPACING),
            ids: EntityIds::default(),
            rng: SimRng::new(seed),
            events: Vec::new(),
        };
        game.spawn_pipe(GAME_WIDTH);
        game.spawn_pipe(GAME_WIDTH + PIPE_SPACING);
        game
    }

    fn spawn_pipe(&mut self, x: f32) {
        let gap_top = self
            .rng
            .range(GAP_MARGIN, GAME_HEIGHT - PIPE_GAP - GAP_MARGIN);
        let id = self.ids.next_id();
        self.pipes.push(Pipe { id, x, gap_top });
    }

    fn out_of_bounds(&self) -> bool {
        self.bird.pos.y > GAME_HEIGHT - BIRD_HEIGHT || self.bird.pos.y < 0.0
    }

    fn game_over(&mut self) -> Step {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::Collision);
        log::info!("Flappy over: score={}", self.score);
        Step::Over { score: self.score }
    }
}

impl Simulation for FlappyGame {
    fn handle_input(&mut self, event: &InputEvent) {
        // Any key, click or tap flaps
        if matches!(event, InputEvent::KeyDown(_) | InputEvent::Tap) {
            self.flap_requested = true;
        }
    }

    fn tick(&mut self, _dt_ms: f64) -> Step {
        match self.phase {
            GamePhase::GameOver => return Step::Over { score: self.score },
            GamePhase::Ready => {
                if !self.flap_requested {
                    return Step::Continue;
                }
                self.phase = GamePhase::Playing;
            }
            GamePhase::Playing => {}
        }

        if std::mem::take(&mut self.flap_requested) {
            self.bird.vel.y = -FLAP_STRENGTH;
            self.events.push(GameEvent::Flap);
        }
        self.bird.integrate(Vec2::new(0.0, GRAVITY));

        for pipe in &mut self.pipes {
            let prev_x = pipe.x;
            pipe.x -= SPEED;
            if prev_x > BIRD_X && pipe.x <= BIRD_X {
                self.score += 1;
                self.events.push(GameEvent::Pass);
            }
        }
        self.pipes.retain(|p| p.x > -PIPE_WIDTH);

        let last_x = self.pipes.last().map_or(0.0, |p| p.x);
        if self.spawner.should_spawn(GAME_WIDTH - last_x, &mut self.rng) {
            self.spawn_pipe(GAME_WIDTH);
        }

        if self.out_of_bounds() {
            return self.game_over();
        }
        let bird_box = self.bird.aabb();
        if hits_any(&bird_box, self.pipes.iter().flat_map(Pipe::boxes)) {
            return self.game_over();
        }
        Step::Continue
    }

    fn score(&self) -> u64 {
        self.score
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
