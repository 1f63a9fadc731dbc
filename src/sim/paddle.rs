//! Paddle-and-ball against a proportional-control opponent
//!
//! The human paddle is on the left, the opponent on the right. The first side
//! to reach the winning score ends the run, and the reported score is always
//! the human's.

use glam::Vec2;
use serde::Serialize;

use super::collision::{Aabb, bounce};
use super::rng::SimRng;
use super::session::Simulation;
use super::state::{Body, GameEvent, GamePhase};
use super::tick::{InputEvent, Key, Step};
use crate::clamp_span;
use crate::consts::paddle::*;
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

/// Keys currently held by the human player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HeldKeys {
    up: bool,
    down: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaddleGame {
    pub ball: Body,
    /// Top edge of the human paddle
    pub player_y: f32,
    /// Top edge of the opponent paddle
    pub ai_y: f32,
    pub player_score: u64,
    pub ai_score: u64,
    pub phase: GamePhase,
    #[serde(skip)]
    held: HeldKeys,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl PaddleGame {
    pub fn new(seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let direction = rng.sign();
        let mut game = Self {
            ball: Body::new(Vec2::ZERO, Vec2::splat(BALL_SIZE)),
            player_y: (GAME_HEIGHT - PADDLE_HEIGHT) / 2.0,
            ai_y: (GAME_HEIGHT - PADDLE_HEIGHT) / 2.0,
            player_score: 0,
            ai_score: 0,
            phase: GamePhase::Playing,
            held: HeldKeys::default(),
            rng,
            events: Vec::new(),
        };
        game.serve(direction);
        game
    }

    /// Recentre the ball heading left (`-1`) or right (`+1`)
    fn serve(&mut self, direction: f32) {
        self.ball.pos = Vec2::splat(GAME_WIDTH / 2.0);
        self.ball.vel = Vec2::new(direction * BALL_SPEED_X, self.rng.sign() * BALL_SPEED_Y);
    }

    pub fn player_box(&self) -> Aabb {
        Aabb::from_rect(
            Vec2::new(0.0, self.player_y),
            Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
        )
    }

    pub fn ai_box(&self) -> Aabb {
        Aabb::from_rect(
            Vec2::new(GAME_WIDTH - PADDLE_WIDTH, self.ai_y),
            Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
        )
    }

    fn move_player(&mut self) {
        let mut y = self.player_y;
        if self.held.up {
            y -= PADDLE_SPEED;
        }
        if self.held.down {
            y += PADDLE_SPEED;
        }
        self.player_y = clamp_span(y, 0.0, GAME_HEIGHT - PADDLE_HEIGHT);
    }

    /// Proportional controller: gain on the error, then scaled by half the paddle speed
    fn move_ai(&mut self) {
        let center = self.ai_y + PADDLE_HEIGHT / 2.0;
        let ideal = (self.ball.pos.y - center) * AI_GAIN;
        let y = self.ai_y + ideal * (PADDLE_SPEED / 2.0);
        self.ai_y = clamp_span(y, 0.0, GAME_HEIGHT - PADDLE_HEIGHT);
    }

    fn bounce_walls(&mut self) {
        let floor = GAME_HEIGHT - BALL_SIZE;
        let hit = if self.ball.pos.y <= 0.0 {
            self.ball.pos.y = 0.0;
            bounce(self.ball.vel, Vec2::Y)
        } else if self.ball.pos.y >= floor {
            self.ball.pos.y = floor;
            bounce(self.ball.vel, Vec2::NEG_Y)
        } else {
            None
        };
        if let Some(vel) = hit {
            self.ball.vel = vel;
            self.events.push(GameEvent::Bounce);
        }
    }

    /// Paddle contact reverses and speeds up horizontal motion only
    fn bounce_paddles(&mut self) {
        let ball = self.ball.aabb();
        let hit_player = self.ball.vel.x < 0.0 && ball.overlaps(&self.player_box());
        let hit_ai = self.ball.vel.x > 0.0 && ball.overlaps(&self.ai_box());
        if hit_player || hit_ai {
            self.ball.vel.x = -self.ball.vel.x * SPEED_UP;
            self.events.push(GameEvent::PaddleHit);
        }
    }

    fn check_points(&mut self) {
        if self.ball.pos.x < 0.0 {
            self.ai_score += 1;
            self.events.push(GameEvent::PointLost);
            self.serve(1.0);
        } else if self.ball.pos.x > GAME_WIDTH {
            self.player_score += 1;
            self.events.push(GameEvent::PointWon);
            self.serve(-1.0);
        }
    }
}

impl Simulation for PaddleGame {
    fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(Key::Up) => self.held.up = true,
            InputEvent::KeyUp(Key::Up) => self.held.up = false,
            InputEvent::KeyDown(Key::Down) => self.held.down = true,
            InputEvent::KeyUp(Key::Down) => self.held.down = false,
            _ => {}
        }
    }

    fn tick(&mut self, _dt_ms: f64) -> Step {
        if self.phase == GamePhase::GameOver {
            return Step::Over { score: self.player_score };
        }

        self.move_player();
        self.move_ai();

        self.ball.integrate(Vec2::ZERO);
        self.bounce_walls();
        self.bounce_paddles();
        self.check_points();

        if self.player_score >= WINNING_SCORE || self.ai_score >= WINNING_SCORE {
            self.phase = GamePhase::GameOver;
            log::info!(
                "Paddle over: player={} ai={}",
                self.player_score,
                self.ai_score
            );
            return Step::Over { score: self.player_score };
        }
        Step::Continue
    }

    fn score(&self) -> u64 {
        self.player_score
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_from_center() {
        let game = PaddleGame::new(1);
        assert_eq!(game.ball.pos, Vec2::splat(50.0));
        assert_eq!(game.ball.vel.x.abs(), BALL_SPEED_X);
        assert_eq!(game.ball.vel.y.abs(), BALL_SPEED_Y);
    }

    #[test]
    fn test_player_paddle_clamped() {
        let mut game = PaddleGame::new(1);
        game.handle_input(&InputEvent::KeyDown(Key::Up));
        for _ in 0..100 {
            game.move_player();
        }
        assert_eq!(game.player_y, 0.0);
        game.handle_input(&InputEvent::KeyUp(Key::Up));
        game.handle_input(&InputEvent::KeyDown(Key::Down));
        for _ in 0..200 {
            game.move_player();
        }
        assert_eq!(game.player_y, GAME_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_ai_tracks_ball() {
        let mut game = PaddleGame::new(1);
        game.ai_y = 0.0;
        game.ball.pos.y = 90.0;
        let before = game.ai_y;
        game.move_ai();
        let expected = (90.0 - PADDLE_HEIGHT / 2.0) * AI_GAIN * (PADDLE_SPEED / 2.0);
        assert!((game.ai_y - before - expected).abs() < 1e-5);
    }

    #[test]
    fn test_wall_bounce_keeps_speed() {
        let mut game = PaddleGame::new(1);
        game.ball.pos = Vec2::new(50.0, 0.2);
        game.ball.vel = Vec2::new(0.6, -0.4);
        game.tick(16.0);
        assert!(game.ball.vel.y > 0.0);
        assert_eq!(game.ball.vel.x, 0.6);
        assert!(game.drain_events().contains(&GameEvent::Bounce));
    }

    #[test]
    fn test_paddle_hit_speeds_up() {
        let mut game = PaddleGame::new(1);
        game.player_y = 40.0;
        game.ball.pos = Vec2::new(PADDLE_WIDTH + 0.3, 48.0);
        game.ball.vel = Vec2::new(-0.6, 0.0);
        game.tick(16.0);
        assert!((game.ball.vel.x - 0.6 * SPEED_UP).abs() < 1e-6);
        assert_eq!(game.ai_score, 0);
    }

    #[test]
    fn test_miss_scores_for_opponent_and_reserves() {
        let mut game = PaddleGame::new(1);
        game.player_y = 0.0;
        game.ball.pos = Vec2::new(0.2, 80.0);
        game.ball.vel = Vec2::new(-0.6, 0.0);
        game.tick(16.0);
        assert_eq!(game.ai_score, 1);
        assert_eq!(game.ball.pos, Vec2::splat(50.0));
        assert!(game.ball.vel.x > 0.0);
    }

    #[test]
    fn test_reports_player_score_when_ai_wins() {
        let mut game = PaddleGame::new(1);
        game.player_score = 4;
        game.ai_score = WINNING_SCORE - 1;
        game.player_y = 0.0;
        game.ball.pos = Vec2::new(0.2, 80.0);
        game.ball.vel = Vec2::new(-0.6, 0.0);
        assert_eq!(game.tick(16.0), Step::Over { score: 4 });
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_player_win_ends_immediately() {
        let mut game = PaddleGame::new(1);
        game.player_score = WINNING_SCORE - 1;
        game.ai_y = 0.0;
        game.ball.pos = Vec2::new(GAME_WIDTH - 0.2, 80.0);
        game.ball.vel = Vec2::new(0.6, 0.0);
        assert_eq!(game.tick(16.0), Step::Over { score: WINNING_SCORE });
    }
}
