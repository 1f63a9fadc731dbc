//! Mini Arcade - casual arcade mini-game engines
//!
//! Core modules:
//! - `sim`: Deterministic simulation (six game engines, shared primitives, lifecycle)
//! - `shell`: Host-side boundary (catalog, accounts, backend, screen state machine)
//! - `settings`: Data-driven configuration
//! - `autopilot`: Simple bots that drive any engine through its public state

pub mod autopilot;
pub mod error;
pub mod settings;
pub mod shell;
pub mod sim;

pub use error::{MountError, ShellError};
pub use settings::Settings;
pub use sim::{GameKind, GameOverCallback, InputEvent, Key, Session};

/// Game configuration constants
///
/// All continuous games work in percentage-of-viewport units (0-100 per axis).
pub mod consts {
    /// Playfield extent for continuous games
    pub const GAME_WIDTH: f32 = 100.0;
    pub const GAME_HEIGHT: f32 = 100.0;

    /// Maximum ticks executed per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Endless runner (y axis grows upward from the floor)
    pub mod runner {
        pub const GROUND_Y: f32 = 5.0;
        pub const PLAYER_X: f32 = super::GAME_WIDTH / 4.0;
        pub const PLAYER_WIDTH: f32 = 5.0;
        pub const PLAYER_HEIGHT: f32 = 7.0;
        pub const GRAVITY: f32 = 0.05;
        pub const JUMP_STRENGTH: f32 = 1.2;
        pub const INITIAL_SPEED: f32 = 0.5;
        /// Speed increases once per this many (floored) points
        pub const SPEED_INTERVAL: u64 = 500;
        pub const SPEED_INCREMENT: f32 = 0.05;
        pub const OBSTACLE_WIDTH: f32 = 3.0;
        pub const OBSTACLE_HEIGHT: f32 = 6.0;
        pub const OBSTACLE_MIN_GAP: f32 = 35.0;
        pub const OBSTACLE_MAX_GAP: f32 = 70.0;
        pub const FIRST_OBSTACLE_X: f32 = super::GAME_WIDTH + 10.0;
        /// Score is accumulated in tenths: +0.1 per tick
        pub const SCORE_TENTHS_PER_TICK: u64 = 1;
    }

    /// Flap-to-survive (y axis grows downward from the ceiling)
    pub mod flappy {
        pub const BIRD_X: f32 = 15.0;
        pub const BIRD_START_Y: f32 = 50.0;
        pub const BIRD_WIDTH: f32 = 7.0;
        pub const BIRD_HEIGHT: f32 = 6.0;
        pub const GRAVITY: f32 = 0.2;
        pub const FLAP_STRENGTH: f32 = 4.0;
        pub const PIPE_WIDTH: f32 = 12.0;
        /// Vertical opening between the two halves of a pipe
        pub const PIPE_GAP: f32 = 30.0;
        pub const PIPE_SPACING: f32 = 55.0;
        pub const SPEED: f32 = 0.7;
        /// Gap top is drawn from [GAP_MARGIN, GAME_HEIGHT - PIPE_GAP - GAP_MARGIN]
        pub const GAP_MARGIN: f32 = 10.0;
    }

    /// Paddle-and-ball
    pub mod paddle {
        pub const PADDLE_WIDTH: f32 = 2.0;
        pub const PADDLE_HEIGHT: f32 = 20.0;
        pub const PADDLE_SPEED: f32 = 1.2;
        /// Proportional gain of the opponent controller
        pub const AI_GAIN: f32 = 0.05;
        pub const BALL_SIZE: f32 = 2.0;
        pub const BALL_SPEED_X: f32 = 0.6;
        pub const BALL_SPEED_Y: f32 = 0.4;
        /// Horizontal speed multiplier on paddle contact
        pub const SPEED_UP: f32 = 1.05;
        pub const WINNING_SCORE: u64 = 10;
    }

    /// Snake
    pub mod snake {
        pub const GRID_SIZE: i32 = 20;
        pub const INITIAL_INTERVAL_MS: f64 = 200.0;
        pub const MIN_INTERVAL_MS: f64 = 50.0;
        pub const INTERVAL_FACTOR: f64 = 0.95;
        /// Turns buffered between ticks; further presses are dropped
        pub const MAX_QUEUED_TURNS: usize = 2;
    }

    /// Falling-block puzzle
    pub mod blocks {
        pub const GRID_WIDTH: usize = 10;
        pub const GRID_HEIGHT: usize = 20;
        pub const INITIAL_DROP_MS: f64 = 1000.0;
        pub const LINES_PER_LEVEL: u64 = 10;
        /// Points for clearing 0..=4 rows in one lock, before the level multiplier
        pub const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];
    }

    /// Tile-merge puzzle
    pub mod merge {
        pub const GRID_SIZE: usize = 4;
        pub const STARTING_TILES: usize = 2;
        /// Probability that a spawned tile is a 2 (otherwise 4)
        pub const TWO_PROBABILITY: f64 = 0.9;
    }
}

/// Clamp a value into `[lo, hi]`, tolerating `hi < lo` by returning `lo`
#[inline]
pub fn clamp_span(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}
