//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step per tick only
//! - Seeded RNG only
//! - Input recorded as intent, applied at the next tick
//! - No rendering, audio or account dependencies

pub mod blocks;
pub mod collision;
pub mod flappy;
pub mod grid;
pub mod merge;
pub mod paddle;
pub mod rng;
pub mod runner;
pub mod session;
pub mod snake;
pub mod spawn;
pub mod state;
pub mod tick;

pub use blocks::{BlockAction, BlocksGame, Piece, PieceKind, clear_full_rows, line_clear_points};
pub use collision::{Aabb, bounce, hits_any, reflect_velocity};
pub use flappy::{FlappyGame, Pipe};
pub use grid::{Direction, Grid, GridPos, random_cell, rotate_cw};
pub use merge::{MergeGame, SlideOutcome, is_stuck, slide, slide_row};
pub use paddle::PaddleGame;
pub use rng::SimRng;
pub use runner::{Obstacle, RunnerGame};
pub use session::{Engine, GameKind, GameOverCallback, Session, Simulation};
pub use snake::{SnakeCell, SnakeGame};
pub use spawn::GapSpawner;
pub use state::{Body, EntityIds, GameEvent, GamePhase, floor_tenths};
pub use tick::{InputEvent, Key, Step, TickSource, TickTask};
