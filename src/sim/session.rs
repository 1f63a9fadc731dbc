//! Game lifecycle: mount, run, report once, unmount
//!
//! A `Session` exclusively owns one engine, its tick task and the host's
//! game-over callback. The callback is an `FnOnce` stored in an `Option`, so it
//! can only be taken and invoked a single time, and only from the game-over
//! path. Unmounting drops it uncalled.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::blocks::BlocksGame;
use super::flappy::FlappyGame;
use super::merge::MergeGame;
use super::paddle::PaddleGame;
use super::runner::RunnerGame;
use super::snake::SnakeGame;
use super::state::{GameEvent, GamePhase};
use super::tick::{InputEvent, Step, TickSource, TickTask};
use crate::error::MountError;

/// Behaviour shared by every engine
pub trait Simulation {
    /// Record input intent; applied at the next tick
    fn handle_input(&mut self, event: &InputEvent);

    /// Advance exactly one step
    fn tick(&mut self, dt_ms: f64) -> Step;

    /// Pacing for the next tick; re-read after every tick
    fn tick_source(&self) -> TickSource {
        TickSource::Frame
    }

    fn score(&self) -> u64;

    fn phase(&self) -> GamePhase;

    /// Take every event emitted since the last drain
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Render-ready view of the visible state
    fn snapshot(&self) -> serde_json::Value;
}

/// Which engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Runner,
    Flappy,
    Paddle,
    Snake,
    Blocks,
    Merge,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Runner,
        GameKind::Flappy,
        GameKind::Paddle,
        GameKind::Snake,
        GameKind::Blocks,
        GameKind::Merge,
    ];

    /// Stable string id
    pub fn id(self) -> &'static str {
        match self {
            GameKind::Runner => "runner",
            GameKind::Flappy => "flappy",
            GameKind::Paddle => "paddle",
            GameKind::Snake => "snake",
            GameKind::Blocks => "blocks",
            GameKind::Merge => "merge",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One engine instance, selected by tag
#[derive(Debug, Clone)]
pub enum Engine {
    Runner(RunnerGame),
    Flappy(FlappyGame),
    Paddle(PaddleGame),
    Snake(SnakeGame),
    Blocks(BlocksGame),
    Merge(MergeGame),
}

impl Engine {
    pub fn new(kind: GameKind, seed: u64) -> Self {
        match kind {
            GameKind::Runner => Engine::Runner(RunnerGame::new(seed)),
            GameKind::Flappy => Engine::Flappy(FlappyGame::new(seed)),
            GameKind::Paddle => Engine::Paddle(PaddleGame::new(seed)),
            GameKind::Snake => Engine::Snake(SnakeGame::new(seed)),
            GameKind::Blocks => Engine::Blocks(BlocksGame::new(seed)),
            GameKind::Merge => Engine::Merge(MergeGame::new(seed)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Engine::Runner(_) => GameKind::Runner,
            Engine::Flappy(_) => GameKind::Flappy,
            Engine::Paddle(_) => GameKind::Paddle,
            Engine::Snake(_) => GameKind::Snake,
            Engine::Blocks(_) => GameKind::Blocks,
            Engine::Merge(_) => GameKind::Merge,
        }
    }

    pub fn sim(&self) -> &dyn Simulation {
        match self {
            Engine::Runner(g) => g,
            Engine::Flappy(g) => g,
            Engine::Paddle(g) => g,
            Engine::Snake(g) => g,
            Engine::Blocks(g) => g,
            Engine::Merge(g) => g,
        }
    }

    pub fn sim_mut(&mut self) -> &mut dyn Simulation {
        match self {
            Engine::Runner(g) => g,
            Engine::Flappy(g) => g,
            Engine::Paddle(g) => g,
            Engine::Snake(g) => g,
            Engine::Blocks(g) => g,
            Engine::Merge(g) => g,
        }
    }
}

/// Host-supplied completion callback, invoked with the final score
pub type GameOverCallback = Box<dyn FnOnce(u64)>;

/// One run of one engine, from mount to report
pub struct Session {
    engine: Engine,
    task: TickTask,
    on_game_over: Option<GameOverCallback>,
    final_score: Option<u64>,
    /// Input and frames are accepted only while bound
    bound: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("kind", &self.engine.kind())
            .field("task", &self.task)
            .field("final_score", &self.final_score)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a fresh engine of `kind`
    pub fn mount(
        kind: GameKind,
        seed: u64,
        max_substeps: u32,
        on_game_over: impl FnOnce(u64) + 'static,
    ) -> Result<Self, MountError> {
        log::info!("Mounting {} (seed {})", kind, seed);
        Self::with_engine(Engine::new(kind, seed), max_substeps, on_game_over)
    }

    /// Start a pre-built engine, e.g. one set up in a specific position
    pub fn with_engine(
        engine: Engine,
        max_substeps: u32,
        on_game_over: impl FnOnce(u64) + 'static,
    ) -> Result<Self, MountError> {
        let task = TickTask::new(engine.sim().tick_source(), max_substeps)?;
        Ok(Self {
            engine,
            task,
            on_game_over: Some(Box::new(on_game_over)),
            final_score: None,
            bound: true,
        })
    }

    pub fn kind(&self) -> GameKind {
        self.engine.kind()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Forward raw input; ignored once the run has ended
    pub fn input(&mut self, event: InputEvent) {
        if self.bound {
            self.engine.sim_mut().handle_input(&event);
        }
    }

    /// Advance by one host frame; returns the number of ticks run
    pub fn frame(&mut self, elapsed_ms: f64) -> u32 {
        if !self.bound {
            return 0;
        }
        self.task.begin_frame(elapsed_ms);
        let mut ticks = 0;
        while let Some(dt) = self.task.next_tick() {
            ticks += 1;
            match self.engine.sim_mut().tick(dt) {
                Step::Continue => self.task.retime(self.engine.sim().tick_source()),
                Step::Over { score } => {
                    self.finish(score);
                    break;
                }
            }
        }
        ticks
    }

    fn finish(&mut self, score: u64) {
        self.task.cancel();
        self.bound = false;
        self.final_score = Some(score);
        log::info!("{} game over: score={}", self.engine.kind(), score);
        if let Some(callback) = self.on_game_over.take() {
            callback(score);
        }
    }

    pub fn score(&self) -> u64 {
        self.engine.sim().score()
    }

    pub fn phase(&self) -> GamePhase {
        self.engine.sim().phase()
    }

    /// Score reported to the callback, once the run has ended
    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    pub fn is_running(&self) -> bool {
        self.bound
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.engine.sim_mut().drain_events()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        self.engine.sim().snapshot()
    }

    /// Stop immediately without reporting a score
    pub fn unmount(mut self) {
        if self.bound {
            self.task.cancel();
            self.bound = false;
            log::info!(
                "Unmounted {} mid-run at score {}",
                self.engine.kind(),
                self.score()
            );
        }
        self.on_game_over = None;
    }
}
