//! Tile-merge puzzle
//!
//! Every direction is handled as a leftward slide: the grid is turned
//! clockwise until the requested direction points left, each row is compacted
//! and merged once, and the grid is turned back.

use serde::Serialize;

use super::grid::{Direction, Grid, GridPos, random_cell};
use super::rng::SimRng;
use super::session::Simulation;
use super::state::{GameEvent, GamePhase};
use super::tick::{InputEvent, Key, Step};
use crate::consts::merge::*;

/// Result of sliding a whole grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideOutcome {
    pub grid: Grid<u32>,
    /// Sum of the values of every merged tile
    pub gained: u64,
    /// False when nothing moved or merged; such a move is illegal
    pub moved: bool,
}

/// Compact a row to the left, merging each equal neighbour pair at most once
pub fn slide_row(row: &[u32]) -> (Vec<u32>, u64) {
    let tiles: Vec<u32> = row.iter().copied().filter(|&v| v != 0).collect();
    let mut out = Vec::with_capacity(row.len());
    let mut gained = 0u64;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let merged = tiles[i] * 2;
            out.push(merged);
            gained += merged as u64;
            i += 2;
        } else {
            out.push(tiles[i]);
            i += 1;
        }
    }
    out.resize(row.len(), 0);
    (out, gained)
}

/// Clockwise quarter turns that make `dir` point left
fn turns_to_left(dir: Direction) -> usize {
    match dir {
        Direction::Left => 0,
        Direction::Down => 1,
        Direction::Right => 2,
        Direction::Up => 3,
    }
}

fn turned(grid: &Grid<u32>, turns: usize) -> Grid<u32> {
    (0..turns).fold(grid.clone(), |g, _| g.rotated_cw())
}

/// Slide every tile toward `dir`; the input grid is left untouched
pub fn slide(grid: &Grid<u32>, dir: Direction) -> SlideOutcome {
    let turns = turns_to_left(dir);
    let work = turned(grid, turns);

    let mut slid = work.clone();
    let mut gained = 0;
    let mut moved = false;
    for (y, row) in work.rows().enumerate() {
        let (new_row, row_gain) = slide_row(row);
        gained += row_gain;
        moved |= new_row.as_slice() != row;
        for (x, v) in new_row.into_iter().enumerate() {
            slid.set(GridPos::new(x as i32, y as i32), v);
        }
    }

    SlideOutcome {
        grid: turned(&slid, (4 - turns) % 4),
        gained,
        moved,
    }
}

/// No empty cell and no equal horizontal or vertical neighbours
pub fn is_stuck(grid: &Grid<u32>) -> bool {
    if grid.cells().contains(&0) {
        return false;
    }
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    for y in 0..h {
        for x in 0..w {
            let here = GridPos::new(x, y);
            let value = grid.get(here);
            if (x + 1 < w && grid.get(here.shifted(1, 0)) == value)
                || (y + 1 < h && grid.get(here.shifted(0, 1)) == value)
            {
                return false;
            }
        }
    }
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeGame {
    /// Tile values, 0 for empty
    pub grid: Grid<u32>,
    pub score: u64,
    pub phase: GamePhase,
    #[serde(skip)]
    pending: Vec<Direction>,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl MergeGame {
    pub fn new(seed: u64) -> Self {
        let mut game = Self::with_grid(Grid::filled(GRID_SIZE, GRID_SIZE, 0), seed);
        for _ in 0..STARTING_TILES {
            game.spawn_tile();
        }
        game
    }

    /// Start from an explicit board without adding tiles
    pub fn with_grid(grid: Grid<u32>, seed: u64) -> Self {
        Self {
            grid,
            score: 0,
            phase: GamePhase::Playing,
            pending: Vec::new(),
            rng: SimRng::new(seed),
            events: Vec::new(),
        }
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.cells().iter().copied().max().unwrap_or(0)
    }

    /// Drop a 2 (or occasionally a 4) into a random empty cell
    fn spawn_tile(&mut self) -> bool {
        let empty = self.grid.positions_where(|&v| v == 0);
        let Some(cell) = random_cell(&mut self.rng, &empty) else {
            return false;
        };
        let value = if self.rng.chance(TWO_PROBABILITY) { 2 } else { 4 };
        self.grid.set(cell, value)
    }

    fn apply_move(&mut self, dir: Direction) -> Step {
        let outcome = slide(&self.grid, dir);
        if outcome.moved {
            self.grid = outcome.grid;
            self.score += outcome.gained;
            if outcome.gained > 0 {
                self.events.push(GameEvent::Merge);
            }
            self.spawn_tile();
        }
        if is_stuck(&self.grid) {
            self.phase = GamePhase::GameOver;
            log::info!(
                "Merge over: score={} max_tile={}",
                self.score,
                self.max_tile()
            );
            return Step::Over { score: self.score };
        }
        Step::Continue
    }
}

impl Simulation for MergeGame {
    fn handle_input(&mut self, event: &InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };
        let dir = match key {
            Key::Up => Direction::Up,
            Key::Down => Direction::Down,
            Key::Left => Direction::Left,
            Key::Right => Direction::Right,
            _ => return,
        };
        self.pending.push(dir);
    }

    fn tick(&mut self, _dt_ms: f64) -> Step {
        if self.phase == GamePhase::GameOver {
            return Step::Over { score: self.score };
        }
        for dir in std::mem::take(&mut self.pending) {
            if let over @ Step::Over { .. } = self.apply_move(dir) {
                return over;
            }
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
