//! Falling-block puzzle
//!
//! The active piece is a boolean matrix anchored at a grid position. Shifts and
//! rotations are validated against the walls, the floor and locked cells, and
//! are dropped silently when they do not fit. Gravity runs on a drop timer fed
//! by frame time; when a drop fails the piece locks, full rows are removed and
//! the next piece takes over.

use serde::Serialize;

use super::grid::{Grid, GridPos, rotate_cw};
use super::rng::SimRng;
use super::session::Simulation;
use super::state::{EntityIds, GameEvent, GamePhase};
use super::tick::{InputEvent, Key, Step};
use crate::consts::blocks::*;

/// The seven tetrominoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Spawn orientation, top row first
    pub fn shape(self) -> Vec<Vec<bool>> {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        rows.iter()
            .map(|row| row.iter().map(|&c| c != 0).collect())
            .collect()
    }

    pub fn color(self) -> &'static str {
        match self {
            PieceKind::I => "cyan",
            PieceKind::J => "blue",
            PieceKind::L => "orange",
            PieceKind::O => "yellow",
            PieceKind::S => "green",
            PieceKind::T => "purple",
            PieceKind::Z => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    pub id: u32,
    pub kind: PieceKind,
    /// Colour tag for the renderer, fixed by `kind`
    pub color: &'static str,
    pub shape: Vec<Vec<bool>>,
    /// Top-left corner of the shape matrix
    pub pos: GridPos,
}

impl Piece {
    /// New piece centred horizontally on the top row
    pub fn spawn(id: u32, kind: PieceKind, grid_width: usize) -> Self {
        let shape = kind.shape();
        let shape_w = shape.first().map_or(0, Vec::len) as i32;
        Self {
            id,
            kind,
            color: kind.color(),
            shape,
            pos: GridPos::new(grid_width as i32 / 2 - shape_w / 2, 0),
        }
    }

    /// Absolute positions of the filled cells
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.shape.iter().enumerate().flat_map(move |(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(dx, _)| self.pos.shifted(dx as i32, dy as i32))
        })
    }

    fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            pos: self.pos.shifted(dx, dy),
            ..self.clone()
        }
    }

    fn rotated(&self) -> Self {
        Self {
            shape: rotate_cw(&self.shape),
            ..self.clone()
        }
    }
}

/// Player requests, applied at the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    Left,
    Right,
    SoftDrop,
    Rotate,
}

/// Score award for clearing `lines` rows in one lock at `level`
pub fn line_clear_points(lines: u32, level: u32) -> u64 {
    let idx = (lines as usize).min(LINE_POINTS.len() - 1);
    LINE_POINTS[idx] * (level as u64 + 1)
}

/// Drop every full row and pad with empty rows at the top; returns a fresh grid
/// and the number of rows removed
pub fn clear_full_rows(grid: &Grid<Option<PieceKind>>) -> (Grid<Option<PieceKind>>, u32) {
    let kept: Vec<&[Option<PieceKind>]> = grid
        .rows()
        .filter(|row| !row.iter().all(Option::is_some))
        .collect();
    let cleared = (grid.height() - kept.len()) as u32;

    let mut next = Grid::filled(grid.width(), grid.height(), None);
    let offset = grid.height() - kept.len();
    for (y, row) in kept.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            next.set(GridPos::new(x as i32, (y + offset) as i32), *cell);
        }
    }
    (next, cleared)
}

#[derive(Debug, Clone, Serialize)]
pub struct BlocksGame {
    /// Locked cells only; the active piece is overlaid by `cells()`
    pub grid: Grid<Option<PieceKind>>,
    pub active: Piece,
    pub next: Piece,
    pub score: u64,
    pub lines: u64,
    pub level: u32,
    pub drop_interval_ms: f64,
    pub phase: GamePhase,
    #[serde(skip)]
    drop_timer_ms: f64,
    #[serde(skip)]
    pending: Vec<BlockAction>,
    #[serde(skip)]
    ids: EntityIds,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl BlocksGame {
    pub fn new(seed: u64) -> Self {
        Self::with_grid(Grid::filled(GRID_WIDTH, GRID_HEIGHT, None), seed)
    }

    /// Start from a pre-filled board
    pub fn with_grid(grid: Grid<Option<PieceKind>>, seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut ids = EntityIds::default();
        let active = random_piece(&mut rng, &mut ids, grid.width());
        let next = random_piece(&mut rng, &mut ids, grid.width());
        Self {
            grid,
            active,
            next,
            score: 0,
            lines: 0,
            level: 0,
            drop_interval_ms: INITIAL_DROP_MS,
            phase: GamePhase::Playing,
            drop_timer_ms: 0.0,
            pending: Vec::new(),
            ids,
            rng,
            events: Vec::new(),
        }
    }

    /// Inside the walls, above the floor and clear of locked cells.
    /// Cells above the top row are allowed.
    pub fn fits(&self, piece: &Piece) -> bool {
        let (w, h) = (self.grid.width() as i32, self.grid.height() as i32);
        piece.cells().all(|c| {
            c.x >= 0
                && c.x < w
                && c.y < h
                && (c.y < 0 || matches!(self.grid.get(c), Some(None)))
        })
    }

    /// Locked grid with the active piece drawn over it
    pub fn cells(&self) -> Grid<Option<PieceKind>> {
        let mut view = self.grid.clone();
        for c in self.active.cells() {
            view.set(c, Some(self.active.kind));
        }
        view
    }

    fn try_replace(&mut self, candidate: Piece) -> bool {
        if self.fits(&candidate) {
            self.active = candidate;
            true
        } else {
            false
        }
    }

    fn apply(&mut self, action: BlockAction) -> Step {
        match action {
            BlockAction::Left => {
                self.try_replace(self.active.moved(-1, 0));
            }
            BlockAction::Right => {
                self.try_replace(self.active.moved(1, 0));
            }
            BlockAction::Rotate => {
                if self.try_replace(self.active.rotated()) {
                    self.events.push(GameEvent::Rotate);
                }
            }
            BlockAction::SoftDrop => return self.drop_piece(),
        }
        Step::Continue
    }

    /// Move down one row, or lock if blocked
    fn drop_piece(&mut self) -> Step {
        if self.try_replace(self.active.moved(0, 1)) {
            return Step::Continue;
        }
        if self.active.pos.y < 1 {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::Collision);
            log::info!(
                "Blocks over: score={} lines={} level={}",
                self.score,
                self.lines,
                self.level
            );
            return Step::Over { score: self.score };
        }
        self.lock_piece();
        Step::Continue
    }

    fn lock_piece(&mut self) {
        let mut locked = self.grid.clone();
        for c in self.active.cells() {
            locked.set(c, Some(self.active.kind));
        }
        let (grid, cleared) = clear_full_rows(&locked);
        self.grid = grid;

        if cleared > 0 {
            self.score += line_clear_points(cleared, self.level);
            self.lines += cleared as u64;
            self.events.push(GameEvent::LinesCleared(cleared));
            self.update_level();
        } else {
            self.events.push(GameEvent::Lock);
        }

        let upcoming = random_piece(&mut self.rng, &mut self.ids, self.grid.width());
        self.active = std::mem::replace(&mut self.next, upcoming);
    }

    fn update_level(&mut self) {
        let level = (self.lines / LINES_PER_LEVEL) as u32;
        if level > self.level {
            self.level = level;
            self.drop_interval_ms = 1000.0 / (level as f64 + 1.0) + 200.0;
            self.events.push(GameEvent::LevelUp(level));
            log::debug!(
                "Blocks level {} (drop every {:.0} ms)",
                level,
                self.drop_interval_ms
            );
        }
    }
}

fn random_piece(rng: &mut SimRng, ids: &mut EntityIds, grid_width: usize) -> Piece {
    let kind = rng.pick(&PieceKind::ALL).unwrap_or(PieceKind::T);
    Piece::spawn(ids.next_id(), kind, grid_width)
}

impl Simulation for BlocksGame {
    fn handle_input(&mut self, event: &InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };
        let action = match key {
            Key::Left => BlockAction::Left,
            Key::Right => BlockAction::Right,
            Key::Down => BlockAction::SoftDrop,
            Key::Up => BlockAction::Rotate,
            _ => return,
        };
        self.pending.push(action);
    }

    fn tick(&mut self, dt_ms: f64) -> Step {
        if self.phase == GamePhase::GameOver {
            return Step::Over { score: self.score };
        }

        for action in std::mem::take(&mut self.pending) {
            if let over @ Step::Over { .. } = self.apply(action) {
                return over;
            }
        }

        self.drop_timer_ms += dt_ms;
        if self.drop_timer_ms > self.drop_interval_ms {
            self.drop_timer_ms = 0.0;
            return self.drop_piece();
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
