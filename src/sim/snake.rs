//! Snake on a fixed grid, paced by its own timer
//!
//! Up to two turns are buffered and applied one per tick. Each food eaten
//! grows the snake by one, scores a point and shortens the tick interval.

use std::collections::VecDeque;

use serde::Serialize;

use super::grid::{Direction, Grid, GridPos, random_cell};
use super::rng::SimRng;
use super::session::Simulation;
use super::state::{GameEvent, GamePhase};
use super::tick::{InputEvent, Key, Step, TickSource};
use crate::consts::snake::*;

/// Cell contents for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnakeCell {
    Empty,
    Head,
    Segment,
    Food,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnakeGame {
    pub width: i32,
    pub height: i32,
    /// Occupied cells, head first
    pub body: VecDeque<GridPos>,
    pub food: Option<GridPos>,
    pub direction: Direction,
    pub score: u64,
    pub interval_ms: f64,
    pub phase: GamePhase,
    /// Pending turns, oldest first; one is applied per tick
    #[serde(skip)]
    queued: VecDeque<Direction>,
    #[serde(skip)]
    rng: SimRng,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl SnakeGame {
    pub fn new(seed: u64) -> Self {
        Self::with_size(GRID_SIZE, GRID_SIZE, seed)
    }

    /// Board of any size; the snake starts as a single cell at the centre heading right
    pub fn with_size(width: i32, height: i32, seed: u64) -> Self {
        let start = GridPos::new(width / 2, height / 2);
        Self::with_layout(width, height, vec![start], Direction::Right, None, seed)
    }

    /// Explicit starting layout; food is placed at random when `food` is `None`
    pub fn with_layout(
        width: i32,
        height: i32,
        body: Vec<GridPos>,
        direction: Direction,
        food: Option<GridPos>,
        seed: u64,
    ) -> Self {
        let mut game = Self {
            width: width.max(1),
            height: height.max(1),
            body: body.into(),
            food,
            direction,
            score: 0,
            interval_ms: INITIAL_INTERVAL_MS,
            phase: GamePhase::Playing,
            queued: VecDeque::new(),
            rng: SimRng::new(seed),
            events: Vec::new(),
        };
        if game.food.is_none() {
            game.food = game.place_food();
        }
        game
    }

    pub fn head(&self) -> Option<GridPos> {
        self.body.front().copied()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Fresh occupancy grid for rendering
    pub fn cells(&self) -> Grid<SnakeCell> {
        let mut grid = Grid::filled(self.width as usize, self.height as usize, SnakeCell::Empty);
        if let Some(food) = self.food {
            grid.set(food, SnakeCell::Food);
        }
        for (i, &segment) in self.body.iter().enumerate() {
            grid.set(segment, if i == 0 { SnakeCell::Head } else { SnakeCell::Segment });
        }
        grid
    }

    /// Uniformly random cell not covered by the snake
    fn place_food(&mut self) -> Option<GridPos> {
        let free: Vec<GridPos> = self
            .cells()
            .positions_where(|c| *c != SnakeCell::Head && *c != SnakeCell::Segment);
        random_cell(&mut self.rng, &free)
    }

    /// A turn is rejected if it would drive the head straight into the second segment
    fn accepts(&self, dir: Direction) -> bool {
        match (self.body.front(), self.body.get(1)) {
            (Some(&head), Some(&second)) => head.offset(dir) != second,
            _ => true,
        }
    }

    fn game_over(&mut self) -> Step {
        self.phase = GamePhase::GameOver;
        log::info!("Snake over: score={} length={}", self.score, self.body.len());
        Step::Over { score: self.score }
    }
}

impl Simulation for SnakeGame {
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
        // Validate against the heading this turn would follow, not the current one
        let prev = self.queued.back().copied().unwrap_or(self.direction);
        if dir == prev || (self.body.len() > 1 && dir == prev.opposite()) {
            return;
        }
        if self.queued.len() < MAX_QUEUED_TURNS {
            self.queued.push_back(dir);
        }
    }

    fn tick(&mut self, _dt_ms: f64) -> Step {
        if self.phase == GamePhase::GameOver {
            return Step::Over { score: self.score };
        }

        if let Some(dir) = self.queued.pop_front()
            && self.accepts(dir)
        {
            self.direction = dir;
        }

        let Some(head) = self.head() else {
            return self.game_over();
        };
        let next = head.offset(self.direction);

        if !self.in_bounds(next) {
            self.events.push(GameEvent::Collision);
            return self.game_over();
        }
        // Checked before the tail moves, so chasing the tail is a collision
        if self.body.contains(&next) {
            self.events.push(GameEvent::Collision);
            return self.game_over();
        }

        self.body.push_front(next);
        if self.food == Some(next) {
            self.score += 1;
            self.interval_ms = (self.interval_ms * INTERVAL_FACTOR).max(MIN_INTERVAL_MS);
            self.events.push(GameEvent::Eat);
            self.food = self.place_food();
            if self.food.is_none() {
                // Board is full
                return self.game_over();
            }
        } else {
            self.body.pop_back();
        }
        Step::Continue
    }

    fn tick_source(&self) -> TickSource {
        TickSource::Timer {
            interval_ms: self.interval_ms,
        }
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
