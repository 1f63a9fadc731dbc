//! Demo-mode players
//!
//! Reads an engine's public state and produces the input a simple player
//! would send this frame. Used by the headless binary; not meant to play well.

use crate::consts;
use crate::sim::{Direction, Engine, GamePhase, GridPos, InputEvent, Key, slide};
use crate::sim::{BlocksGame, FlappyGame, MergeGame, PaddleGame, RunnerGame, SnakeGame};

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Paddle key currently held down
    held: Option<Key>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input to forward before the next frame
    pub fn inputs(&mut self, engine: &Engine) -> Vec<InputEvent> {
        match engine {
            Engine::Runner(g) => runner(g).into_iter().collect(),
            Engine::Flappy(g) => flappy(g).into_iter().collect(),
            Engine::Paddle(g) => self.paddle(g),
            Engine::Snake(g) => snake(g).map(InputEvent::KeyDown).into_iter().collect(),
            Engine::Blocks(g) => blocks(g).map(InputEvent::KeyDown).into_iter().collect(),
            Engine::Merge(g) => merge(g).map(InputEvent::KeyDown).into_iter().collect(),
        }
    }

    /// Hold Up or Down toward the ball, releasing the other key first
    fn paddle(&mut self, game: &PaddleGame) -> Vec<InputEvent> {
        use consts::paddle::{BALL_SIZE, PADDLE_HEIGHT};
        let paddle_center = game.player_y + PADDLE_HEIGHT / 2.0;
        let ball_center = game.ball.pos.y + BALL_SIZE / 2.0;
        let want = if ball_center < paddle_center - 2.0 {
            Some(Key::Up)
        } else if ball_center > paddle_center + 2.0 {
            Some(Key::Down)
        } else {
            None
        };
        if want == self.held {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(key) = self.held.take() {
            events.push(InputEvent::KeyUp(key));
        }
        if let Some(key) = want {
            events.push(InputEvent::KeyDown(key));
        }
        self.held = want;
        events
    }
}

/// Jump when the next obstacle is about to reach the player
fn runner(game: &RunnerGame) -> Option<InputEvent> {
    use consts::runner::{PLAYER_WIDTH, PLAYER_X};
    if game.jumping {
        return None;
    }
    let front = PLAYER_X + PLAYER_WIDTH;
    let lead = game.speed * 8.0;
    game.obstacles
        .iter()
        .any(|o| o.x >= front && o.x - front < lead)
        .then_some(InputEvent::Tap)
}

/// Flap whenever the bird sinks below the middle of the next opening
fn flappy(game: &FlappyGame) -> Option<InputEvent> {
    use consts::flappy::{BIRD_HEIGHT, BIRD_X, PIPE_GAP, PIPE_WIDTH};
    if game.phase == GamePhase::Ready {
        return Some(InputEvent::Tap);
    }
    let target = game
        .pipes
        .iter()
        .find(|p| p.x + PIPE_WIDTH > BIRD_X)
        .map_or(consts::GAME_HEIGHT / 2.0, |p| p.gap_top + PIPE_GAP * 0.6);
    let falling = game.bird.vel.y >= 0.0;
    (falling && game.bird.pos.y + BIRD_HEIGHT > target).then_some(InputEvent::Tap)
}

/// Greedy step toward the food among the moves that survive the next tick
fn snake(game: &SnakeGame) -> Option<Key> {
    let head = game.head()?;
    let goal = game.food.unwrap_or(head);
    let distance = |p: GridPos| (p.x - goal.x).abs() + (p.y - goal.y).abs();
    let best = Direction::ALL
        .into_iter()
        .filter(|&d| d != game.direction.opposite())
        .map(|d| (d, head.offset(d)))
        .filter(|&(_, p)| game.in_bounds(p) && !game.body.contains(&p))
        .min_by_key(|&(_, p)| distance(p))
        .map(|(d, _)| d)?;
    (best != game.direction).then(|| direction_key(best))
}

/// Steer the piece over the lowest stretch of the stack, then drop it
fn blocks(game: &BlocksGame) -> Option<Key> {
    let width = game.grid.width();
    let height = game.grid.height();
    let shape_w = game.active.shape.first().map_or(1, Vec::len).max(1);
    if shape_w > width {
        return Some(Key::Down);
    }

    let column_height = |x: usize| {
        (0..height)
            .find(|&y| matches!(game.grid.get(GridPos::new(x as i32, y as i32)), Some(Some(_))))
            .map_or(0, |top| height - top)
    };
    let heights: Vec<usize> = (0..width).map(column_height).collect();
    let target = (0..=width - shape_w)
        .min_by_key(|&x| heights[x..x + shape_w].iter().copied().max().unwrap_or(0))
        .unwrap_or(0) as i32;

    let x = game.active.pos.x;
    Some(if x < target {
        Key::Right
    } else if x > target {
        Key::Left
    } else {
        Key::Down
    })
}

/// First legal slide in a corner-keeping preference order
fn merge(game: &MergeGame) -> Option<Key> {
    [
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Up,
    ]
    .into_iter()
    .find(|&d| slide(&game.grid, d).moved)
    // Stuck: any key lets the game notice
    .or(Some(Direction::Down))
    .map(direction_key)
}

fn direction_key(dir: Direction) -> Key {
    match dir {
        Direction::Up => Key::Up,
        Direction::Down => Key::Down,
        Direction::Left => Key::Left,
        Direction::Right => Key::Right,
    }
}
