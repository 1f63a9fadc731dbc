//! Game catalog shown in the game menu

use serde::Serialize;

use crate::sim::GameKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub kind: GameKind,
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static str,
    /// A final score at or above this counts as a win
    pub target_score: u64,
}

impl GameInfo {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

pub const GAMES: [GameInfo; 6] = [
    GameInfo {
        kind: GameKind::Snake,
        name: "Snake",
        description: "Classic snake game. Eat food to grow.",
        instructions: "Use the arrow keys to steer. Eat food to grow longer. \
                       Avoid the walls and your own tail.",
        target_score: 20,
    },
    GameInfo {
        kind: GameKind::Runner,
        name: "Runner",
        description: "Jump over obstacles and run as far as you can.",
        instructions: "Press Space, Up or tap to jump. The world speeds up every 500 points.",
        target_score: 1000,
    },
    GameInfo {
        kind: GameKind::Merge,
        name: "Merge",
        description: "Combine tiles to reach the 2048 tile.",
        instructions: "Use the arrow keys to slide every tile. Equal tiles that touch merge into one.",
        target_score: 2048,
    },
    GameInfo {
        kind: GameKind::Flappy,
        name: "Flappy",
        description: "Flap through the gaps between the pipes.",
        instructions: "Press any key or tap to flap. Touching a pipe, the floor or the ceiling ends the run.",
        target_score: 20,
    },
    GameInfo {
        kind: GameKind::Paddle,
        name: "Paddle",
        description: "Beat the computer to ten points.",
        instructions: "Hold Up or Down to move your paddle on the left. First side to 10 wins.",
        target_score: 10,
    },
    GameInfo {
        kind: GameKind::Blocks,
        name: "Blocks",
        description: "Stack falling pieces and clear full rows.",
        instructions: "Left and Right shift, Up rotates, Down drops faster. Every 10 rows raises the level.",
        target_score: 1000,
    },
];

/// Catalog entry for a game id
pub fn find(id: &str) -> Option<&'static GameInfo> {
    GAMES.iter().find(|g| g.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::account::reward_for;

    #[test]
    fn test_every_kind_listed_once() {
        for kind in GameKind::ALL {
            assert_eq!(GAMES.iter().filter(|g| g.kind == kind).count(), 1);
        }
    }

    #[test]
    fn test_find_and_win() {
        let snake = find("snake").unwrap();
        assert!(reward_for(20, 0.00001, snake.target_score).is_win);
        assert!(!reward_for(19, 0.00001, snake.target_score).is_win);
        assert!(find("dino").is_none());
    }
}
