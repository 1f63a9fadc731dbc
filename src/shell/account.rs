//! User records and score-to-coin conversion

use serde::{Deserialize, Serialize};

/// A player as the backend stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub identity: String,
    pub display_name: String,
    /// Lifetime points
    pub score: u64,
    pub coins: f64,
}

impl User {
    pub fn new(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            score: 0,
            coins: 0.0,
        }
    }

    /// Copy with `score` points and `coins` added
    pub fn credited(&self, score: u64, coins: f64) -> Self {
        Self {
            score: self.score + score,
            coins: self.coins + coins,
            ..self.clone()
        }
    }
}

/// Outcome of one finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub score: u64,
    pub coins: f64,
    pub is_win: bool,
}

/// Convert a final score at a fixed rate; a win is reaching `target`
pub fn reward_for(score: u64, rate: f64, target: u64) -> Reward {
    Reward {
        score,
        coins: score as f64 * rate,
        is_win: score >= target,
    }
}
