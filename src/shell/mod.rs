//! Host-side boundary around the engines
//!
//! Everything here is outside the simulation: the game catalog, user
//! accounts and reward conversion, the backend interface and the screen
//! state machine that mounts and unmounts sessions. Engines never see any of
//! it; they only receive input and report a final score.

pub mod account;
pub mod backend;
pub mod catalog;
pub mod host;

pub use account::{Reward, User, reward_for};
pub use backend::{AuthRequest, Backend, InMemoryBackend};
pub use catalog::{GAMES, GameInfo};
pub use host::{Arcade, BonusStatus, LastGame, Screen};
