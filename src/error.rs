//! Error types
//!
//! Gameplay itself never fails: invalid moves are silent no-ops and terminal
//! conditions are ordinary game-over transitions. Only starting a game and the
//! host-side account operations can fail.

use std::fmt;

/// A game could not be started
#[derive(Debug, Clone, PartialEq)]
pub enum MountError {
    /// Timer tick sources need a finite, positive interval
    InvalidInterval(f64),
    /// The host allowed zero ticks per frame, so nothing could ever run
    NoTickBudget,
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::InvalidInterval(ms) => write!(f, "cannot start game: invalid tick interval {ms} ms"),
            MountError::NoTickBudget => write!(f, "cannot start game: no tick budget per frame"),
        }
    }
}

impl std::error::Error for MountError {}

/// Host-side failures reported to the user as a message
#[derive(Debug, Clone, PartialEq)]
pub enum ShellError {
    /// Missing identity or validation token
    AuthRejected(String),
    UnknownUser(String),
    NotLoggedIn,
    UnknownGame(String),
    CannotStart(MountError),
    /// Amount is not a positive number
    InvalidAmount,
    BelowMinimum { minimum: f64 },
    InsufficientFunds { available: f64 },
    MissingAddress,
    InvalidAddress { prefix: String },
    BonusUnavailable { next_at_ms: u64 },
    /// Backend could not be reached
    Unavailable,
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::AuthRejected(reason) => write!(f, "authentication failed: {reason}"),
            ShellError::UnknownUser(id) => write!(f, "user not found: {id}"),
            ShellError::NotLoggedIn => write!(f, "not logged in"),
            ShellError::UnknownGame(id) => write!(f, "unknown game: {id}"),
            ShellError::CannotStart(err) => write!(f, "{err}"),
            ShellError::InvalidAmount => write!(f, "invalid amount, enter a positive number"),
            ShellError::BelowMinimum { minimum } => write!(f, "minimum withdrawal is {minimum}"),
            ShellError::InsufficientFunds { available } => {
                write!(f, "insufficient funds ({available} available)")
            }
            ShellError::MissingAddress => write!(f, "a withdrawal address is required"),
            ShellError::InvalidAddress { prefix } => {
                write!(f, "invalid address, it must start with '{prefix}'")
            }
            ShellError::BonusUnavailable { next_at_ms } => {
                write!(f, "bonus not available until {next_at_ms}")
            }
            ShellError::Unavailable => write!(f, "server unavailable"),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::CannotStart(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MountError> for ShellError {
    fn from(err: MountError) -> Self {
        ShellError::CannotStart(err)
    }
}
