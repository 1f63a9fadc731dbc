//! Account backend interface
//!
//! The host talks to persistence only through `Backend`. `InMemoryBackend`
//! keeps users in a map and can be switched offline to exercise the host's
//! failure paths.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::account::User;
use crate::error::ShellError;

/// Identity plus the provider-supplied validation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub identity: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub validation: String,
}

impl AuthRequest {
    /// Username when given, otherwise "first last"
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!(
                "{} {}",
                self.first_name,
                self.last_name.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
        }
    }
}

pub trait Backend {
    /// Find or create the user and return the stored record
    fn authenticate(&mut self, request: &AuthRequest) -> Result<User, ShellError>;

    /// Overwrite the stored totals and return the persisted record
    fn submit_score(&mut self, identity: &str, new_score: u64, new_coins: f64)
    -> Result<User, ShellError>;

    /// Deduct `amount` and return the remaining coins
    fn withdraw(&mut self, identity: &str, amount: f64, address: &str) -> Result<f64, ShellError>;
}

/// A processed withdrawal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Withdrawal {
    pub identity: String,
    pub amount: f64,
    pub address: String,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    users: HashMap<String, User>,
    withdrawals: Vec<Withdrawal>,
    offline: bool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `Unavailable`
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn user(&self, identity: &str) -> Option<&User> {
        self.users.get(identity)
    }

    pub fn withdrawals(&self) -> &[Withdrawal] {
        &self.withdrawals
    }

    fn online(&self) -> Result<(), ShellError> {
        if self.offline {
            Err(ShellError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Backend for InMemoryBackend {
    fn authenticate(&mut self, request: &AuthRequest) -> Result<User, ShellError> {
        self.online()?;
        if request.identity.trim().is_empty() {
            return Err(ShellError::AuthRejected("missing user id".to_string()));
        }
        if request.validation.trim().is_empty() {
            return Err(ShellError::AuthRejected("missing validation data".to_string()));
        }

        let display_name = request.display_name();
        let user = self
            .users
            .entry(request.identity.clone())
            .and_modify(|u| u.display_name = display_name.clone())
            .or_insert_with(|| {
                log::info!("Creating user {}", request.identity);
                User::new(request.identity.clone(), display_name.clone())
            });
        Ok(user.clone())
    }

    fn submit_score(
        &mut self,
        identity: &str,
        new_score: u64,
        new_coins: f64,
    ) -> Result<User, ShellError> {
        self.online()?;
        let user = self
            .users
            .get_mut(identity)
            .ok_or_else(|| ShellError::UnknownUser(identity.to_string()))?;
        user.score = new_score;
        user.coins = new_coins;
        Ok(user.clone())
    }

    fn withdraw(&mut self, identity: &str, amount: f64, address: &str) -> Result<f64, ShellError> {
        self.online()?;
        let user = self
            .users
            .get_mut(identity)
            .ok_or_else(|| ShellError::UnknownUser(identity.to_string()))?;
        if user.coins < amount {
            return Err(ShellError::InsufficientFunds {
                available: user.coins,
            });
        }
        user.coins -= amount;
        log::info!("Withdrawal of {} to {} for {}", amount, address, identity);
        self.withdrawals.push(Withdrawal {
            identity: identity.to_string(),
            amount,
            address: address.to_string(),
        });
        Ok(user.coins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(identity: &str, username: Option<&str>) -> AuthRequest {
        AuthRequest {
            identity: identity.to_string(),
            username: username.map(str::to_string),
            first_name: "Ada".to_string(),
            last_name: None,
            validation: "token".to_string(),
        }
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(request("1", None).display_name(), "Ada");
        assert_eq!(request("1", Some("ada99")).display_name(), "ada99");
    }

    #[test]
    fn test_first_auth_creates_then_updates_name() {
        let mut backend = InMemoryBackend::new();
        let user = backend.authenticate(&request("7", None)).unwrap();
        assert_eq!((user.score, user.coins), (0, 0.0));
        backend.submit_score("7", 50, 0.5).unwrap();
        let again = backend.authenticate(&request("7", Some("new"))).unwrap();
        assert_eq!(again.display_name, "new");
        assert_eq!(again.score, 50);
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let mut backend = InMemoryBackend::new();
        assert!(matches!(
            backend.authenticate(&request("", None)),
            Err(ShellError::AuthRejected(_))
        ));
        let mut no_token = request("1", None);
        no_token.validation.clear();
        assert!(matches!(
            backend.authenticate(&no_token),
            Err(ShellError::AuthRejected(_))
        ));
    }

    #[test]
    fn test_withdraw_checks_balance() {
        let mut backend = InMemoryBackend::new();
        backend.authenticate(&request("1", None)).unwrap();
        backend.submit_score("1", 0, 3.0).unwrap();
        assert_eq!(
            backend.withdraw("1", 5.0, "UQabc"),
            Err(ShellError::InsufficientFunds { available: 3.0 })
        );
        assert_eq!(backend.withdraw("1", 2.0, "UQabc"), Ok(1.0));
        assert_eq!(backend.withdrawals().len(), 1);
        assert_eq!(
            backend.withdraw("nobody", 1.0, "UQabc"),
            Err(ShellError::UnknownUser("nobody".to_string()))
        );
    }

    #[test]
    fn test_offline_fails_everything() {
        let mut backend = InMemoryBackend::new();
        backend.set_offline(true);
        assert_eq!(
            backend.authenticate(&request("1", None)),
            Err(ShellError::Unavailable)
        );
    }
}
