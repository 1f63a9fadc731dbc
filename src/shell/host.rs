//! Arcade host: screens, sessions and balance bookkeeping
//!
//! The host mounts one session at a time, forwards input and frames to it,
//! and converts the reported score into points and coins. Balance changes
//! are applied optimistically and rolled back if the backend refuses them.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::account::{Reward, User, reward_for};
use super::backend::{AuthRequest, Backend};
use super::catalog::{self, GameInfo};
use crate::error::ShellError;
use crate::settings::Settings;
use crate::sim::{GameEvent, InputEvent, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    Login,
    MainMenu,
    GameMenu,
    Bank,
    Playing,
    Bonus,
}

/// Result of the most recent finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastGame {
    pub game: &'static GameInfo,
    pub reward: Reward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusStatus {
    pub available: bool,
    pub next_at_ms: Option<u64>,
}

struct ActiveGame {
    info: &'static GameInfo,
    session: Session,
    /// Filled by the session's game-over callback
    reported: Rc<Cell<Option<u64>>>,
}

pub struct Arcade<B: Backend> {
    settings: Settings,
    backend: B,
    user: Option<User>,
    screen: Screen,
    active: Option<ActiveGame>,
    last_game: Option<LastGame>,
    /// Last bonus claim per identity, ms since the epoch
    bonus_claims: HashMap<String, u64>,
    seed_base: u64,
    games_started: u64,
}

impl<B: Backend> Arcade<B> {
    pub fn new(settings: Settings, backend: B) -> Self {
        let seed_base = settings.seed.unwrap_or_else(clock_seed);
        Self {
            settings,
            backend,
            user: None,
            screen: Screen::Login,
            active: None,
            last_game: None,
            bonus_claims: HashMap::new(),
            seed_base,
            games_started: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn last_game(&self) -> Option<&LastGame> {
        self.last_game.as_ref()
    }

    /// Session of the game on screen, running or finished
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Switch to the authenticated user; a game left running is unmounted uncredited
    pub fn login(&mut self, request: &AuthRequest) -> Result<&User, ShellError> {
        let user = self.backend.authenticate(request)?;
        log::info!("Logged in as {} ({})", user.display_name, user.identity);
        self.unmount_active();
        self.last_game = None;
        self.screen = Screen::MainMenu;
        Ok(self.user.insert(user))
    }

    /// Switch screens; leaving `Playing` unmounts the game
    pub fn navigate(&mut self, screen: Screen) -> Result<(), ShellError> {
        if screen != Screen::Login && self.user.is_none() {
            return Err(ShellError::NotLoggedIn);
        }
        if screen == Screen::Playing {
            if self.active.is_none() {
                log::warn!("No game selected, staying on {:?}", self.screen);
            }
            return Ok(());
        }
        self.unmount_active();
        self.screen = screen;
        Ok(())
    }

    /// Mount a fresh session for the catalog entry `id`
    pub fn select_game(&mut self, id: &str) -> Result<(), ShellError> {
        if self.user.is_none() {
            return Err(ShellError::NotLoggedIn);
        }
        let info = catalog::find(id).ok_or_else(|| ShellError::UnknownGame(id.to_string()))?;
        self.unmount_active();

        let seed = self.seed_base.wrapping_add(self.games_started);
        let reported = Rc::new(Cell::new(None));
        let sink = Rc::clone(&reported);
        let session = Session::mount(info.kind, seed, self.settings.max_substeps, move |score| {
            sink.set(Some(score));
        })?;

        self.games_started += 1;
        self.last_game = None;
        self.active = Some(ActiveGame {
            info,
            session,
            reported,
        });
        self.screen = Screen::Playing;
        Ok(())
    }

    pub fn input(&mut self, event: InputEvent) {
        if let Some(active) = &mut self.active {
            active.session.input(event);
        }
    }

    /// Advance the active game by one host frame; returns its events for sound cues
    pub fn frame(&mut self, elapsed_ms: f64) -> Vec<GameEvent> {
        let Some(active) = &mut self.active else {
            return Vec::new();
        };
        active.session.frame(elapsed_ms);
        let events = active.session.drain_events();
        if let Some(score) = active.reported.take() {
            let info = active.info;
            self.record_game_over(info, score);
        }
        events
    }

    /// Leave the game screen, stopping the game if it is still running
    pub fn exit_game(&mut self) {
        self.unmount_active();
        if self.screen == Screen::Playing {
            self.screen = Screen::GameMenu;
        }
    }

    fn unmount_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.session.unmount();
        }
    }

    fn record_game_over(&mut self, info: &'static GameInfo, score: u64) {
        let reward = reward_for(score, self.settings.reward_rate, info.target_score);
        self.last_game = Some(LastGame { game: info, reward });
        log::info!(
            "{} finished: score={} coins={:.6} win={}",
            info.name,
            score,
            reward.coins,
            reward.is_win
        );
        if let Err(err) = self.credit(score, reward.coins) {
            log::warn!("Score sync failed, balance reverted: {}", err);
        }
    }

    /// Apply a credit locally, then persist it; the local change is undone on failure
    fn credit(&mut self, score: u64, coins: f64) -> Result<(), ShellError> {
        let Some(user) = self.user.as_mut() else {
            return Err(ShellError::NotLoggedIn);
        };
        let original = user.clone();
        *user = original.credited(score, coins);
        let (identity, new_score, new_coins) = (user.identity.clone(), user.score, user.coins);

        match self.backend.submit_score(&identity, new_score, new_coins) {
            Ok(persisted) => {
                self.user = Some(persisted);
                Ok(())
            }
            Err(err) => {
                self.user = Some(original);
                Err(err)
            }
        }
    }

    pub fn bonus_status(&self, now_ms: u64) -> BonusStatus {
        let last = self
            .user
            .as_ref()
            .and_then(|u| self.bonus_claims.get(&u.identity));
        match last {
            Some(&at) if now_ms < at + self.settings.bonus_cooldown_ms => BonusStatus {
                available: false,
                next_at_ms: Some(at + self.settings.bonus_cooldown_ms),
            },
            _ => BonusStatus {
                available: self.user.is_some(),
                next_at_ms: None,
            },
        }
    }

    /// Grant the daily bonus; the claim only counts once the backend accepts it
    pub fn claim_bonus(&mut self, now_ms: u64) -> Result<Reward, ShellError> {
        let identity = self
            .user
            .as_ref()
            .map(|u| u.identity.clone())
            .ok_or(ShellError::NotLoggedIn)?;
        let status = self.bonus_status(now_ms);
        if !status.available {
            return Err(ShellError::BonusUnavailable {
                next_at_ms: status.next_at_ms.unwrap_or(now_ms),
            });
        }

        let amount = self.settings.bonus_amount;
        let coins = self.settings.coins_for(amount);
        self.credit(amount, coins)?;
        self.bonus_claims.insert(identity, now_ms);
        log::info!("Daily bonus claimed: +{} points", amount);
        Ok(Reward {
            score: amount,
            coins,
            is_win: true,
        })
    }

    /// Validate locally, then ask the backend; returns the new coin balance
    pub fn withdraw(&mut self, amount: f64, address: &str) -> Result<f64, ShellError> {
        let user = self.user.as_ref().ok_or(ShellError::NotLoggedIn)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ShellError::InvalidAmount);
        }
        if amount < self.settings.min_withdraw {
            return Err(ShellError::BelowMinimum {
                minimum: self.settings.min_withdraw,
            });
        }
        if amount > user.coins {
            return Err(ShellError::InsufficientFunds {
                available: user.coins,
            });
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(ShellError::MissingAddress);
        }
        if !address.starts_with(&self.settings.address_prefix) {
            return Err(ShellError::InvalidAddress {
                prefix: self.settings.address_prefix.clone(),
            });
        }

        let identity = user.identity.clone();
        let coins = self.backend.withdraw(&identity, amount, address)?;
        if let Some(user) = self.user.as_mut() {
            user.coins = coins;
        }
        Ok(coins)
    }
}

/// Parse a typed withdrawal amount
pub fn parse_amount(text: &str) -> Result<f64, ShellError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ShellError::InvalidAmount)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DAY_MS;
    use crate::shell::backend::InMemoryBackend;

    fn request() -> AuthRequest {
        AuthRequest {
            identity: "1001".to_string(),
            username: Some("ada".to_string()),
            first_name: "Ada".to_string(),
            last_name: None,
            validation: "signed".to_string(),
        }
    }

    fn arcade() -> Arcade<InMemoryBackend> {
        let settings = Settings {
            seed: Some(17),
            ..Settings::default()
        };
        let mut arcade = Arcade::new(settings, InMemoryBackend::new());
        arcade.login(&request()).unwrap();
        arcade
    }

    /// Run the selected game until it reports, pressing nothing
    fn play_out(arcade: &mut Arcade<InMemoryBackend>) -> u64 {
        for _ in 0..10_000 {
            arcade.frame(1000.0);
            if let Some(last) = arcade.last_game() {
                return last.reward.score;
            }
        }
        panic!("game never ended");
    }

    #[test]
    fn test_screens_require_login() {
        let mut arcade = Arcade::new(Settings::default(), InMemoryBackend::new());
        assert_eq!(arcade.navigate(Screen::Bank), Err(ShellError::NotLoggedIn));
        assert_eq!(arcade.select_game("snake"), Err(ShellError::NotLoggedIn));
        arcade.login(&request()).unwrap();
        assert_eq!(arcade.screen(), Screen::MainMenu);
        arcade.navigate(Screen::GameMenu).unwrap();
        assert_eq!(arcade.screen(), Screen::GameMenu);
    }

    #[test]
    fn test_unknown_game() {
        let mut arcade = arcade();
        assert_eq!(
            arcade.select_game("pinball"),
            Err(ShellError::UnknownGame("pinball".to_string()))
        );
        assert!(arcade.session().is_none());
    }

    #[test]
    fn test_game_over_credits_user() {
        let mut arcade = arcade();
        arcade.select_game("snake").unwrap();
        assert_eq!(arcade.screen(), Screen::Playing);
        let score = play_out(&mut arcade);

        let user = arcade.user().unwrap();
        assert_eq!(user.score, score);
        assert!((user.coins - score as f64 * 0.00001).abs() < 1e-12);
        assert_eq!(arcade.backend().user("1001"), Some(user));
        assert!(!arcade.session().unwrap().is_running());
    }

    #[test]
    fn test_failed_sync_reverts_balance() {
        let mut arcade = arcade();
        arcade.select_game("snake").unwrap();
        arcade.backend_mut().set_offline(true);
        play_out(&mut arcade);
        let user = arcade.user().unwrap();
        assert_eq!((user.score, user.coins), (0, 0.0));
        // The run itself is still shown
        assert!(arcade.last_game().is_some());
    }

    #[test]
    fn test_exit_mid_game_awards_nothing() {
        let mut arcade = arcade();
        arcade.select_game("runner").unwrap();
        for _ in 0..20 {
            arcade.frame(16.0);
        }
        arcade.exit_game();
        assert_eq!(arcade.screen(), Screen::GameMenu);
        assert!(arcade.session().is_none());
        assert!(arcade.last_game().is_none());
        assert_eq!(arcade.user().unwrap().score, 0);
    }

    #[test]
    fn test_login_mid_game_drops_previous_run() {
        let mut arcade = arcade();
        arcade.select_game("snake").unwrap();
        arcade.frame(200.0);

        let other = AuthRequest {
            identity: "2002".to_string(),
            ..request()
        };
        arcade.login(&other).unwrap();
        assert!(arcade.session().is_none());
        assert_eq!(arcade.screen(), Screen::MainMenu);

        for _ in 0..100 {
            arcade.frame(1000.0);
        }
        assert!(arcade.last_game().is_none());
        assert_eq!(arcade.user().unwrap().identity, "2002");
        assert_eq!(arcade.user().unwrap().score, 0);
        assert_eq!(arcade.backend().user("1001").unwrap().score, 0);
    }

    #[test]
    fn test_bonus_cooldown() {
        let mut arcade = arcade();
        let now = 5 * DAY_MS;
        assert!(arcade.bonus_status(now).available);
        let reward = arcade.claim_bonus(now).unwrap();
        assert_eq!(reward.score, 1000);
        assert_eq!(arcade.user().unwrap().score, 1000);

        let status = arcade.bonus_status(now + 1);
        assert!(!status.available);
        assert_eq!(status.next_at_ms, Some(now + DAY_MS));
        assert_eq!(
            arcade.claim_bonus(now + 1),
            Err(ShellError::BonusUnavailable {
                next_at_ms: now + DAY_MS
            })
        );
        assert!(arcade.claim_bonus(now + DAY_MS).is_ok());
        assert_eq!(arcade.user().unwrap().score, 2000);
    }

    #[test]
    fn test_bonus_not_recorded_when_offline() {
        let mut arcade = arcade();
        arcade.backend_mut().set_offline(true);
        assert_eq!(arcade.claim_bonus(0), Err(ShellError::Unavailable));
        assert!(arcade.bonus_status(1).available);
        assert_eq!(arcade.user().unwrap().score, 0);
    }

    #[test]
    fn test_withdraw_validation_order() {
        let mut arcade = arcade();
        arcade.backend_mut().submit_score("1001", 0, 2.5).unwrap();
        arcade.login(&request()).unwrap();

        assert_eq!(arcade.withdraw(-1.0, "UQx"), Err(ShellError::InvalidAmount));
        assert_eq!(arcade.withdraw(f64::NAN, "UQx"), Err(ShellError::InvalidAmount));
        assert_eq!(
            arcade.withdraw(0.5, "UQx"),
            Err(ShellError::BelowMinimum { minimum: 1.0 })
        );
        assert_eq!(
            arcade.withdraw(3.0, "UQx"),
            Err(ShellError::InsufficientFunds { available: 2.5 })
        );
        assert_eq!(arcade.withdraw(2.0, "  "), Err(ShellError::MissingAddress));
        assert_eq!(
            arcade.withdraw(2.0, "EQx"),
            Err(ShellError::InvalidAddress {
                prefix: "UQ".to_string()
            })
        );
        assert_eq!(arcade.withdraw(2.0, " UQwallet "), Ok(0.5));
        assert_eq!(arcade.user().unwrap().coins, 0.5);
        assert_eq!(arcade.backend().withdrawals()[0].address, "UQwallet");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1.5 "), Ok(1.5));
        assert_eq!(parse_amount("ten"), Err(ShellError::InvalidAmount));
    }
}
