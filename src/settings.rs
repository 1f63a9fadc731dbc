//! Arcade settings
//!
//! Reward conversion, withdrawal rules, the daily bonus and frame pacing.
//! Stored as JSON; any missing field takes its default.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One day in milliseconds
pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rewards ===
    /// Coins awarded per score point
    pub reward_rate: f64,

    // === Bank ===
    /// Smallest withdrawal accepted
    pub min_withdraw: f64,
    /// Every withdrawal address must start with this
    pub address_prefix: String,

    // === Daily bonus ===
    /// Score points granted per claim
    pub bonus_amount: u64,
    pub bonus_cooldown_ms: u64,

    // === Pacing ===
    /// Cap on ticks run per host frame
    pub max_substeps: u32,
    /// Fixed seed for every game; derived from the clock when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reward_rate: 0.00001,

            min_withdraw: 1.0,
            address_prefix: "UQ".to_string(),

            bonus_amount: 1000,
            bonus_cooldown_ms: DAY_MS,

            max_substeps: crate::consts::MAX_SUBSTEPS,
            seed: None,
        }
    }
}

impl Settings {
    /// Coins earned for a final score
    pub fn coins_for(&self, score: u64) -> f64 {
        score as f64 * self.reward_rate
    }

    /// Read settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Read settings, falling back to defaults when the file is missing or bad
    pub fn load(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::info!("Using default settings ({:#})", err);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to encode settings")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
