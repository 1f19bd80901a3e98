//! TOML-based engine configuration.
//!
//! Stores tunables for:
//! - Sync pacing (minimum refresh interval, HTTP timeout)
//! - Notification pacing (gap between banners, post-dismissal cooldown)
//! - Morning/evening hour bands for time-of-day achievements
//! - Display language for catalog text
//!
//! Configuration is stored at `~/.config/starquest/config.toml`.

use serde::{Deserialize, Serialize};

use crate::catalog::Language;
use crate::error::ConfigError;
use crate::storage::data_dir;

/// Sync pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Minimum seconds between remote pulls (unless forced).
    #[serde(default = "default_min_refresh_interval")]
    pub min_refresh_interval_secs: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Notification pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Seconds between consecutive unlock banners.
    #[serde(default = "default_notification_gap")]
    pub gap_secs: u64,
    /// Seconds after a dismissal before the next banner may show.
    #[serde(default = "default_dismiss_cooldown")]
    pub dismiss_cooldown_secs: u64,
}

/// Hour bands for the morning/evening play achievements.
///
/// A check-in at hour `h` is in a band when `start <= h < end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBandsConfig {
    #[serde(default = "default_morning_start")]
    pub morning_start_hour: u32,
    #[serde(default = "default_morning_end")]
    pub morning_end_hour: u32,
    #[serde(default = "default_evening_start")]
    pub evening_start_hour: u32,
    #[serde(default = "default_evening_end")]
    pub evening_end_hour: u32,
}

impl TimeBandsConfig {
    pub fn is_morning(&self, hour: u32) -> bool {
        hour >= self.morning_start_hour && hour < self.morning_end_hour
    }

    pub fn is_evening(&self, hour: u32) -> bool {
        hour >= self.evening_start_hour && hour < self.evening_end_hour
    }
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/starquest/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub time_bands: TimeBandsConfig,
    #[serde(default)]
    pub language: Language,
}

// Default functions
fn default_min_refresh_interval() -> u64 {
    300
}
fn default_request_timeout() -> u64 {
    10
}
fn default_notification_gap() -> u64 {
    5
}
fn default_dismiss_cooldown() -> u64 {
    1
}
fn default_morning_start() -> u32 {
    5
}
fn default_morning_end() -> u32 {
    10
}
fn default_evening_start() -> u32 {
    18
}
fn default_evening_end() -> u32 {
    22
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_refresh_interval_secs: default_min_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            gap_secs: default_notification_gap(),
            dismiss_cooldown_secs: default_dismiss_cooldown(),
        }
    }
}

impl Default for TimeBandsConfig {
    fn default() -> Self {
        Self {
            morning_start_hour: default_morning_start(),
            morning_end_hour: default_morning_end(),
            evening_start_hour: default_evening_start(),
            evening_end_hour: default_evening_end(),
        }
    }
}

impl EngineConfig {
    /// Load configuration, falling back to defaults if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = data_dir()
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?
            .join("config.toml");

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save configuration to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = data_dir()
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?
            .join("config.toml");

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }
}
