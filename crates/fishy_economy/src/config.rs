//! # Engine Configuration
//!
//! Timers, queue sizing and housekeeping intervals, loaded once at startup
//! from TOML. Durations are written in whole seconds.
//!
//! ```toml
//! cast_cooldown_secs = 10
//! gather_bait_secs = 21600
//! density_ttl_secs = 10800
//! task_queue_capacity = 1024
//! maintenance_interval_secs = 60
//! hourly_window_secs = 3600
//! daily_window_secs = 86400
//! garbage_worth = 5
//! tracked_commands = ["fishy"]
//! ```

use crate::error::{FishingError, FishingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Command name under which casts are rate limited and tracked.
pub const CAST_COMMAND: &str = "fishy";

/// Runtime settings for the fishing engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cooldown between two casts by the same player.
    #[serde(rename = "cast_cooldown_secs", with = "seconds")]
    pub cast_cooldown: Duration,
    /// How long a bait-gathering trip blocks casting.
    #[serde(rename = "gather_bait_secs", with = "seconds")]
    pub gather_bait: Duration,
    /// Inactivity after which location density resets.
    #[serde(rename = "density_ttl_secs", with = "seconds")]
    pub density_ttl: Duration,
    /// Bound of the background task queue.
    pub task_queue_capacity: usize,
    /// Period of the command-tracking prune.
    #[serde(rename = "maintenance_interval_secs", with = "seconds")]
    pub maintenance_interval: Duration,
    /// Rolling window of the hourly command count.
    #[serde(rename = "hourly_window_secs", with = "seconds")]
    pub hourly_window: Duration,
    /// Rolling window of the daily command count.
    #[serde(rename = "daily_window_secs", with = "seconds")]
    pub daily_window: Duration,
    /// Worth credited for a garbage catch.
    pub garbage_worth: i64,
    /// Commands whose tracking windows the maintenance ticker prunes.
    pub tracked_commands: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cast_cooldown: Duration::from_secs(10),
            gather_bait: Duration::from_secs(6 * 60 * 60),
            density_ttl: Duration::from_secs(3 * 60 * 60),
            task_queue_capacity: 1024,
            maintenance_interval: Duration::from_secs(60),
            hourly_window: Duration::from_secs(60 * 60),
            daily_window: Duration::from_secs(24 * 60 * 60),
            garbage_worth: 5,
            tracked_commands: vec![CAST_COMMAND.to_string()],
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> FishingResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| FishingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FishingResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FishingError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Checks values that would stall or break the engine.
    pub fn validate(&self) -> FishingResult<()> {
        if self.task_queue_capacity == 0 {
            return Err(FishingError::Config("task_queue_capacity must be > 0".into()));
        }
        if self.maintenance_interval.is_zero() {
            return Err(FishingError::Config(
                "maintenance_interval_secs must be > 0".into(),
            ));
        }
        if self.density_ttl.is_zero() || self.cast_cooldown.is_zero() {
            return Err(FishingError::Config(
                "density and cooldown durations must be > 0".into(),
            ));
        }
        if self.hourly_window > self.daily_window {
            return Err(FishingError::Config(
                "hourly window must not exceed daily window".into(),
            ));
        }
        if self.garbage_worth < 0 {
            return Err(FishingError::Config("garbage_worth must be >= 0".into()));
        }
        Ok(())
    }
}

/// `Duration` as whole seconds.
mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cast_cooldown, Duration::from_secs(10));
        assert_eq!(config.gather_bait, Duration::from_secs(21_600));
        assert_eq!(config.density_ttl, Duration::from_secs(10_800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("cast_cooldown_secs = 3\ngarbage_worth = 7\n")
            .unwrap();
        assert_eq!(config.cast_cooldown, Duration::from_secs(3));
        assert_eq!(config.garbage_worth, 7);
        assert_eq!(config.task_queue_capacity, 1024);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("task_queue_capacity = 0"),
            Err(FishingError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("no_such_key = 1"),
            Err(FishingError::Config(_))
        ));
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/engine.toml");
        let config = EngineConfig::load(path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
