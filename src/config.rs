use chrono::Weekday;
use serde::Serialize;
use std::env;

use crate::calendar::parse_weekday;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_TIMELINE_PAD_DAYS: u32 = 7;
const DEFAULT_EMPTY_HORIZON_BEFORE_DAYS: u32 = 7;
const DEFAULT_EMPTY_HORIZON_AFTER_DAYS: u32 = 45;

/// Upper bound for any day-count setting (about ten years)
pub const MAX_CONFIG_DAYS: u32 = 3650;

const ENV_TIMELINE_PAD_DAYS: &str = "ROSTER_TIMELINE_PAD_DAYS";
const ENV_EMPTY_HORIZON_BEFORE_DAYS: &str = "ROSTER_EMPTY_HORIZON_BEFORE_DAYS";
const ENV_EMPTY_HORIZON_AFTER_DAYS: &str = "ROSTER_EMPTY_HORIZON_AFTER_DAYS";
const ENV_WEEK_STARTS_ON: &str = "ROSTER_WEEK_STARTS_ON";

#[derive(Debug, thiserror::Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ConfigError {
  #[error("Invalid configuration value for {key}: {value}")]
  Invalid { key: String, value: String },
}

/// Tunables for timeline derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
  /// Days of padding before the first and after the last block
  pub timeline_pad_days: u32,
  /// Planning horizon used when an athlete has no blocks
  pub empty_horizon_before_days: u32,
  pub empty_horizon_after_days: u32,
  pub week_starts_on: Weekday,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      timeline_pad_days: DEFAULT_TIMELINE_PAD_DAYS,
      empty_horizon_before_days: DEFAULT_EMPTY_HORIZON_BEFORE_DAYS,
      empty_horizon_after_days: DEFAULT_EMPTY_HORIZON_AFTER_DAYS,
      week_starts_on: Weekday::Mon,
    }
  }
}

impl EngineConfig {
  /// Load a `.env` file if one exists, then read the environment
  pub fn load() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_env()
  }

  /// Read overrides from the environment; unset keys keep their defaults
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();
    Ok(Self {
      timeline_pad_days: read_days(ENV_TIMELINE_PAD_DAYS, defaults.timeline_pad_days)?,
      empty_horizon_before_days: read_days(
        ENV_EMPTY_HORIZON_BEFORE_DAYS,
        defaults.empty_horizon_before_days,
      )?,
      empty_horizon_after_days: read_days(
        ENV_EMPTY_HORIZON_AFTER_DAYS,
        defaults.empty_horizon_after_days,
      )?,
      week_starts_on: match env::var(ENV_WEEK_STARTS_ON) {
        Ok(raw) => parse_weekday(&raw).ok_or_else(|| invalid(ENV_WEEK_STARTS_ON, &raw))?,
        Err(_) => defaults.week_starts_on,
      },
    })
  }
}

fn read_days(key: &str, default: u32) -> Result<u32, ConfigError> {
  match env::var(key) {
    Ok(raw) => match raw.trim().parse::<u32>() {
      Ok(days) if days <= MAX_CONFIG_DAYS => Ok(days),
      _ => Err(invalid(key, &raw)),
    },
    Err(_) => Ok(default),
  }
}

fn invalid(key: &str, value: &str) -> ConfigError {
  ConfigError::Invalid {
    key: key.to_string(),
    value: value.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const ALL_KEYS: [&str; 4] = [
    ENV_TIMELINE_PAD_DAYS,
    ENV_EMPTY_HORIZON_BEFORE_DAYS,
    ENV_EMPTY_HORIZON_AFTER_DAYS,
    ENV_WEEK_STARTS_ON,
  ];

  #[test]
  #[serial]
  fn test_from_env_defaults() {
    temp_env::with_vars_unset(ALL_KEYS, || {
      let config = EngineConfig::from_env().expect("Defaults should load");
      assert_eq!(config, EngineConfig::default());
      assert_eq!(config.timeline_pad_days, 7);
      assert_eq!(config.empty_horizon_after_days, 45);
      assert_eq!(config.week_starts_on, Weekday::Mon);
    });
  }

  #[test]
  #[serial]
  fn test_from_env_overrides() {
    temp_env::with_vars(
      [
        (ENV_TIMELINE_PAD_DAYS, Some("3")),
        (ENV_EMPTY_HORIZON_BEFORE_DAYS, None),
        (ENV_EMPTY_HORIZON_AFTER_DAYS, Some("60")),
        (ENV_WEEK_STARTS_ON, Some("sunday")),
      ],
      || {
        let config = EngineConfig::from_env().expect("Overrides should load");
        assert_eq!(config.timeline_pad_days, 3);
        assert_eq!(config.empty_horizon_before_days, 7);
        assert_eq!(config.empty_horizon_after_days, 60);
        assert_eq!(config.week_starts_on, Weekday::Sun);
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_bad_values() {
    temp_env::with_vars(
      [(ENV_TIMELINE_PAD_DAYS, Some("-2")), (ENV_WEEK_STARTS_ON, None)],
      || {
        let err = EngineConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_TIMELINE_PAD_DAYS));
      },
    );

    temp_env::with_vars(
      [(ENV_TIMELINE_PAD_DAYS, Some("100000000")), (ENV_WEEK_STARTS_ON, None)],
      || {
        let err = EngineConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("100000000"));
      },
    );

    temp_env::with_vars(
      [(ENV_TIMELINE_PAD_DAYS, None), (ENV_WEEK_STARTS_ON, Some("caturday"))],
      || {
        assert!(EngineConfig::from_env().is_err());
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_day_bounds() {
    temp_env::with_vars(
      [
        (ENV_TIMELINE_PAD_DAYS, Some("0")),
        (ENV_EMPTY_HORIZON_BEFORE_DAYS, Some("3650")),
        (ENV_EMPTY_HORIZON_AFTER_DAYS, Some("3651")),
        (ENV_WEEK_STARTS_ON, None),
      ],
      || {
        let err = EngineConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_EMPTY_HORIZON_AFTER_DAYS));
      },
    );

    temp_env::with_vars(
      [
        (ENV_TIMELINE_PAD_DAYS, Some("0")),
        (ENV_EMPTY_HORIZON_BEFORE_DAYS, Some("3650")),
        (ENV_EMPTY_HORIZON_AFTER_DAYS, Some("3650")),
        (ENV_WEEK_STARTS_ON, None),
      ],
      || {
        let config = EngineConfig::from_env().expect("Bounds are inclusive");
        assert_eq!(config.timeline_pad_days, 0);
        assert_eq!(config.empty_horizon_before_days, MAX_CONFIG_DAYS);
      },
    );
  }
}
