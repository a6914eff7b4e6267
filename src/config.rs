use std::env;
use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{MagpieError, MagpieResult};

/// Application configuration loaded from environment variables.
/// A `.env` file is honored when present.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database holding the value table and action log
    pub database_path: PathBuf,
    /// App bearer token, used for platform reads
    pub twitter_bearer_token: String,
    /// User access token, used for platform writes
    pub twitter_access_token: String,
    /// The agent's own account name
    pub twitter_username: String,
    pub openai_api_key: String,
    /// Civil timezone the time buckets are computed in
    pub timezone: FixedOffset,
    pub learning: LearningConfig,
}

/// Parameters of the learning loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub exploration_rate: f64,
    /// Fixed estimate of future value used in place of a next-state lookup
    pub terminal_reward_estimate: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.8,
            terminal_reward_estimate: 50.0,
        }
    }
}

impl Config {
    pub fn from_env() -> MagpieResult<Self> {
        dotenv::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_path: env::var("MAGPIE_DB")
                .unwrap_or_else(|_| "magpie.db".to_string())
                .into(),
            twitter_bearer_token: require_env("TWITTER_BEARER_TOKEN")?,
            twitter_access_token: require_env("TWITTER_ACCESS_TOKEN")?,
            twitter_username: require_env("TWITTER_USERNAME")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            timezone: parse_offset(
                &env::var("MAGPIE_UTC_OFFSET_HOURS").unwrap_or_else(|_| "-5".to_string()),
            )?,
            learning: LearningConfig::from_env()?,
        })
    }
}

impl LearningConfig {
    /// Defaults, with per-parameter environment overrides
    pub fn from_env() -> MagpieResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            learning_rate: optional_f64("MAGPIE_LEARNING_RATE", defaults.learning_rate)?,
            discount_factor: optional_f64("MAGPIE_DISCOUNT_FACTOR", defaults.discount_factor)?,
            exploration_rate: optional_f64("MAGPIE_EXPLORATION_RATE", defaults.exploration_rate)?,
            terminal_reward_estimate: optional_f64(
                "MAGPIE_TERMINAL_REWARD_ESTIMATE",
                defaults.terminal_reward_estimate,
            )?,
        })
    }
}

fn require_env(key: &str) -> MagpieResult<String> {
    env::var(key).map_err(|_| {
        MagpieError::config_error(format!("Required environment variable '{}' is not set", key))
    })
}

fn optional_f64(key: &str, default: f64) -> MagpieResult<f64> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| MagpieError::config_error(format!("'{}' must be a number", key))),
        Err(_) => Ok(default),
    }
}

/// Parse a whole-hour UTC offset such as "-5" into a chrono offset
fn parse_offset(hours: &str) -> MagpieResult<FixedOffset> {
    let hours: i32 = hours.trim().parse().map_err(|_| {
        MagpieError::config_error("'MAGPIE_UTC_OFFSET_HOURS' must be a whole number of hours")
    })?;

    FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
        MagpieError::config_error(format!("UTC offset of {} hours is out of range", hours))
    })
}
