//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Google's OpenAI-compatible endpoint for Gemini models.
pub const DEFAULT_SCORING_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    /// Absent or blank means the fallback scorer is used.
    pub scoring_api_key: Option<String>,
    pub scoring_api_base: String,
    pub scoring_model: String,
    pub scoring_temperature: f32,
    pub scoring_timeout: Duration,
    pub fallback_seed: Option<u64>,
    pub seed_load_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            cors_origin: "http://localhost:5173".to_string(),
            scoring_api_key: None,
            scoring_api_base: DEFAULT_SCORING_API_BASE.to_string(),
            scoring_model: "gemini-2.5-flash".to_string(),
            scoring_temperature: 0.2,
            scoring_timeout: Duration::from_secs(30),
            fallback_seed: None,
            seed_load_delay: Duration::from_millis(1500),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = parse_var(&lookup, "BIND_ADDRESS")?.unwrap_or(defaults.bind_address);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        // --- Scoring Service (key is optional) ---
        let scoring_api_key = lookup("SCORING_API_KEY").filter(|key| !key.trim().is_empty());
        let scoring_api_base = lookup("SCORING_API_BASE").unwrap_or(defaults.scoring_api_base);
        let scoring_model = lookup("SCORING_MODEL").unwrap_or(defaults.scoring_model);
        let scoring_temperature =
            parse_var(&lookup, "SCORING_TEMPERATURE")?.unwrap_or(defaults.scoring_temperature);
        if !(0.0..=2.0).contains(&scoring_temperature) {
            return Err(ConfigError::InvalidValue(
                "SCORING_TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", scoring_temperature),
            ));
        }
        let scoring_timeout = parse_var(&lookup, "SCORING_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.scoring_timeout);
        let fallback_seed = parse_var(&lookup, "FALLBACK_SEED")?;

        // --- Seed Data ---
        let seed_load_delay = parse_var(&lookup, "SEED_LOAD_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.seed_load_delay);

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            scoring_api_key,
            scoring_api_base,
            scoring_model,
            scoring_temperature,
            scoring_timeout,
            fallback_seed,
            seed_load_delay,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_select_fallback_scoring() {
        let config = config_from(&[]).unwrap();
        assert!(config.scoring_api_key.is_none());
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.scoring_model, "gemini-2.5-flash");
        assert_eq!(config.seed_load_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_blank_key_counts_as_absent() {
        let config = config_from(&[("SCORING_API_KEY", "   ")]).unwrap();
        assert!(config.scoring_api_key.is_none());
        let config = config_from(&[("SCORING_API_KEY", "abc")]).unwrap();
        assert_eq!(config.scoring_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_numeric_settings_are_parsed() {
        let config = config_from(&[
            ("SCORING_TIMEOUT_SECS", "5"),
            ("FALLBACK_SEED", "42"),
            ("SEED_LOAD_DELAY_MS", "0"),
            ("SCORING_TEMPERATURE", "0.7"),
        ])
        .unwrap();
        assert_eq!(config.scoring_timeout, Duration::from_secs(5));
        assert_eq!(config.fallback_seed, Some(42));
        assert_eq!(config.seed_load_delay, Duration::ZERO);
        assert!((config.scoring_temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config_from(&[("BIND_ADDRESS", "not-an-address")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "BIND_ADDRESS"));
        let err = config_from(&[("RUST_LOG", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "RUST_LOG"));
        let err = config_from(&[("SCORING_TEMPERATURE", "3.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "SCORING_TEMPERATURE"));
    }
}
