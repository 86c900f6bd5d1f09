//! # Configuration
//!
//! Environment-driven bot configuration. `.env` files are loaded by the binary
//! via dotenvy before [`Config::from_env`] runs.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Pledge roster URL/token for the daily pledge sync
//! - 1.1.0: Hosted application ids are configurable
//! - 1.0.0: Initial release

use anyhow::{Context, Result};
use serenity::model::id::ChannelId;
use std::env;

/// Application ids of the canonical hosted deployments.
pub const DEFAULT_HOSTED_APPLICATION_IDS: [u64; 2] = [249303797371895820, 314145804807962634];

/// Hosted deployment that always runs with the highest resampling quality.
pub const DEFAULT_HIGH_QUALITY_APPLICATION_ID: u64 = 314145804807962634;

pub const DEFAULT_PREFIX: &str = "$";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub default_prefix: String,
    pub nsfw_enabled: bool,
    pub database_path: String,
    pub log_level: String,
    pub hosted_application_ids: Vec<u64>,
    pub high_quality_application_id: Option<u64>,
    pub patreon_url: Option<String>,
    pub feedback_channel_id: Option<ChannelId>,
    pub pledge_roster_url: Option<String>,
    pub pledge_roster_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = get("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let default_prefix = get("DEFAULT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let nsfw_enabled = match get("NSFW_ENABLED") {
            Some(v) => parse_bool(&v).with_context(|| format!("Invalid NSFW_ENABLED value: {v}"))?,
            None => false,
        };

        let hosted_application_ids = match get("HOSTED_APPLICATION_IDS") {
            Some(v) => parse_id_list(&v).context("Invalid HOSTED_APPLICATION_IDS")?,
            None => DEFAULT_HOSTED_APPLICATION_IDS.to_vec(),
        };

        let high_quality_application_id = match get("HIGH_QUALITY_APPLICATION_ID") {
            Some(v) => Some(
                v.parse::<u64>()
                    .with_context(|| format!("Invalid HIGH_QUALITY_APPLICATION_ID: {v}"))?,
            ),
            None => Some(DEFAULT_HIGH_QUALITY_APPLICATION_ID),
        };

        let feedback_channel_id = match get("FEEDBACK_CHANNEL_ID") {
            Some(v) => Some(ChannelId(
                v.parse::<u64>()
                    .with_context(|| format!("Invalid FEEDBACK_CHANNEL_ID: {v}"))?,
            )),
            None => None,
        };

        Ok(Config {
            discord_token,
            default_prefix,
            nsfw_enabled,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "jukebox.db".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            hosted_application_ids,
            high_quality_application_id,
            patreon_url: get("PATREON_URL"),
            feedback_channel_id,
            pledge_roster_url: get("PLEDGE_ROSTER_URL"),
            pledge_roster_token: get("PLEDGE_ROSTER_TOKEN"),
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Ok(true),
        "0" | "false" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(anyhow::anyhow!("expected a boolean")),
    }
}

fn parse_id_list(value: &str) -> Result<Vec<u64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("not an id: {s}")))
        .collect()
}

#[cfg(test)]
impl Config {
    /// Minimal config for tests: hosted-only integrations unset.
    pub fn for_tests() -> Self {
        Config {
            discord_token: "test-token".to_string(),
            default_prefix: DEFAULT_PREFIX.to_string(),
            nsfw_enabled: false,
            database_path: ":memory:".to_string(),
            log_level: "debug".to_string(),
            hosted_application_ids: DEFAULT_HOSTED_APPLICATION_IDS.to_vec(),
            high_quality_application_id: Some(DEFAULT_HIGH_QUALITY_APPLICATION_ID),
            patreon_url: None,
            feedback_channel_id: None,
            pledge_roster_url: None,
            pledge_roster_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(config.default_prefix, "$");
        assert!(!config.nsfw_enabled);
        assert_eq!(config.database_path, "jukebox.db");
        assert_eq!(config.hosted_application_ids, DEFAULT_HOSTED_APPLICATION_IDS.to_vec());
        assert_eq!(
            config.high_quality_application_id,
            Some(DEFAULT_HIGH_QUALITY_APPLICATION_ID)
        );
        assert!(config.feedback_channel_id.is_none());
    }

    #[test]
    fn test_missing_token_fails() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DEFAULT_PREFIX", "!"),
            ("NSFW_ENABLED", "yes"),
            ("HOSTED_APPLICATION_IDS", "1, 2,3"),
            ("FEEDBACK_CHANNEL_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(config.default_prefix, "!");
        assert!(config.nsfw_enabled);
        assert_eq!(config.hosted_application_ids, vec![1, 2, 3]);
        assert_eq!(config.feedback_channel_id, Some(ChannelId(42)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("NSFW_ENABLED", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DISCORD_TOKEN", "a"), ("HOSTED_APPLICATION_IDS", "x")])).is_err());
    }
}
