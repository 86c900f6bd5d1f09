//! Sources of the active pledge roster.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::warn;
use serde::Deserialize;
use serenity::model::id::UserId;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Active pledges as user -> tier
    async fn active_pledges(&self) -> Result<HashMap<UserId, u32>>;
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    discord_id: String,
    tier: u32,
}

/// Roster served as JSON: `[{"discord_id": "123", "tier": 2}, ...]`
pub struct HttpRoster {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpRoster {
    pub fn new(url: String, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build roster HTTP client")?;

        Ok(Self { client, url, token })
    }
}

#[async_trait]
impl RosterSource for HttpRoster {
    async fn active_pledges(&self) -> Result<HashMap<UserId, u32>> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let body = request
            .send()
            .await
            .context("Roster request failed")?
            .error_for_status()
            .context("Roster endpoint returned an error")?
            .text()
            .await?;

        parse_roster(&body)
    }
}

/// Entries with unparseable ids are skipped; a later entry for the same user wins.
pub(crate) fn parse_roster(body: &str) -> Result<HashMap<UserId, u32>> {
    let entries: Vec<RosterEntry> =
        serde_json::from_str(body).context("Roster is not a JSON list of entries")?;

    let mut pledges = HashMap::with_capacity(entries.len());
    for entry in entries {
        match entry.discord_id.trim().parse::<u64>() {
            Ok(id) => {
                pledges.insert(UserId(id), entry.tier);
            }
            Err(_) => warn!("Skipping roster entry with invalid id '{}'", entry.discord_id),
        }
    }

    Ok(pledges)
}
