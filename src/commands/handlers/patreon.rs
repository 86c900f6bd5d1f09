//! Pledge command handlers
//!
//! Handles: patreon, verify
//!
//! Both depend on the hosted pledge roster and are removed on self-hosted
//! deployments during start-up reconciliation.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandInitError, CommandProperties};
use crate::core::Config;

pub struct PatreonCommand {
    properties: CommandProperties,
    url: String,
}

pub struct VerifyCommand {
    properties: CommandProperties,
}

pub fn build_patreon(config: &Config) -> Result<Arc<dyn Command>> {
    let url = config
        .patreon_url
        .clone()
        .ok_or_else(|| CommandInitError::unavailable("PATREON_URL is not set"))?;

    Ok(Arc::new(PatreonCommand {
        properties: CommandProperties::new("Support the bot").aliases(&["donate"]),
        url,
    }))
}

pub fn build_verify(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(VerifyCommand {
        properties: CommandProperties::new("Check your pledge status"),
    }))
}

#[async_trait]
impl Command for PatreonCommand {
    fn name(&self) -> &str {
        "patreon"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        ctx.reply(&format!(
            "Pledging unlocks perks and keeps the bot running: <{}>\nAlready pledged? Run `{}verify`.",
            self.url, ctx.prefix
        ))
        .await
    }
}

#[async_trait]
impl Command for VerifyCommand {
    fn name(&self) -> &str {
        "verify"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let tier = ctx.services.storage.pledge_tier(ctx.message.author_id)?;

        let response = match tier {
            Some(tier) => format!("Thanks for your support! You are a tier {tier} patron."),
            None => format!(
                "No active pledge found. Pledges sync once a day; see `{}patreon`.",
                ctx.prefix
            ),
        };

        ctx.reply(&response).await
    }
}
