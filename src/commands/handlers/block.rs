//! Handles: block (add, remove)
//!
//! Developer-only. Blocked users are dropped by the dispatcher before prefix
//! parsing, so they get no response from any command.

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::id::UserId;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandProperties, SubCommand, SubCommands};
use crate::core::Config;

pub struct BlockCommand {
    properties: CommandProperties,
    subcommands: SubCommands,
}

pub fn build(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(BlockCommand {
        properties: CommandProperties::new("Manage the block list").developer_only(),
        subcommands: SubCommands::new()
            .with("add", SubCommand::new("Block a user", block_user))
            .with("remove", SubCommand::new("Unblock a user", unblock_user)),
    }))
}

#[async_trait]
impl Command for BlockCommand {
    fn name(&self) -> &str {
        "block"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    fn subcommands(&self) -> Option<&SubCommands> {
        Some(&self.subcommands)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        ctx.reply(&format!("Usage: `{}block <add|remove> <user>`", ctx.prefix))
            .await
    }
}

/// Accepts `<@id>`, `<@!id>` or a bare id
pub fn parse_user(text: &str) -> Option<UserId> {
    let text = text.trim();
    let id = match text.strip_prefix("<@").and_then(|t| t.strip_suffix('>')) {
        Some(inner) => inner.strip_prefix('!').unwrap_or(inner),
        None => text,
    };
    id.parse::<u64>().ok().filter(|&id| id != 0).map(UserId)
}

async fn block_user(ctx: CommandContext) -> Result<()> {
    let Some(user_id) = parse_user(&ctx.args) else {
        return ctx
            .reply(&format!("Usage: `{}block add <user>`", ctx.prefix))
            .await;
    };
    if user_id == ctx.message.author_id {
        return ctx.reply("You can't block yourself.").await;
    }

    ctx.services.storage.block(user_id)?;
    info!("[{}] 🚫 Blocked user {user_id}", ctx.request_id);

    ctx.reply(&format!("Blocked <@{}>", user_id.0)).await
}

async fn unblock_user(ctx: CommandContext) -> Result<()> {
    let Some(user_id) = parse_user(&ctx.args) else {
        return ctx
            .reply(&format!("Usage: `{}block remove <user>`", ctx.prefix))
            .await;
    };

    if ctx.services.storage.unblock(user_id)? {
        info!("[{}] Unblocked user {user_id}", ctx.request_id);
        ctx.reply(&format!("Unblocked <@{}>", user_id.0)).await
    } else {
        ctx.reply(&format!("<@{}> is not blocked.", user_id.0)).await
    }
}
