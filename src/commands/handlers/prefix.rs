//! Handles: prefix (set, reset)

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandProperties, SubCommand, SubCommands};
use crate::core::Config;

const MAX_PREFIX_LEN: usize = 10;

pub struct PrefixCommand {
    properties: CommandProperties,
    subcommands: SubCommands,
}

pub fn build(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(PrefixCommand {
        properties: CommandProperties::new("Show or change the server prefix"),
        subcommands: SubCommands::new()
            .with("set", SubCommand::new("Change the server prefix", set_prefix))
            .with("reset", SubCommand::new("Restore the default prefix", reset_prefix)),
    }))
}

#[async_trait]
impl Command for PrefixCommand {
    fn name(&self) -> &str {
        "prefix"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    fn subcommands(&self) -> Option<&SubCommands> {
        Some(&self.subcommands)
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        ctx.reply(&format!("The prefix for this server is `{}`", ctx.prefix))
            .await
    }
}

fn is_manager(ctx: &CommandContext) -> bool {
    ctx.gateway
        .is_guild_manager(ctx.message.guild_id, ctx.message.author_id)
}

async fn set_prefix(ctx: CommandContext) -> Result<()> {
    if !is_manager(&ctx) {
        return ctx
            .reply("You need the Manage Server permission to change the prefix.")
            .await;
    }

    let prefix = ctx.args.trim();
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        return ctx
            .reply(&format!("Usage: `{}prefix set <prefix>`", ctx.prefix))
            .await;
    }
    if prefix.chars().count() > MAX_PREFIX_LEN {
        return ctx
            .reply(&format!("Prefixes can be at most {MAX_PREFIX_LEN} characters."))
            .await;
    }

    ctx.services
        .storage
        .set_prefix(ctx.message.guild_id, prefix)?;
    info!(
        "[{}] Prefix for guild {} set to '{prefix}'",
        ctx.request_id, ctx.message.guild_id
    );

    ctx.reply(&format!("Prefix set to `{prefix}`")).await
}

async fn reset_prefix(ctx: CommandContext) -> Result<()> {
    if !is_manager(&ctx) {
        return ctx
            .reply("You need the Manage Server permission to change the prefix.")
            .await;
    }

    let storage = &ctx.services.storage;
    storage.reset_prefix(ctx.message.guild_id)?;
    let prefix = storage.prefix(ctx.message.guild_id)?;

    ctx.reply(&format!("Prefix reset to `{prefix}`")).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::{context_for, services};
    use crate::commands::handler::run_checks;
    use crate::testing::{MockGateway, GUILD};
    use serenity::model::id::UserId;

    const MANAGER: UserId = UserId(77);

    async fn run(args: &str, author: UserId) -> (Arc<MockGateway>, Arc<crate::commands::context::Services>) {
        let gateway = Arc::new(MockGateway::new());
        gateway.managers.lock().unwrap().insert(MANAGER);
        let services = services();

        let command = build(&Config::for_tests()).unwrap();
        run_checks(command, context_for(gateway.clone(), services.clone(), author, args))
            .await
            .unwrap();

        (gateway, services)
    }

    #[tokio::test]
    async fn test_show_prefix() {
        let (gateway, _) = run("", UserId(1)).await;
        assert_eq!(gateway.sent_messages(), vec!["The prefix for this server is `$`"]);
    }

    #[tokio::test]
    async fn test_manager_sets_prefix() {
        let (gateway, services) = run("SET !!", MANAGER).await;

        assert_eq!(gateway.sent_messages(), vec!["Prefix set to `!!`"]);
        assert_eq!(services.storage.prefix(GUILD).unwrap(), "!!");
    }

    #[tokio::test]
    async fn test_non_manager_cannot_set() {
        let (gateway, services) = run("set !", UserId(1)).await;

        assert!(gateway.sent_messages()[0].contains("Manage Server"));
        assert_eq!(services.storage.prefix(GUILD).unwrap(), "$");
    }

    #[tokio::test]
    async fn test_invalid_prefixes() {
        let (gateway, _) = run("set", MANAGER).await;
        assert!(gateway.sent_messages()[0].starts_with("Usage"));

        let (gateway, _) = run("set a b", MANAGER).await;
        assert!(gateway.sent_messages()[0].starts_with("Usage"));

        let (gateway, _) = run("set abcdefghijk", MANAGER).await;
        assert!(gateway.sent_messages()[0].contains("at most 10"));
    }

    #[tokio::test]
    async fn test_reset_prefix() {
        let gateway = Arc::new(MockGateway::new());
        gateway.managers.lock().unwrap().insert(MANAGER);
        let services = services();
        services.storage.set_prefix(GUILD, "!").unwrap();

        let command = build(&Config::for_tests()).unwrap();
        run_checks(command, context_for(gateway.clone(), services.clone(), MANAGER, "reset"))
            .await
            .unwrap();

        assert_eq!(gateway.sent_messages(), vec!["Prefix reset to `$`"]);
        assert_eq!(services.storage.prefix(GUILD).unwrap(), "$");
    }
}
