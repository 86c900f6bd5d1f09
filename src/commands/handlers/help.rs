//! Handles: help

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{split_first_word, Command, CommandProperties};
use crate::core::Config;

pub struct HelpCommand {
    properties: CommandProperties,
}

pub fn build(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(HelpCommand {
        properties: CommandProperties::new("List commands, or describe one")
            .aliases(&["h", "commands"]),
    }))
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let (topic, _) = split_first_word(&ctx.args);
        let response = if topic.is_empty() {
            command_list(&ctx)
        } else {
            command_details(&ctx, topic)
        };

        ctx.reply(&response).await
    }
}

fn visible(ctx: &CommandContext, command: &dyn Command) -> bool {
    !command.properties().developer_only || ctx.is_owner()
}

fn command_list(ctx: &CommandContext) -> String {
    let mut response = format!("**Commands** (prefix `{}`)\n", ctx.prefix);

    for command in ctx.services.registry.commands() {
        if !visible(ctx, command.as_ref()) {
            continue;
        }
        response.push_str(&format!(
            "`{}{}` - {}\n",
            ctx.prefix,
            command.name(),
            command.properties().description
        ));
    }

    response.push_str(&format!(
        "\nUse `{}help <command>` for details.",
        ctx.prefix
    ));
    response
}

fn command_details(ctx: &CommandContext, topic: &str) -> String {
    let command = match ctx.services.registry.resolve(topic) {
        Some(command) if visible(ctx, command.as_ref()) => command,
        _ => return format!("No command named `{topic}`."),
    };

    let properties = command.properties();
    let mut response = format!(
        "**{}{}** - {}\n",
        ctx.prefix,
        command.name(),
        properties.description
    );

    if !properties.aliases.is_empty() {
        response.push_str(&format!("Aliases: {}\n", properties.aliases.join(", ")));
    }

    if let Some(subcommands) = command.subcommands().filter(|s| !s.is_empty()) {
        response.push_str("Sub-commands:\n");
        for (trigger, subcommand) in subcommands.sorted() {
            response.push_str(&format!(
                "`{}{} {}` - {}\n",
                ctx.prefix,
                command.name(),
                trigger,
                subcommand.description()
            ));
        }
    }

    response.trim_end().to_string()
}
