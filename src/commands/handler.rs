//! Command trait, sub-command tables and the invocation pipeline
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Text commands with declarative sub-command tables
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::context::CommandContext;
use crate::core::Config;

/// Static properties of a command, read by the registry and the dispatcher.
#[derive(Debug, Clone)]
pub struct CommandProperties {
    pub description: &'static str,
    pub aliases: Vec<String>,
    pub enabled: bool,
    pub nsfw: bool,
    pub developer_only: bool,
}

impl CommandProperties {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            aliases: Vec::new(),
            enabled: true,
            nsfw: false,
            developer_only: false,
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn nsfw(mut self) -> Self {
        self.nsfw = true;
        self
    }

    pub fn developer_only(mut self) -> Self {
        self.developer_only = true;
        self
    }
}

type SubCommandFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type SubCommandFn = Arc<dyn Fn(CommandContext) -> SubCommandFuture + Send + Sync>;

/// A sub-command handler plus the description shown in help.
#[derive(Clone)]
pub struct SubCommand {
    description: String,
    handler: SubCommandFn,
}

impl SubCommand {
    pub fn new<F, Fut>(description: &str, handler: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            description: description.to_string(),
            handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub async fn invoke(&self, ctx: CommandContext) -> Result<()> {
        (self.handler)(ctx).await
    }
}

/// Lower-cased trigger -> sub-command.
#[derive(Clone, Default)]
pub struct SubCommands {
    entries: HashMap<String, SubCommand>,
}

impl SubCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sub-command. A repeated trigger replaces the earlier entry.
    pub fn with(mut self, trigger: &str, subcommand: SubCommand) -> Self {
        self.insert(trigger, subcommand);
        self
    }

    pub fn insert(&mut self, trigger: &str, subcommand: SubCommand) -> Option<SubCommand> {
        let trigger = trigger.to_lowercase();
        let previous = self.entries.insert(trigger.clone(), subcommand);
        if previous.is_some() {
            warn!("Sub-command trigger '{trigger}' declared twice; keeping the last declaration");
        }
        previous
    }

    pub fn get(&self, trigger: &str) -> Option<&SubCommand> {
        self.entries.get(&trigger.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by trigger
    pub fn sorted(&self) -> Vec<(&str, &SubCommand)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(trigger, sub)| (trigger.as_str(), sub))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// A text command.
///
/// Commands are built once by their factory, registered under their lower-cased
/// name and shared across every invocation afterwards.
///
/// # Example
///
/// ```ignore
/// pub struct PingCommand {
///     properties: CommandProperties,
/// }
///
/// #[async_trait]
/// impl Command for PingCommand {
///     fn name(&self) -> &str {
///         "ping"
///     }
///
///     fn properties(&self) -> &CommandProperties {
///         &self.properties
///     }
///
///     async fn execute(&self, ctx: CommandContext) -> Result<()> {
///         ctx.reply("Pong!").await
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn properties(&self) -> &CommandProperties;

    /// Sub-commands selected by the first argument word
    fn subcommands(&self) -> Option<&SubCommands> {
        None
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()>;

    /// Release resources held by the command. Called when it is unregistered.
    fn destroy(&self) {}
}

/// Builds a command from configuration.
///
/// Factories return [`CommandInitError::Unavailable`] when a prerequisite
/// (credential, channel, URL) is missing.
pub type CommandFactory = fn(&Config) -> Result<Arc<dyn Command>>;

#[derive(Clone, Copy)]
pub struct CommandSource {
    pub name: &'static str,
    pub build: CommandFactory,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandInitError {
    #[error("command unavailable: {0}")]
    Unavailable(String),
}

impl CommandInitError {
    pub fn unavailable(reason: impl Into<String>) -> anyhow::Error {
        CommandInitError::Unavailable(reason.into()).into()
    }
}

/// Split text at the first run of whitespace. Both halves are trimmed.
pub fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    }
}

/// Route an invocation to a sub-command when the first argument names one,
/// otherwise to the command itself.
pub async fn run_checks(command: Arc<dyn Command>, ctx: CommandContext) -> Result<()> {
    if let Some(subcommands) = command.subcommands() {
        let (trigger, rest) = split_first_word(&ctx.args);
        if let Some(subcommand) = subcommands.get(trigger) {
            let rest = rest.to_string();
            return subcommand.invoke(ctx.with_args(rest)).await;
        }
    }

    command.execute(ctx).await
}
