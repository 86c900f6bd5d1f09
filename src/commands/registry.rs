//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Factory-based build with conditional enablement, alias resolution
//! - 1.0.0: Initial implementation for handler dispatch

use dashmap::DashMap;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{Command, CommandInitError, CommandSource};
use crate::core::Config;

/// Registry mapping lower-cased command names to commands
///
/// Built once at start-up. Afterwards it is only read, except for the one-time
/// removal of hosted-only commands during start-up reconciliation.
///
/// # Example
///
/// ```ignore
/// let registry = CommandRegistry::build(&handlers::command_sources(), &config);
///
/// if let Some(command) = registry.resolve("p") {
///     run_checks(command, ctx).await?;
/// }
/// ```
pub struct CommandRegistry {
    commands: DashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: DashMap::new(),
        }
    }

    /// Instantiate every source and register the commands that are enabled
    ///
    /// A source failing with [`CommandInitError::Unavailable`] is skipped
    /// quietly; any other failure is logged and skipped.
    pub fn build(sources: &[CommandSource], config: &Config) -> Self {
        let registry = Self::new();

        for source in sources {
            let command = match (source.build)(config) {
                Ok(command) => command,
                Err(e) if e.downcast_ref::<CommandInitError>().is_some() => {
                    debug!("Command {} skipped: {e}", source.name);
                    continue;
                }
                Err(e) => {
                    warn!("Command {} failed to load: {e:#}", source.name);
                    continue;
                }
            };

            let properties = command.properties();
            if !properties.enabled || (properties.nsfw && !config.nsfw_enabled) {
                debug!("Command {} is disabled", command.name());
                continue;
            }

            if let Some(subcommands) = command.subcommands() {
                debug!(
                    "Command {} declares {} sub-commands",
                    command.name(),
                    subcommands.len()
                );
            }

            if let Some(previous) = registry.insert(command) {
                warn!("Command {} registered twice; keeping the later one", previous.name());
            }
        }

        registry.warn_alias_collisions();
        info!("Loaded {} commands!", registry.len());

        registry
    }

    /// Register a command under its lower-cased name, returning any command it replaced
    pub fn insert(&self, command: Arc<dyn Command>) -> Option<Arc<dyn Command>> {
        self.commands.insert(command.name().to_lowercase(), command)
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .remove(&name.to_lowercase())
            .map(|(_, command)| command)
    }

    /// Look a token up by name, then by alias
    pub fn resolve(&self, token: &str) -> Option<Arc<dyn Command>> {
        let token = token.to_lowercase();

        if let Some(command) = self.commands.get(&token) {
            return Some(command.value().clone());
        }

        self.commands
            .iter()
            .find(|entry| entry.value().properties().aliases.contains(&token))
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered commands ordered by name
    pub fn commands(&self) -> Vec<Arc<dyn Command>> {
        let mut commands: Vec<_> = self
            .commands
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Aliases claimed by more than one command, or shadowed by a command name,
    /// resolve ambiguously.
    fn warn_alias_collisions(&self) {
        let mut claims: HashMap<String, Vec<String>> = HashMap::new();
        for entry in self.commands.iter() {
            for alias in &entry.value().properties().aliases {
                claims
                    .entry(alias.clone())
                    .or_default()
                    .push(entry.key().clone());
            }
        }

        for (alias, owners) in claims {
            if owners.len() > 1 {
                warn!("Alias '{alias}' is claimed by several commands: {owners:?}");
            }
            if self.commands.contains_key(&alias) {
                warn!("Alias '{alias}' is shadowed by the command of the same name");
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
