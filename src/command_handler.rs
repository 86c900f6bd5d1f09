//! Inbound message dispatch
//!
//! Gates every guild message, extracts the invocation (prefix or self-mention),
//! resolves the command and hands it off. Dropped events are only logged;
//! the invoking user never sees why.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Prefix and mention invocations routed through the command registry
//! - 2.0.0: Request ids on every log line
//! - 1.0.0: Initial implementation

use log::{debug, error, info, warn};
use serenity::model::id::UserId;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::context::{CommandContext, Services};
use crate::commands::handler::{run_checks, split_first_word};
use crate::gateway::{Gateway, InboundMessage};

/// Why a message did not reach a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    GuildUnavailable,
    AutomatedAuthor,
    CannotSend,
    Blocked,
    StorageError,
    NotInvocation,
    UnknownCommand,
    AccessDenied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Dispatched { command: String },
}

/// A parsed attempt to run a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub raw: String,
    /// Lower-cased command token
    pub command: String,
    pub args: String,
    /// Length of the consumed prefix or mention
    pub trigger_len: usize,
}

/// Extract an invocation from message text.
///
/// A leading self-mention (`<@id>` or `<@!id>`) takes precedence over the
/// prefix and must be followed by whitespace and at least one more token.
pub fn parse_invocation(content: &str, prefix: &str, bot_id: UserId) -> Option<Invocation> {
    let trigger_len = match mention_len(content, bot_id) {
        Some(len) => {
            let rest = &content[len..];
            if !rest.starts_with(char::is_whitespace) || rest.trim().is_empty() {
                return None;
            }
            len
        }
        None if !prefix.is_empty() && content.starts_with(prefix) => prefix.len(),
        None => return None,
    };

    let (token, args) = split_first_word(&content[trigger_len..]);
    if token.is_empty() {
        return None;
    }

    Some(Invocation {
        raw: content.to_string(),
        command: token.to_lowercase(),
        args: args.to_string(),
        trigger_len,
    })
}

fn mention_len(content: &str, bot_id: UserId) -> Option<usize> {
    [format!("<@{}>", bot_id.0), format!("<@!{}>", bot_id.0)]
        .into_iter()
        .find(|mention| content.starts_with(mention.as_str()))
        .map(|mention| mention.len())
}

pub struct CommandHandler {
    services: Arc<Services>,
}

impl CommandHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Run the gates in order, then hand the invocation to its command.
    ///
    /// Command failures are logged and never surface to the caller.
    pub async fn handle_message(&self, gateway: Arc<dyn Gateway>, msg: InboundMessage) -> Outcome {
        let request_id = Uuid::new_v4();

        if !gateway.guild_available(msg.guild_id) {
            return ignore(request_id, IgnoreReason::GuildUnavailable);
        }

        if msg.author_is_bot || msg.author_is_synthetic {
            return ignore(request_id, IgnoreReason::AutomatedAuthor);
        }

        if !gateway.can_send_to(msg.guild_id, msg.channel_id) {
            return ignore(request_id, IgnoreReason::CannotSend);
        }

        let storage = &self.services.storage;
        match storage.is_blocked(msg.author_id) {
            Ok(false) => {}
            Ok(true) => return ignore(request_id, IgnoreReason::Blocked),
            Err(e) => {
                warn!("[{request_id}] ⚠️ Block list lookup failed for {}: {e:#}", msg.author_id);
                return ignore(request_id, IgnoreReason::StorageError);
            }
        }

        let prefix = match storage.prefix(msg.guild_id) {
            Ok(prefix) => prefix,
            Err(e) => {
                warn!("[{request_id}] ⚠️ Prefix lookup failed for guild {}: {e:#}", msg.guild_id);
                return ignore(request_id, IgnoreReason::StorageError);
            }
        };

        let Some(invocation) = parse_invocation(&msg.content, &prefix, gateway.current_user_id())
        else {
            return ignore(request_id, IgnoreReason::NotInvocation);
        };

        let Some(command) = self.services.registry.resolve(&invocation.command) else {
            return ignore(request_id, IgnoreReason::UnknownCommand);
        };

        if command.properties().developer_only && !self.services.deployment.is_owner(msg.author_id) {
            return ignore(request_id, IgnoreReason::AccessDenied);
        }

        let name = command.name().to_string();
        info!(
            "[{request_id}] 🎯 {} | User: {} | Channel: {} | Guild: {}",
            name, msg.author_id, msg.channel_id, msg.guild_id
        );

        let ctx = CommandContext {
            message: msg,
            args: invocation.args,
            prefix,
            request_id,
            gateway,
            services: self.services.clone(),
        };

        match run_checks(command, ctx).await {
            Ok(()) => debug!("[{request_id}] ✅ {name} completed"),
            Err(e) => error!("[{request_id}] ❌ {name} failed: {e:#}"),
        }

        Outcome::Dispatched { command: name }
    }
}

fn ignore(request_id: Uuid, reason: IgnoreReason) -> Outcome {
    debug!("[{request_id}] ℹ️ Message ignored: {reason:?}");
    Outcome::Ignored(reason)
}
