//! Shared services and per-invocation context for commands
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Split long-lived services from the per-invocation context
//! - 1.0.0: Initial implementation with core shared state

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use super::registry::CommandRegistry;
use crate::core::Config;
use crate::database::Storage;
use crate::features::audio::AudioSettings;
use crate::features::sessions::SessionManager;
use crate::features::startup::Deployment;
use crate::gateway::{Gateway, InboundMessage};

/// Long-lived services shared by the dispatcher and every command.
pub struct Services {
    pub config: Arc<Config>,
    pub storage: Arc<dyn Storage>,
    pub registry: Arc<CommandRegistry>,
    pub sessions: Arc<SessionManager>,
    pub deployment: Arc<Deployment>,
    pub audio: Arc<AudioSettings>,
}

/// One invocation: the originating message, its argument text and the
/// guild's effective prefix.
#[derive(Clone)]
pub struct CommandContext {
    pub message: InboundMessage,
    pub args: String,
    pub prefix: String,
    pub request_id: Uuid,
    pub gateway: Arc<dyn Gateway>,
    pub services: Arc<Services>,
}

impl CommandContext {
    /// Same invocation with different argument text (sub-command routing)
    pub fn with_args(self, args: String) -> Self {
        Self { args, ..self }
    }

    /// Send a message to the channel the invocation came from
    pub async fn reply(&self, content: &str) -> Result<()> {
        self.gateway
            .send_message(self.message.channel_id, content)
            .await
    }

    pub fn is_owner(&self) -> bool {
        self.services.deployment.is_owner(self.message.author_id)
    }
}
