//! # Gateway Layer
//!
//! The narrow surface the bot core needs from the chat platform. Event
//! handlers convert serenity events into the owned types here, and every call
//! back into Discord goes through [`Gateway`].
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Member counts and leaving guilds
//! - 1.1.0: Voice join/close and listener counting
//! - 1.0.0: Initial extraction from the event handler

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, UserId};

pub use discord::SerenityGateway;

/// A guild text message, detached from the serenity model.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub author_name: String,
    pub author_is_bot: bool,
    /// Webhook or system authored
    pub author_is_synthetic: bool,
    pub content: String,
}

/// Who runs this process, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentIdentity {
    pub owner_id: UserId,
    pub application_id: u64,
}

/// Cached guild membership split by account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberCounts {
    pub humans: usize,
    pub bots: usize,
}

impl MemberCounts {
    pub fn total(&self) -> usize {
        self.humans + self.bots
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    fn guild_available(&self, guild_id: GuildId) -> bool;

    fn current_user_id(&self) -> UserId;

    /// Whether the bot may post (messages and embeds) in the channel
    fn can_send_to(&self, guild_id: GuildId, channel_id: ChannelId) -> bool;

    fn is_guild_manager(&self, guild_id: GuildId, user_id: UserId) -> bool;

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()>;

    /// Voice channel the bot is currently connected to in the guild
    fn connected_voice_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    /// Non-bot members present in a voice channel
    fn human_listeners(&self, guild_id: GuildId, channel_id: ChannelId) -> usize;

    /// Join the voice channel `user_id` is in. `None` when the user is not in voice.
    async fn join_voice(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<ChannelId>>;

    async fn close_voice_connection(&self, guild_id: GuildId) -> Result<()>;

    async fn fetch_deployment_identity(&self) -> Result<DeploymentIdentity>;

    /// `None` when the guild is not cached
    fn member_counts(&self, guild_id: GuildId) -> Option<MemberCounts>;

    async fn leave_guild(&self, guild_id: GuildId) -> Result<()>;
}
