//! # Feature: Session Monitor
//!
//! Tears voice sessions down once the last human listener leaves, drops
//! session records for guilds the bot is removed from, and leaves newly
//! joined guilds that are mostly bots.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Leave bot-farm guilds on join
//! - 1.1.0: Moving out of the bot's channel counts as leaving it
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{debug, info};
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;

use super::manager::SessionManager;
use crate::gateway::{Gateway, MemberCounts};

/// Share of bot accounts above which a newly joined guild is left.
pub const MAX_BOT_RATIO: f64 = 0.6;

/// More than [`MAX_BOT_RATIO`] of the members are bots. Empty guilds never are.
pub fn is_bot_farm(counts: MemberCounts) -> bool {
    let total = counts.total();
    total > 0 && counts.bots as f64 / total as f64 > MAX_BOT_RATIO
}

/// A member left (or moved out of) a voice channel.
#[derive(Debug, Clone, Copy)]
pub struct VoiceLeave {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub member_is_bot: bool,
}

pub struct SessionMonitor {
    sessions: Arc<SessionManager>,
}

impl SessionMonitor {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Returns true when the session was torn down.
    pub async fn on_voice_leave(&self, event: VoiceLeave, gateway: &dyn Gateway) -> Result<bool> {
        if event.member_is_bot {
            return Ok(false);
        }

        if !self.sessions.contains(event.guild_id) {
            return Ok(false);
        }

        let Some(connected) = gateway.connected_voice_channel(event.guild_id) else {
            debug!(
                "Guild {} has a session but no connected voice channel",
                event.guild_id
            );
            return Ok(false);
        };

        let listeners = gateway.human_listeners(event.guild_id, connected);
        if listeners > 0 {
            debug!(
                "{listeners} listener(s) remain in {connected} for guild {}",
                event.guild_id
            );
            return Ok(false);
        }

        info!(
            "🔇 Voice channel {connected} in guild {} is empty, ending session",
            event.guild_id
        );
        self.sessions.remove(event.guild_id);
        gateway.close_voice_connection(event.guild_id).await?;

        Ok(true)
    }

    /// The bot was added to a guild. Returns true when it left again.
    pub async fn on_guild_join(&self, guild_id: GuildId, gateway: &dyn Gateway) -> Result<bool> {
        let Some(counts) = gateway.member_counts(guild_id) else {
            debug!("Guild {guild_id} is not cached; skipping member check");
            return Ok(false);
        };

        if !is_bot_farm(counts) {
            return Ok(false);
        }

        info!(
            "🤖 Leaving guild {guild_id}: {} of {} members are bots",
            counts.bots,
            counts.total()
        );
        gateway.leave_guild(guild_id).await?;

        Ok(true)
    }

    /// The bot was removed from the guild; its connection is already gone.
    pub fn on_guild_remove(&self, guild_id: GuildId) {
        if self.sessions.remove(guild_id).is_some() {
            info!("Dropped session for removed guild {guild_id}");
        }
    }
}
