//! Serenity + songbird backed [`Gateway`].

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Context;
use songbird::error::JoinError;
use songbird::Songbird;
use std::sync::Arc;

use super::{DeploymentIdentity, Gateway, InboundMessage, MemberCounts};

#[derive(Clone)]
pub struct SerenityGateway {
    ctx: Context,
}

impl SerenityGateway {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    async fn voice_manager(&self) -> Result<Arc<Songbird>> {
        songbird::get(&self.ctx)
            .await
            .ok_or_else(|| anyhow::anyhow!("Songbird voice client was not registered"))
    }
}

/// Convert a serenity message into the dispatcher's owned form.
///
/// Returns `None` for direct messages; only guild traffic is dispatched.
pub fn inbound_message(msg: &Message) -> Option<InboundMessage> {
    let guild_id = msg.guild_id?;

    Some(InboundMessage {
        guild_id,
        channel_id: msg.channel_id,
        author_id: msg.author.id,
        author_name: msg.author.name.clone(),
        author_is_bot: msg.author.bot,
        author_is_synthetic: msg.webhook_id.is_some() || msg.author.system,
        content: msg.content.clone(),
    })
}

#[async_trait]
impl Gateway for SerenityGateway {
    fn guild_available(&self, guild_id: GuildId) -> bool {
        self.ctx.cache.guild_field(guild_id, |_| ()).is_some()
    }

    fn current_user_id(&self) -> UserId {
        self.ctx.cache.current_user_id()
    }

    fn can_send_to(&self, _guild_id: GuildId, channel_id: ChannelId) -> bool {
        let Some(channel) = self.ctx.cache.guild_channel(channel_id) else {
            return false;
        };

        match channel.permissions_for_user(&self.ctx.cache, self.ctx.cache.current_user_id()) {
            Ok(permissions) => permissions.send_messages() && permissions.embed_links(),
            Err(e) => {
                debug!("Permission lookup failed for channel {channel_id}: {e}");
                false
            }
        }
    }

    fn is_guild_manager(&self, guild_id: GuildId, user_id: UserId) -> bool {
        self.ctx
            .cache
            .member(guild_id, user_id)
            .and_then(|member| member.permissions(&self.ctx.cache).ok())
            .map(|permissions| permissions.manage_guild())
            .unwrap_or(false)
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        channel_id.say(&self.ctx.http, content).await?;
        Ok(())
    }

    fn connected_voice_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let me = self.ctx.cache.current_user_id();
        self.ctx
            .cache
            .guild_field(guild_id, |guild| {
                guild.voice_states.get(&me).and_then(|state| state.channel_id)
            })
            .flatten()
    }

    fn human_listeners(&self, guild_id: GuildId, channel_id: ChannelId) -> usize {
        self.ctx
            .cache
            .guild_field(guild_id, |guild| {
                guild
                    .voice_states
                    .values()
                    .filter(|state| state.channel_id == Some(channel_id))
                    .filter(|state| {
                        let is_bot = state
                            .member
                            .as_ref()
                            .or_else(|| guild.members.get(&state.user_id))
                            .map(|member| member.user.bot)
                            .unwrap_or(false);
                        !is_bot
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    async fn join_voice(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<ChannelId>> {
        let target = self
            .ctx
            .cache
            .guild_field(guild_id, |guild| {
                guild.voice_states.get(&user_id).and_then(|state| state.channel_id)
            })
            .flatten();

        let Some(channel_id) = target else {
            return Ok(None);
        };

        let manager = self.voice_manager().await?;
        let (_call, joined) = manager.join(guild_id, channel_id).await;
        joined?;

        Ok(Some(channel_id))
    }

    async fn close_voice_connection(&self, guild_id: GuildId) -> Result<()> {
        let manager = self.voice_manager().await?;
        match manager.remove(guild_id).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => {
                warn!("Failed to close voice connection for guild {guild_id}: {e}");
                Err(e.into())
            }
        }
    }

    async fn fetch_deployment_identity(&self) -> Result<DeploymentIdentity> {
        let info = self.ctx.http.get_current_application_info().await?;

        Ok(DeploymentIdentity {
            owner_id: info.owner.id,
            application_id: info.id.0,
        })
    }

    fn member_counts(&self, guild_id: GuildId) -> Option<MemberCounts> {
        self.ctx.cache.guild_field(guild_id, |guild| {
            let bots = guild.members.values().filter(|member| member.user.bot).count();
            MemberCounts {
                humans: guild.members.len() - bots,
                bots,
            }
        })
    }

    async fn leave_guild(&self, guild_id: GuildId) -> Result<()> {
        guild_id.leave(&self.ctx.http).await?;
        Ok(())
    }
}
