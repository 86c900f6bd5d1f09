//! Voice session command handlers
//!
//! Handles: join, leave

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandProperties};
use crate::core::Config;

pub struct JoinCommand {
    properties: CommandProperties,
}

pub struct LeaveCommand {
    properties: CommandProperties,
}

pub fn build_join(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(JoinCommand {
        properties: CommandProperties::new("Join your voice channel").aliases(&["summon"]),
    }))
}

pub fn build_leave(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(LeaveCommand {
        properties: CommandProperties::new("Leave the voice channel")
            .aliases(&["disconnect", "dc"]),
    }))
}

#[async_trait]
impl Command for JoinCommand {
    fn name(&self) -> &str {
        "join"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let guild_id = ctx.message.guild_id;

        let Some(voice_channel) = ctx
            .gateway
            .join_voice(guild_id, ctx.message.author_id)
            .await?
        else {
            return ctx.reply("Join a voice channel first.").await;
        };

        ctx.services
            .sessions
            .register(guild_id, voice_channel, ctx.message.channel_id);
        info!("[{}] Joined voice channel {voice_channel} in guild {guild_id}", ctx.request_id);

        ctx.reply(&format!("Joined <#{}>", voice_channel.0)).await
    }
}

#[async_trait]
impl Command for LeaveCommand {
    fn name(&self) -> &str {
        "leave"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let guild_id = ctx.message.guild_id;

        let had_session = ctx.services.sessions.remove(guild_id).is_some();
        if !had_session && ctx.gateway.connected_voice_channel(guild_id).is_none() {
            return ctx.reply("I'm not in a voice channel.").await;
        }

        ctx.gateway.close_voice_connection(guild_id).await?;
        ctx.reply("Disconnected.").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::{context_for, services};
    use crate::testing::{MockGateway, GUILD, TEXT_CHANNEL, VOICE_CHANNEL};
    use serenity::model::id::UserId;

    const LISTENER: UserId = UserId(5);

    #[tokio::test]
    async fn test_join_registers_session() {
        let gateway = Arc::new(MockGateway::new());
        gateway.user_voice.lock().unwrap().insert(LISTENER, VOICE_CHANNEL);
        let services = services();

        build_join(&Config::for_tests())
            .unwrap()
            .execute(context_for(gateway.clone(), services.clone(), LISTENER, ""))
            .await
            .unwrap();

        let session = services.sessions.get(GUILD).unwrap();
        assert_eq!(session.voice_channel_id, VOICE_CHANNEL);
        assert_eq!(session.text_channel_id, TEXT_CHANNEL);
        assert_eq!(gateway.sent_messages(), vec![format!("Joined <#{}>", VOICE_CHANNEL.0)]);
    }

    #[tokio::test]
    async fn test_join_requires_voice_channel() {
        let gateway = Arc::new(MockGateway::new());
        let services = services();

        build_join(&Config::for_tests())
            .unwrap()
            .execute(context_for(gateway.clone(), services.clone(), LISTENER, ""))
            .await
            .unwrap();

        assert!(services.sessions.is_empty());
        assert_eq!(gateway.sent_messages(), vec!["Join a voice channel first."]);
    }

    #[tokio::test]
    async fn test_leave_closes_session() {
        let gateway = Arc::new(MockGateway::new());
        gateway.connect(GUILD, VOICE_CHANNEL, 1);
        let services = services();
        services.sessions.register(GUILD, VOICE_CHANNEL, TEXT_CHANNEL);

        build_leave(&Config::for_tests())
            .unwrap()
            .execute(context_for(gateway.clone(), services.clone(), LISTENER, ""))
            .await
            .unwrap();

        assert!(!services.sessions.contains(GUILD));
        assert_eq!(gateway.closed_guilds(), vec![GUILD]);
        assert_eq!(gateway.sent_messages(), vec!["Disconnected."]);
    }

    #[tokio::test]
    async fn test_leave_when_not_connected() {
        let gateway = Arc::new(MockGateway::new());

        build_leave(&Config::for_tests())
            .unwrap()
            .execute(context_for(gateway.clone(), services(), LISTENER, ""))
            .await
            .unwrap();

        assert!(gateway.closed_guilds().is_empty());
        assert_eq!(gateway.sent_messages(), vec!["I'm not in a voice channel."]);
    }
}
