use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::info;
use serenity::model::id::{ChannelId, GuildId};

#[derive(Debug, Clone)]
pub struct Session {
    pub guild_id: GuildId,
    pub voice_channel_id: ChannelId,
    pub text_channel_id: ChannelId,
    pub started_at: DateTime<Utc>,
}

/// Active voice sessions keyed by guild.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: DashMap<GuildId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Record a session, replacing any previous one for the guild
    pub fn register(&self, guild_id: GuildId, voice_channel_id: ChannelId, text_channel_id: ChannelId) {
        self.sessions.insert(
            guild_id,
            Session {
                guild_id,
                voice_channel_id,
                text_channel_id,
                started_at: Utc::now(),
            },
        );
        info!("Registered session for guild: {guild_id}, voice_channel: {voice_channel_id}");
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Session> {
        self.sessions.get(&guild_id).map(|r| r.value().clone())
    }

    pub fn contains(&self, guild_id: GuildId) -> bool {
        self.sessions.contains_key(&guild_id)
    }

    pub fn remove(&self, guild_id: GuildId) -> Option<Session> {
        let removed = self.sessions.remove(&guild_id).map(|(_, session)| session);
        if removed.is_some() {
            info!("Removed session for guild: {guild_id}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
