//! In-memory doubles for the gateway and storage collaborators.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::database::Storage;
use crate::gateway::{DeploymentIdentity, Gateway, InboundMessage, MemberCounts};

pub const BOT_ID: UserId = UserId(1000);
pub const OWNER_ID: UserId = UserId(1);
pub const GUILD: GuildId = GuildId(500);
pub const TEXT_CHANNEL: ChannelId = ChannelId(600);
pub const VOICE_CHANNEL: ChannelId = ChannelId(700);

pub fn message(author: UserId, content: &str) -> InboundMessage {
    InboundMessage {
        guild_id: GUILD,
        channel_id: TEXT_CHANNEL,
        author_id: author,
        author_name: format!("user{}", author.0),
        author_is_bot: false,
        author_is_synthetic: false,
        content: content.to_string(),
    }
}

#[derive(Default)]
pub struct MockGateway {
    pub unavailable_guilds: Mutex<HashSet<GuildId>>,
    pub muted_channels: Mutex<HashSet<ChannelId>>,
    pub managers: Mutex<HashSet<UserId>>,
    pub sent: Mutex<Vec<(ChannelId, String)>>,
    pub connected: Mutex<HashMap<GuildId, ChannelId>>,
    pub listeners: Mutex<HashMap<ChannelId, usize>>,
    pub user_voice: Mutex<HashMap<UserId, ChannelId>>,
    pub closed: Mutex<Vec<GuildId>>,
    pub identity: Mutex<Option<DeploymentIdentity>>,
    pub identity_fetches: AtomicUsize,
    pub members: Mutex<HashMap<GuildId, MemberCounts>>,
    pub left: Mutex<Vec<GuildId>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(application_id: u64) -> Self {
        let gateway = Self::new();
        *gateway.identity.lock().unwrap() = Some(DeploymentIdentity {
            owner_id: OWNER_ID,
            application_id,
        });
        gateway
    }

    pub fn connect(&self, guild_id: GuildId, channel_id: ChannelId, listeners: usize) {
        self.connected.lock().unwrap().insert(guild_id, channel_id);
        self.listeners.lock().unwrap().insert(channel_id, listeners);
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn closed_guilds(&self) -> Vec<GuildId> {
        self.closed.lock().unwrap().clone()
    }

    pub fn left_guilds(&self) -> Vec<GuildId> {
        self.left.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn guild_available(&self, guild_id: GuildId) -> bool {
        !self.unavailable_guilds.lock().unwrap().contains(&guild_id)
    }

    fn current_user_id(&self) -> UserId {
        BOT_ID
    }

    fn can_send_to(&self, _guild_id: GuildId, channel_id: ChannelId) -> bool {
        !self.muted_channels.lock().unwrap().contains(&channel_id)
    }

    fn is_guild_manager(&self, _guild_id: GuildId, user_id: UserId) -> bool {
        self.managers.lock().unwrap().contains(&user_id)
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        self.sent.lock().unwrap().push((channel_id, content.to_string()));
        Ok(())
    }

    fn connected_voice_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.connected.lock().unwrap().get(&guild_id).copied()
    }

    fn human_listeners(&self, _guild_id: GuildId, channel_id: ChannelId) -> usize {
        self.listeners.lock().unwrap().get(&channel_id).copied().unwrap_or(0)
    }

    async fn join_voice(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<ChannelId>> {
        let target = self.user_voice.lock().unwrap().get(&user_id).copied();
        if let Some(channel_id) = target {
            self.connected.lock().unwrap().insert(guild_id, channel_id);
        }
        Ok(target)
    }

    async fn close_voice_connection(&self, guild_id: GuildId) -> Result<()> {
        self.connected.lock().unwrap().remove(&guild_id);
        self.closed.lock().unwrap().push(guild_id);
        Ok(())
    }

    async fn fetch_deployment_identity(&self) -> Result<DeploymentIdentity> {
        self.identity_fetches.fetch_add(1, Ordering::SeqCst);
        (*self.identity.lock().unwrap())
            .ok_or_else(|| anyhow::anyhow!("application info unavailable"))
    }

    fn member_counts(&self, guild_id: GuildId) -> Option<MemberCounts> {
        self.members.lock().unwrap().get(&guild_id).copied()
    }

    async fn leave_guild(&self, guild_id: GuildId) -> Result<()> {
        self.left.lock().unwrap().push(guild_id);
        Ok(())
    }
}

pub struct MemoryStorage {
    default_prefix: String,
    prefixes: DashMap<GuildId, String>,
    blocked: DashSet<UserId>,
    pledges: DashMap<UserId, u32>,
}

impl MemoryStorage {
    pub fn new(default_prefix: &str) -> Self {
        Self {
            default_prefix: default_prefix.to_string(),
            prefixes: DashMap::new(),
            blocked: DashSet::new(),
            pledges: DashMap::new(),
        }
    }
}

impl Storage for MemoryStorage {
    fn prefix(&self, guild_id: GuildId) -> Result<String> {
        Ok(self
            .prefixes
            .get(&guild_id)
            .map(|p| p.value().clone())
            .unwrap_or_else(|| self.default_prefix.clone()))
    }

    fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> Result<()> {
        self.prefixes.insert(guild_id, prefix.to_string());
        Ok(())
    }

    fn reset_prefix(&self, guild_id: GuildId) -> Result<()> {
        self.prefixes.remove(&guild_id);
        Ok(())
    }

    fn is_blocked(&self, user_id: UserId) -> Result<bool> {
        Ok(self.blocked.contains(&user_id))
    }

    fn block(&self, user_id: UserId) -> Result<()> {
        self.blocked.insert(user_id);
        Ok(())
    }

    fn unblock(&self, user_id: UserId) -> Result<bool> {
        Ok(self.blocked.remove(&user_id).is_some())
    }

    fn pledge_tier(&self, user_id: UserId) -> Result<Option<u32>> {
        Ok(self.pledges.get(&user_id).map(|t| *t.value()))
    }

    fn set_pledge(&self, user_id: UserId, tier: u32) -> Result<()> {
        self.pledges.insert(user_id, tier);
        Ok(())
    }

    fn remove_pledge(&self, user_id: UserId) -> Result<()> {
        self.pledges.remove(&user_id);
        Ok(())
    }

    fn pledged_users(&self) -> Result<Vec<UserId>> {
        Ok(self.pledges.iter().map(|entry| *entry.key()).collect())
    }
}
