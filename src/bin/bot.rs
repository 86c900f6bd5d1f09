use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, UnavailableGuild};
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use songbird::SerenityInit;
use std::sync::Arc;

use jukebox::commands::{command_sources, CommandHandler, CommandRegistry, Services};
use jukebox::core::Config;
use jukebox::database::{Database, Storage};
use jukebox::features::audio::AudioSettings;
use jukebox::features::pledges::{HttpRoster, RosterSource};
use jukebox::features::sessions::{SessionManager, SessionMonitor, VoiceLeave};
use jukebox::features::startup::{Deployment, StartupCoordinator};
use jukebox::gateway::discord::inbound_message;
use jukebox::gateway::{Gateway, SerenityGateway};

struct Handler {
    command_handler: Arc<CommandHandler>,
    session_monitor: SessionMonitor,
    startup: StartupCoordinator,
}

impl Handler {
    fn gateway(ctx: &Context) -> Arc<dyn Gateway> {
        Arc::new(SerenityGateway::new(ctx.clone()))
    }

    /// The member was in a channel before this update and no longer is.
    fn voice_leave(ctx: &Context, old: Option<&VoiceState>, new: &VoiceState) -> Option<VoiceLeave> {
        let left = old.and_then(|state| state.channel_id)?;
        if new.channel_id == Some(left) {
            return None;
        }

        let guild_id = new.guild_id.or_else(|| old.and_then(|state| state.guild_id))?;
        let member_is_bot = new
            .member
            .as_ref()
            .map(|member| member.user.bot)
            .or_else(|| ctx.cache.user(new.user_id).map(|user| user.bot))
            .unwrap_or(false);

        Some(VoiceLeave {
            guild_id,
            channel_id: left,
            member_is_bot,
        })
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        let Some(inbound) = inbound_message(&msg) else {
            return;
        };

        self.command_handler
            .handle_message(Self::gateway(&ctx), inbound)
            .await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        let gateway = Self::gateway(&ctx);
        match self.startup.on_ready(gateway.as_ref()).await {
            Ok(true) => info!("✅ Start-up reconciliation complete"),
            Ok(false) => debug!("Start-up reconciliation already done"),
            Err(e) => error!("❌ Start-up reconciliation failed: {e:#}"),
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let Some(event) = Self::voice_leave(&ctx, old.as_ref(), &new) else {
            return;
        };

        let gateway = Self::gateway(&ctx);
        if let Err(e) = self
            .session_monitor
            .on_voice_leave(event, gateway.as_ref())
            .await
        {
            error!("Failed to end session for guild {}: {e:#}", event.guild_id);
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        if !is_new {
            return;
        }

        info!("🆕 Joined new guild: {} ({})", guild.name, guild.id);
        let gateway = Self::gateway(&ctx);
        if let Err(e) = self
            .session_monitor
            .on_guild_join(guild.id, gateway.as_ref())
            .await
        {
            error!("Failed to leave guild {}: {e:#}", guild.id);
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // Outages arrive as deletes too; the guild comes back on its own
        if incomplete.unavailable {
            warn!("Guild {} became unavailable", incomplete.id);
            return;
        }

        self.session_monitor.on_guild_remove(incomplete.id);
    }
}

fn pledge_roster(config: &Config) -> Option<Arc<dyn RosterSource>> {
    let url = config.pledge_roster_url.clone()?;
    match HttpRoster::new(url, config.pledge_roster_token.clone()) {
        Ok(roster) => Some(Arc::new(roster)),
        Err(e) => {
            error!("❌ Pledge roster unavailable: {e:#}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Jukebox...");

    let storage: Arc<dyn Storage> =
        Arc::new(Database::open(&config.database_path, &config.default_prefix)?);
    info!("💾 Database opened at {}", config.database_path);

    let registry = Arc::new(CommandRegistry::build(&command_sources(), &config));
    let sessions = Arc::new(SessionManager::new());
    let deployment = Arc::new(Deployment::new());
    let audio = Arc::new(AudioSettings::new());

    let mut startup = StartupCoordinator::new(
        &config,
        registry.clone(),
        deployment.clone(),
        audio.clone(),
        storage.clone(),
    );
    if let Some(roster) = pledge_roster(&config) {
        startup = startup.with_roster(roster);
    }

    let services = Arc::new(Services {
        config: Arc::new(config.clone()),
        storage,
        registry,
        sessions: sessions.clone(),
        deployment,
        audio,
    });

    let handler = Handler {
        command_handler: Arc::new(CommandHandler::new(services)),
        session_monitor: SessionMonitor::new(sessions),
        startup,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird()
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
