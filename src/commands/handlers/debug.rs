//! Handles: debug
//!
//! Developer-only snapshot of the running bot.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandProperties};
use crate::core::Config;

pub struct DebugCommand {
    properties: CommandProperties,
}

pub fn build(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(DebugCommand {
        properties: CommandProperties::new("Show runtime diagnostics").developer_only(),
    }))
}

#[async_trait]
impl Command for DebugCommand {
    fn name(&self) -> &str {
        "debug"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let services = &ctx.services;

        let mode = match services.deployment.mode() {
            Some(mode) if mode.self_hosted => format!("self-hosted (app {})", mode.application_id),
            Some(mode) => format!("hosted (app {})", mode.application_id),
            None => "starting".to_string(),
        };

        let this_guild = match services.sessions.get(ctx.message.guild_id) {
            Some(session) => format!(
                "<#{}> for {}m",
                session.voice_channel_id.0,
                (Utc::now() - session.started_at).num_minutes()
            ),
            None => "none".to_string(),
        };

        let report = format!(
            "**Debug**\nVersion: {}\nCommands: {}\nSessions: {} (this server: {})\nDeployment: {}\nResampling: {}",
            env!("CARGO_PKG_VERSION"),
            services.registry.len(),
            services.sessions.len(),
            this_guild,
            mode,
            services.audio.resampling_quality(),
        );

        ctx.reply(&report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::{context_for, services};
    use crate::features::startup::DeploymentMode;
    use crate::testing::{MockGateway, GUILD, OWNER_ID, TEXT_CHANNEL, VOICE_CHANNEL};

    #[tokio::test]
    async fn test_debug_report() {
        let gateway = Arc::new(MockGateway::new());
        let services = services();
        services.registry.insert(build(&Config::for_tests()).unwrap());
        services.sessions.register(GUILD, VOICE_CHANNEL, TEXT_CHANNEL);

        let command = build(&Config::for_tests()).unwrap();
        command
            .execute(context_for(gateway.clone(), services.clone(), OWNER_ID, ""))
            .await
            .unwrap();

        let report = gateway.sent_messages().join("\n");
        assert!(report.contains("Commands: 1"));
        assert!(report.contains(&format!("Sessions: 1 (this server: <#{}> for 0m)", VOICE_CHANNEL.0)));
        assert!(report.contains("Deployment: starting"));
        assert!(report.contains("Resampling: medium"));

        services.deployment.publish(DeploymentMode {
            owner_id: OWNER_ID,
            application_id: 9,
            self_hosted: true,
        });
        command
            .execute(context_for(gateway.clone(), services.clone(), OWNER_ID, ""))
            .await
            .unwrap();
        assert!(gateway.sent_messages()[1].contains("Deployment: self-hosted (app 9)"));

        services.sessions.remove(GUILD);
        command
            .execute(context_for(gateway.clone(), services, OWNER_ID, ""))
            .await
            .unwrap();
        assert!(gateway.sent_messages()[2].contains("Sessions: 0 (this server: none)"));
    }
}
