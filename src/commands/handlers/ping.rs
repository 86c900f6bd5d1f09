//! Handles: ping

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandProperties};
use crate::core::Config;

pub struct PingCommand {
    properties: CommandProperties,
}

pub fn build(_config: &Config) -> Result<Arc<dyn Command>> {
    Ok(Arc::new(PingCommand {
        properties: CommandProperties::new("Check that the bot is responding"),
    }))
}

#[async_trait]
impl Command for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        ctx.reply("Pong!").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::context;
    use crate::testing::MockGateway;

    #[tokio::test]
    async fn test_ping_replies() {
        let gateway = Arc::new(MockGateway::new());
        let command = build(&Config::for_tests()).unwrap();

        command.execute(context(gateway.clone(), "")).await.unwrap();

        assert_eq!(gateway.sent_messages(), vec!["Pong!"]);
    }
}
