//! Handles: feedback
//!
//! Forwards user feedback to the maintainers' channel through a background
//! worker so a slow send never holds up the invoking command. The worker is
//! spawned on first use. [`Command::destroy`] closes its queue; reports
//! already queued are still delivered.

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};
use serenity::model::id::ChannelId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{Command, CommandInitError, CommandProperties};
use crate::core::Config;
use crate::features::rate_limiting::RateLimiter;
use crate::gateway::Gateway;

const RATE_LIMIT_SCOPE: &str = "feedback";
const MAX_SUBMISSIONS: usize = 2;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10 * 60);
const MAX_FEEDBACK_CHARS: usize = 1900;

pub struct FeedbackCommand {
    properties: CommandProperties,
    channel_id: ChannelId,
    limiter: RateLimiter,
    worker: Mutex<Option<mpsc::UnboundedSender<String>>>,
    destroyed: AtomicBool,
}

pub fn build(config: &Config) -> Result<Arc<dyn Command>> {
    let channel_id = config
        .feedback_channel_id
        .ok_or_else(|| CommandInitError::unavailable("FEEDBACK_CHANNEL_ID is not set"))?;

    Ok(Arc::new(FeedbackCommand::new(channel_id)))
}

impl FeedbackCommand {
    fn new(channel_id: ChannelId) -> Self {
        Self {
            properties: CommandProperties::new("Send feedback to the developers"),
            channel_id,
            limiter: RateLimiter::new(MAX_SUBMISSIONS, RATE_LIMIT_WINDOW),
            worker: Mutex::new(None),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Queue a report, spawning the worker if needed. Returns false once destroyed.
    fn submit(&self, gateway: &Arc<dyn Gateway>, report: String) -> bool {
        if self.destroyed.load(Ordering::Acquire) {
            return false;
        }

        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        let sender = worker.get_or_insert_with(|| self.spawn_worker(gateway.clone()));

        match sender.send(report) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to queue feedback: {e}");
                false
            }
        }
    }

    fn spawn_worker(&self, gateway: Arc<dyn Gateway>) -> mpsc::UnboundedSender<String> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();
        let channel_id = self.channel_id;

        tokio::spawn(async move {
            while let Some(report) = receiver.recv().await {
                if let Err(e) = gateway.send_message(channel_id, &report).await {
                    error!("Failed to forward feedback to {channel_id}: {e:#}");
                }
            }
            info!("Feedback worker for channel {channel_id} stopped");
        });

        info!("Feedback worker started for channel {channel_id}");
        sender
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl Command for FeedbackCommand {
    fn name(&self) -> &str {
        "feedback"
    }

    fn properties(&self) -> &CommandProperties {
        &self.properties
    }

    async fn execute(&self, ctx: CommandContext) -> Result<()> {
        let text = ctx.args.trim();
        if text.is_empty() {
            return ctx
                .reply(&format!("Usage: `{}feedback <message>`", ctx.prefix))
                .await;
        }

        if !self
            .limiter
            .check_rate_limit(RATE_LIMIT_SCOPE, ctx.message.author_id)
        {
            return ctx
                .reply("You've sent a lot of feedback recently. Please try again later.")
                .await;
        }

        let report = format!(
            "**Feedback** from {} ({}) in guild {}\n{}",
            ctx.message.author_name,
            ctx.message.author_id,
            ctx.message.guild_id,
            truncate(text, MAX_FEEDBACK_CHARS)
        );

        if !self.submit(&ctx.gateway, report) {
            return ctx.reply("Feedback is not being accepted right now.").await;
        }

        info!("[{}] 📝 Feedback queued from {}", ctx.request_id, ctx.message.author_id);
        ctx.reply("Thanks! Your feedback was sent.").await
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
        // Dropping the sender lets the worker drain its queue and exit
        let sender = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if sender.is_some() {
            info!("Feedback queue closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::{context_for, services};
    use crate::testing::MockGateway;
    use serenity::model::id::UserId;

    const FEEDBACK_CHANNEL: ChannelId = ChannelId(900);

    fn command() -> FeedbackCommand {
        FeedbackCommand::new(FEEDBACK_CHANNEL)
    }

    async fn forwarded(gateway: &MockGateway, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let forwarded: Vec<String> = gateway
                .sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(channel, _)| *channel == FEEDBACK_CHANNEL)
                .map(|(_, text)| text.clone())
                .collect();
            if forwarded.len() >= count {
                return forwarded;
            }
            tokio::task::yield_now().await;
        }
        panic!("feedback was not forwarded");
    }

    #[test]
    fn test_unavailable_without_channel() {
        let err = build(&Config::for_tests()).err().unwrap();
        assert!(err.downcast_ref::<CommandInitError>().is_some());
    }

    #[test]
    fn test_truncate_by_chars() {
        assert_eq!(truncate("héllo", 10), "héllo");
        assert_eq!(truncate("héllo", 2), "hé…");
    }

    #[tokio::test]
    async fn test_feedback_is_forwarded() {
        let gateway = Arc::new(MockGateway::new());
        let command = command();

        command
            .execute(context_for(gateway.clone(), services(), UserId(8), "great bot"))
            .await
            .unwrap();

        let forwarded = forwarded(&gateway, 1).await;
        assert!(forwarded[0].contains("great bot"));
        assert!(forwarded[0].contains("user8"));
        assert!(gateway
            .sent_messages()
            .contains(&"Thanks! Your feedback was sent.".to_string()));
    }

    #[tokio::test]
    async fn test_feedback_rate_limited() {
        let gateway = Arc::new(MockGateway::new());
        let command = command();

        for _ in 0..=MAX_SUBMISSIONS {
            command
                .execute(context_for(gateway.clone(), services(), UserId(8), "again"))
                .await
                .unwrap();
        }

        let replies = gateway.sent_messages();
        assert!(replies.iter().any(|r| r.contains("try again later")));
    }

    #[tokio::test]
    async fn test_empty_feedback_shows_usage() {
        let gateway = Arc::new(MockGateway::new());

        command()
            .execute(context_for(gateway.clone(), services(), UserId(8), "  "))
            .await
            .unwrap();

        assert_eq!(gateway.sent_messages(), vec!["Usage: `$feedback <message>`"]);
    }

    #[tokio::test]
    async fn test_destroy_delivers_queued_feedback() {
        let gateway = Arc::new(MockGateway::new());
        let command = command();

        command
            .execute(context_for(gateway.clone(), services(), UserId(8), "queued"))
            .await
            .unwrap();
        command.destroy();

        let forwarded = forwarded(&gateway, 1).await;
        assert!(forwarded[0].contains("queued"));
    }

    #[tokio::test]
    async fn test_destroy_rejects_submissions() {
        let gateway = Arc::new(MockGateway::new());
        let command = command();

        command
            .execute(context_for(gateway.clone(), services(), UserId(8), "first"))
            .await
            .unwrap();
        forwarded(&gateway, 1).await;

        command.destroy();
        assert!(command.worker.lock().unwrap().is_none());

        command
            .execute(context_for(gateway.clone(), services(), UserId(9), "second"))
            .await
            .unwrap();

        let replies = gateway.sent_messages();
        assert_eq!(replies.last().unwrap(), "Feedback is not being accepted right now.");
        assert!(!replies.iter().any(|r| r.contains("second")));
    }
}
