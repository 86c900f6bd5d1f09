//! # Feature: Startup Reconciliation
//!
//! Runs on the first successful Ready. Learns who operates this deployment,
//! strips commands that only work on the hosted deployment, raises audio
//! quality where appropriate and schedules the daily pledge sync.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Replaced owner notifications with deployment reconciliation
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use super::deployment::{Deployment, DeploymentMode};
use crate::commands::CommandRegistry;
use crate::core::Config;
use crate::database::Storage;
use crate::features::audio::{AudioSettings, ResamplingQuality};
use crate::features::pledges::{PledgeMonitor, RosterSource};
use crate::gateway::Gateway;

/// Commands backed by services that only exist for the hosted deployment.
pub const HOSTED_ONLY_COMMANDS: [&str; 3] = ["patreon", "verify", "feedback"];

pub struct StartupCoordinator {
    registry: Arc<CommandRegistry>,
    deployment: Arc<Deployment>,
    audio: Arc<AudioSettings>,
    storage: Arc<dyn Storage>,
    roster: Option<Arc<dyn RosterSource>>,
    hosted_application_ids: Vec<u64>,
    high_quality_application_id: Option<u64>,
}

impl StartupCoordinator {
    pub fn new(
        config: &Config,
        registry: Arc<CommandRegistry>,
        deployment: Arc<Deployment>,
        audio: Arc<AudioSettings>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            registry,
            deployment,
            audio,
            storage,
            roster: None,
            hosted_application_ids: config.hosted_application_ids.clone(),
            high_quality_application_id: config.high_quality_application_id,
        }
    }

    /// Roster used by the daily pledge sync on hosted deployments
    pub fn with_roster(mut self, roster: Arc<dyn RosterSource>) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Handle a Ready event.
    ///
    /// Returns `Ok(true)` when this call performed the reconciliation and
    /// `Ok(false)` when it had already happened or is in flight. A failed
    /// identity fetch leaves the bot not ready so a later Ready can retry.
    pub async fn on_ready(&self, gateway: &dyn Gateway) -> Result<bool> {
        if !self.deployment.begin() {
            return Ok(false);
        }

        let identity = match gateway.fetch_deployment_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                self.deployment.abandon();
                return Err(e.context("Failed to fetch application info"));
            }
        };

        let self_hosted = !self
            .hosted_application_ids
            .contains(&identity.application_id);

        info!(
            "🏠 Application {} owned by {} ({})",
            identity.application_id,
            identity.owner_id,
            if self_hosted { "self-hosted" } else { "hosted" }
        );

        if self_hosted {
            self.remove_hosted_commands();
        } else {
            self.schedule_pledge_sync();
        }

        if self_hosted || Some(identity.application_id) == self.high_quality_application_id {
            self.audio.set_resampling_quality(ResamplingQuality::High);
        }

        self.deployment.publish(DeploymentMode {
            owner_id: identity.owner_id,
            application_id: identity.application_id,
            self_hosted,
        });

        Ok(true)
    }

    fn remove_hosted_commands(&self) {
        for name in HOSTED_ONLY_COMMANDS {
            if let Some(command) = self.registry.remove(name) {
                command.destroy();
                info!("Removed hosted-only command {name}");
            }
        }
    }

    fn schedule_pledge_sync(&self) {
        match &self.roster {
            Some(roster) => {
                let monitor = PledgeMonitor::new(roster.clone(), self.storage.clone());
                tokio::spawn(monitor.run());
            }
            None => warn!("No pledge roster configured; pledge sync disabled"),
        }
    }
}
