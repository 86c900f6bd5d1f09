//! # Feature: Pledge Monitor
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use anyhow::Result;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use super::roster::RosterSource;
use crate::database::Storage;

pub const PLEDGE_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PledgeSyncReport {
    pub active: usize,
    pub removed: usize,
}

pub struct PledgeMonitor {
    roster: Arc<dyn RosterSource>,
    storage: Arc<dyn Storage>,
}

impl PledgeMonitor {
    pub fn new(roster: Arc<dyn RosterSource>, storage: Arc<dyn Storage>) -> Self {
        Self { roster, storage }
    }

    /// Upsert active pledges and drop stored ones that lapsed.
    pub async fn sync_once(&self) -> Result<PledgeSyncReport> {
        let active = self.roster.active_pledges().await?;

        let mut removed = 0;
        for user_id in self.storage.pledged_users()? {
            if !active.contains_key(&user_id) {
                self.storage.remove_pledge(user_id)?;
                removed += 1;
            }
        }

        for (user_id, tier) in &active {
            self.storage.set_pledge(*user_id, *tier)?;
        }

        Ok(PledgeSyncReport {
            active: active.len(),
            removed,
        })
    }

    /// Runs forever; the first sync happens immediately.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(PLEDGE_SYNC_INTERVAL);

        info!("Pledge sync task started (interval: 24 hours)");

        loop {
            interval.tick().await;

            match self.sync_once().await {
                Ok(report) => info!(
                    "💳 Pledge sync complete: {} active, {} lapsed",
                    report.active, report.removed
                ),
                Err(e) => error!("Pledge sync failed: {e:#}"),
            }
        }
    }
}
