//! # Pledges Feature
//!
//! Daily reconciliation of stored pledge tiers against the sponsorship roster.
//! Only scheduled on hosted deployments.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true

pub mod monitor;
pub mod roster;

pub use monitor::{PledgeMonitor, PledgeSyncReport, PLEDGE_SYNC_INTERVAL};
pub use roster::{HttpRoster, RosterSource};
