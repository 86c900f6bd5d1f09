//! # Features
//!
//! Self-contained feature modules used by the command layer and the event
//! handler.

pub mod audio;
pub mod pledges;
pub mod rate_limiting;
pub mod sessions;
pub mod startup;

pub use audio::{AudioSettings, ResamplingQuality};
pub use pledges::{HttpRoster, PledgeMonitor, RosterSource};
pub use rate_limiting::RateLimiter;
pub use sessions::{SessionManager, SessionMonitor, VoiceLeave};
pub use startup::{Deployment, DeploymentMode, StartupCoordinator};
