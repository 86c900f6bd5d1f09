// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Platform boundary
pub mod gateway;

// Infrastructure
pub mod database;

// Application layer
pub mod command_handler;
pub mod commands;

#[cfg(test)]
pub mod testing;

pub use core::Config;

pub use features::{
    // Audio
    AudioSettings, ResamplingQuality,
    // Pledges
    HttpRoster, PledgeMonitor, RosterSource,
    // Rate limiting
    RateLimiter,
    // Sessions
    SessionManager, SessionMonitor, VoiceLeave,
    // Startup
    Deployment, DeploymentMode, StartupCoordinator,
};
