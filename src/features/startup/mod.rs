//! # Startup Feature
//!
//! One-time reconciliation once the gateway reports ready: deployment mode,
//! hosted-only commands, audio quality and the pledge sync schedule.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod coordinator;
pub mod deployment;

pub use coordinator::{StartupCoordinator, HOSTED_ONLY_COMMANDS};
pub use deployment::{Deployment, DeploymentMode};
