//! # Sessions Feature
//!
//! Per-guild voice sessions, their teardown when nobody is listening, and
//! the guild membership checks that go with them.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod manager;
pub mod monitor;

pub use manager::{Session, SessionManager};
pub use monitor::{is_bot_farm, SessionMonitor, VoiceLeave, MAX_BOT_RATIO};
