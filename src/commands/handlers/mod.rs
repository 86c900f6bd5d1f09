//! Per-command implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 3.0.0: Text commands built from a static factory table
//! - 2.0.0: Split voice, prefix and block handling into their own files
//! - 1.0.0: Initial extraction from monolithic command_handler.rs

pub mod block;
pub mod debug;
pub mod feedback;
pub mod help;
pub mod patreon;
pub mod ping;
pub mod prefix;
pub mod voice;

use super::handler::CommandSource;

/// Every command the bot knows about
///
/// Passed to [`CommandRegistry::build`](super::CommandRegistry::build), which
/// drops the ones that are unavailable or disabled.
pub fn command_sources() -> Vec<CommandSource> {
    vec![
        CommandSource { name: "ping", build: ping::build },
        CommandSource { name: "help", build: help::build },
        CommandSource { name: "prefix", build: prefix::build },
        CommandSource { name: "join", build: voice::build_join },
        CommandSource { name: "leave", build: voice::build_leave },
        CommandSource { name: "block", build: block::build },
        CommandSource { name: "debug", build: debug::build },
        CommandSource { name: "patreon", build: patreon::build_patreon },
        CommandSource { name: "verify", build: patreon::build_verify },
        CommandSource { name: "feedback", build: feedback::build },
    ]
}
