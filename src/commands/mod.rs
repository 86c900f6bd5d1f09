//! # Command System
//!
//! Prefix and mention invoked text commands.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Text commands with sub-command tables, factory-built registry
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;

pub use crate::command_handler::CommandHandler;

pub use context::{CommandContext, Services};
pub use handler::{
    run_checks, split_first_word, Command, CommandFactory, CommandInitError, CommandProperties,
    CommandSource, SubCommand, SubCommands,
};
pub use handlers::command_sources;
pub use registry::CommandRegistry;
