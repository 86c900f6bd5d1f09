//! # Audio Feature
//!
//! Process-wide audio engine settings.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod settings;

pub use settings::{AudioSettings, ResamplingQuality};
