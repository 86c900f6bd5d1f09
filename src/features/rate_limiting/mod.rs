//! # Rate Limiting Feature
//!
//! Sliding-window limits per (scope, user).
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod limiter;

pub use limiter::RateLimiter;
