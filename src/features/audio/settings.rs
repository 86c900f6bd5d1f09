//! # Feature: Audio Settings
//!
//! Global configuration read by the audio engine when it builds new players.
//! Written once during start-up reconciliation, read lock-free afterwards.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use log::info;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResamplingQuality {
    Low,
    Medium,
    High,
}

impl ResamplingQuality {
    fn as_u8(self) -> u8 {
        match self {
            ResamplingQuality::Low => 0,
            ResamplingQuality::Medium => 1,
            ResamplingQuality::High => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => ResamplingQuality::Low,
            2 => ResamplingQuality::High,
            _ => ResamplingQuality::Medium,
        }
    }
}

impl fmt::Display for ResamplingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResamplingQuality::Low => "low",
            ResamplingQuality::Medium => "medium",
            ResamplingQuality::High => "high",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct AudioSettings {
    resampling_quality: AtomicU8,
}

impl AudioSettings {
    pub fn new() -> Self {
        Self {
            resampling_quality: AtomicU8::new(ResamplingQuality::Medium.as_u8()),
        }
    }

    pub fn resampling_quality(&self) -> ResamplingQuality {
        ResamplingQuality::from_u8(self.resampling_quality.load(Ordering::Acquire))
    }

    pub fn set_resampling_quality(&self, quality: ResamplingQuality) {
        let previous = self
            .resampling_quality
            .swap(quality.as_u8(), Ordering::AcqRel);
        info!(
            "🎚️ Resampling quality {} -> {}",
            ResamplingQuality::from_u8(previous),
            quality
        );
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium() {
        assert_eq!(AudioSettings::new().resampling_quality(), ResamplingQuality::Medium);
    }

    #[test]
    fn test_set_quality() {
        let settings = AudioSettings::default();
        settings.set_resampling_quality(ResamplingQuality::High);
        assert_eq!(settings.resampling_quality(), ResamplingQuality::High);
    }

    #[test]
    fn test_quality_ordering() {
        assert!(ResamplingQuality::High > ResamplingQuality::Medium);
        assert!(ResamplingQuality::Medium > ResamplingQuality::Low);
    }
}
