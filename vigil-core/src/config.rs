//! Engine configuration
//!
//! All knobs are supplied at construction and immutable for the engine's
//! lifetime; reconfiguration means constructing a new engine. Validation
//! fails fast, before any frame is accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    FusionMode, DEFAULT_ALERT_COOLDOWN_SECS, DEFAULT_BEHAVIOR_THRESHOLD, DEFAULT_FINGERPRINT_TTL_MS,
    DEFAULT_FRAME_SKIP, DEFAULT_HISTORY_CAPACITY, DEFAULT_REQUIRED_HITS, DEFAULT_SEQUENCE_LENGTH,
    DEFAULT_TREND_WINDOW, DEFAULT_WEAPON_THRESHOLD,
};

/// Configuration errors, raised at engine construction
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("weapon threshold {0} outside [0, 1]")]
    WeaponThreshold(f64),

    #[error("behavior threshold {0} outside [0, 1]")]
    BehaviorThreshold(f64),

    #[error("required hits must be positive")]
    RequiredHits,

    #[error("sequence length must be positive")]
    SequenceLength,

    #[error("frame skip must be positive")]
    FrameSkip,

    #[error("history capacity must be positive")]
    HistoryCapacity,

    #[error("trend window must be positive")]
    TrendWindow,
}

/// Full configuration surface of the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fusion policy preset
    pub mode: FusionMode,

    /// Confidence gate for the weapon channel (0.0 - 1.0)
    pub weapon_threshold: f64,

    /// Confidence gate for the behavior channel (0.0 - 1.0)
    pub behavior_threshold: f64,

    /// Consecutive positive frames before a weapon signal escalates
    pub required_hits: u32,

    /// Sliding-window length for sequence classification
    pub sequence_length: usize,

    /// Only every N-th frame is offered to the sequence buffer
    pub frame_skip: u32,

    /// Minimum seconds between two dispatched alerts of the same kind
    pub alert_cooldown_secs: u64,

    /// Bounded history capacity
    pub history_capacity: usize,

    /// Fingerprint cache TTL in milliseconds
    pub fingerprint_ttl_ms: u64,

    /// Window for trend analysis
    pub trend_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

impl EngineConfig {
    /// Balanced preset: adaptive fusion with the base thresholds
    pub fn balanced() -> Self {
        Self {
            mode: FusionMode::Adaptive,
            weapon_threshold: DEFAULT_WEAPON_THRESHOLD,
            behavior_threshold: DEFAULT_BEHAVIOR_THRESHOLD,
            required_hits: DEFAULT_REQUIRED_HITS,
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            frame_skip: DEFAULT_FRAME_SKIP,
            alert_cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            fingerprint_ttl_ms: DEFAULT_FINGERPRINT_TTL_MS,
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }

    /// High-security preset: aggressive fusion, lower thresholds, every frame
    /// offered to the sequence buffer
    pub fn high_security() -> Self {
        Self {
            mode: FusionMode::Aggressive,
            weapon_threshold: 0.70,
            behavior_threshold: 0.50,
            frame_skip: 1,
            ..Self::balanced()
        }
    }

    /// Low-false-positive preset: conservative fusion, raised thresholds,
    /// sparser sequence sampling
    pub fn low_false_positives() -> Self {
        Self {
            mode: FusionMode::Conservative,
            weapon_threshold: 0.85,
            behavior_threshold: 0.75,
            frame_skip: 4,
            ..Self::balanced()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::balanced()),
            "high_security" => Some(Self::high_security()),
            "low_false_positives" => Some(Self::low_false_positives()),
            _ => None,
        }
    }

    /// Names accepted by [`EngineConfig::preset`]
    pub fn preset_names() -> &'static [&'static str] {
        &["balanced", "high_security", "low_false_positives"]
    }

    /// Validate all knobs; called by the engine constructor before any frame
    /// is accepted
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.weapon_threshold) {
            return Err(ConfigError::WeaponThreshold(self.weapon_threshold));
        }
        if !(0.0..=1.0).contains(&self.behavior_threshold) {
            return Err(ConfigError::BehaviorThreshold(self.behavior_threshold));
        }
        if self.required_hits == 0 {
            return Err(ConfigError::RequiredHits);
        }
        if self.sequence_length == 0 {
            return Err(ConfigError::SequenceLength);
        }
        if self.frame_skip == 0 {
            return Err(ConfigError::FrameSkip);
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::HistoryCapacity);
        }
        if self.trend_window == 0 {
            return Err(ConfigError::TrendWindow);
        }
        Ok(())
    }
}
