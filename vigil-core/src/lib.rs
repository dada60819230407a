//! Vigil Core - Signal types and domain model for hybrid surveillance alerting
//!
//! This crate provides the foundational primitives:
//! - Detection signals from the weapon and behavior channels
//! - Fusion results with severity classification
//! - The pure fusion decision table with selectable modes
//! - Validated engine configuration with named presets
//! - Content fingerprinting for short-horizon frame caching

pub mod config;
pub mod fingerprint;
pub mod frames;
pub mod policy;
pub mod signals;

pub use config::*;
pub use fingerprint::*;
pub use frames::*;
pub use policy::*;
pub use signals::*;

/// Default confidence threshold for the weapon channel
pub const DEFAULT_WEAPON_THRESHOLD: f64 = 0.75;

/// Default confidence threshold for the behavior channel
pub const DEFAULT_BEHAVIOR_THRESHOLD: f64 = 0.60;

/// Default consecutive positive frames required before a weapon signal escalates
pub const DEFAULT_REQUIRED_HITS: u32 = 3;

/// Default sliding-window length for sequence classification
pub const DEFAULT_SEQUENCE_LENGTH: usize = 16;

/// Default stride: only every N-th frame is offered to the sequence buffer
pub const DEFAULT_FRAME_SKIP: u32 = 2;

/// Default minimum seconds between two dispatched alerts of the same kind
pub const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 5;

/// Default bounded history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default fingerprint cache TTL in milliseconds
pub const DEFAULT_FINGERPRINT_TTL_MS: u64 = 100;

/// Default trend-analysis window
pub const DEFAULT_TREND_WINDOW: usize = 10;

/// Conservative mode never alerts below these confidences
pub const CONSERVATIVE_WEAPON_FLOOR: f64 = 0.90;
pub const CONSERVATIVE_BEHAVIOR_FLOOR: f64 = 0.80;

/// Aggressive mode raises a low-severity alert above this behavior confidence
pub const SUSPICIOUS_ACTIVITY_FLOOR: f64 = 0.50;
