//! Fusion policy - the pure decision table
//!
//! Combines one weapon-channel observation with one behavior-channel
//! observation into a severity-ranked result. The table is discrete rather
//! than score-weighted so thresholds stay auditable; severity scores and the
//! fused confidence are advisory fields for ranking and UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    DetectionSignal, FusionResult, ResponseAction, Severity, CONSERVATIVE_BEHAVIOR_FLOOR,
    CONSERVATIVE_WEAPON_FLOOR, SUSPICIOUS_ACTIVITY_FLOOR,
};

/// Incident kind for a combined weapon + behavior detection
pub const KIND_CRITICAL_THREAT: &str = "critical_threat";
/// Incident kind for a weapon-only detection
pub const KIND_WEAPON: &str = "weapon_detected";
/// Incident kind for a behavior-only detection
pub const KIND_AGGRESSION: &str = "aggression_detected";
/// Incident kind for low-confidence suspicious activity (aggressive mode only)
pub const KIND_SUSPICIOUS: &str = "suspicious_activity";
/// Incident kind for normal activity
pub const KIND_NORMAL: &str = "normal";

/// Named threshold/policy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    /// Configured base thresholds, no low-severity rung
    #[default]
    Adaptive,
    /// Raised thresholds, fewer alerts, higher latency
    Conservative,
    /// Base thresholds plus the low-severity suspicious-activity rung
    Aggressive,
}

/// Pure fusion function over the two detection channels
///
/// Thresholds and mode are configuration, not computed state. Identical
/// inputs always produce an identical result.
#[derive(Debug, Clone, Copy)]
pub struct FusionPolicy {
    mode: FusionMode,
    weapon_threshold: f64,
    behavior_threshold: f64,
}

impl FusionPolicy {
    pub fn new(mode: FusionMode, weapon_threshold: f64, behavior_threshold: f64) -> Self {
        Self {
            mode,
            weapon_threshold,
            behavior_threshold,
        }
    }

    pub fn mode(&self) -> FusionMode {
        self.mode
    }

    /// Weapon gate threshold after mode adjustment
    pub fn effective_weapon_threshold(&self) -> f64 {
        match self.mode {
            FusionMode::Conservative => self.weapon_threshold.max(CONSERVATIVE_WEAPON_FLOOR),
            _ => self.weapon_threshold,
        }
    }

    /// Behavior gate threshold after mode adjustment
    pub fn effective_behavior_threshold(&self) -> f64 {
        match self.mode {
            FusionMode::Conservative => self.behavior_threshold.max(CONSERVATIVE_BEHAVIOR_FLOOR),
            _ => self.behavior_threshold,
        }
    }

    /// Fuse one observation from each channel into a classified result
    ///
    /// An absent stream degrades to no-detection so the other stream can
    /// still alert. Rows are evaluated top-to-bottom, first match wins.
    pub fn fuse(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        let weapon_gated = weapon
            .map(|s| s.detected && s.confidence >= self.effective_weapon_threshold())
            .unwrap_or(false);
        let behavior_gated = behavior
            .map(|s| s.detected && s.confidence >= self.effective_behavior_threshold())
            .unwrap_or(false);

        let behavior_confidence = behavior.map(|s| s.confidence).unwrap_or(0.0);

        if weapon_gated && behavior_gated {
            return self.critical_threat(weapon, behavior, now);
        }

        if weapon_gated {
            return self.weapon_only(weapon, behavior, now);
        }

        if behavior_gated {
            return self.behavior_only(weapon, behavior, now);
        }

        // The low rung caused an unacceptable false-positive rate at low
        // confidence in adaptive mode and stays enabled only for aggressive.
        if self.mode == FusionMode::Aggressive && behavior_confidence > SUSPICIOUS_ACTIVITY_FLOOR {
            return self.suspicious_activity(weapon, behavior, now);
        }

        self.normal(weapon, behavior, now)
    }

    fn critical_threat(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        let weapon_kind = weapon.map(|s| s.kind.as_str()).unwrap_or("unknown");
        let behavior_kind = behavior.map(|s| s.kind.as_str()).unwrap_or("aggression");
        let confidence = mean_confidence(weapon, behavior);

        FusionResult {
            detected: true,
            kind: KIND_CRITICAL_THREAT.to_string(),
            severity: Severity::Critical,
            severity_score: Severity::Critical.score(),
            confidence,
            description: format!(
                "CRITICAL: weapon and aggressive behavior detected (weapon: {}, behavior: {})",
                weapon_kind, behavior_kind
            ),
            action: ResponseAction::ImmediateAlert,
            recommended_response: vec![
                "Sound alarm immediately".to_string(),
                "Alert security personnel".to_string(),
                "Notify law enforcement".to_string(),
                "Record all footage".to_string(),
            ],
            weapon_signal: weapon.cloned(),
            behavior_signal: behavior.cloned(),
            classified_at: now,
        }
    }

    fn weapon_only(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        let kind = weapon.map(|s| s.kind.as_str()).unwrap_or("unknown");
        let confidence = weapon.map(|s| s.confidence).unwrap_or(0.0);

        FusionResult {
            detected: true,
            kind: KIND_WEAPON.to_string(),
            severity: Severity::High,
            severity_score: Severity::High.score(),
            confidence,
            description: format!(
                "HIGH: weapon detected ({}, confidence {:.0}%)",
                kind,
                confidence * 100.0
            ),
            action: ResponseAction::ImmediateAlert,
            recommended_response: vec![
                "Alert security immediately".to_string(),
                "Track the armed person".to_string(),
                "Record all angles".to_string(),
                "Prepare emergency response".to_string(),
            ],
            weapon_signal: weapon.cloned(),
            behavior_signal: behavior.cloned(),
            classified_at: now,
        }
    }

    fn behavior_only(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        let confidence = behavior.map(|s| s.confidence).unwrap_or(0.0);

        FusionResult {
            detected: true,
            kind: KIND_AGGRESSION.to_string(),
            severity: Severity::Medium,
            severity_score: Severity::Medium.score(),
            confidence,
            description: format!(
                "MEDIUM: aggressive behavior detected (confidence {:.0}%)",
                confidence * 100.0
            ),
            action: ResponseAction::AlertAndMonitor,
            recommended_response: vec![
                "Alert security to monitor".to_string(),
                "Zoom in for details".to_string(),
                "Prepare to intervene".to_string(),
                "Record the incident".to_string(),
            ],
            weapon_signal: weapon.cloned(),
            behavior_signal: behavior.cloned(),
            classified_at: now,
        }
    }

    fn suspicious_activity(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        let confidence = behavior.map(|s| s.confidence).unwrap_or(0.0);

        FusionResult {
            detected: true,
            kind: KIND_SUSPICIOUS.to_string(),
            severity: Severity::Low,
            severity_score: Severity::Low.score(),
            confidence,
            description: format!(
                "LOW: suspicious activity (confidence {:.0}%)",
                confidence * 100.0
            ),
            action: ResponseAction::Monitor,
            recommended_response: vec![
                "Keep monitoring".to_string(),
                "Manual verification recommended".to_string(),
                "Check for context clues".to_string(),
            ],
            weapon_signal: weapon.cloned(),
            behavior_signal: behavior.cloned(),
            classified_at: now,
        }
    }

    fn normal(
        &self,
        weapon: Option<&DetectionSignal>,
        behavior: Option<&DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FusionResult {
        FusionResult {
            detected: false,
            kind: KIND_NORMAL.to_string(),
            severity: Severity::None,
            severity_score: Severity::None.score(),
            confidence: 0.0,
            description: "normal activity - no threats detected".to_string(),
            action: ResponseAction::None,
            recommended_response: Vec::new(),
            weapon_signal: weapon.cloned(),
            behavior_signal: behavior.cloned(),
            classified_at: now,
        }
    }
}

/// Mean of the confidences present, 0.0 when neither is
fn mean_confidence(weapon: Option<&DetectionSignal>, behavior: Option<&DetectionSignal>) -> f64 {
    match (weapon, behavior) {
        (Some(w), Some(b)) => (w.confidence + b.confidence) / 2.0,
        (Some(w), None) => w.confidence,
        (None, Some(b)) => b.confidence,
        (None, None) => 0.0,
    }
}
