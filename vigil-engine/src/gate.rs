//! Alert gate
//!
//! Per-incident-kind cooldown between dispatched alerts. Suppression is
//! counted but leaves the cooldown clock untouched, so a burst of identical
//! incidents produces exactly one alert per cooldown interval.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vigil_core::FusionResult;

/// Outcome of offering a fusion result to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Result becomes a dispatched alert; the cooldown clock restarts
    Admitted,
    /// Within cooldown for this incident kind; counted, not dispatched
    Suppressed,
    /// No detection; results without a detection never alert
    NotAlertable,
}

/// Cooldown bookkeeping per incident kind
#[derive(Debug)]
pub struct AlertGate {
    cooldown: Duration,
    last_alert_at: HashMap<String, DateTime<Utc>>,
    suppressed: u64,
}

impl AlertGate {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs as i64),
            last_alert_at: HashMap::new(),
            suppressed: 0,
        }
    }

    /// Decide whether a classified result becomes an alert
    pub fn admit(&mut self, result: &FusionResult, now: DateTime<Utc>) -> GateDecision {
        if !result.detected {
            return GateDecision::NotAlertable;
        }

        if let Some(last) = self.last_alert_at.get(&result.kind) {
            if now.signed_duration_since(*last) < self.cooldown {
                self.suppressed += 1;
                debug!(
                    kind = %result.kind,
                    elapsed_ms = now.signed_duration_since(*last).num_milliseconds(),
                    "alert suppressed by cooldown"
                );
                return GateDecision::Suppressed;
            }
        }

        self.last_alert_at.insert(result.kind.clone(), now);
        GateDecision::Admitted
    }

    /// Alerts suppressed over the gate's lifetime
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }

    /// Last admission time for an incident kind
    pub fn last_alert_at(&self, kind: &str) -> Option<DateTime<Utc>> {
        self.last_alert_at.get(kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{DetectionSignal, DetectionStream, FusionMode, FusionPolicy};

    fn detection(now: DateTime<Utc>) -> FusionResult {
        let policy = FusionPolicy::new(FusionMode::Adaptive, 0.75, 0.60);
        let weapon = DetectionSignal::builder(DetectionStream::Weapon)
            .detected(true)
            .kind("firearm")
            .confidence(0.9)
            .build();
        policy.fuse(Some(&weapon), None, now)
    }

    fn normal(now: DateTime<Utc>) -> FusionResult {
        let policy = FusionPolicy::new(FusionMode::Adaptive, 0.75, 0.60);
        policy.fuse(None, None, now)
    }

    #[test]
    fn test_cooldown_enforced() {
        let mut gate = AlertGate::new(5);
        let t0 = Utc::now();

        assert_eq!(gate.admit(&detection(t0), t0), GateDecision::Admitted);
        assert_eq!(
            gate.admit(&detection(t0), t0 + Duration::seconds(3)),
            GateDecision::Suppressed
        );
        assert_eq!(
            gate.admit(&detection(t0), t0 + Duration::seconds(6)),
            GateDecision::Admitted
        );
        assert_eq!(gate.suppressed_count(), 1);
    }

    #[test]
    fn test_suppression_leaves_clock_unchanged() {
        let mut gate = AlertGate::new(5);
        let t0 = Utc::now();

        gate.admit(&detection(t0), t0);
        gate.admit(&detection(t0), t0 + Duration::seconds(3));

        // The cooldown still counts from t0, not from the suppressed attempt
        assert_eq!(gate.last_alert_at("weapon_detected"), Some(t0));
        assert_eq!(
            gate.admit(&detection(t0), t0 + Duration::seconds(5)),
            GateDecision::Admitted
        );
    }

    #[test]
    fn test_kinds_cool_down_independently() {
        let mut gate = AlertGate::new(5);
        let t0 = Utc::now();
        let policy = FusionPolicy::new(FusionMode::Adaptive, 0.75, 0.60);

        let behavior = DetectionSignal::builder(DetectionStream::Behavior)
            .detected(true)
            .kind("aggression")
            .confidence(0.8)
            .build();
        let behavior_result = policy.fuse(None, Some(&behavior), t0);

        assert_eq!(gate.admit(&detection(t0), t0), GateDecision::Admitted);
        assert_eq!(gate.admit(&behavior_result, t0), GateDecision::Admitted);
    }

    #[test]
    fn test_no_detection_never_alerts() {
        let mut gate = AlertGate::new(5);
        let t0 = Utc::now();

        assert_eq!(gate.admit(&normal(t0), t0), GateDecision::NotAlertable);
        assert_eq!(gate.suppressed_count(), 0);
        assert!(gate.last_alert_at("normal").is_none());
    }
}
