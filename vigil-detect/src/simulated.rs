//! Simulated detectors
//!
//! Random synthetic detection streams for demos and load testing, standing
//! in for the real frame-level and sequence-level models.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde_json::Value;

use vigil_core::{DetectionSignal, DetectionStream, Frame, FrameObservation};

use crate::{BehaviorClassifier, DetectorError, WeaponDetector};

/// Weapon kinds produced by the simulator
const WEAPON_KINDS: &[&str] = &["firearm", "knife", "bat"];

/// Behavior kinds produced by the simulator
const BEHAVIOR_KINDS: &[&str] = &["aggression", "fighting", "assault"];

/// Simulated frame-level weapon detector
pub struct SimulatedWeaponDetector {
    /// Probability of a positive detection per frame
    detection_rate: f64,
}

impl SimulatedWeaponDetector {
    pub fn new(detection_rate: f64) -> Self {
        Self {
            detection_rate: detection_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for SimulatedWeaponDetector {
    fn default() -> Self {
        Self::new(0.05)
    }
}

#[async_trait]
impl WeaponDetector for SimulatedWeaponDetector {
    async fn detect(&self, frame: &Frame) -> Result<DetectionSignal, DetectorError> {
        let mut rng = rand::thread_rng();

        if rng.gen::<f64>() < self.detection_rate {
            let kind = WEAPON_KINDS[rng.gen_range(0..WEAPON_KINDS.len())];
            let confidence: f64 = rng.gen_range(0.75..0.98);

            return Ok(DetectionSignal::builder(DetectionStream::Weapon)
                .detected(true)
                .kind(kind)
                .confidence(confidence)
                .description(&format!("simulated {kind} detection"))
                .observed_at(frame.captured_at)
                .metadata("simulated", Value::Bool(true))
                .build());
        }

        Ok(DetectionSignal::negative(DetectionStream::Weapon, frame.captured_at))
    }

    fn name(&self) -> &str {
        "simulated-weapon"
    }
}

/// Simulated sequence-level behavior classifier
pub struct SimulatedBehaviorClassifier {
    detection_rate: f64,
}

impl SimulatedBehaviorClassifier {
    pub fn new(detection_rate: f64) -> Self {
        Self {
            detection_rate: detection_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for SimulatedBehaviorClassifier {
    fn default() -> Self {
        Self::new(0.08)
    }
}

#[async_trait]
impl BehaviorClassifier for SimulatedBehaviorClassifier {
    async fn classify(&self, window: &[FrameObservation]) -> Result<DetectionSignal, DetectorError> {
        let observed_at = window.last().map(|o| o.captured_at).unwrap_or_else(Utc::now);
        let mut rng = rand::thread_rng();

        if rng.gen::<f64>() < self.detection_rate {
            let kind = BEHAVIOR_KINDS[rng.gen_range(0..BEHAVIOR_KINDS.len())];
            let confidence: f64 = rng.gen_range(0.60..0.95);

            return Ok(DetectionSignal::builder(DetectionStream::Behavior)
                .detected(true)
                .kind(kind)
                .confidence(confidence)
                .description(&format!("simulated {kind} over {} frames", window.len()))
                .observed_at(observed_at)
                .metadata("simulated", Value::Bool(true))
                .build());
        }

        Ok(DetectionSignal::negative(DetectionStream::Behavior, observed_at))
    }

    fn name(&self) -> &str {
        "simulated-behavior"
    }
}
