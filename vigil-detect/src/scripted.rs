//! Scripted detectors for deterministic tests
//!
//! Play back a fixed sequence of signals, then fall through to negatives.
//! An unavailable variant exercises the single-stream degradation path.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use vigil_core::{DetectionSignal, DetectionStream, Frame, FrameObservation};

use crate::{BehaviorClassifier, DetectorError, WeaponDetector};

/// Weapon detector that replays a scripted signal sequence
pub struct ScriptedWeaponDetector {
    script: Mutex<VecDeque<DetectionSignal>>,
}

impl ScriptedWeaponDetector {
    pub fn new(signals: Vec<DetectionSignal>) -> Self {
        Self {
            script: Mutex::new(signals.into()),
        }
    }

    /// Remaining scripted signals
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl WeaponDetector for ScriptedWeaponDetector {
    async fn detect(&self, frame: &Frame) -> Result<DetectionSignal, DetectorError> {
        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or_else(|| DetectionSignal::negative(DetectionStream::Weapon, frame.captured_at)))
    }

    fn name(&self) -> &str {
        "scripted-weapon"
    }
}

/// Behavior classifier that replays a scripted signal sequence
pub struct ScriptedBehaviorClassifier {
    script: Mutex<VecDeque<DetectionSignal>>,
}

impl ScriptedBehaviorClassifier {
    pub fn new(signals: Vec<DetectionSignal>) -> Self {
        Self {
            script: Mutex::new(signals.into()),
        }
    }
}

#[async_trait]
impl BehaviorClassifier for ScriptedBehaviorClassifier {
    async fn classify(&self, window: &[FrameObservation]) -> Result<DetectionSignal, DetectorError> {
        let observed_at = window
            .last()
            .map(|o| o.captured_at)
            .unwrap_or_else(chrono::Utc::now);
        let next = self.script.lock().pop_front();
        Ok(next.unwrap_or_else(|| DetectionSignal::negative(DetectionStream::Behavior, observed_at)))
    }

    fn name(&self) -> &str {
        "scripted-behavior"
    }
}

/// Detector whose model never loads; every call reports unavailable
pub struct UnavailableDetector;

#[async_trait]
impl WeaponDetector for UnavailableDetector {
    async fn detect(&self, _frame: &Frame) -> Result<DetectionSignal, DetectorError> {
        Err(DetectorError::Unavailable("weapon model not loaded".to_string()))
    }

    fn name(&self) -> &str {
        "unavailable-weapon"
    }
}

#[async_trait]
impl BehaviorClassifier for UnavailableDetector {
    async fn classify(&self, _window: &[FrameObservation]) -> Result<DetectionSignal, DetectorError> {
        Err(DetectorError::Unavailable("behavior model not loaded".to_string()))
    }

    fn name(&self) -> &str {
        "unavailable-behavior"
    }
}
