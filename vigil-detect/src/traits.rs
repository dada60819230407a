//! Common traits for external detectors

use async_trait::async_trait;
use thiserror::Error;

use vigil_core::{DetectionSignal, Frame, FrameObservation};

/// Errors from detector invocations
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Upstream model not loaded; the pipeline degrades that stream to
    /// no-detection rather than failing
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Frame-level weapon detection (stream 1)
#[async_trait]
pub trait WeaponDetector: Send + Sync {
    /// Analyze one frame for weapons
    async fn detect(&self, frame: &Frame) -> Result<DetectionSignal, DetectorError>;

    /// Detector name for logging
    fn name(&self) -> &str;
}

/// Sequence-level behavior classification (stream 2)
#[async_trait]
pub trait BehaviorClassifier: Send + Sync {
    /// Classify a full sliding window of frame observations
    async fn classify(&self, window: &[FrameObservation]) -> Result<DetectionSignal, DetectorError>;

    /// Classifier name for logging
    fn name(&self) -> &str;
}
