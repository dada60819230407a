//! Detection signals and fused results
//!
//! Signals are the immutable observations handed in by the external
//! detectors:
//! - The weapon channel produces one frame-level signal per analyzed frame
//! - The behavior channel produces one sequence-level signal per full window
//! - The fusion engine combines both into a severity-ranked result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Signal kind emitted by the debouncer while a weapon track is still unconfirmed
pub const VALIDATING_KIND: &str = "validating";

/// Signal kind for a frame with no detection
pub const NEGATIVE_KIND: &str = "none";

/// The two independent detection channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStream {
    /// Frame-level object detection (stream 1)
    Weapon,
    /// Sequence-level temporal classification (stream 2)
    Behavior,
}

/// A single observation from one detection channel
///
/// Immutable once built. Confidence is clamped to [0, 1] by the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSignal {
    /// Unique signal instance ID
    pub id: Uuid,

    /// Which channel produced this signal
    pub stream: DetectionStream,

    /// Whether the detector reported a positive observation
    pub detected: bool,

    /// Detector-assigned kind (e.g. "knife", "firearm", "aggression")
    pub kind: String,

    /// Detector confidence (0.0 - 1.0)
    pub confidence: f64,

    /// Human-readable account of the observation
    pub description: String,

    /// When the detector observed the frame(s)
    pub observed_at: DateTime<Utc>,

    /// Opaque detector metadata (bounding boxes, attention weights, ...)
    pub metadata: Map<String, Value>,
}

impl DetectionSignal {
    /// Create a new signal builder for the given channel
    pub fn builder(stream: DetectionStream) -> SignalBuilder {
        SignalBuilder::new(stream)
    }

    /// A no-detection observation, used when a channel saw nothing or is degraded
    pub fn negative(stream: DetectionStream, observed_at: DateTime<Utc>) -> Self {
        let description = match stream {
            DetectionStream::Weapon => "no weapon detected".to_string(),
            DetectionStream::Behavior => "normal behavior".to_string(),
        };

        Self {
            id: Uuid::new_v4(),
            stream,
            detected: false,
            kind: NEGATIVE_KIND.to_string(),
            confidence: 0.0,
            description,
            observed_at,
            metadata: Map::new(),
        }
    }

    /// Pseudo-signal emitted while the debouncer is still counting
    /// consecutive weapon hits. Carries progress for UI feedback but never
    /// escalates.
    pub fn validating(raw: &DetectionSignal, hits: u32, required: u32) -> Self {
        let mut metadata = Map::new();
        metadata.insert("progress_hits".to_string(), Value::from(hits));
        metadata.insert("required_hits".to_string(), Value::from(required));

        Self {
            id: Uuid::new_v4(),
            stream: raw.stream,
            detected: false,
            kind: VALIDATING_KIND.to_string(),
            confidence: raw.confidence,
            description: format!("validating weapon signal: {}/{} consecutive frames", hits, required),
            observed_at: raw.observed_at,
            metadata,
        }
    }

    /// Whether the debouncer is mid-validation on this signal
    pub fn is_validating(&self) -> bool {
        self.kind == VALIDATING_KIND
    }
}

/// Builder for detection signals
pub struct SignalBuilder {
    stream: DetectionStream,
    detected: bool,
    kind: String,
    confidence: f64,
    description: String,
    observed_at: Option<DateTime<Utc>>,
    metadata: Map<String, Value>,
}

impl SignalBuilder {
    pub fn new(stream: DetectionStream) -> Self {
        Self {
            stream,
            detected: false,
            kind: NEGATIVE_KIND.to_string(),
            confidence: 0.0,
            description: String::new(),
            observed_at: None,
            metadata: Map::new(),
        }
    }

    pub fn detected(mut self, detected: bool) -> Self {
        self.detected = detected;
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = Some(at);
        self
    }

    pub fn metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> DetectionSignal {
        DetectionSignal {
            id: Uuid::new_v4(),
            stream: self.stream,
            detected: self.detected,
            kind: self.kind,
            confidence: self.confidence,
            description: self.description,
            observed_at: self.observed_at.unwrap_or_else(Utc::now),
            metadata: self.metadata,
        }
    }
}

/// Alert severity levels, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Weapon and aggressive behavior detected together
    Critical,
    /// Weapon detected without a behavior pattern
    High,
    /// Aggressive behavior detected without a weapon
    Medium,
    /// Low-confidence suspicious activity (aggressive mode only)
    Low,
    /// Normal activity
    None,
}

impl Severity {
    /// Fixed advisory score for ranking; the decision table itself is discrete
    pub fn score(&self) -> f64 {
        match self {
            Severity::Critical => 1.0,
            Severity::High => 0.9,
            Severity::Medium => 0.7,
            Severity::Low => 0.4,
            Severity::None => 0.0,
        }
    }
}

/// Recommended operator action for a fused result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseAction {
    ImmediateAlert,
    AlertAndMonitor,
    Monitor,
    None,
}

/// The outcome of fusing one weapon observation with one behavior observation
///
/// Produced exactly once per fused frame; immutable; owned by the history
/// tracker after recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    /// Whether any threat was detected
    pub detected: bool,

    /// Incident kind: critical_threat, weapon_detected, aggression_detected,
    /// suspicious_activity or normal
    pub kind: String,

    /// Severity classification
    pub severity: Severity,

    /// Advisory severity score (0.0 - 1.0)
    pub severity_score: f64,

    /// Mean of the gated stream confidences (or the single present one)
    pub confidence: f64,

    /// Human-readable account of the classification
    pub description: String,

    /// Recommended operator action
    pub action: ResponseAction,

    /// Operator playbook for this incident kind
    pub recommended_response: Vec<String>,

    /// The weapon-channel signal that entered fusion, if any
    pub weapon_signal: Option<DetectionSignal>,

    /// The behavior-channel signal that entered fusion, if any
    pub behavior_signal: Option<DetectionSignal>,

    /// When the classification was made
    pub classified_at: DateTime<Utc>,
}

/// Wire payload delivered to alert subscribers
///
/// Carries the minimum contract for the transport layer: kind, severity,
/// confidence, description, timestamp and evidence reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert ID
    pub id: Uuid,

    /// Incident kind
    pub kind: String,

    /// Severity classification
    pub severity: Severity,

    /// Advisory severity score
    pub severity_score: f64,

    /// Fused confidence
    pub confidence: f64,

    /// Human-readable account
    pub description: String,

    /// Recommended operator action
    pub action: ResponseAction,

    /// Reference into the evidence store, when a frame was saved
    pub evidence_ref: Option<String>,

    /// When the alert was admitted for dispatch
    pub issued_at: DateTime<Utc>,
}

impl Alert {
    /// Build an alert payload from an admitted fusion result
    pub fn from_result(result: &FusionResult, evidence_ref: Option<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: result.kind.clone(),
            severity: result.severity,
            severity_score: result.severity_score,
            confidence: result.confidence,
            description: result.description.clone(),
            action: result.action,
            evidence_ref,
            issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_builder() {
        let signal = DetectionSignal::builder(DetectionStream::Weapon)
            .detected(true)
            .kind("knife")
            .confidence(0.92)
            .description("knife in right hand")
            .build();

        assert!(signal.detected);
        assert_eq!(signal.kind, "knife");
        assert_eq!(signal.confidence, 0.92);
        assert_eq!(signal.stream, DetectionStream::Weapon);
    }

    #[test]
    fn test_builder_clamps_confidence() {
        let signal = DetectionSignal::builder(DetectionStream::Behavior)
            .detected(true)
            .confidence(1.7)
            .build();

        assert_eq!(signal.confidence, 1.0);
    }

    #[test]
    fn test_validating_pseudo_signal() {
        let raw = DetectionSignal::builder(DetectionStream::Weapon)
            .detected(true)
            .kind("firearm")
            .confidence(0.9)
            .build();

        let pseudo = DetectionSignal::validating(&raw, 1, 3);
        assert!(!pseudo.detected);
        assert!(pseudo.is_validating());
        assert_eq!(pseudo.confidence, 0.9);
        assert_eq!(pseudo.metadata["progress_hits"], 1);
        assert_eq!(pseudo.metadata["required_hits"], 3);
    }

    #[test]
    fn test_severity_scores_monotonic() {
        let ordered = [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::None,
        ];

        for pair in ordered.windows(2) {
            assert!(pair[0].score() > pair[1].score());
        }
    }

    #[test]
    fn test_severity_serializes_snake_case() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");

        let action = serde_json::to_string(&ResponseAction::ImmediateAlert).unwrap();
        assert_eq!(action, "\"IMMEDIATE_ALERT\"");
    }
}
