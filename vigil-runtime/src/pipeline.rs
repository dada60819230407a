//! Frame pipeline
//!
//! One `analyze_frame` call runs the entire per-frame control flow. Detector
//! failures degrade the affected stream to no-detection so the other stream
//! can still alert; collaborator failures are logged and never block
//! dispatch. Only a malformed frame fails the call, and it is rejected
//! before any stateful component is touched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use vigil_core::{Alert, ConfigError, EngineConfig, Frame, FrameError, FrameObservation, FusionResult};
use vigil_engine::{
    FusionEngine, GateDecision, SequenceOutcome, StatusReport, Subscription, TrendReport,
};
use vigil_detect::{
    BehaviorClassifier, DetectorError, EvidenceStore, IncidentLog, IncidentRecord, WeaponDetector,
};

/// Errors that fail a frame analysis outright
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),
}

/// Everything the pipeline decided about one input frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The classified result (cached or freshly fused)
    pub result: FusionResult,
    /// Gate decision for a freshly fused frame; `None` on a cache hit
    pub gate: Option<GateDecision>,
    /// Trend over the recent history window
    pub trend: TrendReport,
    /// The alert dispatched for this frame, if one was admitted
    pub alert: Option<Alert>,
    /// Whether the fingerprint cache short-circuited this frame
    pub cache_hit: bool,
}

/// Pipeline counters
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub alerts_triggered: u64,
    pub cache_hits: u64,
    pub subscribers: usize,
}

/// The per-frame analysis pipeline
pub struct FramePipeline {
    engine: Arc<FusionEngine>,
    weapon: Arc<dyn WeaponDetector>,
    behavior: Arc<dyn BehaviorClassifier>,
    incidents: Arc<dyn IncidentLog>,
    evidence: Arc<dyn EvidenceStore>,
    frames_processed: AtomicU64,
    alerts_triggered: AtomicU64,
}

impl FramePipeline {
    /// Build a pipeline, failing fast on invalid engine configuration
    pub fn new(
        config: EngineConfig,
        weapon: Arc<dyn WeaponDetector>,
        behavior: Arc<dyn BehaviorClassifier>,
        incidents: Arc<dyn IncidentLog>,
        evidence: Arc<dyn EvidenceStore>,
    ) -> Result<Self, ConfigError> {
        let engine = Arc::new(FusionEngine::new(config)?);

        info!(
            weapon = weapon.name(),
            behavior = behavior.name(),
            "frame pipeline initialized"
        );

        Ok(Self {
            engine,
            weapon,
            behavior,
            incidents,
            evidence,
            frames_processed: AtomicU64::new(0),
            alerts_triggered: AtomicU64::new(0),
        })
    }

    /// The engine backing this pipeline
    pub fn engine(&self) -> &Arc<FusionEngine> {
        &self.engine
    }

    /// Register an alert subscriber
    pub fn subscribe(&self) -> Subscription {
        self.engine.subscribe()
    }

    /// Analyze one frame stamped with the current time
    pub async fn analyze_frame(&self, data: Vec<u8>) -> Result<FrameReport, PipelineError> {
        self.analyze_frame_at(data, Utc::now()).await
    }

    /// Analyze one frame at an explicit time
    pub async fn analyze_frame_at(
        &self,
        data: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<FrameReport, PipelineError> {
        // Rejected before any stateful component is touched
        let frame = Frame::new(data, now)?;

        if let Some(cached) = self.engine.cached_result(&frame.data, now) {
            debug!(fingerprint = %frame.fingerprint(), "duplicate frame served from cache");
            return Ok(FrameReport {
                result: cached,
                gate: None,
                trend: self.engine.trend(),
                alert: None,
                cache_hit: true,
            });
        }

        let sequence_no = self.frames_processed.fetch_add(1, Ordering::Relaxed) + 1;

        let weapon_signal = match self.weapon.detect(&frame).await {
            Ok(signal) => Some(signal),
            Err(DetectorError::Unavailable(reason)) => {
                warn!(detector = self.weapon.name(), %reason, "weapon stream degraded");
                None
            }
            Err(err) => {
                warn!(detector = self.weapon.name(), error = %err, "weapon detection failed");
                None
            }
        };

        let observation = FrameObservation::from_frame(&frame, sequence_no);
        let behavior_signal = match self.engine.offer_frame(observation) {
            SequenceOutcome::Ready(window) => match self.behavior.classify(&window).await {
                Ok(signal) => Some(signal),
                Err(DetectorError::Unavailable(reason)) => {
                    warn!(classifier = self.behavior.name(), %reason, "behavior stream degraded");
                    None
                }
                Err(err) => {
                    warn!(classifier = self.behavior.name(), error = %err, "behavior classification failed");
                    None
                }
            },
            SequenceOutcome::Buffering { filled, capacity } => {
                debug!(filled, capacity, "sequence window still buffering");
                None
            }
            SequenceOutcome::Skipped => None,
        };

        let assessment = self.engine.submit_at(weapon_signal, behavior_signal, now);

        let alert = if assessment.gate == GateDecision::Admitted {
            Some(self.raise_alert(&frame, &assessment.result, now).await)
        } else {
            None
        };

        self.engine.cache_result(&frame.data, assessment.result.clone(), now);

        Ok(FrameReport {
            result: assessment.result,
            gate: Some(assessment.gate),
            trend: assessment.trend,
            alert,
            cache_hit: false,
        })
    }

    /// Evidence, persistence, dispatch and window reset for an admitted result
    async fn raise_alert(&self, frame: &Frame, result: &FusionResult, now: DateTime<Utc>) -> Alert {
        self.alerts_triggered.fetch_add(1, Ordering::Relaxed);

        let evidence_ref = match self.evidence.save_frame(frame).await {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!(error = %err, "evidence save failed, alert proceeds without reference");
                None
            }
        };

        let alert = Alert::from_result(result, evidence_ref, now);

        let record = IncidentRecord::from_alert(&alert);
        if let Err(err) = self.incidents.log_incident(&record).await {
            warn!(error = %err, "incident logging failed");
        }

        let report = self.engine.dispatch(&alert);
        info!(
            kind = %alert.kind,
            severity = ?alert.severity,
            delivered = report.delivered,
            failed = report.failed.len(),
            "alert dispatched"
        );

        // Stale frames in the window must not re-alert
        self.engine.reset_sequence();

        alert
    }

    /// Lifetime status counters from the history tracker
    pub fn status(&self) -> StatusReport {
        self.engine.status()
    }

    /// Pipeline counters
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            alerts_triggered: self.alerts_triggered.load(Ordering::Relaxed),
            cache_hits: self.engine.cache_hits(),
            subscribers: self.engine.subscriber_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{DetectionSignal, DetectionStream, Severity};
    use vigil_detect::{
        MemoryEvidenceStore, MemoryIncidentLog, ScriptedBehaviorClassifier, ScriptedWeaponDetector,
        UnavailableDetector,
    };
    use vigil_engine::Trend;

    fn weapon_hit(confidence: f64) -> DetectionSignal {
        DetectionSignal::builder(DetectionStream::Weapon)
            .detected(true)
            .kind("firearm")
            .confidence(confidence)
            .build()
    }

    fn behavior_hit(confidence: f64) -> DetectionSignal {
        DetectionSignal::builder(DetectionStream::Behavior)
            .detected(true)
            .kind("aggression")
            .confidence(confidence)
            .build()
    }

    struct Harness {
        pipeline: FramePipeline,
        incidents: Arc<MemoryIncidentLog>,
        evidence: Arc<MemoryEvidenceStore>,
    }

    fn harness(
        config: EngineConfig,
        weapon: Arc<dyn WeaponDetector>,
        behavior: Arc<dyn BehaviorClassifier>,
    ) -> Harness {
        let incidents = Arc::new(MemoryIncidentLog::new());
        let evidence = Arc::new(MemoryEvidenceStore::new());
        let pipeline = FramePipeline::new(
            config,
            weapon,
            behavior,
            incidents.clone(),
            evidence.clone(),
        )
        .unwrap();
        Harness {
            pipeline,
            incidents,
            evidence,
        }
    }

    #[tokio::test]
    async fn test_debounced_weapon_alert_end_to_end() {
        let weapon = Arc::new(ScriptedWeaponDetector::new(vec![
            weapon_hit(0.9),
            weapon_hit(0.9),
            weapon_hit(0.9),
        ]));
        let behavior = Arc::new(ScriptedBehaviorClassifier::new(Vec::new()));
        let h = harness(EngineConfig::balanced(), weapon, behavior);

        let mut subscription = h.pipeline.subscribe();

        let first = h.pipeline.analyze_frame(b"frame-1".to_vec()).await.unwrap();
        assert!(first.alert.is_none());

        let second = h.pipeline.analyze_frame(b"frame-2".to_vec()).await.unwrap();
        assert!(second.alert.is_none());

        let third = h.pipeline.analyze_frame(b"frame-3".to_vec()).await.unwrap();
        let alert = third.alert.expect("third consecutive hit must alert");
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.evidence_ref.as_deref().unwrap().starts_with("mem://"));

        assert_eq!(h.incidents.len(), 1);
        assert_eq!(h.evidence.len(), 1);

        let delivered = subscription.receiver.recv().await.unwrap();
        assert_eq!(delivered.id, alert.id);
    }

    #[tokio::test]
    async fn test_malformed_frame_touches_no_state() {
        let weapon = Arc::new(ScriptedWeaponDetector::new(vec![weapon_hit(0.9)]));
        let behavior = Arc::new(ScriptedBehaviorClassifier::new(Vec::new()));
        let h = harness(EngineConfig::balanced(), weapon.clone(), behavior);

        let result = h.pipeline.analyze_frame(Vec::new()).await;
        assert!(matches!(result, Err(PipelineError::MalformedFrame(_))));

        // No detector invoked, nothing recorded
        assert_eq!(weapon.remaining(), 1);
        assert_eq!(h.pipeline.stats().frames_processed, 0);
        assert_eq!(h.pipeline.engine().trend().trend, Trend::Idle);
    }

    #[tokio::test]
    async fn test_duplicate_frame_served_from_cache() {
        let weapon = Arc::new(ScriptedWeaponDetector::new(vec![
            weapon_hit(0.9),
            weapon_hit(0.9),
        ]));
        let behavior = Arc::new(ScriptedBehaviorClassifier::new(Vec::new()));
        let h = harness(EngineConfig::balanced(), weapon.clone(), behavior);

        let now = Utc::now();
        let first = h
            .pipeline
            .analyze_frame_at(b"same-bytes".to_vec(), now)
            .await
            .unwrap();
        assert!(!first.cache_hit);
        assert_eq!(weapon.remaining(), 1);

        let second = h
            .pipeline
            .analyze_frame_at(b"same-bytes".to_vec(), now + chrono::Duration::milliseconds(50))
            .await
            .unwrap();
        assert!(second.cache_hit);
        assert!(second.alert.is_none());
        // Detectors not re-invoked for the duplicate
        assert_eq!(weapon.remaining(), 1);
        assert_eq!(second.result.kind, first.result.kind);
    }

    #[tokio::test]
    async fn test_weapon_stream_degrades_to_behavior_only() {
        let config = EngineConfig {
            sequence_length: 2,
            frame_skip: 1,
            ..EngineConfig::balanced()
        };
        let weapon = Arc::new(UnavailableDetector);
        let behavior = Arc::new(ScriptedBehaviorClassifier::new(vec![behavior_hit(0.8)]));
        let h = harness(config, weapon, behavior);

        let first = h.pipeline.analyze_frame(b"frame-1".to_vec()).await.unwrap();
        assert!(first.alert.is_none());

        // Window fills on the second frame; behavior stream alerts alone
        let second = h.pipeline.analyze_frame(b"frame-2".to_vec()).await.unwrap();
        let alert = second.alert.expect("behavior stream must still alert");
        assert_eq!(alert.kind, "aggression_detected");
        assert_eq!(alert.severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_stats_track_activity() {
        let weapon = Arc::new(ScriptedWeaponDetector::new(Vec::new()));
        let behavior = Arc::new(ScriptedBehaviorClassifier::new(Vec::new()));
        let h = harness(EngineConfig::balanced(), weapon, behavior);

        for i in 0..4u8 {
            h.pipeline.analyze_frame(vec![i + 1]).await.unwrap();
        }

        let stats = h.pipeline.stats();
        assert_eq!(stats.frames_processed, 4);
        assert_eq!(stats.alerts_triggered, 0);
    }
}
