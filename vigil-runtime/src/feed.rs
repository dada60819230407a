//! Feed runner
//!
//! Paces a synthetic frame stream through the pipeline on a fixed tick,
//! used by the CLI demo and load tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::FramePipeline;

/// Synthetic feed configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Total frames to push through the pipeline
    pub frames: u64,
    /// Milliseconds between frames
    pub tick_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            tick_interval_ms: 33,
        }
    }
}

/// Outcome of a completed feed
#[derive(Debug, Clone)]
pub struct FeedSummary {
    pub frames: u64,
    pub alerts: u64,
    pub suppressed: u64,
}

/// Drives synthetic frames through a pipeline at a fixed rate
pub struct FeedRunner {
    pipeline: Arc<FramePipeline>,
    config: FeedConfig,
}

impl FeedRunner {
    pub fn new(pipeline: Arc<FramePipeline>, config: FeedConfig) -> Self {
        Self { pipeline, config }
    }

    /// Run the feed to completion
    pub async fn run(&self) -> Result<FeedSummary, anyhow::Error> {
        let mut ticker = interval(Duration::from_millis(self.config.tick_interval_ms));
        let mut alerts = 0u64;

        info!(
            frames = self.config.frames,
            tick_ms = self.config.tick_interval_ms,
            "synthetic feed starting"
        );

        for i in 0..self.config.frames {
            ticker.tick().await;

            let data = format!("synthetic-frame-{i:08}").into_bytes();
            match self.pipeline.analyze_frame(data).await {
                Ok(report) => {
                    if let Some(alert) = report.alert {
                        alerts += 1;
                        info!(
                            kind = %alert.kind,
                            severity = ?alert.severity,
                            confidence = alert.confidence,
                            "feed alert"
                        );
                    }
                }
                Err(err) => {
                    warn!(frame = i, error = %err, "frame rejected");
                }
            }
        }

        Ok(FeedSummary {
            frames: self.config.frames,
            alerts,
            suppressed: self.pipeline.engine().suppressed_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::EngineConfig;
    use vigil_detect::{
        MemoryEvidenceStore, MemoryIncidentLog, SimulatedBehaviorClassifier,
        SimulatedWeaponDetector,
    };

    #[tokio::test]
    async fn test_quiet_feed_produces_no_alerts() {
        let pipeline = Arc::new(
            FramePipeline::new(
                EngineConfig::balanced(),
                Arc::new(SimulatedWeaponDetector::new(0.0)),
                Arc::new(SimulatedBehaviorClassifier::new(0.0)),
                Arc::new(MemoryIncidentLog::new()),
                Arc::new(MemoryEvidenceStore::new()),
            )
            .unwrap(),
        );

        let runner = FeedRunner::new(
            pipeline.clone(),
            FeedConfig {
                frames: 5,
                tick_interval_ms: 1,
            },
        );

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.alerts, 0);
        assert_eq!(pipeline.stats().frames_processed, 5);
    }
}
