//! Bounded detection history and trend analysis
//!
//! A rolling log of fusion results, capped at a fixed capacity with FIFO
//! eviction. Trend analysis over the recent window flags escalating threat
//! activity before any single frame would.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigil_core::FusionResult;

/// Classification of recent detection activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// More than half of the recent window carried a detection
    Escalating,
    /// Detection activity within normal bounds
    Normal,
    /// No history recorded yet
    Idle,
}

/// Rolling trend statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub trend: Trend,
    /// Entries with a detection inside the examined window
    pub recent_alerts: usize,
    /// Mean severity score over the examined window
    pub mean_severity_score: f64,
    /// recent_alerts / examined entries
    pub detection_rate: f64,
    /// Entries actually examined (may be fewer than requested)
    pub examined: usize,
}

/// Lifetime counters for the status surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// Alerts recorded over the tracker's lifetime
    pub total_alerts: u64,
    /// Timestamp of the most recent detection
    pub last_alert_at: Option<DateTime<Utc>>,
    /// Detections within the last 10 recorded entries
    pub alerts_last_10: usize,
}

/// Bounded rolling log of fusion results
#[derive(Debug)]
pub struct HistoryTracker {
    capacity: usize,
    log: VecDeque<FusionResult>,
    total_alerts: u64,
    last_alert_at: Option<DateTime<Utc>>,
}

impl HistoryTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            log: VecDeque::with_capacity(capacity),
            total_alerts: 0,
            last_alert_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a result, evicting the oldest entry past capacity
    pub fn record(&mut self, result: FusionResult) {
        if result.detected {
            self.total_alerts += 1;
            self.last_alert_at = Some(result.classified_at);
        }

        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(result);
    }

    /// Trend statistics over the most recent `window` entries
    pub fn trend(&self, window: usize) -> TrendReport {
        if self.log.is_empty() {
            return TrendReport {
                trend: Trend::Idle,
                recent_alerts: 0,
                mean_severity_score: 0.0,
                detection_rate: 0.0,
                examined: 0,
            };
        }

        let examined = window.min(self.log.len());
        let recent = self.log.iter().skip(self.log.len() - examined);

        let mut recent_alerts = 0usize;
        let mut severity_sum = 0.0;
        for result in recent {
            if result.detected {
                recent_alerts += 1;
            }
            severity_sum += result.severity_score;
        }

        let trend = if recent_alerts as f64 > window as f64 * 0.5 {
            Trend::Escalating
        } else {
            Trend::Normal
        };

        TrendReport {
            trend,
            recent_alerts,
            mean_severity_score: severity_sum / examined as f64,
            detection_rate: recent_alerts as f64 / examined as f64,
            examined,
        }
    }

    /// Lifetime status counters
    pub fn status(&self) -> StatusReport {
        let last_10 = self.log.len().min(10);
        let alerts_last_10 = self
            .log
            .iter()
            .skip(self.log.len() - last_10)
            .filter(|r| r.detected)
            .count();

        StatusReport {
            total_alerts: self.total_alerts,
            last_alert_at: self.last_alert_at,
            alerts_last_10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{DetectionSignal, DetectionStream, FusionMode, FusionPolicy};

    fn result(detected: bool) -> FusionResult {
        let policy = FusionPolicy::new(FusionMode::Adaptive, 0.75, 0.60);
        let weapon = DetectionSignal::builder(DetectionStream::Weapon)
            .detected(detected)
            .kind(if detected { "firearm" } else { "none" })
            .confidence(if detected { 0.9 } else { 0.0 })
            .build();
        policy.fuse(Some(&weapon), None, Utc::now())
    }

    #[test]
    fn test_history_stays_bounded() {
        let mut tracker = HistoryTracker::new(5);
        for _ in 0..12 {
            tracker.record(result(false));
            assert!(tracker.len() <= 5);
        }
        assert_eq!(tracker.len(), 5);
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let mut tracker = HistoryTracker::new(3);
        tracker.record(result(false));
        tracker.record(result(false));
        tracker.record(result(true));
        tracker.record(result(true));

        // Two oldest negatives evicted down to one; both detections retained
        let detected: Vec<bool> = tracker.log.iter().map(|r| r.detected).collect();
        assert_eq!(detected, vec![false, true, true]);
    }

    #[test]
    fn test_trend_escalating() {
        let mut tracker = HistoryTracker::new(100);
        for _ in 0..6 {
            tracker.record(result(true));
        }
        for _ in 0..4 {
            tracker.record(result(false));
        }

        let report = tracker.trend(10);
        assert_eq!(report.recent_alerts, 6);
        assert_eq!(report.trend, Trend::Escalating);
        assert!(report.mean_severity_score > 0.5);
    }

    #[test]
    fn test_trend_normal_at_half() {
        let mut tracker = HistoryTracker::new(100);
        for i in 0..10 {
            tracker.record(result(i % 2 == 0));
        }

        // Exactly half is not escalating
        let report = tracker.trend(10);
        assert_eq!(report.recent_alerts, 5);
        assert_eq!(report.trend, Trend::Normal);
    }

    #[test]
    fn test_trend_idle_without_history() {
        let tracker = HistoryTracker::new(100);
        let report = tracker.trend(10);
        assert_eq!(report.trend, Trend::Idle);
        assert_eq!(report.examined, 0);
    }

    #[test]
    fn test_trend_with_short_history() {
        let mut tracker = HistoryTracker::new(100);
        tracker.record(result(true));
        tracker.record(result(true));

        let report = tracker.trend(10);
        assert_eq!(report.examined, 2);
        assert_eq!(report.detection_rate, 1.0);
    }

    #[test]
    fn test_status_counts_lifetime_alerts() {
        let mut tracker = HistoryTracker::new(3);
        for _ in 0..5 {
            tracker.record(result(true));
        }
        tracker.record(result(false));

        // Eviction does not erase lifetime counters
        let status = tracker.status();
        assert_eq!(status.total_alerts, 5);
        assert!(status.last_alert_at.is_some());
        assert_eq!(status.alerts_last_10, 2);
    }
}
