//! Incident persistence collaborator
//!
//! Fire-and-forget from the core's perspective: a failed write is logged and
//! never blocks alert dispatch.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use vigil_core::{Alert, Severity};

/// Errors from persistence and evidence collaborators
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One persisted incident row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: Uuid,
    pub kind: String,
    pub severity: Severity,
    pub confidence: f64,
    pub description: String,
    pub evidence_ref: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl IncidentRecord {
    /// Build a record from a dispatched alert
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            id: alert.id,
            kind: alert.kind.clone(),
            severity: alert.severity,
            confidence: alert.confidence,
            description: alert.description.clone(),
            evidence_ref: alert.evidence_ref.clone(),
            recorded_at: alert.issued_at,
        }
    }
}

/// Incident persistence contract
#[async_trait]
pub trait IncidentLog: Send + Sync {
    async fn log_incident(&self, record: &IncidentRecord) -> Result<(), CollaboratorError>;
}

/// In-memory incident log for tests and demos
#[derive(Default)]
pub struct MemoryIncidentLog {
    records: Mutex<Vec<IncidentRecord>>,
}

impl MemoryIncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<IncidentRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl IncidentLog for MemoryIncidentLog {
    async fn log_incident(&self, record: &IncidentRecord) -> Result<(), CollaboratorError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Append-only JSON-lines incident log
pub struct JsonlIncidentLog {
    path: PathBuf,
}

impl JsonlIncidentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl IncidentLog for JsonlIncidentLog {
    async fn log_incident(&self, record: &IncidentRecord) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::ResponseAction;

    fn sample_alert() -> Alert {
        Alert {
            id: Uuid::new_v4(),
            kind: "weapon_detected".to_string(),
            severity: Severity::High,
            severity_score: 0.9,
            confidence: 0.88,
            description: "HIGH: weapon detected".to_string(),
            action: ResponseAction::ImmediateAlert,
            evidence_ref: Some("alerts/alert_x.bin".to_string()),
            issued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_log_roundtrip() {
        let log = MemoryIncidentLog::new();
        let record = IncidentRecord::from_alert(&sample_alert());

        log.log_incident(&record).await.unwrap();

        let stored = log.records();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, "weapon_detected");
        assert_eq!(stored[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_jsonl_log_appends_lines() {
        let dir = std::env::temp_dir().join(format!("vigil-test-{}", Uuid::new_v4()));
        let log = JsonlIncidentLog::new(dir.join("incidents.jsonl"));

        let record = IncidentRecord::from_alert(&sample_alert());
        log.log_incident(&record).await.unwrap();
        log.log_incident(&record).await.unwrap();

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert_eq!(content.lines().count(), 2);

        let parsed: IncidentRecord = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.kind, "weapon_detected");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
