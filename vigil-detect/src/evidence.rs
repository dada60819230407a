//! Evidence store collaborator
//!
//! Saves the triggering frame when an alert is admitted and returns a
//! reference the alert payload carries to operators.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use vigil_core::Frame;

use crate::CollaboratorError;

/// Evidence storage contract
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Persist the frame and return its evidence reference
    async fn save_frame(&self, frame: &Frame) -> Result<String, CollaboratorError>;
}

/// Filesystem evidence store
///
/// Frames land under the configured directory as
/// `alert_<fingerprint>_<timestamp>.bin`.
pub struct FileEvidenceStore {
    dir: PathBuf,
}

impl FileEvidenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl EvidenceStore for FileEvidenceStore {
    async fn save_frame(&self, frame: &Frame) -> Result<String, CollaboratorError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "alert_{}_{}.bin",
            frame.fingerprint(),
            frame.captured_at.timestamp_millis()
        );
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &frame.data).await?;

        debug!(path = %path.display(), "evidence frame saved");
        Ok(path.display().to_string())
    }
}

/// In-memory evidence store for tests
#[derive(Default)]
pub struct MemoryEvidenceStore {
    saved: Mutex<Vec<String>>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_refs(&self) -> Vec<String> {
        self.saved.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.saved.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.lock().is_empty()
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn save_frame(&self, frame: &Frame) -> Result<String, CollaboratorError> {
        let reference = format!("mem://{}", frame.fingerprint());
        self.saved.lock().push(reference.clone());
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_file_store_writes_frame() {
        let dir = std::env::temp_dir().join(format!("vigil-evidence-{}", Uuid::new_v4()));
        let store = FileEvidenceStore::new(&dir);
        let frame = Frame::new(vec![7, 7, 7], Utc::now()).unwrap();

        let reference = store.save_frame(&frame).await.unwrap();
        let saved = tokio::fs::read(&reference).await.unwrap();
        assert_eq!(saved, vec![7, 7, 7]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_returns_reference() {
        let store = MemoryEvidenceStore::new();
        let frame = Frame::new(vec![1], Utc::now()).unwrap();

        let reference = store.save_frame(&frame).await.unwrap();
        assert!(reference.starts_with("mem://"));
        assert_eq!(store.len(), 1);
    }
}
