//! Frame ingestion types
//!
//! A [`Frame`] is validated at construction, before any stateful component
//! is touched. A [`FrameObservation`] is the compact representation the
//! sequence buffer holds for the behavior channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint_hex;

/// Upper bound on a single frame payload (8 MiB)
pub const MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Rejected frames never reach the fusion pipeline
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("empty frame payload")]
    Empty,

    #[error("frame payload of {0} bytes exceeds the 8 MiB limit")]
    Oversized(usize),
}

/// A validated input frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw frame content
    pub data: Vec<u8>,

    /// When the frame was captured
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Validate and wrap raw frame bytes
    pub fn new(data: Vec<u8>, captured_at: DateTime<Utc>) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        if data.len() > MAX_FRAME_BYTES {
            return Err(FrameError::Oversized(data.len()));
        }
        Ok(Self { data, captured_at })
    }

    /// Content fingerprint of this frame
    pub fn fingerprint(&self) -> String {
        fingerprint_hex(&self.data)
    }
}

/// Preprocessed frame representation buffered for sequence classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Monotonic frame number within the feed
    pub sequence_no: u64,

    /// Content fingerprint of the originating frame
    pub fingerprint: String,

    /// When the frame was captured
    pub captured_at: DateTime<Utc>,
}

impl FrameObservation {
    pub fn from_frame(frame: &Frame, sequence_no: u64) -> Self {
        Self {
            sequence_no,
            fingerprint: frame.fingerprint(),
            captured_at: frame.captured_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame_rejected() {
        assert_eq!(Frame::new(Vec::new(), Utc::now()), Err(FrameError::Empty));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let data = vec![0u8; MAX_FRAME_BYTES + 1];
        assert!(matches!(
            Frame::new(data, Utc::now()),
            Err(FrameError::Oversized(_))
        ));
    }

    #[test]
    fn test_valid_frame_accepted() {
        let frame = Frame::new(vec![1, 2, 3], Utc::now()).unwrap();
        assert_eq!(frame.data.len(), 3);
        assert!(!frame.fingerprint().is_empty());
    }

    #[test]
    fn test_observation_carries_fingerprint() {
        let frame = Frame::new(vec![9, 9, 9], Utc::now()).unwrap();
        let obs = FrameObservation::from_frame(&frame, 42);
        assert_eq!(obs.sequence_no, 42);
        assert_eq!(obs.fingerprint, frame.fingerprint());
    }
}
