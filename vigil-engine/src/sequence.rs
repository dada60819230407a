//! Sequence buffer for the behavior channel
//!
//! Accumulates a fixed-length sliding window of frame observations. The
//! window keeps sliding once full - every stride frame yields a fresh
//! overlapping window - trading redundant classification for lower alert
//! latency versus clear-and-refill.

use std::collections::VecDeque;

use vigil_core::FrameObservation;

/// Outcome of offering one frame to the buffer
#[derive(Debug, Clone)]
pub enum SequenceOutcome {
    /// Frame fell outside the stride; nothing changed
    Skipped,
    /// Window not yet full
    Buffering { filled: usize, capacity: usize },
    /// Window full; snapshot ready for the external sequence classifier
    Ready(Vec<FrameObservation>),
}

/// Fixed-capacity sliding window with FIFO eviction
#[derive(Debug)]
pub struct SequenceBuffer {
    capacity: usize,
    frame_skip: u32,
    window: VecDeque<FrameObservation>,
    offered: u64,
}

impl SequenceBuffer {
    pub fn new(capacity: usize, frame_skip: u32) -> Self {
        Self {
            capacity,
            frame_skip,
            window: VecDeque::with_capacity(capacity),
            offered: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Offer one observation
    ///
    /// Only every `frame_skip`-th offer enters the window; the rest are
    /// skipped with no side effects. Once the window is full, every stride
    /// frame yields a fresh snapshot.
    pub fn add_frame(&mut self, observation: FrameObservation) -> SequenceOutcome {
        self.offered += 1;
        if self.offered % self.frame_skip as u64 != 0 {
            return SequenceOutcome::Skipped;
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(observation);

        if self.window.len() < self.capacity {
            return SequenceOutcome::Buffering {
                filled: self.window.len(),
                capacity: self.capacity,
            };
        }

        SequenceOutcome::Ready(self.window.iter().cloned().collect())
    }

    /// Clear the window and stride counter, e.g. after a dispatched alert so
    /// stale frames cannot re-alert
    pub fn reset(&mut self) {
        self.window.clear();
        self.offered = 0;
    }
}
