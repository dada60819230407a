//! Weapon stream debouncer
//!
//! Frame-level object detectors flicker: a single-frame false positive is
//! endemic. The debouncer requires `required_hits` consecutive positive
//! frames before letting a weapon detection through, while negative frames
//! clear the track instantly - false negatives should drop a false alarm at
//! once, false positives must persist to count.

use tracing::debug;
use vigil_core::DetectionSignal;

/// Per-channel temporal consistency filter for the weapon stream
#[derive(Debug)]
pub struct WeaponStreamDebouncer {
    required_hits: u32,
    confidence_threshold: f64,
    consecutive_hits: u32,
}

impl WeaponStreamDebouncer {
    pub fn new(required_hits: u32, confidence_threshold: f64) -> Self {
        Self {
            required_hits,
            confidence_threshold,
            consecutive_hits: 0,
        }
    }

    /// Current consecutive positive count
    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    /// Clear the track
    pub fn reset(&mut self) {
        self.consecutive_hits = 0;
    }

    /// Filter one raw weapon observation
    ///
    /// A frame counts as a hit only when the detector reported a detection at
    /// or above the confidence threshold. Below `required_hits` the raw
    /// signal is replaced by a `validating` pseudo-signal carrying progress;
    /// from the `required_hits`-th consecutive hit onward the raw signal
    /// passes through unmodified. Any non-hit resets the count and passes
    /// the raw signal through immediately.
    pub fn apply(&mut self, raw: DetectionSignal) -> DetectionSignal {
        let positive = raw.detected && raw.confidence >= self.confidence_threshold;

        if !positive {
            if self.consecutive_hits > 0 {
                debug!(
                    hits = self.consecutive_hits,
                    "weapon track cleared by negative frame"
                );
            }
            self.consecutive_hits = 0;
            return raw;
        }

        self.consecutive_hits += 1;

        if self.consecutive_hits < self.required_hits {
            debug!(
                hits = self.consecutive_hits,
                required = self.required_hits,
                kind = %raw.kind,
                "weapon signal still validating"
            );
            return DetectionSignal::validating(&raw, self.consecutive_hits, self.required_hits);
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::DetectionStream;

    fn raw(confidence: f64) -> DetectionSignal {
        DetectionSignal::builder(DetectionStream::Weapon)
            .detected(true)
            .kind("firearm")
            .confidence(confidence)
            .build()
    }

    fn negative() -> DetectionSignal {
        DetectionSignal::builder(DetectionStream::Weapon)
            .detected(false)
            .confidence(0.0)
            .build()
    }

    #[test]
    fn test_escalates_on_required_hits() {
        let mut debouncer = WeaponStreamDebouncer::new(3, 0.85);

        let first = debouncer.apply(raw(0.9));
        assert!(!first.detected);
        assert!(first.is_validating());

        let second = debouncer.apply(raw(0.9));
        assert!(second.is_validating());
        assert_eq!(second.metadata["progress_hits"], 2);

        let third = debouncer.apply(raw(0.9));
        assert!(third.detected);
        assert_eq!(third.kind, "firearm");
    }

    #[test]
    fn test_passes_through_after_confirmation() {
        let mut debouncer = WeaponStreamDebouncer::new(3, 0.85);
        for _ in 0..3 {
            debouncer.apply(raw(0.9));
        }

        // Every subsequent consistent frame keeps passing through unmodified
        let fourth = debouncer.apply(raw(0.95));
        assert!(fourth.detected);
        assert_eq!(fourth.confidence, 0.95);
    }

    #[test]
    fn test_negative_resets_immediately() {
        let mut debouncer = WeaponStreamDebouncer::new(3, 0.85);
        debouncer.apply(raw(0.9));
        debouncer.apply(raw(0.9));

        let cleared = debouncer.apply(negative());
        assert!(!cleared.detected);
        assert!(!cleared.is_validating());
        assert_eq!(debouncer.consecutive_hits(), 0);
    }

    #[test]
    fn test_low_confidence_counts_as_negative() {
        // Feed 0.9, 0.9, 0.2, 0.9, 0.9, 0.9 at threshold 0.85: the 0.2
        // frame resets the track and confirmation lands on the final frame.
        let mut debouncer = WeaponStreamDebouncer::new(3, 0.85);

        assert!(debouncer.apply(raw(0.9)).is_validating());
        assert!(debouncer.apply(raw(0.9)).is_validating());

        let dip = debouncer.apply(raw(0.2));
        assert!(!dip.is_validating());
        assert_eq!(debouncer.consecutive_hits(), 0);

        let fourth = debouncer.apply(raw(0.9));
        assert!(fourth.is_validating());
        assert_eq!(fourth.metadata["progress_hits"], 1);

        assert!(debouncer.apply(raw(0.9)).is_validating());
        assert!(debouncer.apply(raw(0.9)).detected);
    }
}
