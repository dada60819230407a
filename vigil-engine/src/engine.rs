//! Fusion engine composition
//!
//! Owns all session-wide mutable state (debounce count, sliding window,
//! history, cooldown map) behind a single mutex so that concurrent callers
//! observe one consistent, serialized ordering of frames. Each mutating
//! operation is a single atomic transition: an abandoned caller can never
//! leave partially-updated state visible to others.
//!
//! The fingerprint cache and the subscriber registry are separately locked;
//! their correctness does not depend on global frame ordering.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use vigil_core::{
    Alert, ConfigError, DetectionSignal, DetectionStream, EngineConfig, FrameObservation,
    FusionPolicy, FusionResult,
};

use crate::{
    AlertDispatcher, AlertGate, DispatchReport, FrameFingerprintCache, GateDecision,
    HistoryTracker, SequenceBuffer, SequenceOutcome, StatusReport, Subscription, TrendReport,
    WeaponStreamDebouncer,
};

/// Everything the engine decided about one fused observation
#[derive(Debug, Clone)]
pub struct FrameAssessment {
    /// The classified result (also recorded in history)
    pub result: FusionResult,
    /// Whether the result may become a dispatched alert
    pub gate: GateDecision,
    /// Trend over the recent history window, including this result
    pub trend: TrendReport,
}

/// State guarded by the serialization boundary
struct EngineState {
    debouncer: WeaponStreamDebouncer,
    sequence: SequenceBuffer,
    history: HistoryTracker,
    gate: AlertGate,
}

/// The signal fusion and alert correlation engine
///
/// Constructed once with validated, immutable configuration; reconfiguration
/// means constructing a new engine.
pub struct FusionEngine {
    config: EngineConfig,
    policy: FusionPolicy,
    state: Mutex<EngineState>,
    cache: FrameFingerprintCache,
    dispatcher: AlertDispatcher,
}

impl FusionEngine {
    /// Build an engine, failing fast on invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let policy = FusionPolicy::new(config.mode, config.weapon_threshold, config.behavior_threshold);
        let state = EngineState {
            debouncer: WeaponStreamDebouncer::new(config.required_hits, config.weapon_threshold),
            sequence: SequenceBuffer::new(config.sequence_length, config.frame_skip),
            history: HistoryTracker::new(config.history_capacity),
            gate: AlertGate::new(config.alert_cooldown_secs),
        };
        let cache = FrameFingerprintCache::new(config.fingerprint_ttl_ms);

        info!(
            mode = ?config.mode,
            weapon_threshold = config.weapon_threshold,
            behavior_threshold = config.behavior_threshold,
            "fusion engine initialized"
        );

        Ok(Self {
            config,
            policy,
            state: Mutex::new(state),
            cache,
            dispatcher: AlertDispatcher::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cached result for this frame content, if still within TTL
    pub fn cached_result(&self, content: &[u8], now: DateTime<Utc>) -> Option<FusionResult> {
        self.cache.lookup(content, now)
    }

    /// Cache the result computed for this frame content
    pub fn cache_result(&self, content: &[u8], result: FusionResult, now: DateTime<Utc>) {
        self.cache.store(content, result, now);
    }

    /// Cache hits observed so far
    pub fn cache_hits(&self) -> u64 {
        self.cache.hit_count()
    }

    /// Offer a frame observation to the behavior-channel window
    pub fn offer_frame(&self, observation: FrameObservation) -> SequenceOutcome {
        self.state.lock().sequence.add_frame(observation)
    }

    /// Clear the behavior-channel window, e.g. after a dispatched alert
    pub fn reset_sequence(&self) {
        self.state.lock().sequence.reset();
    }

    /// Fuse one observation pair stamped with the current time
    pub fn submit(
        &self,
        weapon: Option<DetectionSignal>,
        behavior: Option<DetectionSignal>,
    ) -> FrameAssessment {
        self.submit_at(weapon, behavior, Utc::now())
    }

    /// Fuse one observation pair at an explicit time
    ///
    /// Debounce, fuse, record and gate happen under one lock acquisition, so
    /// the whole submission is a single globally-ordered transition. An
    /// absent stream (detector unavailable) degrades to a no-detection
    /// observation so the other stream can still alert.
    pub fn submit_at(
        &self,
        weapon: Option<DetectionSignal>,
        behavior: Option<DetectionSignal>,
        now: DateTime<Utc>,
    ) -> FrameAssessment {
        let weapon = weapon.unwrap_or_else(|| DetectionSignal::negative(DetectionStream::Weapon, now));

        let mut state = self.state.lock();

        let debounced = state.debouncer.apply(weapon);
        let result = self.policy.fuse(Some(&debounced), behavior.as_ref(), now);
        state.history.record(result.clone());
        let gate = state.gate.admit(&result, now);
        let trend = state.history.trend(self.config.trend_window);
        drop(state);

        match gate {
            GateDecision::Admitted => {
                info!(kind = %result.kind, severity = ?result.severity, "alert admitted");
            }
            GateDecision::Suppressed => {
                debug!(kind = %result.kind, "alert suppressed by cooldown");
            }
            GateDecision::NotAlertable => {}
        }

        FrameAssessment { result, gate, trend }
    }

    /// Register an alert subscriber
    pub fn subscribe(&self) -> Subscription {
        self.dispatcher.subscribe()
    }

    /// Remove an alert subscriber
    pub fn unsubscribe(&self, id: uuid::Uuid) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.dispatcher.subscriber_count()
    }

    /// Fan an admitted alert out to all subscribers
    pub fn dispatch(&self, alert: &Alert) -> DispatchReport {
        self.dispatcher.dispatch(alert)
    }

    /// Trend over the recent history window
    pub fn trend(&self) -> TrendReport {
        self.state.lock().history.trend(self.config.trend_window)
    }

    /// Lifetime status counters
    pub fn status(&self) -> StatusReport {
        self.state.lock().history.status()
    }

    /// Alerts suppressed by cooldown so far
    pub fn suppressed_count(&self) -> u64 {
        self.state.lock().gate.suppressed_count()
    }
}
