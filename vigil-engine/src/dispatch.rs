//! Alert dispatcher
//!
//! Fans admitted alerts out to every current subscriber. Each subscriber
//! gets one bounded, non-blocking send attempt per alert: a full or closed
//! channel is recorded and logged, never retried, and never fails delivery
//! to the others. Stale subscribers are removed by the transport layer via
//! `unsubscribe` on disconnect, not evicted here.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use vigil_core::Alert;

/// Default per-subscriber channel depth
pub const SUBSCRIBER_BUFFER: usize = 32;

/// Handle returned to a subscriber; dropping the receiver ends delivery
pub struct Subscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<Alert>,
}

/// One failed delivery attempt
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub subscriber: Uuid,
    pub reason: String,
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: Vec<DeliveryFailure>,
}

/// Subscriber registry and fan-out
pub struct AlertDispatcher {
    subscribers: DashMap<Uuid, mpsc::Sender<Alert>>,
    buffer: usize,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::with_buffer(SUBSCRIBER_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            buffer,
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.subscribers.insert(id, tx);
        debug!(subscriber = %id, total = self.subscribers.len(), "subscriber added");
        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber, e.g. on transport disconnect
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, total = self.subscribers.len(), "subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one alert to all current subscribers
    ///
    /// Never returns an error: individual failures are collected in the
    /// report and logged.
    pub fn dispatch(&self, alert: &Alert) -> DispatchReport {
        let mut report = DispatchReport::default();

        for entry in self.subscribers.iter() {
            match entry.value().try_send(alert.clone()) {
                Ok(()) => report.delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber = %entry.key(), alert = %alert.id, "subscriber channel full, alert dropped");
                    report.failed.push(DeliveryFailure {
                        subscriber: *entry.key(),
                        reason: "channel full".to_string(),
                    });
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(subscriber = %entry.key(), alert = %alert.id, "subscriber receiver dropped");
                    report.failed.push(DeliveryFailure {
                        subscriber: *entry.key(),
                        reason: "receiver dropped".to_string(),
                    });
                }
            }
        }

        debug!(
            alert = %alert.id,
            delivered = report.delivered,
            failed = report.failed.len(),
            "alert dispatched"
        );
        report
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
