// Health Signal - "is the node running"

use tokio::sync::{broadcast, watch};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Process-wide running/stopped flag
///
/// `watch` carries the current value for late readers; `broadcast`
/// carries every transition so subscribers never miss a short-lived
/// `true`. Only the supervisor holds a mutable reference.
pub struct HealthSignal {
    current: watch::Sender<bool>,
    changes: broadcast::Sender<bool>,
}

impl HealthSignal {
    pub fn new() -> Self {
        let (current, _) = watch::channel(false);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { current, changes }
    }

    /// Update the flag. Returns true if the value changed (and was broadcast).
    pub(crate) fn set_running(&self, running: bool) -> bool {
        let changed = self.current.send_if_modified(|value| {
            if *value == running {
                false
            } else {
                *value = running;
                true
            }
        });

        if changed {
            // No subscribers is fine
            let _ = self.changes.send(running);
        }
        changed
    }

    pub fn is_running(&self) -> bool {
        *self.current.borrow()
    }

    /// Receiver for the current value
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.current.subscribe()
    }

    /// Receiver for every transition, in order
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.changes.subscribe()
    }
}

impl Default for HealthSignal {
    fn default() -> Self {
        Self::new()
    }
}
