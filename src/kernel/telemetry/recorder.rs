use std::collections::VecDeque;
use std::sync::Mutex;

use super::event::Notification;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use super::sink::NotificationSink;

const MAX_EVENTS: usize = 10_000;

/// Bounded in-memory log of published notifications.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: Mutex<VecDeque<Notification>>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(MAX_EVENTS)),
        }
    }

    pub fn record(&self, event: Notification) {
        let mut buffer = match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if buffer.len() >= MAX_EVENTS {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }

    pub fn events(&self) -> Vec<Notification> {
        match self.buffer.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        // Delegate to pure functional metrics module
        match self.buffer.lock() {
            Ok(guard) => compute_snapshot(&guard),
            Err(poisoned) => compute_snapshot(&poisoned.into_inner()),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.buffer.lock() {
            guard.clear();
        }
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for TelemetryRecorder {
    fn publish(&self, notification: &Notification) {
        self.record(notification.clone());
    }
}
