use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use super::event::Notification;

pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: &Notification);
}

/// Publish/subscribe bus. Slow subscribers lag and lose the oldest messages.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl NotificationSink for NotificationBus {
    fn publish(&self, notification: &Notification) {
        // No subscribers is fine
        if self.tx.send(notification.clone()).is_err() {
            trace!(kind = ?notification.kind(), "Notification dropped, no subscribers");
        }
    }
}

/// Forwards to several sinks in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationSink for FanoutSink {
    fn publish(&self, notification: &Notification) {
        for sink in &self.sinks {
            sink.publish(notification);
        }
    }
}
