//! Notifications and telemetry.
//!
//! The reactor publishes through an injected `NotificationSink`.
//! Nothing here is read back by the transition logic.

pub mod event;
pub mod metrics;
pub mod recorder;
pub mod sink;

pub use event::{Notification, NotificationKind};
pub use recorder::TelemetryRecorder;
pub use sink::{FanoutSink, NotificationBus, NotificationSink};
