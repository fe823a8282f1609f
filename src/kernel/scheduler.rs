use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::event::Epoch;
use super::telemetry::Notification;
use crate::outputs::QuestionCard;
use crate::services::types::ConverseRequest;

/// Effects produced by a step. Executed by the reactor's driver half.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Speak(String),
    Notify(Notification),
    ListDialogs {
        epoch: Epoch,
    },
    Converse {
        epoch: Epoch,
        request: ConverseRequest,
    },
    Ask {
        epoch: Epoch,
        pipeline: String,
        question: String,
    },
    /// Abort every in-flight service request.
    AbortRequests,
    ScheduleRestart(Duration),
    OpenQuestionDisplay(QuestionCard),
    CloseQuestionDisplay,
}

/// Delayed callbacks, all cancellable at once.
#[derive(Debug)]
pub struct Scheduler {
    root: CancellationToken,
}

/// Handle to one scheduled callback.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
        }
    }

    /// Runs `callback` after `delay` unless cancelled first.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> ScheduledTask
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.root.child_token();
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => callback(),
                _ = guard.cancelled() => debug!("Scheduled task cancelled"),
            }
        });
        ScheduledTask { token }
    }

    /// Cancels everything scheduled so far. Later schedules still run.
    pub fn cancel_all(&mut self) {
        self.root.cancel();
        self.root = CancellationToken::new();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
