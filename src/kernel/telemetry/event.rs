use serde::{Deserialize, Serialize};

use crate::kernel::presence::{ConversationState, Mood};
use crate::services::types::{AnswerCandidate, QuestionCandidate};

/// Everything observers can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Notification {
    StateChanged {
        from: ConversationState,
        to: ConversationState,
    },
    MoodChanged {
        mood: Mood,
    },
    QuestionAvailable {
        questions: Vec<QuestionCandidate>,
    },
    ParseAvailable {
        parse: serde_json::Value,
    },
    AnswersAvailable {
        answers: Vec<AnswerCandidate>,
    },
    DebugMessage(String),
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::StateChanged { .. } => NotificationKind::StateChanged,
            Notification::MoodChanged { .. } => NotificationKind::MoodChanged,
            Notification::QuestionAvailable { .. } => NotificationKind::QuestionAvailable,
            Notification::ParseAvailable { .. } => NotificationKind::ParseAvailable,
            Notification::AnswersAvailable { .. } => NotificationKind::AnswersAvailable,
            Notification::DebugMessage(_) => NotificationKind::DebugMessage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    StateChanged,
    MoodChanged,
    QuestionAvailable,
    ParseAvailable,
    AnswersAvailable,
    DebugMessage,
}
