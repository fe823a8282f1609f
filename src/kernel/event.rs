use super::presence::Mood;
use crate::services::types::{AskResponse, Classification, ConverseResponse, DialogSummary};
use crate::services::ServiceError;

/// Identifies the conversation cycle a request was issued in.
/// Completions from an older cycle are stale.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub enum Event {
    /// External signals (wake word, NLU, host commands)
    Input(InputEvent),
    /// Tagged with the startup epoch, not the conversation cycle.
    DialogsListed {
        epoch: Epoch,
        result: Result<Vec<DialogSummary>, ServiceError>,
    },
    ConverseCompleted {
        epoch: Epoch,
        result: Result<ConverseResponse, ServiceError>,
    },
    AskCompleted {
        epoch: Epoch,
        result: Result<AskResponse, ServiceError>,
    },
    /// The scheduled recovery after `Error` fired.
    RestartDue,
}

#[derive(Debug, Clone)]
pub struct InputEvent {
    pub source: String,
    pub content: InputContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputContent {
    Start,
    /// Wake word heard, optionally with the utterance that followed it.
    Wake(Option<Classification>),
    Classified(Classification),
    ClassificationFailed,
    Cancel,
    Sleep,
    /// Host started (true) or stopped (false) speaking our output.
    Speaking(bool),
    SetMood(Mood),
}

impl InputEvent {
    pub fn new(source: &str, content: InputContent) -> Self {
        Self {
            source: source.to_string(),
            content,
        }
    }
}

impl Event {
    pub fn input(source: &str, content: InputContent) -> Self {
        Event::Input(InputEvent::new(source, content))
    }
}
