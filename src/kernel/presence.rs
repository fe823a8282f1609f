use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The conversational lifecycle of the avatar.
/// Exactly one is active at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationState {
    /// Constructed but not yet started.
    Connecting,
    /// Waiting for the wake word. Dialog session is reset.
    SleepingListening,
    /// Awake and waiting for a classified utterance.
    Listening,
    /// A dialog or question request is in flight.
    Thinking,
    /// The host is speaking our output.
    Answering,
    /// The last utterance could not be classified.
    DidNotUnderstand,
    /// Something fatal happened. A restart is scheduled.
    Error,
}

impl ConversationState {
    pub const ALL: [ConversationState; 7] = [
        ConversationState::Connecting,
        ConversationState::SleepingListening,
        ConversationState::Listening,
        ConversationState::Thinking,
        ConversationState::Answering,
        ConversationState::DidNotUnderstand,
        ConversationState::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::Connecting => "Connecting",
            ConversationState::SleepingListening => "SleepingListening",
            ConversationState::Listening => "Listening",
            ConversationState::Thinking => "Thinking",
            ConversationState::Answering => "Answering",
            ConversationState::DidNotUnderstand => "DidNotUnderstand",
            ConversationState::Error => "Error",
        }
    }

    /// States that force the mood back to `Sleeping` on entry.
    pub fn forces_sleep(&self) -> bool {
        matches!(
            self,
            ConversationState::Connecting
                | ConversationState::SleepingListening
                | ConversationState::Error
        )
    }

    pub fn is_listening(&self) -> bool {
        matches!(
            self,
            ConversationState::SleepingListening | ConversationState::Listening
        )
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Connecting
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConversationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown conversation state '{s}'"))
    }
}

/// Cosmetic behavioural modifier. Orthogonal to `ConversationState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Sleeping,
    Idle,
    Interested,
    Urgent,
    Upset,
    Shy,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Sleeping,
        Mood::Idle,
        Mood::Interested,
        Mood::Urgent,
        Mood::Upset,
        Mood::Shy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mood::Sleeping => "Sleeping",
            Mood::Idle => "Idle",
            Mood::Interested => "Interested",
            Mood::Urgent => "Urgent",
            Mood::Upset => "Upset",
            Mood::Shy => "Shy",
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::Sleeping
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mood| mood.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mood '{s}'"))
    }
}

/// Requests for a conversation state transition.
/// These are REQUESTS, not forces. The graph validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceRequest {
    Start,
    WakeWordDetected,
    QuestionIssued,
    DialogIssued,
    AnswerDelivered,
    UserCancel,
    ClassificationMissed,
    SleepCommand,
    SpeakingStarted,
    /// Carries the listening variant to return to.
    SpeakingEnded(ConversationState),
    Fatal,
}

/// Guard table for the turn-taking machine.
pub struct PresenceGraph;

impl PresenceGraph {
    /// Pure function: (Current State, Request) -> New State
    /// Returns None if the transition is invalid/ignored.
    pub fn transition(
        current: ConversationState,
        request: PresenceRequest,
    ) -> Option<ConversationState> {
        use ConversationState::*;
        use PresenceRequest::*;

        match (current, request) {
            (_, Start) => Some(SleepingListening),

            (SleepingListening, WakeWordDetected) => Some(Listening),

            // DidNotUnderstand keeps the ear open for a rephrase
            (Listening | DidNotUnderstand, QuestionIssued) => Some(Thinking),
            (Listening | DidNotUnderstand, DialogIssued) => Some(Thinking),

            (Thinking, AnswerDelivered) => Some(Listening),
            (Thinking, UserCancel) => Some(Listening),

            // Error is only left through Start, so a scheduled restart always finds it
            (SleepingListening | Error, ClassificationMissed) => None,
            (_, ClassificationMissed) => Some(DidNotUnderstand),

            (SleepingListening | Error, SleepCommand) => None,
            (_, SleepCommand) => Some(SleepingListening),

            (Error, SpeakingStarted | SpeakingEnded(_)) => None,
            (_, SpeakingStarted) => Some(Answering),
            (_, SpeakingEnded(previous)) if previous.is_listening() => Some(previous),

            (Error, Fatal) => None,
            (_, Fatal) => Some(Error),

            _ => None,
        }
    }
}
