use super::debug::DebugSnapshot;
use super::event::Epoch;
use super::mood::MoodTracker;
use super::presence::{ConversationState, Mood};
use crate::services::types::{
    AnswerCandidate, Classification, ConverseResponse, DialogId, QuestionCandidate,
};

/// Identifiers correlating requests with the dialog service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogSession {
    pub dialog_id: Option<DialogId>,
    pub conversation_id: u64,
    pub client_id: u64,
}

/// Results of the current question cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQuestion {
    pub classification: Option<Classification>,
    pub parse: Option<serde_json::Value>,
    pub questions: Vec<QuestionCandidate>,
    pub answers: Vec<AnswerCandidate>,
    /// Answer text as spoken, after cleanup.
    pub answer_text: Option<String>,
}

/// Strict state delta. This is the ONLY way state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    Enter(ConversationState),
    SetMood(Mood),
    DialogResolved(DialogId),
    DialogForgotten,
    SessionUpdated(ConverseResponse),
    SessionReset,
    ClassificationStored(Classification),
    PipelineSelected(String),
    AnswerStored {
        parse: serde_json::Value,
        questions: Vec<QuestionCandidate>,
        answers: Vec<AnswerCandidate>,
        answer_text: String,
    },
    PendingCleared,
    DisplayOpened,
    DisplayClosed,
    /// Invalidates every request issued so far.
    CycleAdvanced,
    /// Invalidates the previous startup's dialog listing.
    StartupAdvanced,
}

#[derive(Debug, Clone)]
pub struct TurnState {
    current: ConversationState,
    previous_listening: ConversationState,
    mood: MoodTracker,
    session: DialogSession,
    pending: PendingQuestion,
    active_pipeline: String,
    display_open: bool,
    cycle: Epoch,
    startup: Epoch,
    // Monotonic version, bumped on every delta
    pub version: u64,
}

impl TurnState {
    pub fn new(default_pipeline: &str) -> Self {
        Self {
            current: ConversationState::Connecting,
            previous_listening: ConversationState::SleepingListening,
            mood: MoodTracker::new(Mood::Sleeping),
            session: DialogSession::default(),
            pending: PendingQuestion::default(),
            active_pipeline: default_pipeline.to_string(),
            display_open: false,
            cycle: 0,
            startup: 0,
            version: 0,
        }
    }

    /// Applies a delta. Returns the new mood for `SetMood` if it changed.
    pub fn reduce(&mut self, delta: StateDelta) -> Option<Mood> {
        self.version += 1;

        match delta {
            StateDelta::Enter(state) => {
                self.current = state;
                if state.is_listening() {
                    self.previous_listening = state;
                }
            }
            StateDelta::SetMood(mood) => return self.mood.set(mood),
            StateDelta::DialogResolved(id) => self.session.dialog_id = Some(id),
            StateDelta::DialogForgotten => self.session.dialog_id = None,
            StateDelta::SessionUpdated(response) => {
                self.session.conversation_id = response.conversation_id;
                self.session.client_id = response.client_id;
            }
            StateDelta::SessionReset => {
                self.session.conversation_id = 0;
                self.session.client_id = 0;
            }
            StateDelta::ClassificationStored(classification) => {
                self.pending.classification = Some(classification);
            }
            StateDelta::PipelineSelected(pipeline) => self.active_pipeline = pipeline,
            StateDelta::AnswerStored {
                parse,
                questions,
                answers,
                answer_text,
            } => {
                self.pending.parse = Some(parse);
                self.pending.questions = questions;
                self.pending.answers = answers;
                self.pending.answer_text = Some(answer_text);
            }
            StateDelta::PendingCleared => self.pending = PendingQuestion::default(),
            StateDelta::DisplayOpened => self.display_open = true,
            StateDelta::DisplayClosed => self.display_open = false,
            StateDelta::CycleAdvanced => self.cycle += 1,
            StateDelta::StartupAdvanced => self.startup += 1,
        }
        None
    }

    // Read-only accessors for renderers and the debug console
    pub fn current(&self) -> ConversationState {
        self.current
    }

    pub fn previous_listening(&self) -> ConversationState {
        self.previous_listening
    }

    pub fn mood(&self) -> Mood {
        self.mood.get()
    }

    pub fn session(&self) -> &DialogSession {
        &self.session
    }

    pub fn pending(&self) -> &PendingQuestion {
        &self.pending
    }

    pub fn active_pipeline(&self) -> &str {
        &self.active_pipeline
    }

    pub fn display_open(&self) -> bool {
        self.display_open
    }

    pub fn cycle(&self) -> Epoch {
        self.cycle
    }

    /// Epoch of the current startup. Only a new start advances it.
    pub fn startup(&self) -> Epoch {
        self.startup
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            state: self.current.name().to_string(),
            mood: self.mood.get().name().to_string(),
            last_classification: self.pending.classification.as_ref().map(|c| c.summary()),
            last_question: self
                .pending
                .questions
                .first()
                .map(|q| format!("{} ({:.2})", q.text, q.confidence)),
            last_answer: self.pending.answer_text.clone(),
        }
    }
}
