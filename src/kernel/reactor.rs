use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::appearance::{AppearanceEntry, AppearanceTable};
use super::cancel::CancellationRegistry;
use super::debug::DebugRegistry;
use super::error::TurnError;
use super::event::{Epoch, Event, InputContent};
use super::phrases::{PhraseCategory, PhrasePicker};
use super::presence::{ConversationState, Mood, PresenceGraph, PresenceRequest};
use super::scheduler::{Scheduler, SideEffect};
use super::state::{StateDelta, TurnState};
use super::telemetry::{Notification, NotificationSink};
use crate::config::{ConfigError, ConversationSettings, ParleyConfig};
use crate::outputs::realizer::{clean_answer, realize_answer};
use crate::outputs::{QuestionCard, QuestionDisplay, TextOutput, TextSink};
use crate::services::types::{
    AskResponse, Classification, ConverseRequest, ConverseResponse, DialogId, DialogSummary,
};
use crate::services::{DialogService, QaService, ServiceError};

/// Name the reactor registers under in the debug console.
pub const DEBUG_OWNER: &str = "avatar";

/// Everything the reactor talks to, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub dialog: Arc<dyn DialogService>,
    pub qa: Arc<dyn QaService>,
    pub notifications: Arc<dyn NotificationSink>,
    pub debug: Arc<dyn DebugRegistry>,
    pub text: Arc<dyn TextSink>,
    pub display: Arc<dyn QuestionDisplay>,
}

/// What renderers poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub state: ConversationState,
    pub mood: Mood,
    pub state_look: AppearanceEntry,
    pub mood_look: AppearanceEntry,
}

pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    // Sender clone handed to spawned requests and the restart timer
    tx_clone: mpsc::Sender<Event>,
    pub state: TurnState,
    settings: ConversationSettings,
    preambles: HashMap<String, String>,
    phrases: PhrasePicker,
    appearance: AppearanceTable,
    pub scheduler: Scheduler,
    pub cancel_registry: CancellationRegistry,
    collaborators: Collaborators,
    status_tx: watch::Sender<StatusSnapshot>,
    attached: bool,
}

impl Reactor {
    pub fn new(
        receiver: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        config: &ParleyConfig,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let phrases = PhrasePicker::new(config.phrases.clone())?;
        Self::with_phrases(receiver, tx, config, collaborators, phrases)
    }

    /// Same as `new` with a caller-provided picker (seeded in tests).
    pub fn with_phrases(
        receiver: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        config: &ParleyConfig,
        collaborators: Collaborators,
        phrases: PhrasePicker,
    ) -> Result<Self, ConfigError> {
        let appearance = config.appearance_table()?;
        let state = TurnState::new(&config.conversation.default_pipeline);
        let (status_tx, _) = watch::channel(status_of(&state, &appearance));

        Ok(Self {
            receiver,
            tx_clone: tx,
            state,
            settings: config.conversation.clone(),
            preambles: config.preambles.clone(),
            phrases,
            appearance,
            scheduler: Scheduler::new(),
            cancel_registry: CancellationRegistry::new(),
            collaborators,
            status_tx,
            attached: false,
        })
    }

    pub fn appearance(&self) -> &AppearanceTable {
        &self.appearance
    }

    pub fn status(&self) -> StatusSnapshot {
        status_of(&self.state, &self.appearance)
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Registers with the debug console and starts the conversation.
    pub fn on_attach(&mut self) -> Vec<SideEffect> {
        self.collaborators.debug.register(DEBUG_OWNER);
        self.attached = true;
        self.step(Event::input("host", InputContent::Start))
    }

    /// Cancels timers and requests, closes the display, deregisters.
    pub fn on_detach(&mut self) {
        self.scheduler.cancel_all();
        let aborted = self.cancel_registry.shutdown();
        if self.state.display_open() {
            self.collaborators.display.close();
            self.state.reduce(StateDelta::DisplayClosed);
        }
        if self.attached {
            self.collaborators.debug.deregister(DEBUG_OWNER);
            self.attached = false;
        }
        info!(aborted, "Reactor detached");
    }

    // ------------------------------------------------------------------
    // Core: one event in, side effects out. No I/O, no awaits.
    // ------------------------------------------------------------------

    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        match event {
            Event::Input(input) => {
                debug!(source = %input.source, content = ?input.content, "Input");
                self.on_input(input.content, &mut effects);
            }
            Event::DialogsListed { epoch, result } => {
                if self.is_current(epoch, self.state.startup(), "dialog listing") {
                    self.on_dialogs_listed(result, &mut effects);
                }
            }
            Event::ConverseCompleted { epoch, result } => {
                if self.is_current(epoch, self.state.cycle(), "dialog response") {
                    self.on_converse_completed(result, &mut effects);
                }
            }
            Event::AskCompleted { epoch, result } => {
                if self.is_current(epoch, self.state.cycle(), "answer") {
                    self.on_ask_completed(result, &mut effects);
                }
            }
            Event::RestartDue => {
                if self.state.current() == ConversationState::Error {
                    info!("Recovering from error");
                    self.start(&mut effects);
                } else {
                    debug!(state = %self.state.current(), "Restart skipped, no longer in error");
                }
            }
        }

        self.publish_status();
        effects
    }

    fn on_input(&mut self, content: InputContent, fx: &mut Vec<SideEffect>) {
        match content {
            InputContent::Start => self.start(fx),
            InputContent::Wake(utterance) => self.wake(utterance, fx),
            InputContent::Classified(classification) => self.classified(classification, fx),
            InputContent::ClassificationFailed => self.miss("classifier reported failure", fx),
            InputContent::Cancel => self.cancel(fx),
            InputContent::Sleep => self.sleep(fx),
            InputContent::Speaking(true) => {
                self.request(PresenceRequest::SpeakingStarted, fx);
            }
            InputContent::Speaking(false) => {
                let previous = self.state.previous_listening();
                self.request(PresenceRequest::SpeakingEnded(previous), fx);
            }
            InputContent::SetMood(mood) => self.set_mood(mood, fx),
        }
    }

    fn start(&mut self, fx: &mut Vec<SideEffect>) {
        info!(dialog = %self.settings.dialog_name, "Starting conversation");
        self.advance_cycle(fx);
        self.state.reduce(StateDelta::StartupAdvanced);
        self.close_display(fx);
        self.state.reduce(StateDelta::SessionReset);
        self.state.reduce(StateDelta::PendingCleared);
        self.state.reduce(StateDelta::DialogForgotten);
        self.request(PresenceRequest::Start, fx);
        fx.push(SideEffect::ListDialogs {
            epoch: self.state.startup(),
        });
    }

    fn wake(&mut self, utterance: Option<Classification>, fx: &mut Vec<SideEffect>) {
        if !self.request(PresenceRequest::WakeWordDetected, fx) {
            return;
        }
        self.set_mood(Mood::Idle, fx);

        let dialog_id = self.state.session().dialog_id;
        match (utterance, dialog_id) {
            (Some(classification), Some(dialog_id)) => {
                let input = classification.raw_text.clone();
                self.state
                    .reduce(StateDelta::ClassificationStored(classification));
                fx.push(self.converse_effect(dialog_id, input));
            }
            (utterance, _) => {
                if let Some(classification) = utterance {
                    self.state
                        .reduce(StateDelta::ClassificationStored(classification));
                }
                fx.push(SideEffect::Speak(self.phrases.pick(PhraseCategory::Greeting)));
            }
        }
    }

    fn classified(&mut self, classification: Classification, fx: &mut Vec<SideEffect>) {
        let current = self.state.current();
        if !matches!(
            current,
            ConversationState::Listening | ConversationState::DidNotUnderstand
        ) {
            debug!(state = %current, "Classification ignored");
            return;
        }

        self.state.reduce(StateDelta::PendingCleared);
        self.state
            .reduce(StateDelta::ClassificationStored(classification.clone()));

        if classification.top_confidence < self.settings.min_confidence {
            let reason = format!(
                "confidence {:.2} below {:.2}",
                classification.top_confidence, self.settings.min_confidence
            );
            self.miss(&reason, fx);
            return;
        }

        let category = classification.top_category.as_str();
        let head = category_head(category);

        if head == self.settings.question_category {
            let pipeline = pipeline_from_category(category)
                .unwrap_or_else(|| self.state.active_pipeline())
                .to_string();
            self.state
                .reduce(StateDelta::PipelineSelected(pipeline.clone()));
            self.request(PresenceRequest::QuestionIssued, fx);
            info!(pipeline = %pipeline, "Asking question");
            fx.push(SideEffect::Ask {
                epoch: self.state.cycle(),
                pipeline,
                question: classification.raw_text,
            });
        } else if head == self.settings.dialog_category {
            match self.state.session().dialog_id {
                Some(dialog_id) => {
                    self.request(PresenceRequest::DialogIssued, fx);
                    fx.push(self.converse_effect(dialog_id, classification.raw_text));
                }
                None => self.fail(TurnError::DialogUnresolved, fx),
            }
        } else {
            let reason = format!("unknown category '{category}'");
            self.miss(&reason, fx);
        }
    }

    fn miss(&mut self, reason: &str, fx: &mut Vec<SideEffect>) {
        let err = TurnError::ClassificationMiss(reason.to_string());
        debug!(error = %err, "Did not understand");
        if self.request(PresenceRequest::ClassificationMissed, fx) {
            fx.push(SideEffect::Notify(Notification::DebugMessage(err.to_string())));
            fx.push(SideEffect::Speak(self.phrases.pick(PhraseCategory::Failure)));
        }
    }

    fn cancel(&mut self, fx: &mut Vec<SideEffect>) {
        if self.state.current() != ConversationState::Thinking {
            debug!(state = %self.state.current(), "Cancel ignored");
            return;
        }
        // Leaving Thinking advances the cycle, which drops the request
        self.request(PresenceRequest::UserCancel, fx);
    }

    fn sleep(&mut self, fx: &mut Vec<SideEffect>) {
        let current = self.state.current();
        if PresenceGraph::transition(current, PresenceRequest::SleepCommand).is_none() {
            debug!(state = %current, "Sleep ignored");
            return;
        }
        fx.push(SideEffect::Speak(self.phrases.pick(PhraseCategory::Farewell)));
        self.close_display(fx);
        self.state.reduce(StateDelta::SessionReset);
        self.state.reduce(StateDelta::PendingCleared);
        self.advance_cycle(fx);
        self.request(PresenceRequest::SleepCommand, fx);
    }

    fn on_dialogs_listed(
        &mut self,
        result: Result<Vec<DialogSummary>, ServiceError>,
        fx: &mut Vec<SideEffect>,
    ) {
        let name = self.settings.dialog_name.clone();
        match result {
            Ok(dialogs) => match dialogs.iter().find(|d| d.name == name) {
                Some(dialog) => {
                    info!(dialog = %dialog.name, id = dialog.id, "Dialog resolved");
                    self.state.reduce(StateDelta::DialogResolved(dialog.id));
                }
                None => {
                    let reason = format!("not among {} available dialogs", dialogs.len());
                    self.fail(TurnError::ResolutionFailure { name, reason }, fx);
                }
            },
            Err(err) => {
                let reason = err.to_string();
                self.fail(TurnError::ResolutionFailure { name, reason }, fx);
            }
        }
    }

    fn on_converse_completed(
        &mut self,
        result: Result<ConverseResponse, ServiceError>,
        fx: &mut Vec<SideEffect>,
    ) {
        match result {
            Ok(response) => {
                let lines: Vec<String> = response
                    .response
                    .iter()
                    .map(|line| line.trim())
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                self.state.reduce(StateDelta::SessionUpdated(response));
                for line in lines {
                    fx.push(SideEffect::Speak(line));
                }
            }
            Err(source) => self.fail(
                TurnError::RequestRejected {
                    what: "dialog",
                    source,
                },
                fx,
            ),
        }
    }

    fn on_ask_completed(
        &mut self,
        result: Result<AskResponse, ServiceError>,
        fx: &mut Vec<SideEffect>,
    ) {
        if self.state.current() != ConversationState::Thinking {
            debug!(state = %self.state.current(), "Late answer discarded");
            return;
        }

        let response = match result {
            Ok(response) => response,
            Err(source) => {
                self.fail(
                    TurnError::RequestRejected {
                        what: "question",
                        source,
                    },
                    fx,
                );
                return;
            }
        };

        let pipeline = self.state.active_pipeline().to_string();
        let Some(best) = response.best_answer().cloned() else {
            self.fail(TurnError::EmptyResult(pipeline), fx);
            return;
        };

        let asked = self
            .state
            .pending()
            .classification
            .as_ref()
            .map(|c| c.raw_text.clone())
            .unwrap_or_default();
        let template = self.preambles.get(&pipeline).map(String::as_str);
        let spoken = realize_answer(&asked, &best.text, template, self.settings.max_answer_chars);
        let shown = clean_answer(&best.text, self.settings.max_answer_chars);
        let question = response
            .questions
            .first()
            .map(|q| q.text.clone())
            .unwrap_or(asked);

        let AskResponse {
            parse,
            questions,
            answers,
        } = response;
        self.state.reduce(StateDelta::AnswerStored {
            parse: parse.clone(),
            questions: questions.clone(),
            answers: answers.clone(),
            answer_text: spoken.clone(),
        });
        fx.push(SideEffect::Notify(Notification::ParseAvailable { parse }));
        fx.push(SideEffect::Notify(Notification::QuestionAvailable { questions }));
        fx.push(SideEffect::Notify(Notification::AnswersAvailable { answers }));

        self.open_display(
            QuestionCard {
                pipeline,
                question,
                answer: shown,
                confidence: best.confidence,
            },
            fx,
        );
        fx.push(SideEffect::Speak(spoken));
        self.request(PresenceRequest::AnswerDelivered, fx);
    }

    // ------------------------------------------------------------------
    // Transition plumbing
    // ------------------------------------------------------------------

    /// Asks the guard table for a transition and enters it if allowed.
    fn request(&mut self, request: PresenceRequest, fx: &mut Vec<SideEffect>) -> bool {
        let current = self.state.current();
        match PresenceGraph::transition(current, request) {
            Some(next) => {
                self.enter(next, fx);
                true
            }
            None => {
                debug!(state = %current, request = ?request, "Transition ignored");
                false
            }
        }
    }

    fn enter(&mut self, next: ConversationState, fx: &mut Vec<SideEffect>) {
        let from = self.state.current();
        self.state.reduce(StateDelta::Enter(next));

        if from != next {
            info!(from = %from, to = %next, "State transition");
            fx.push(SideEffect::Notify(Notification::StateChanged { from, to: next }));
        }
        if next.forces_sleep() {
            self.set_mood(Mood::Sleeping, fx);
        }
        if next == ConversationState::Error && from != ConversationState::Error {
            // Display teardown and recovery come before the spoken notice
            self.close_display(fx);
            fx.push(SideEffect::ScheduleRestart(self.settings.restart_delay()));
            self.advance_cycle(fx);
            fx.push(SideEffect::Speak(self.phrases.pick(PhraseCategory::Error)));
        } else if from == ConversationState::Thinking && next != ConversationState::Thinking {
            // Whatever was asked in Thinking can no longer be answered
            self.advance_cycle(fx);
        }
    }

    fn fail(&mut self, err: TurnError, fx: &mut Vec<SideEffect>) {
        warn!(error = %err, state = %self.state.current(), "Turn failed");
        fx.push(SideEffect::Notify(Notification::DebugMessage(err.to_string())));
        self.request(PresenceRequest::Fatal, fx);
    }

    fn set_mood(&mut self, mood: Mood, fx: &mut Vec<SideEffect>) {
        if let Some(mood) = self.state.reduce(StateDelta::SetMood(mood)) {
            debug!(mood = %mood, "Mood changed");
            fx.push(SideEffect::Notify(Notification::MoodChanged { mood }));
        }
    }

    fn advance_cycle(&mut self, fx: &mut Vec<SideEffect>) {
        self.state.reduce(StateDelta::CycleAdvanced);
        if !fx.contains(&SideEffect::AbortRequests) {
            fx.push(SideEffect::AbortRequests);
        }
    }

    fn open_display(&mut self, card: QuestionCard, fx: &mut Vec<SideEffect>) {
        self.close_display(fx);
        fx.push(SideEffect::OpenQuestionDisplay(card));
        self.state.reduce(StateDelta::DisplayOpened);
    }

    fn close_display(&mut self, fx: &mut Vec<SideEffect>) {
        if self.state.display_open() {
            fx.push(SideEffect::CloseQuestionDisplay);
            self.state.reduce(StateDelta::DisplayClosed);
        }
    }

    fn converse_effect(&self, dialog_id: DialogId, input: String) -> SideEffect {
        let session = self.state.session();
        SideEffect::Converse {
            epoch: self.state.cycle(),
            request: ConverseRequest {
                dialog_id,
                input,
                conversation_id: session.conversation_id,
                client_id: session.client_id,
            },
        }
    }

    /// STALE REJECTION: completions from an older epoch are dropped.
    fn is_current(&self, epoch: Epoch, current: Epoch, what: &str) -> bool {
        if epoch != current {
            debug!(epoch, current, "Discarded stale {}", what);
            return false;
        }
        true
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.status());
        if self.attached {
            self.collaborators
                .debug
                .publish(DEBUG_OWNER, self.state.debug_snapshot());
        }
    }

    // ------------------------------------------------------------------
    // Driver: executes side effects and runs the event loop.
    // ------------------------------------------------------------------

    /// Must be called from within a tokio runtime.
    pub fn execute(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Speak(text) => {
                    info!("[SPEAK] {}", text);
                    self.collaborators.text.emit(TextOutput::new(text));
                }
                SideEffect::Notify(notification) => {
                    self.collaborators.notifications.publish(&notification);
                }
                SideEffect::ListDialogs { epoch } => {
                    let dialog = Arc::clone(&self.collaborators.dialog);
                    let tx = self.tx_clone.clone();
                    self.cancel_registry.track_listing(tokio::spawn(async move {
                        let result = dialog.list_dialogs().await;
                        if let Err(e) = &result {
                            warn!("Dialog listing failed: {}", e);
                        }
                        let _ = tx.send(Event::DialogsListed { epoch, result }).await;
                    }));
                }
                SideEffect::Converse { epoch, request } => {
                    let dialog = Arc::clone(&self.collaborators.dialog);
                    let tx = self.tx_clone.clone();
                    self.spawn_request(async move {
                        let result = dialog.converse(&request).await;
                        if let Err(e) = &result {
                            warn!("Dialog exchange failed: {}", e);
                        }
                        let _ = tx.send(Event::ConverseCompleted { epoch, result }).await;
                    });
                }
                SideEffect::Ask {
                    epoch,
                    pipeline,
                    question,
                } => {
                    let qa = Arc::clone(&self.collaborators.qa);
                    let tx = self.tx_clone.clone();
                    self.spawn_request(async move {
                        let result = qa.ask(&pipeline, &question).await;
                        if let Err(e) = &result {
                            warn!(pipeline = %pipeline, "Question failed: {}", e);
                        }
                        let _ = tx.send(Event::AskCompleted { epoch, result }).await;
                    });
                }
                SideEffect::AbortRequests => {
                    let aborted = self.cancel_registry.abort_all();
                    if aborted > 0 {
                        debug!(aborted, "Aborted in-flight requests");
                    }
                }
                SideEffect::ScheduleRestart(delay) => {
                    info!(delay_secs = delay.as_secs(), "Restart scheduled");
                    let tx = self.tx_clone.clone();
                    self.scheduler.schedule(delay, move || {
                        // Waits for queue room rather than losing the restart
                        tokio::spawn(async move {
                            if tx.send(Event::RestartDue).await.is_err() {
                                warn!("Restart dropped, reactor is gone");
                            }
                        });
                    });
                }
                SideEffect::OpenQuestionDisplay(card) => {
                    self.collaborators.display.open(card);
                }
                SideEffect::CloseQuestionDisplay => {
                    self.collaborators.display.close();
                }
            }
        }
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel_registry.track(tokio::spawn(request));
    }

    /// Async Driver Loop. Attaches, processes events until `shutdown`, detaches.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Reactor started");
        let effects = self.on_attach();
        self.execute(effects);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.receiver.recv() => match event {
                    Some(event) => {
                        let effects = self.step(event);
                        self.execute(effects);
                    }
                    None => break,
                },
            }
        }

        self.on_detach();
    }
}

fn status_of(state: &TurnState, appearance: &AppearanceTable) -> StatusSnapshot {
    StatusSnapshot {
        state: state.current(),
        mood: state.mood(),
        state_look: appearance.for_state(state.current()),
        mood_look: appearance.for_mood(state.mood()),
    }
}

/// Category label before the first `-`.
pub fn category_head(category: &str) -> &str {
    category.split_once('-').map_or(category, |(head, _)| head)
}

/// Pipeline named after the first `-` of a category label, if any.
pub fn pipeline_from_category(category: &str) -> Option<&str> {
    category
        .split_once('-')
        .map(|(_, pipeline)| pipeline)
        .filter(|pipeline| !pipeline.is_empty())
}
