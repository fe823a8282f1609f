#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use parley::kernel::debug::InMemoryDebugRegistry;
use parley::kernel::event::{Event, InputContent};
use parley::kernel::phrases::PhrasePicker;
use parley::kernel::reactor::Collaborators;
use parley::kernel::scheduler::SideEffect;
use parley::kernel::telemetry::TelemetryRecorder;
use parley::outputs::{ChannelTextSink, QuestionCard, QuestionDisplay, TextOutput};
use parley::services::types::{
    AnswerCandidate, AskResponse, ConverseRequest, ConverseResponse, DialogSummary,
    QuestionCandidate,
};
use parley::services::{DialogService, QaService, ServiceError};
use parley::{ParleyConfig, Reactor};

pub const DIALOG_ID: u64 = 7;

pub struct MockDialog {
    listings: Mutex<VecDeque<Result<Vec<DialogSummary>, ServiceError>>>,
    replies: Mutex<VecDeque<Result<ConverseResponse, ServiceError>>>,
    pub list_calls: AtomicUsize,
    pub requests: Mutex<Vec<ConverseRequest>>,
}

impl MockDialog {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_listing(&self, listing: Result<Vec<DialogSummary>, ServiceError>) {
        self.listings.lock().unwrap().push_back(listing);
    }

    pub fn push_reply(&self, reply: Result<ConverseResponse, ServiceError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DialogService for MockDialog {
    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        // Unscripted calls see the default dialog
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(companion_listing()))
    }

    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ConverseResponse::default()))
    }
}

pub struct MockQa {
    responses: Mutex<VecDeque<Result<AskResponse, ServiceError>>>,
    delay: Duration,
    pub asked: Mutex<Vec<(String, String)>>,
}

impl MockQa {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: Result<AskResponse, ServiceError>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl QaService for MockQa {
    async fn ask(&self, pipeline: &str, question: &str) -> Result<AskResponse, ServiceError> {
        self.asked
            .lock()
            .unwrap()
            .push((pipeline.to_string(), question.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AskResponse::default()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Open(QuestionCard),
    Close,
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub calls: Mutex<Vec<DisplayCall>>,
}

impl QuestionDisplay for RecordingDisplay {
    fn open(&self, card: QuestionCard) {
        self.calls.lock().unwrap().push(DisplayCall::Open(card));
    }

    fn close(&self) {
        self.calls.lock().unwrap().push(DisplayCall::Close);
    }
}

pub struct Harness {
    pub reactor: Reactor,
    pub tx: mpsc::Sender<Event>,
    pub dialog: Arc<MockDialog>,
    pub qa: Arc<MockQa>,
    pub recorder: Arc<TelemetryRecorder>,
    pub debug: Arc<InMemoryDebugRegistry>,
    pub display: Arc<RecordingDisplay>,
    pub text_rx: mpsc::UnboundedReceiver<TextOutput>,
    pub config: ParleyConfig,
}

pub fn harness() -> Harness {
    harness_with(ParleyConfig::default(), MockQa::new())
}

pub fn harness_with(config: ParleyConfig, qa: MockQa) -> Harness {
    let dialog = Arc::new(MockDialog::new());
    let qa = Arc::new(qa);
    let recorder = Arc::new(TelemetryRecorder::new());
    let debug = Arc::new(InMemoryDebugRegistry::new());
    let display = Arc::new(RecordingDisplay::default());
    let (text, text_rx) = ChannelTextSink::new();

    let collaborators = Collaborators {
        dialog: dialog.clone(),
        qa: qa.clone(),
        notifications: recorder.clone(),
        debug: debug.clone(),
        text: Arc::new(text),
        display: display.clone(),
    };

    let (tx, rx) = mpsc::channel(100);
    let phrases = PhrasePicker::with_seed(config.phrases.clone(), 42).unwrap();
    let reactor = Reactor::with_phrases(rx, tx.clone(), &config, collaborators, phrases).unwrap();

    Harness {
        reactor,
        tx,
        dialog,
        qa,
        recorder,
        debug,
        display,
        text_rx,
        config,
    }
}

pub fn companion_listing() -> Vec<DialogSummary> {
    vec![
        DialogSummary {
            name: "weather".to_string(),
            id: 3,
        },
        DialogSummary {
            name: "companion".to_string(),
            id: DIALOG_ID,
        },
    ]
}

pub fn input(content: InputContent) -> Event {
    Event::input("test", content)
}

pub fn answer(text: &str, confidence: f32) -> AskResponse {
    AskResponse {
        parse: serde_json::json!({ "intent": "lookup" }),
        questions: vec![QuestionCandidate {
            text: "what is the capital of france".to_string(),
            confidence: 0.7,
        }],
        answers: vec![AnswerCandidate {
            text: text.to_string(),
            confidence,
        }],
    }
}

pub fn spoken(effects: &[SideEffect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            SideEffect::Speak(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn count(effects: &[SideEffect], pred: impl Fn(&SideEffect) -> bool) -> usize {
    effects.iter().filter(|e| pred(e)).count()
}

/// Attached, dialog resolved, still asleep.
pub fn resolved(h: &mut Harness) {
    let effects = h.reactor.on_attach();
    let epoch = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::ListDialogs { epoch } => Some(*epoch),
            _ => None,
        })
        .expect("startup lists dialogs");
    h.reactor.step(Event::DialogsListed {
        epoch,
        result: Ok(companion_listing()),
    });
}

/// Attached, resolved and awake.
pub fn listening(h: &mut Harness) {
    resolved(h);
    h.reactor.step(input(InputContent::Wake(None)));
}
