use serde::Serialize;
use tracing::info;

/// What the question widget shows for one answered question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionCard {
    pub pipeline: String,
    pub question: String,
    pub answer: String,
    pub confidence: f32,
}

/// Single-owner question widget. At most one card is open at a time.
pub trait QuestionDisplay: Send + Sync {
    fn open(&self, card: QuestionCard);
    fn close(&self);
}

/// Display for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDisplay;

impl QuestionDisplay for LoggingDisplay {
    fn open(&self, card: QuestionCard) {
        info!(
            pipeline = %card.pipeline,
            confidence = card.confidence,
            "[DISPLAY] {} -> {}",
            card.question,
            card.answer
        );
    }

    fn close(&self) {
        info!("[DISPLAY] closed");
    }
}
