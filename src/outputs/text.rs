use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// One phrase or answer for the host to render and speak.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOutput {
    pub id: Uuid,
    pub content: String,
}

impl TextOutput {
    pub fn new(content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
        }
    }
}

pub trait TextSink: Send + Sync {
    fn emit(&self, output: TextOutput);
}

/// Hands outputs to a consumer task.
#[derive(Debug, Clone)]
pub struct ChannelTextSink {
    tx: mpsc::UnboundedSender<TextOutput>,
}

impl ChannelTextSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TextOutput>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TextSink for ChannelTextSink {
    fn emit(&self, output: TextOutput) {
        if self.tx.send(output).is_err() {
            warn!("Text output dropped, consumer is gone");
        }
    }
}
