pub mod display;
pub mod realizer;
pub mod text;

pub use display::{LoggingDisplay, QuestionCard, QuestionDisplay};
pub use text::{ChannelTextSink, TextOutput, TextSink};
