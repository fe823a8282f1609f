use serde::{Deserialize, Serialize};

pub type DialogId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogSummary {
    pub name: String,
    pub id: DialogId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverseRequest {
    pub dialog_id: DialogId,
    pub input: String,
    pub conversation_id: u64,
    pub client_id: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConverseResponse {
    pub conversation_id: u64,
    pub client_id: u64,
    #[serde(default)]
    pub response: Vec<String>,
}

/// Output of the NLU classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub top_category: String,
    pub top_confidence: f32,
    pub raw_text: String,
}

impl Classification {
    pub fn new(top_category: &str, top_confidence: f32, raw_text: &str) -> Self {
        Self {
            top_category: top_category.to_string(),
            top_confidence,
            raw_text: raw_text.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({:.2}): {}",
            self.top_category, self.top_confidence, self.raw_text
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCandidate {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

/// Structured response of a question pipeline. Candidates are best-first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub parse: serde_json::Value,
    #[serde(default)]
    pub questions: Vec<QuestionCandidate>,
    #[serde(default)]
    pub answers: Vec<AnswerCandidate>,
}

impl AskResponse {
    pub fn best_answer(&self) -> Option<&AnswerCandidate> {
        self.answers.first().filter(|a| !a.text.trim().is_empty())
    }
}
