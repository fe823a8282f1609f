//! TOML configuration.
//!
//! Every field has a default so an empty file is a valid config.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::appearance::{AppearanceEntry, AppearanceTable};
use crate::kernel::phrases::PhraseCategory;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("phrase list '{0}' is empty")]
    EmptyPhraseList(&'static str),
    #[error("appearance table is missing entries for: {0}")]
    IncompleteAppearance(String),
    #[error("unknown appearance key: {0}")]
    UnknownAppearanceKey(String),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub conversation: ConversationSettings,
    /// Pipeline name -> spoken template. `{question}` and `{answer}` are substituted.
    pub preambles: HashMap<String, String>,
    pub phrases: PhraseBook,
    pub services: ServiceSettings,
    pub appearance: AppearanceOverrides,
}

impl ParleyConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: ParleyConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conversation.validate()?;
        self.phrases.validate()?;
        self.appearance_table().map(|_| ())
    }

    /// Built-in tables with the configured overrides applied.
    pub fn appearance_table(&self) -> Result<AppearanceTable, ConfigError> {
        AppearanceTable::with_overrides(&self.appearance)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Longest answer spoken or displayed, in characters.
    pub max_answer_chars: usize,
    pub restart_delay_secs: u64,
    pub default_pipeline: String,
    /// Dialog looked up by name at startup.
    pub dialog_name: String,
    pub min_confidence: f32,
    pub question_category: String,
    pub dialog_category: String,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_answer_chars: 200,
            restart_delay_secs: 5,
            default_pipeline: "default".to_string(),
            dialog_name: "companion".to_string(),
            min_confidence: 0.5,
            question_category: "qa".to_string(),
            dialog_category: "dialog".to_string(),
        }
    }
}

impl ConversationSettings {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_answer_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "conversation.max_answer_chars",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid {
                field: "conversation.min_confidence",
                reason: format!("{} is outside 0..=1", self.min_confidence),
            });
        }
        if self.question_category.is_empty() || self.dialog_category.is_empty() {
            return Err(ConfigError::Invalid {
                field: "conversation.question_category",
                reason: "categories must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseBook {
    pub greeting: Vec<String>,
    pub farewell: Vec<String>,
    pub failure: Vec<String>,
    pub error: Vec<String>,
}

impl Default for PhraseBook {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            greeting: owned(&["Hello!", "Hi there.", "Yes?", "I'm listening."]),
            farewell: owned(&["Goodbye.", "See you later.", "Going to sleep now."]),
            failure: owned(&[
                "Sorry, I didn't understand that.",
                "Could you say that again?",
                "I'm not sure what you mean.",
            ]),
            error: owned(&[
                "Something went wrong. Give me a moment.",
                "I lost my train of thought. Reconnecting.",
            ]),
        }
    }
}

impl PhraseBook {
    pub fn list(&self, category: PhraseCategory) -> &[String] {
        match category {
            PhraseCategory::Greeting => &self.greeting,
            PhraseCategory::Farewell => &self.farewell,
            PhraseCategory::Failure => &self.failure,
            PhraseCategory::Error => &self.error,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in PhraseCategory::ALL {
            if self.list(category).is_empty() {
                return Err(ConfigError::EmptyPhraseList(category.name()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub dialog_url: String,
    pub qa_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            dialog_url: "http://localhost:8081".to_string(),
            qa_url: "http://localhost:8082".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl ServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Per-state / per-mood overrides, keyed by variant name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceOverrides {
    pub states: HashMap<String, AppearanceEntry>,
    pub moods: HashMap<String, AppearanceEntry>,
}
