use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::presence::{ConversationState, Mood};
use crate::config::{AppearanceOverrides, ConfigError};

/// Color and animation speed multiplier for one state or mood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppearanceEntry {
    pub color: [u8; 3],
    pub speed: f32,
}

impl AppearanceEntry {
    pub const fn new(color: [u8; 3], speed: f32) -> Self {
        Self { color, speed }
    }
}

/// Placeholder used only by `AppearanceTable::lenient`.
pub const NEUTRAL: AppearanceEntry = AppearanceEntry::new([128, 128, 128], 1.0);

/// Immutable lookup from state and mood to appearance.
/// Complete by construction.
#[derive(Debug, Clone)]
pub struct AppearanceTable {
    states: HashMap<ConversationState, AppearanceEntry>,
    moods: HashMap<Mood, AppearanceEntry>,
    missing: Vec<String>,
}

impl AppearanceTable {
    /// Fails if any state or mood lacks an entry.
    pub fn new(
        states: HashMap<ConversationState, AppearanceEntry>,
        moods: HashMap<Mood, AppearanceEntry>,
    ) -> Result<Self, ConfigError> {
        let missing = missing_keys(&states, &moods);
        if !missing.is_empty() {
            return Err(ConfigError::IncompleteAppearance(missing.join(", ")));
        }
        Ok(Self {
            states,
            moods,
            missing,
        })
    }

    /// Fills absent entries with `NEUTRAL` and logs a warning for each.
    pub fn lenient(
        mut states: HashMap<ConversationState, AppearanceEntry>,
        mut moods: HashMap<Mood, AppearanceEntry>,
    ) -> Self {
        let missing = missing_keys(&states, &moods);
        for key in &missing {
            warn!(key = %key, "No appearance entry, using neutral placeholder");
        }
        for state in ConversationState::ALL {
            states.entry(state).or_insert(NEUTRAL);
        }
        for mood in Mood::ALL {
            moods.entry(mood).or_insert(NEUTRAL);
        }
        Self {
            states,
            moods,
            missing,
        }
    }

    pub fn builtin() -> Self {
        use ConversationState::*;
        let states = HashMap::from([
            (Connecting, AppearanceEntry::new([90, 90, 110], 0.5)),
            (SleepingListening, AppearanceEntry::new([40, 60, 120], 0.3)),
            (Listening, AppearanceEntry::new([60, 180, 255], 1.0)),
            (Thinking, AppearanceEntry::new([255, 200, 60], 2.0)),
            (Answering, AppearanceEntry::new([80, 220, 120], 1.5)),
            (DidNotUnderstand, AppearanceEntry::new([255, 140, 0], 1.2)),
            (Error, AppearanceEntry::new([220, 30, 30], 0.8)),
        ]);
        let moods = HashMap::from([
            (Mood::Sleeping, AppearanceEntry::new([30, 30, 80], 0.3)),
            (Mood::Idle, AppearanceEntry::new([200, 200, 200], 1.0)),
            (Mood::Interested, AppearanceEntry::new([120, 220, 255], 1.3)),
            (Mood::Urgent, AppearanceEntry::new([255, 80, 40], 2.0)),
            (Mood::Upset, AppearanceEntry::new([180, 40, 90], 1.6)),
            (Mood::Shy, AppearanceEntry::new([255, 170, 200], 0.7)),
        ]);
        Self {
            states,
            moods,
            missing: Vec::new(),
        }
    }

    /// Builtin table with named overrides applied. Unknown names are rejected.
    pub fn with_overrides(overrides: &AppearanceOverrides) -> Result<Self, ConfigError> {
        let mut table = Self::builtin();
        for (name, entry) in &overrides.states {
            let state: ConversationState = name
                .parse()
                .map_err(|_| ConfigError::UnknownAppearanceKey(format!("states.{name}")))?;
            table.states.insert(state, *entry);
        }
        for (name, entry) in &overrides.moods {
            let mood: Mood = name
                .parse()
                .map_err(|_| ConfigError::UnknownAppearanceKey(format!("moods.{name}")))?;
            table.moods.insert(mood, *entry);
        }
        Self::new(table.states, table.moods)
    }

    pub fn for_state(&self, state: ConversationState) -> AppearanceEntry {
        self.states.get(&state).copied().unwrap_or(NEUTRAL)
    }

    pub fn for_mood(&self, mood: Mood) -> AppearanceEntry {
        self.moods.get(&mood).copied().unwrap_or(NEUTRAL)
    }

    /// Keys that were filled with the placeholder by `lenient`.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

impl Default for AppearanceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn missing_keys(
    states: &HashMap<ConversationState, AppearanceEntry>,
    moods: &HashMap<Mood, AppearanceEntry>,
) -> Vec<String> {
    let mut missing: Vec<String> = ConversationState::ALL
        .iter()
        .filter(|s| !states.contains_key(s))
        .map(|s| format!("state:{}", s.name()))
        .collect();
    missing.extend(
        Mood::ALL
            .iter()
            .filter(|m| !moods.contains_key(m))
            .map(|m| format!("mood:{}", m.name())),
    );
    missing
}
