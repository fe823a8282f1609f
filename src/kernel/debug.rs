use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

/// Read-only introspection published after every event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub state: String,
    pub mood: String,
    pub last_classification: Option<String>,
    pub last_question: Option<String>,
    pub last_answer: Option<String>,
}

/// Debug console capability. Owners register on attach and deregister on detach.
pub trait DebugRegistry: Send + Sync {
    fn register(&self, owner: &str);
    fn publish(&self, owner: &str, snapshot: DebugSnapshot);
    fn deregister(&self, owner: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryDebugRegistry {
    entries: Mutex<HashMap<String, Option<DebugSnapshot>>>,
}

impl InMemoryDebugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, owner: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(owner))
            .unwrap_or(false)
    }

    pub fn latest(&self, owner: &str) -> Option<DebugSnapshot> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(owner).cloned().flatten())
    }
}

impl DebugRegistry for InMemoryDebugRegistry {
    fn register(&self, owner: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.entry(owner.to_string()).or_insert(None);
        }
    }

    fn publish(&self, owner: &str, snapshot: DebugSnapshot) {
        if let Ok(mut entries) = self.entries.lock() {
            // Unregistered owners are ignored
            if let Some(slot) = entries.get_mut(owner) {
                *slot = Some(snapshot);
            }
        }
    }

    fn deregister(&self, owner: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(owner);
        }
    }
}
