use super::presence::Mood;

/// Holds the avatar's mood. Reports a change only when the value differs.
#[derive(Debug, Clone, Default)]
pub struct MoodTracker {
    current: Mood,
}

impl MoodTracker {
    pub fn new(initial: Mood) -> Self {
        Self { current: initial }
    }

    pub fn get(&self) -> Mood {
        self.current
    }

    /// Returns the new mood if it changed, so the caller can notify observers.
    pub fn set(&mut self, mood: Mood) -> Option<Mood> {
        if self.current == mood {
            return None;
        }
        self.current = mood;
        Some(mood)
    }
}
