use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PhraseBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhraseCategory {
    Greeting,
    Farewell,
    Failure,
    Error,
}

impl PhraseCategory {
    pub const ALL: [PhraseCategory; 4] = [
        PhraseCategory::Greeting,
        PhraseCategory::Farewell,
        PhraseCategory::Failure,
        PhraseCategory::Error,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PhraseCategory::Greeting => "greeting",
            PhraseCategory::Farewell => "farewell",
            PhraseCategory::Failure => "failure",
            PhraseCategory::Error => "error",
        }
    }
}

/// Uniform random choice over fixed, non-empty phrase lists.
#[derive(Debug)]
pub struct PhrasePicker {
    book: PhraseBook,
    rng: StdRng,
}

impl PhrasePicker {
    /// Rejects a book with an empty category.
    pub fn new(book: PhraseBook) -> Result<Self, ConfigError> {
        Self::with_rng(book, StdRng::from_entropy())
    }

    pub fn with_seed(book: PhraseBook, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(book, StdRng::seed_from_u64(seed))
    }

    fn with_rng(book: PhraseBook, rng: StdRng) -> Result<Self, ConfigError> {
        book.validate()?;
        Ok(Self { book, rng })
    }

    pub fn phrases(&self, category: PhraseCategory) -> &[String] {
        self.book.list(category)
    }

    pub fn pick(&mut self, category: PhraseCategory) -> String {
        // Lists are validated non-empty at construction.
        self.book
            .list(category)
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn pick_covers_every_phrase() {
        let mut picker = PhrasePicker::with_seed(PhraseBook::default(), 7).unwrap();
        let expected = picker.phrases(PhraseCategory::Greeting).to_vec();

        let mut seen: HashMap<String, usize> = HashMap::new();
        for _ in 0..2000 {
            *seen.entry(picker.pick(PhraseCategory::Greeting)).or_default() += 1;
        }

        assert_eq!(seen.len(), expected.len());
        for phrase in expected {
            assert!(seen[&phrase] > 2000 / 20, "'{}' picked too rarely", phrase);
        }
    }

    #[test]
    fn empty_category_is_rejected() {
        let mut book = PhraseBook::default();
        book.farewell.clear();
        assert!(PhrasePicker::new(book).is_err());
    }
}
