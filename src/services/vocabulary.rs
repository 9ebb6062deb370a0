use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

const BUNDLED_VOCABULARY: &str = include_str!("../../data/words.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }

    /// Display position of a tier name; unknown names sort after the known tiers.
    pub fn rank(value: &str) -> usize {
        Self::ALL
            .iter()
            .position(|d| d.as_str() == value)
            .unwrap_or(Self::ALL.len())
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vocabulary tier '{0}' is missing or empty")]
    EmptyTier(&'static str),
}

/// Words grouped by tier, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tiers: HashMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn new(tiers: HashMap<String, Vec<String>>) -> Result<Self, VocabularyError> {
        for difficulty in Difficulty::ALL {
            let non_empty = tiers
                .get(difficulty.as_str())
                .is_some_and(|words| !words.is_empty());
            if !non_empty {
                return Err(VocabularyError::EmptyTier(difficulty.as_str()));
            }
        }
        Ok(Self { tiers })
    }

    pub fn from_json(raw: &str) -> Result<Self, VocabularyError> {
        let tiers: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Self::new(tiers)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn bundled() -> Result<Self, VocabularyError> {
        Self::from_json(BUNDLED_VOCABULARY)
    }

    pub fn words(&self, tier: &str) -> Option<&[String]> {
        self.tiers.get(tier).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedWord {
    pub word: String,
    pub difficulty: String,
}

#[derive(Debug, Clone)]
pub struct WordSelector {
    vocabulary: Arc<Vocabulary>,
}

impl WordSelector {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Picks a word from `tier`, or from a uniformly random tier when `None`.
    /// Unknown tiers fall back to `beginner`.
    pub fn select_word<R: Rng + ?Sized>(&self, rng: &mut R, tier: Option<&str>) -> SelectedWord {
        let requested = match tier {
            Some(name) => name.to_string(),
            None => Difficulty::ALL[rng.random_range(0..Difficulty::ALL.len())]
                .as_str()
                .to_string(),
        };

        let (difficulty, words) = match self.vocabulary.words(&requested) {
            Some(words) if !words.is_empty() => (requested, words),
            _ => {
                let fallback = Difficulty::Beginner.as_str();
                let words = self.vocabulary.words(fallback).unwrap_or_default();
                (fallback.to_string(), words)
            }
        };

        // Vocabulary::new guarantees the beginner tier is non-empty.
        let word = words.choose(rng).cloned().unwrap_or_default();

        SelectedWord { word, difficulty }
    }
}
