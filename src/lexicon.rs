//! Lexicon store: sentiment polarity weights, negation markers and intensifiers.
//!
//! A store is immutable once built. Load it once, wrap it in an `Arc`, and hand
//! clones of the `Arc` to every pipeline; concurrent runs read it without locking.

use std::collections::{HashMap, HashSet};

use crate::errors::AnalysisError;
use crate::normalizer::canonical_token;
use crate::types::Token;

/// Read-only sentiment lexicon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LexiconStore {
    polarity: HashMap<Token, f32>,
    negators: HashSet<Token>,
    intensifiers: HashMap<Token, f32>,
}

/// Incremental builder for [`LexiconStore`]; validation happens in `build`.
#[derive(Clone, Debug, Default)]
pub struct LexiconBuilder {
    polarity: Vec<(String, f32)>,
    negators: Vec<String>,
    intensifiers: Vec<(String, f32)>,
}

impl LexiconBuilder {
    /// Add (or override) one polarity weight.
    pub fn polarity(mut self, word: impl Into<String>, weight: f32) -> Self {
        self.polarity.push((word.into(), weight));
        self
    }

    /// Add many polarity weights.
    pub fn polarities<I, W>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (W, f32)>,
        W: Into<String>,
    {
        self.polarity
            .extend(entries.into_iter().map(|(word, weight)| (word.into(), weight)));
        self
    }

    /// Add negation markers.
    pub fn negators<I, W>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        self.negators.extend(words.into_iter().map(Into::into));
        self
    }

    /// Add one intensifier multiplier applied to the following token.
    pub fn intensifier(mut self, word: impl Into<String>, multiplier: f32) -> Self {
        self.intensifiers.push((word.into(), multiplier));
        self
    }

    /// Validate entries and freeze the store.
    pub fn build(self) -> Result<LexiconStore, AnalysisError> {
        let mut store = LexiconStore::default();
        for (word, weight) in self.polarity {
            if !weight.is_finite() {
                return Err(AnalysisError::config(format!(
                    "lexicon weight for '{word}' is not finite"
                )));
            }
            store.polarity.insert(canonical(&word)?, weight);
        }
        for word in self.negators {
            store.negators.insert(canonical(&word)?);
        }
        for (word, multiplier) in self.intensifiers {
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(AnalysisError::config(format!(
                    "intensifier multiplier for '{word}' must be finite and >= 0"
                )));
            }
            store.intensifiers.insert(canonical(&word)?, multiplier);
        }
        Ok(store)
    }
}

impl LexiconStore {
    /// Start an empty [`LexiconBuilder`].
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    /// Build a store from polarity weights and negation markers.
    pub fn new<P, N, W>(polarity: P, negators: N) -> Result<Self, AnalysisError>
    where
        P: IntoIterator<Item = (W, f32)>,
        N: IntoIterator<Item = W>,
        W: Into<String>,
    {
        Self::builder().polarities(polarity).negators(negators).build()
    }

    /// Small built-in English lexicon tuned for product feedback.
    pub fn english() -> Self {
        let mut store = LexiconStore::default();
        for (word, weight) in ENGLISH_POLARITY {
            store.polarity.insert((*word).to_string(), *weight);
        }
        for word in ENGLISH_NEGATORS {
            store.negators.insert((*word).to_string());
        }
        for (word, multiplier) in ENGLISH_INTENSIFIERS {
            store.intensifiers.insert((*word).to_string(), *multiplier);
        }
        store
    }

    /// Polarity weight of a token (0 when absent).
    pub fn weight(&self, token: &str) -> f32 {
        self.polarity.get(token).copied().unwrap_or(0.0)
    }

    /// Whether the token carries any sentiment weight.
    pub fn is_polar(&self, token: &str) -> bool {
        self.polarity.get(token).is_some_and(|weight| *weight != 0.0)
    }

    /// Whether the token opens a negation window.
    pub fn is_negator(&self, token: &str) -> bool {
        self.negators.contains(token)
    }

    /// Multiplier for the token after an intensifier, if the token is one.
    pub fn intensifier(&self, token: &str) -> Option<f32> {
        self.intensifiers.get(token).copied()
    }

    /// Number of polarity entries.
    pub fn len(&self) -> usize {
        self.polarity.len()
    }

    /// A store with no polarity entries cannot score anything.
    pub fn is_empty(&self) -> bool {
        self.polarity.is_empty()
    }
}

/// Entries are stored in the form the normalizer emits, so `don't` is kept as `dont`.
fn canonical(word: &str) -> Result<Token, AnalysisError> {
    canonical_token(word).ok_or_else(|| {
        AnalysisError::config(format!(
            "lexicon entry '{word}' must normalize to a single non-empty token"
        ))
    })
}

const ENGLISH_POLARITY: &[(&str, f32)] = &[
    ("accurate", 0.5),
    ("amazing", 0.9),
    ("annoying", -0.7),
    ("awesome", 0.9),
    ("awful", -0.9),
    ("bad", -0.7),
    ("beautiful", 0.8),
    ("best", 0.9),
    ("better", 0.5),
    ("broken", -0.7),
    ("buggy", -0.6),
    ("clean", 0.4),
    ("complicated", -0.5),
    ("confusing", -0.6),
    ("crash", -0.6),
    ("crashes", -0.6),
    ("crashing", -0.6),
    ("difficult", -0.5),
    ("disappointed", -0.7),
    ("disappointing", -0.7),
    ("dislike", -0.6),
    ("easy", 0.6),
    ("enjoy", 0.6),
    ("excellent", 0.9),
    ("expensive", -0.4),
    ("fantastic", 0.9),
    ("fast", 0.5),
    ("frustrating", -0.8),
    ("good", 0.6),
    ("great", 0.8),
    ("happy", 0.7),
    ("hard", -0.3),
    ("hate", -0.9),
    ("hated", -0.9),
    ("hates", -0.9),
    ("helpful", 0.6),
    ("horrible", -0.9),
    ("intuitive", 0.6),
    ("laggy", -0.6),
    ("like", 0.3),
    ("love", 0.9),
    ("loved", 0.9),
    ("loves", 0.9),
    ("modern", 0.3),
    ("nice", 0.5),
    ("perfect", 1.0),
    ("perfectly", 0.9),
    ("poor", -0.6),
    ("relevant", 0.4),
    ("reliable", 0.6),
    ("responsive", 0.5),
    ("simple", 0.4),
    ("slow", -0.5),
    ("smooth", 0.6),
    ("straightforward", 0.5),
    ("terrible", -0.9),
    ("unusable", -0.9),
    ("useful", 0.6),
    ("useless", -0.8),
    ("wonderful", 0.9),
    ("worse", -0.6),
    ("worst", -1.0),
];

const ENGLISH_NEGATORS: &[&str] = &[
    "aint", "cannot", "cant", "didnt", "doesnt", "dont", "hardly", "isnt", "never", "no",
    "nobody", "none", "nor", "not", "nothing", "wasnt", "werent", "without", "wont", "wouldnt",
];

const ENGLISH_INTENSIFIERS: &[(&str, f32)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("really", 1.3),
    ("super", 1.4),
    ("too", 1.2),
    ("very", 1.3),
    ("barely", 0.5),
    ("slightly", 0.6),
    ("somewhat", 0.7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_lexicon_is_populated() {
        let lexicon = LexiconStore::english();
        assert!(!lexicon.is_empty());
        assert!(lexicon.weight("great") > 0.0);
        assert!(lexicon.weight("terrible") < 0.0);
        assert_eq!(lexicon.weight("packaging"), 0.0);
        assert!(lexicon.is_negator("not"));
        assert_eq!(lexicon.intensifier("very"), Some(1.3));
        assert!(lexicon.is_polar("love"));
        assert!(!lexicon.is_polar("price"));
    }

    #[test]
    fn builder_case_folds_and_overrides_entries() {
        let lexicon = LexiconStore::builder()
            .polarity("Good", 0.5)
            .polarity("good", 0.7)
            .negators(["NOT"])
            .intensifier("Very", 2.0)
            .build()
            .unwrap();
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.weight("good"), 0.7);
        assert!(lexicon.is_negator("not"));
        assert_eq!(lexicon.intensifier("very"), Some(2.0));
    }

    #[test]
    fn builder_rejects_invalid_entries() {
        assert!(LexiconStore::builder().polarity("good", f32::NAN).build().is_err());
        assert!(LexiconStore::builder().polarity("  ", 0.5).build().is_err());
        assert!(LexiconStore::builder().polarity("very good", 0.5).build().is_err());
        assert!(
            LexiconStore::builder()
                .polarity("good", 0.5)
                .intensifier("very", -1.0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn builder_stores_contractions_in_normalized_form() {
        let lexicon = LexiconStore::builder()
            .polarity("Don't-care", 0.1)
            .build();
        assert!(lexicon.is_err());

        let lexicon = LexiconStore::builder()
            .polarity("like", 0.5)
            .negators(["don't", "Can’t"])
            .intensifier("Super", 1.4)
            .build()
            .unwrap();
        assert!(lexicon.is_negator("dont"));
        assert!(lexicon.is_negator("cant"));
        assert!(!lexicon.is_negator("don't"));
        assert_eq!(lexicon.intensifier("super"), Some(1.4));
    }

    #[test]
    fn new_builds_from_pairs() {
        let lexicon = LexiconStore::new([("good", 0.5), ("bad", -0.5)], ["not"]).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert!(lexicon.is_negator("not"));
    }

    #[test]
    fn empty_store_reports_empty() {
        let lexicon = LexiconStore::builder().negators(["not"]).build().unwrap();
        assert!(lexicon.is_empty());
    }
}
