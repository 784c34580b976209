//! Text normalizer: raw response text to canonical tokens.
//!
//! Normalization never fails. Case is folded, apostrophes are dropped inside
//! words (`don't` -> `dont`), every other punctuation or control character
//! separates tokens, and stop words plus short tokens are removed. Words
//! carrying malformed-encoding replacement characters collapse into a single
//! placeholder token so they stay visible to record validation.

use std::collections::HashSet;

use crate::config::NormalizerConfig;
use crate::constants::normalizer::{PLACEHOLDER_TOKEN, REPLACEMENT_CHAR};
use crate::data::NormalizedText;
use crate::types::Token;

/// Stateless tokenizer built once per run from [`NormalizerConfig`].
#[derive(Clone, Debug)]
pub struct TextNormalizer {
    stop_words: HashSet<Token>,
    min_token_length: usize,
}

impl TextNormalizer {
    /// Build a normalizer; stop words go through [`canonical_token`] so they
    /// compare against tokens in the same form.
    pub fn new(config: &NormalizerConfig) -> Self {
        let stop_words = config
            .stop_words
            .iter()
            .filter_map(|word| canonical_token(word))
            .collect();
        Self {
            stop_words,
            min_token_length: config.min_token_length,
        }
    }

    /// Convert raw text into its canonical token sequence.
    pub fn normalize(&self, raw_text: &str) -> NormalizedText {
        let mut normalized = NormalizedText {
            tokens: Vec::new(),
            placeholder_count: 0,
        };
        let mut current = String::new();
        for ch in raw_text.chars() {
            if is_apostrophe(ch) {
                continue;
            }
            if ch == REPLACEMENT_CHAR {
                current.push(ch);
            } else if ch.is_alphanumeric() {
                current.extend(ch.to_lowercase());
            } else {
                self.flush(&mut current, &mut normalized);
            }
        }
        self.flush(&mut current, &mut normalized);
        normalized
    }

    /// Normalize a configured keyword; `None` unless it yields exactly one real token.
    pub fn keyword_token(&self, keyword: &str) -> Option<Token> {
        let NormalizedText {
            mut tokens,
            placeholder_count,
        } = self.normalize(keyword);
        if tokens.len() == 1 && placeholder_count == 0 {
            tokens.pop()
        } else {
            None
        }
    }

    /// Whether a canonical token is filtered out as a stop word.
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn flush(&self, current: &mut String, normalized: &mut NormalizedText) {
        if current.is_empty() {
            return;
        }
        let token = std::mem::take(current);
        if token.contains(REPLACEMENT_CHAR) {
            normalized.tokens.push(PLACEHOLDER_TOKEN.to_string());
            normalized.placeholder_count += 1;
            return;
        }
        if token.chars().count() < self.min_token_length || self.stop_words.contains(&token) {
            return;
        }
        normalized.tokens.push(token);
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

/// Canonical form of a single configured word, using the tokenizer rules
/// without stop-word or length filtering.
///
/// `"Don't"` becomes `"dont"`. Returns `None` when the word is empty, splits
/// into more than one token, or carries malformed encoding.
pub fn canonical_token(word: &str) -> Option<Token> {
    let unfiltered = TextNormalizer {
        stop_words: HashSet::new(),
        min_token_length: 1,
    };
    unfiltered.keyword_token(word)
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}' | '\u{2018}' | '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(normalizer: &TextNormalizer, text: &str) -> Vec<String> {
        normalizer.normalize(text).tokens
    }

    #[test]
    fn lowercases_strips_punctuation_and_stop_words() {
        let normalizer = TextNormalizer::default();
        assert_eq!(
            tokens(&normalizer, "Great product, love it!"),
            vec!["great", "product", "love"]
        );
        assert_eq!(
            tokens(&normalizer, "The   PRICE is\ttoo\nhigh..."),
            vec!["price", "too", "high"]
        );
    }

    #[test]
    fn empty_and_whitespace_input_yield_no_tokens() {
        let normalizer = TextNormalizer::default();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("  \n\t ").is_empty());
        assert!(normalizer.normalize("?!... --").is_empty());
    }

    #[test]
    fn apostrophes_join_contractions() {
        let normalizer = TextNormalizer::default();
        assert_eq!(
            tokens(&normalizer, "Doesn't work, can’t log in"),
            vec!["doesnt", "work", "cant", "log"]
        );
    }

    #[test]
    fn control_characters_separate_tokens() {
        let normalizer = TextNormalizer::default();
        assert_eq!(tokens(&normalizer, "slow\u{0007}search"), vec!["slow", "search"]);
    }

    #[test]
    fn short_tokens_respect_min_length() {
        let config = NormalizerConfig {
            stop_words: Vec::new(),
            min_token_length: 4,
        };
        let normalizer = TextNormalizer::new(&config);
        assert_eq!(tokens(&normalizer, "UI is so slow"), vec!["slow"]);

        let keep_all = TextNormalizer::new(&NormalizerConfig {
            stop_words: Vec::new(),
            min_token_length: 0,
        });
        assert_eq!(tokens(&keep_all, "a b"), vec!["a", "b"]);
    }

    #[test]
    fn stop_words_are_case_folded_on_construction() {
        let normalizer = TextNormalizer::new(&NormalizerConfig {
            stop_words: vec!["App".into(), "I'm".into()],
            min_token_length: 1,
        });
        assert_eq!(tokens(&normalizer, "I'm using the app"), vec!["using", "the"]);
        assert!(normalizer.is_stop_word("im"));
    }

    #[test]
    fn malformed_encoding_becomes_placeholder() {
        let normalizer = TextNormalizer::default();
        let raw = String::from_utf8_lossy(b"fast \xff\xfeapp ok").into_owned();
        let normalized = normalizer.normalize(&raw);
        assert_eq!(normalized.tokens, vec!["fast", PLACEHOLDER_TOKEN, "ok"]);
        assert_eq!(normalized.placeholder_count, 1);
    }

    #[test]
    fn unicode_letters_are_kept() {
        let normalizer = TextNormalizer::default();
        assert_eq!(tokens(&normalizer, "Très RAPIDE"), vec!["très", "rapide"]);
    }

    #[test]
    fn keyword_token_requires_single_surviving_token() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.keyword_token(" Price "), Some("price".to_string()));
        assert_eq!(normalizer.keyword_token("the"), None);
        assert_eq!(normalizer.keyword_token("too expensive"), None);
        assert_eq!(normalizer.keyword_token(""), None);
    }

    #[test]
    fn canonical_token_matches_normalized_contractions() {
        assert_eq!(canonical_token("Don't"), Some("dont".to_string()));
        assert_eq!(canonical_token(" can’t "), Some("cant".to_string()));
        assert_eq!(canonical_token("the"), Some("the".to_string()));
        assert_eq!(canonical_token("very good"), None);
        assert_eq!(canonical_token("log-in"), None);
        assert_eq!(canonical_token("  "), None);

        let normalizer = TextNormalizer::default();
        assert_eq!(
            normalizer.normalize("I don't like it").tokens,
            vec!["dont", "like"]
        );
    }
}
