use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

use crate::constants::aggregation::{
    DEFAULT_MAX_ISSUES, DEFAULT_MIN_KEYWORD_FREQUENCY, DEFAULT_PROBLEM_KEYWORDS,
};
use crate::constants::clustering::{
    DEFAULT_EMERGENT_LABEL_TERMS, DEFAULT_EMERGENT_MIN_SIMILARITY, DEFAULT_EXEMPLARS_PER_THEME,
    DEFAULT_QUOTE_MAX_CHARS, DEFAULT_SEEDED_MIN_SIMILARITY,
};
use crate::constants::limits::{DEFAULT_MAX_PLACEHOLDER_RATIO, DEFAULT_MAX_RESPONSE_CHARS};
use crate::constants::metadata::META_FIELD_SEGMENT;
use crate::constants::normalizer::{DEFAULT_MIN_TOKEN_LENGTH, DEFAULT_STOP_WORDS};
use crate::constants::sentiment::{
    DEFAULT_NEGATION_WINDOW, DEFAULT_NEGATIVE_BELOW, DEFAULT_POSITIVE_ABOVE,
};
use crate::data::SentimentLabel;
use crate::errors::AnalysisError;
use crate::hash::stable_hash_with;
use crate::normalizer::{TextNormalizer, canonical_token};
use crate::types::{MetaKey, ThemeLabel, Token};

/// Controls how raw text is turned into tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Tokens removed after case-folding (matched case-insensitively).
    pub stop_words: Vec<Token>,
    /// Tokens shorter than this many chars are discarded.
    pub min_token_length: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
        }
    }
}

/// Polarity cut-offs used to bucket scores into labels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentThresholds {
    /// Polarity strictly below this is negative.
    pub negative_below: f32,
    /// Polarity strictly above this is positive.
    pub positive_above: f32,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            negative_below: DEFAULT_NEGATIVE_BELOW,
            positive_above: DEFAULT_POSITIVE_ABOVE,
        }
    }
}

impl SentimentThresholds {
    /// Bucket a polarity score.
    pub fn label(&self, polarity: f32) -> SentimentLabel {
        if polarity < self.negative_below {
            SentimentLabel::Negative
        } else if polarity > self.positive_above {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        let Self {
            negative_below,
            positive_above,
        } = *self;
        if !negative_below.is_finite() || !positive_above.is_finite() {
            return Err(AnalysisError::config("sentiment thresholds must be finite"));
        }
        if !(-1.0..=1.0).contains(&negative_below) || !(-1.0..=1.0).contains(&positive_above) {
            return Err(AnalysisError::config(
                "sentiment thresholds must lie within [-1, 1]",
            ));
        }
        if negative_below > positive_above {
            return Err(AnalysisError::config(format!(
                "negative threshold {negative_below} exceeds positive threshold {positive_above}"
            )));
        }
        Ok(())
    }
}

/// Sentiment scoring behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentConfig {
    /// Polarity cut-offs for labels.
    pub thresholds: SentimentThresholds,
    /// Tokens after a negation marker whose polarity is flipped (0 disables negation).
    pub negation_window: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            thresholds: SentimentThresholds::default(),
            negation_window: DEFAULT_NEGATION_WINDOW,
        }
    }
}

/// Built-in similarity metrics between token sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// `|A ∩ B| / min(|A|, |B|)`.
    OverlapCoefficient,
    /// `|A ∩ B| / |A ∪ B|`.
    Jaccard,
    /// `2|A ∩ B| / (|A| + |B|)`.
    Dice,
}

/// How many themes a response may join.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// Join every seeded theme that clears the threshold.
    Soft,
    /// Join only the dominant theme.
    Dominant,
}

/// A theme defined up front by its keywords.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeededTheme {
    /// Display label; must be unique ignoring case.
    pub label: ThemeLabel,
    /// Keywords that each normalize to a single token.
    pub keywords: Vec<Token>,
}

impl SeededTheme {
    /// Seeded theme from a label and its keywords.
    pub fn new<L, K, I>(label: L, keywords: I) -> Self
    where
        L: Into<ThemeLabel>,
        I: IntoIterator<Item = K>,
        K: Into<Token>,
    {
        Self {
            label: label.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// UX feedback categories used when no seeds are configured explicitly.
    pub fn ux_defaults() -> Vec<SeededTheme> {
        vec![
            SeededTheme::new(
                "usability",
                ["easy", "difficult", "confusing", "intuitive", "simple", "complicated"],
            ),
            SeededTheme::new(
                "performance",
                ["fast", "slow", "quick", "loading", "responsive", "laggy"],
            ),
            SeededTheme::new(
                "design",
                ["design", "interface", "layout", "navigation", "menu", "button"],
            ),
            SeededTheme::new(
                "functionality",
                ["search", "find", "discover", "browse", "filter", "sort"],
            ),
            SeededTheme::new(
                "personalization",
                [
                    "recommendation",
                    "recommendations",
                    "suggestions",
                    "personalized",
                    "relevant",
                    "accurate",
                ],
            ),
            SeededTheme::new(
                "technical_issues",
                ["bug", "bugs", "error", "errors", "crash", "crashes", "crashing", "broken"],
            ),
        ]
    }
}

/// Seeded and emergent theme clustering behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Themes matched first, in id order.
    pub seeded_themes: Vec<SeededTheme>,
    /// Similarity metric shared by both phases.
    pub metric: MetricKind,
    /// Soft or dominant-only theme membership.
    pub membership: Membership,
    /// A response joins a seeded theme only when its similarity strictly
    /// exceeds this value.
    pub seeded_min_similarity: f32,
    /// Group unmatched responses into emergent themes.
    pub allow_emergent: bool,
    /// Minimum similarity for a response to join an existing emergent theme.
    pub emergent_min_similarity: f32,
    /// Number of member tokens used to label an emergent theme.
    pub emergent_label_terms: usize,
    /// Exemplars kept per theme.
    pub exemplars_per_theme: usize,
    /// Maximum characters of an exemplar quote.
    pub quote_max_chars: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seeded_themes: SeededTheme::ux_defaults(),
            metric: MetricKind::OverlapCoefficient,
            membership: Membership::Soft,
            seeded_min_similarity: DEFAULT_SEEDED_MIN_SIMILARITY,
            allow_emergent: true,
            emergent_min_similarity: DEFAULT_EMERGENT_MIN_SIMILARITY,
            emergent_label_terms: DEFAULT_EMERGENT_LABEL_TERMS,
            exemplars_per_theme: DEFAULT_EXEMPLARS_PER_THEME,
            quote_max_chars: DEFAULT_QUOTE_MAX_CHARS,
        }
    }
}

/// Metadata field used to break statistics down by segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentField {
    /// Group by the raw metadata value.
    Attribute(MetaKey),
    /// Group by the calendar day of a timestamp-like metadata value.
    Day(MetaKey),
}

impl SegmentField {
    /// Metadata key read from each response.
    pub fn key(&self) -> &str {
        match self {
            SegmentField::Attribute(key) | SegmentField::Day(key) => key,
        }
    }

    /// Display name used in breakdown tables (`segment`, `timestamp:day`).
    pub fn name(&self) -> String {
        match self {
            SegmentField::Attribute(key) => key.clone(),
            SegmentField::Day(key) => format!("{key}:day"),
        }
    }
}

/// Run-level statistics behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Metadata fields to break statistics down by.
    pub segment_fields: Vec<SegmentField>,
    /// Keywords counted across negative responses to surface priority issues.
    pub problem_keywords: Vec<Token>,
    /// Maximum priority issues reported.
    pub max_issues: usize,
    /// Minimum occurrences for a seeded keyword to enter the keyword table.
    pub min_keyword_frequency: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            segment_fields: vec![SegmentField::Attribute(
                META_FIELD_SEGMENT.as_str().to_string(),
            )],
            problem_keywords: DEFAULT_PROBLEM_KEYWORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
            max_issues: DEFAULT_MAX_ISSUES,
            min_keyword_frequency: DEFAULT_MIN_KEYWORD_FREQUENCY,
        }
    }
}

/// Per-record acceptance limits; violations become record errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordLimits {
    /// Share of placeholder tokens above which a record is undecodable.
    pub max_placeholder_ratio: f32,
    /// Longer responses are not truncated; they become `TooLong` record
    /// errors and are excluded from analysis.
    pub max_response_chars: usize,
}

impl Default for RecordLimits {
    fn default() -> Self {
        Self {
            max_placeholder_ratio: DEFAULT_MAX_PLACEHOLDER_RATIO,
            max_response_chars: DEFAULT_MAX_RESPONSE_CHARS,
        }
    }
}

/// Top-level analysis configuration, validated at pipeline invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Tokenizer settings.
    pub normalizer: NormalizerConfig,
    /// Scoring settings.
    pub sentiment: SentimentConfig,
    /// Clustering settings.
    pub clustering: ClusteringConfig,
    /// Statistics settings.
    pub aggregation: AggregationConfig,
    /// Per-record limits.
    pub limits: RecordLimits,
}

impl AnalysisConfig {
    /// Reject configuration that would make a run ill-defined.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.sentiment.thresholds.validate()?;
        self.validate_clustering()?;
        self.validate_aggregation()?;

        let ratio = self.limits.max_placeholder_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(AnalysisError::config(
                "max_placeholder_ratio must lie within (0, 1]",
            ));
        }
        if self.limits.max_response_chars == 0 {
            return Err(AnalysisError::config("max_response_chars must be > 0"));
        }
        Ok(())
    }

    fn validate_clustering(&self) -> Result<(), AnalysisError> {
        let clustering = &self.clustering;
        unit_interval("seeded_min_similarity", clustering.seeded_min_similarity)?;
        unit_interval("emergent_min_similarity", clustering.emergent_min_similarity)?;
        if clustering.emergent_label_terms == 0 {
            return Err(AnalysisError::config("emergent_label_terms must be > 0"));
        }
        if clustering.exemplars_per_theme == 0 {
            return Err(AnalysisError::config("exemplars_per_theme must be > 0"));
        }
        if clustering.quote_max_chars == 0 {
            return Err(AnalysisError::config("quote_max_chars must be > 0"));
        }

        let normalizer = TextNormalizer::new(&self.normalizer);
        let mut labels = HashSet::new();
        for theme in &clustering.seeded_themes {
            let label = theme.label.trim();
            if label.is_empty() {
                return Err(AnalysisError::config("seeded theme label must not be empty"));
            }
            if !labels.insert(label.to_lowercase()) {
                return Err(AnalysisError::config(format!(
                    "duplicate seeded theme label '{label}'"
                )));
            }
            if theme.keywords.is_empty() {
                return Err(AnalysisError::config(format!(
                    "seeded theme '{label}' has no keywords"
                )));
            }
            for keyword in &theme.keywords {
                if normalizer.keyword_token(keyword).is_none() {
                    return Err(AnalysisError::config(format!(
                        "keyword '{keyword}' of seeded theme '{label}' does not normalize to a single token"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_aggregation(&self) -> Result<(), AnalysisError> {
        let aggregation = &self.aggregation;
        if aggregation.max_issues == 0 {
            return Err(AnalysisError::config("max_issues must be > 0"));
        }
        if aggregation.min_keyword_frequency == 0 {
            return Err(AnalysisError::config("min_keyword_frequency must be > 0"));
        }
        for keyword in &aggregation.problem_keywords {
            if canonical_token(keyword).is_none() {
                return Err(AnalysisError::config(format!(
                    "problem keyword '{keyword}' does not normalize to a single token"
                )));
            }
        }
        let mut names = HashSet::new();
        for field in &aggregation.segment_fields {
            if field.key().trim().is_empty() {
                return Err(AnalysisError::config("segment field key must not be empty"));
            }
            if !names.insert(field.name()) {
                return Err(AnalysisError::config(format!(
                    "duplicate segment field '{}'",
                    field.name()
                )));
            }
        }
        Ok(())
    }

    /// Stable fingerprint used to derive deterministic run ids.
    pub(crate) fn fingerprint(&self) -> u64 {
        let encoded = serde_json::to_string(self).unwrap_or_default();
        stable_hash_with(|hasher| encoded.hash(hasher))
    }
}

fn unit_interval(name: &str, value: f32) -> Result<(), AnalysisError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::config(format!(
            "{name} must lie within [0, 1] (got {value})"
        )));
    }
    Ok(())
}
