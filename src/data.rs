use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregator::AggregateStats;
pub use crate::types::{MetaKey, MetaValue, ResponseId, RunId, ThemeId, ThemeLabel, Token};

/// One unit of open-ended feedback handed over by the upstream survey processor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Identifier, unique within a batch.
    pub id: ResponseId,
    /// Open-ended answer text (possibly empty).
    pub raw_text: String,
    /// Respondent segmentation fields (segment, question id, timestamp, ...).
    #[serde(default)]
    pub metadata: IndexMap<MetaKey, MetaValue>,
}

impl Response {
    /// Build a response without metadata.
    pub fn new(id: impl Into<ResponseId>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            metadata: IndexMap::new(),
        }
    }

    /// Build a response from raw bytes; malformed UTF-8 becomes U+FFFD.
    pub fn from_bytes(id: impl Into<ResponseId>, raw: &[u8]) -> Self {
        Self::new(id, String::from_utf8_lossy(raw).into_owned())
    }

    /// Attach one metadata attribute (replacing an existing value).
    pub fn with_meta(mut self, key: impl Into<MetaKey>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata attribute.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Canonical token sequence derived from one response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedText {
    /// Tokens in text order.
    pub tokens: Vec<Token>,
    /// Number of tokens replaced with the malformed-encoding placeholder.
    pub placeholder_count: usize,
}

impl NormalizedText {
    /// Whether normalization produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens, placeholders included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Discrete sentiment bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Polarity below the negative threshold.
    Negative,
    /// Polarity within the thresholds, or no scorable tokens.
    Neutral,
    /// Polarity above the positive threshold.
    Positive,
}

impl SentimentLabel {
    /// Every label in reporting order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    /// Lowercase name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment outcome for one response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Id of the scored response.
    pub response_id: ResponseId,
    /// Continuous score in `[-1, 1]`.
    pub polarity: f32,
    /// Bucketed label.
    pub label: SentimentLabel,
}

/// Whether a theme came from configured seed keywords or was discovered at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeOrigin {
    /// Defined by configured keywords.
    Seeded,
    /// Grouped from responses no seed matched.
    Emergent,
}

/// Representative response for a theme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    /// Id of the exemplar response.
    pub response_id: ResponseId,
    /// Similarity of the response to the theme.
    pub similarity: f32,
    /// Whitespace-collapsed, length-capped quote of the raw text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

/// A cluster of responses sharing a topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Seeded ids come first; emergent ids follow.
    pub theme_id: ThemeId,
    /// Seed label, or the top tokens of an emergent theme.
    pub label: ThemeLabel,
    /// Seeded or emergent.
    pub origin: ThemeOrigin,
    /// Seed keywords, or the shared vocabulary of an emergent theme (sorted).
    pub keywords: Vec<Token>,
    /// Members in batch order.
    pub member_response_ids: Vec<ResponseId>,
    /// Prevalence: member count over the number of clustered responses.
    pub score: f32,
    /// Strongest members first.
    pub exemplars: Vec<Exemplar>,
}

impl Theme {
    /// Number of member responses.
    pub fn member_count(&self) -> usize {
        self.member_response_ids.len()
    }
}

/// Unique dominant theme of one response, used for aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeAssignment {
    /// Id of the clustered response.
    pub response_id: ResponseId,
    /// Dominant theme.
    pub theme_id: ThemeId,
    /// Similarity to the dominant theme.
    pub similarity: f32,
}

/// Why a single response could not be analyzed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// Text is dominated by malformed-encoding placeholders.
    Undecodable,
    /// The id was already used earlier in the same batch.
    DuplicateId,
    /// Raw text exceeds the configured size limit.
    TooLong,
}

/// Per-response failure captured as data on the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordError {
    /// Id of the rejected response.
    pub response_id: ResponseId,
    /// Failure category.
    pub kind: RecordErrorKind,
    /// Human-readable detail.
    pub reason: String,
}

/// Informational notice about degenerate input; never fails a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnalysisWarning {
    /// The batch contained no responses.
    EmptyBatch,
    /// Every analyzed response normalized to zero tokens.
    AllResponsesEmpty,
    /// Seeded themes are configured but none cleared the similarity threshold.
    NoSeededThemeMatched,
    /// Every response in a non-empty batch became a record error.
    AllResponsesFailed {
        /// Record errors in the run.
        errors: usize,
    },
}

/// Reference to the batch a run analyzed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRef {
    /// Responses submitted, record errors included.
    pub response_count: usize,
    /// Content fingerprint over ids, text and metadata.
    pub fingerprint: u64,
}

/// Immutable result of one pipeline invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRun {
    /// Deterministic id derived from config and batch content.
    pub run_id: RunId,
    /// The analyzed batch.
    pub batch: BatchRef,
    /// One entry per successfully analyzed response, in batch order.
    pub sentiment: Vec<SentimentResult>,
    /// Ranked themes (member count desc, then label).
    pub themes: Vec<Theme>,
    /// Dominant theme per clustered response, in batch order.
    pub assignments: Vec<ThemeAssignment>,
    /// Run-level statistics.
    pub stats: AggregateStats,
    /// Per-response failures, in batch order.
    pub errors: Vec<RecordError>,
    /// Degenerate-input notices (at most one).
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisRun {
    /// Number of responses that produced a sentiment result.
    pub fn analyzed_count(&self) -> usize {
        self.sentiment.len()
    }

    /// Look up the sentiment result for a response id.
    pub fn sentiment_for(&self, response_id: &str) -> Option<&SentimentResult> {
        self.sentiment
            .iter()
            .find(|result| result.response_id == response_id)
    }

    /// Look up a theme by label.
    pub fn theme_by_label(&self, label: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.label == label)
    }

    /// Themes a response belongs to (soft membership), in rank order.
    pub fn themes_for(&self, response_id: &str) -> Vec<&Theme> {
        self.themes
            .iter()
            .filter(|theme| theme.member_response_ids.iter().any(|id| id == response_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_builders_populate_fields() {
        let response = Response::new("r1", "Fast checkout")
            .with_meta("segment", "enterprise")
            .with_meta("segment", "smb");
        assert_eq!(response.id, "r1");
        assert_eq!(response.meta("segment"), Some("smb"));
        assert_eq!(response.meta("missing"), None);
        assert_eq!(response.metadata.len(), 1);
    }

    #[test]
    fn from_bytes_replaces_malformed_sequences() {
        let response = Response::from_bytes("r2", b"ok \xff\xfe text");
        assert!(response.raw_text.contains('\u{FFFD}'));
        assert!(response.raw_text.starts_with("ok "));
    }

    #[test]
    fn sentiment_labels_serialize_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
        assert_eq!(SentimentLabel::Negative.to_string(), "negative");
        assert_eq!(SentimentLabel::ALL.len(), 3);
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let json = serde_json::to_value(AnalysisWarning::AllResponsesFailed { errors: 2 }).unwrap();
        assert_eq!(json["kind"], "all_responses_failed");
        assert_eq!(json["errors"], 2);
    }
}
