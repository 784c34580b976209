#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Run-level statistics over analyzed responses.
pub mod aggregator;
/// Seeded and emergent theme clustering.
pub mod clustering;
/// Analysis configuration types and validation.
pub mod config;
/// Centralized constants used across normalization, scoring, clustering, and aggregation.
pub mod constants;
/// Response, result, and run types.
pub mod data;
/// Reusable example runners shared by downstream crates.
pub mod example_apps;
mod hash;
/// Sentiment lexicon store.
pub mod lexicon;
/// Metadata keys and helpers.
pub mod metadata;
/// Raw text to canonical tokens.
pub mod normalizer;
/// Batch analysis pipeline and cancellation.
pub mod pipeline;
/// Lexicon-based sentiment scoring.
pub mod sentiment;
/// Shared type aliases.
pub mod types;
/// Text helpers for quotes and reports.
pub mod utils;

mod errors;

pub use aggregator::{
    AggregateStats, Aggregator, AnalyzedRecord, CrossTabRow, KeywordFrequency, LabelCounts,
    LabelPercentages, PolarityStats, PriorityIssue, SegmentBreakdown, SegmentStats,
    SentimentDistribution, ThemeFrequency,
};
pub use clustering::{
    ClusterInput, Dice, Jaccard, OverlapCoefficient, SimilarityMetric, ThemeClusterer,
    ThemeClustering, TokenSet,
};
pub use config::{
    AggregationConfig, AnalysisConfig, ClusteringConfig, Membership, MetricKind,
    NormalizerConfig, RecordLimits, SeededTheme, SegmentField, SentimentConfig,
    SentimentThresholds,
};
pub use data::{
    AnalysisRun, AnalysisWarning, BatchRef, Exemplar, NormalizedText, RecordError,
    RecordErrorKind, Response, SentimentLabel, SentimentResult, Theme, ThemeAssignment,
    ThemeOrigin,
};
pub use errors::AnalysisError;
pub use lexicon::{LexiconBuilder, LexiconStore};
pub use normalizer::TextNormalizer;
pub use pipeline::{AnalysisPipeline, CancellationToken, analyze};
pub use sentiment::SentimentScorer;
pub use types::{MetaKey, MetaValue, ResponseId, RunId, SegmentValue, ThemeId, ThemeLabel, Token};
