//! Analysis pipeline: validate, normalize, score, cluster, aggregate.
//!
//! Normalization and scoring of individual responses are independent and run
//! on the rayon pool; clustering and aggregation see the whole batch and run
//! afterwards on the calling thread. Results never depend on scheduling:
//! every per-record output is collected back into batch order.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, AnalyzedRecord};
use crate::clustering::{ClusterInput, SimilarityMetric, ThemeClusterer, ThemeClustering};
use crate::config::AnalysisConfig;
use crate::constants::normalizer::PLACEHOLDER_TOKEN;
use crate::constants::pipeline::{RUN_ID_PREFIX, RUN_SEED_OFFSET};
use crate::data::{
    AnalysisRun, AnalysisWarning, BatchRef, NormalizedText, RecordError, RecordErrorKind,
    Response, SentimentResult,
};
use crate::errors::AnalysisError;
use crate::hash::stable_hash_with;
use crate::lexicon::LexiconStore;
use crate::normalizer::TextNormalizer;
use crate::sentiment::SentimentScorer;
use crate::types::RunId;
use crate::utils::quote_excerpt;

/// Cooperative cancellation flag shared between a caller and a running pipeline.
///
/// Clones observe the same flag. A cancelled run returns
/// [`AnalysisError::Cancelled`] and no partial result.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-record outcome of the parallel stage.
enum Stage {
    Analyzed {
        text: NormalizedText,
        sentiment: SentimentResult,
    },
    Failed(RecordError),
    Skipped,
}

/// Reusable analysis pipeline; one instance can analyze any number of batches.
#[derive(Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    normalizer: TextNormalizer,
    scorer: SentimentScorer,
    clusterer: ThemeClusterer,
    aggregator: Aggregator,
    config_fingerprint: u64,
}

impl AnalysisPipeline {
    /// Validate `config` and prepare every stage.
    ///
    /// Fails with [`AnalysisError::Configuration`] for invalid settings or a
    /// lexicon without polarity entries.
    pub fn new(lexicon: Arc<LexiconStore>, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        if lexicon.is_empty() {
            return Err(AnalysisError::config(
                "lexicon must contain at least one polarity entry",
            ));
        }
        let normalizer = TextNormalizer::new(&config.normalizer);
        let clusterer = ThemeClusterer::new(&config.clustering, &normalizer, Arc::clone(&lexicon));
        let aggregator = Aggregator::new(&config.aggregation, clusterer.seed_keywords());
        Ok(Self {
            scorer: SentimentScorer::new(lexicon, config.sentiment.clone()),
            config_fingerprint: config.fingerprint(),
            normalizer,
            clusterer,
            aggregator,
            config,
        })
    }

    /// Swap the similarity metric used by the clusterer.
    pub fn with_metric(mut self, metric: Arc<dyn SimilarityMetric>) -> Self {
        self.clusterer = self.clusterer.with_metric(metric);
        self
    }

    /// Validated configuration the pipeline runs with.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one batch.
    pub fn run(&self, batch: &[Response]) -> Result<AnalysisRun, AnalysisError> {
        self.run_with_cancellation(batch, &CancellationToken::new())
    }

    /// Analyze one batch, stopping early once `cancel` is triggered.
    pub fn run_with_cancellation(
        &self,
        batch: &[Response],
        cancel: &CancellationToken,
    ) -> Result<AnalysisRun, AnalysisError> {
        let total = batch.len();
        let batch_ref = BatchRef {
            response_count: total,
            fingerprint: batch_fingerprint(batch),
        };
        let run_id = self.run_id(&batch_ref);
        info!(run_id = %run_id, responses = total, "analysis run started");
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled {
                completed: 0,
                total,
            });
        }

        let started = Instant::now();
        let duplicates = duplicate_positions(batch);
        let completed = AtomicUsize::new(0);
        let stages: Vec<Stage> = batch
            .par_iter()
            .enumerate()
            .map(|(position, response)| {
                if cancel.is_cancelled() {
                    return Stage::Skipped;
                }
                let stage = if duplicates.contains(&position) {
                    Stage::Failed(record_error(
                        response,
                        RecordErrorKind::DuplicateId,
                        "id already used earlier in the batch",
                    ))
                } else {
                    self.analyze_record(response)
                };
                completed.fetch_add(1, Ordering::Relaxed);
                stage
            })
            .collect();
        if cancel.is_cancelled() {
            let completed = completed.load(Ordering::Relaxed);
            warn!(run_id = %run_id, completed, total, "analysis run cancelled");
            return Err(AnalysisError::Cancelled { completed, total });
        }
        debug!(
            run_id = %run_id,
            responses = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "normalize and score stage completed"
        );

        let mut analyzed: Vec<(&Response, NormalizedText, SentimentResult)> = Vec::new();
        let mut errors = Vec::new();
        for (response, stage) in batch.iter().zip(stages) {
            match stage {
                Stage::Analyzed { text, sentiment } => analyzed.push((response, text, sentiment)),
                Stage::Failed(error) => {
                    warn!(
                        response_id = %error.response_id,
                        kind = ?error.kind,
                        reason = %error.reason,
                        "response rejected"
                    );
                    errors.push(error);
                }
                Stage::Skipped => {}
            }
        }

        let inputs: Vec<ClusterInput<'_>> = analyzed
            .iter()
            .map(|(response, text, _)| ClusterInput {
                response_id: response.id.as_str(),
                text,
            })
            .collect();
        let mut clustering = self.clusterer.cluster(&inputs);
        self.attach_quotes(&mut clustering, &analyzed);
        debug!(
            run_id = %run_id,
            themes = clustering.themes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cluster stage completed"
        );

        let records: Vec<AnalyzedRecord<'_>> = analyzed
            .iter()
            .map(|(response, text, sentiment)| AnalyzedRecord {
                response,
                text,
                sentiment,
            })
            .collect();
        let stats = self
            .aggregator
            .aggregate(&records, &clustering.themes, &clustering.assignments);

        let warnings = self.warnings(total, &analyzed, &errors, &clustering);
        for warning in &warnings {
            warn!(run_id = %run_id, warning = ?warning, "degenerate analysis input");
        }

        let ThemeClustering {
            themes,
            assignments,
            ..
        } = clustering;
        let run = AnalysisRun {
            run_id,
            batch: batch_ref,
            sentiment: analyzed
                .into_iter()
                .map(|(_, _, sentiment)| sentiment)
                .collect(),
            themes,
            assignments,
            stats,
            errors,
            warnings,
        };
        info!(
            run_id = %run.run_id,
            analyzed = run.analyzed_count(),
            errors = run.errors.len(),
            themes = run.themes.len(),
            "analysis run finished"
        );
        Ok(run)
    }

    fn analyze_record(&self, response: &Response) -> Stage {
        let limits = &self.config.limits;
        let chars = response.raw_text.chars().count();
        if chars > limits.max_response_chars {
            return Stage::Failed(record_error(
                response,
                RecordErrorKind::TooLong,
                format!(
                    "text has {chars} chars, limit is {}",
                    limits.max_response_chars
                ),
            ));
        }
        let text = self.normalizer.normalize(&response.raw_text);
        if text.placeholder_count > 0 {
            let ratio = text.placeholder_count as f32 / text.len() as f32;
            if ratio > limits.max_placeholder_ratio {
                return Stage::Failed(record_error(
                    response,
                    RecordErrorKind::Undecodable,
                    format!(
                        "{} of {} tokens are malformed",
                        text.placeholder_count,
                        text.len()
                    ),
                ));
            }
        }
        let sentiment = self.scorer.score(&response.id, &text);
        Stage::Analyzed { text, sentiment }
    }

    fn attach_quotes(
        &self,
        clustering: &mut ThemeClustering,
        analyzed: &[(&Response, NormalizedText, SentimentResult)],
    ) {
        let max_chars = self.config.clustering.quote_max_chars;
        let by_id: HashMap<&str, &Response> = analyzed
            .iter()
            .map(|(response, _, _)| (response.id.as_str(), *response))
            .collect();
        for theme in &mut clustering.themes {
            for exemplar in &mut theme.exemplars {
                exemplar.quote = by_id
                    .get(exemplar.response_id.as_str())
                    .and_then(|response| quote_excerpt(&response.raw_text, max_chars));
            }
        }
    }

    fn warnings(
        &self,
        total: usize,
        analyzed: &[(&Response, NormalizedText, SentimentResult)],
        errors: &[RecordError],
        clustering: &ThemeClustering,
    ) -> Vec<AnalysisWarning> {
        let mut warnings = Vec::new();
        if total == 0 {
            warnings.push(AnalysisWarning::EmptyBatch);
            return warnings;
        }
        if analyzed.is_empty() {
            warnings.push(AnalysisWarning::AllResponsesFailed {
                errors: errors.len(),
            });
            return warnings;
        }
        if analyzed.iter().all(|(_, text, _)| text.is_empty()) {
            warnings.push(AnalysisWarning::AllResponsesEmpty);
            return warnings;
        }
        let clusterable = analyzed
            .iter()
            .any(|(_, text, _)| text.tokens.iter().any(|token| token != PLACEHOLDER_TOKEN));
        if self.clusterer.seed_count() > 0 && clusterable && clustering.seeded_matches == 0 {
            warnings.push(AnalysisWarning::NoSeededThemeMatched);
        }
        warnings
    }

    /// Same configuration and batch always produce the same id.
    fn run_id(&self, batch: &BatchRef) -> RunId {
        let seed = stable_hash_with(|hasher| {
            RUN_SEED_OFFSET.hash(hasher);
            self.config_fingerprint.hash(hasher);
            batch.fingerprint.hash(hasher);
            batch.response_count.hash(hasher);
        });
        format!("{RUN_ID_PREFIX}{seed:016x}")
    }
}

/// Validate `config` and analyze one batch with a fresh pipeline.
pub fn analyze(
    batch: &[Response],
    config: AnalysisConfig,
    lexicon: Arc<LexiconStore>,
) -> Result<AnalysisRun, AnalysisError> {
    AnalysisPipeline::new(lexicon, config)?.run(batch)
}

/// Positions whose id already appeared earlier in the batch.
fn duplicate_positions(batch: &[Response]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    batch
        .iter()
        .enumerate()
        .filter(|(_, response)| !seen.insert(response.id.as_str()))
        .map(|(position, _)| position)
        .collect()
}

fn batch_fingerprint(batch: &[Response]) -> u64 {
    stable_hash_with(|hasher| {
        for response in batch {
            response.id.hash(hasher);
            response.raw_text.hash(hasher);
            for (key, value) in &response.metadata {
                key.hash(hasher);
                value.hash(hasher);
            }
            response.metadata.len().hash(hasher);
        }
    })
}

fn record_error(response: &Response, kind: RecordErrorKind, reason: impl Into<String>) -> RecordError {
    RecordError {
        response_id: response.id.clone(),
        kind,
        reason: reason.into(),
    }
}
