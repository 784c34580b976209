//! Theme clusterer.
//!
//! Two explicit phases over one batch:
//! 1. Seeded assignment: every response is scored against each configured
//!    keyword set and joins the themes that clear the threshold (all of them
//!    under soft membership, only the best under dominant membership).
//! 2. Emergent grouping: responses that matched no seed are grouped greedily
//!    by token overlap so none of them silently drops out of reporting.
//!
//! Both phases use the same [`SimilarityMetric`], which can be replaced
//! without touching the pipeline. Output is fully deterministic: ties break
//! on similarity, then theme id, and themes rank by member count, then label.

use std::sync::Arc;

use tracing::debug;

use crate::config::{ClusteringConfig, Membership};
use crate::constants::normalizer::PLACEHOLDER_TOKEN;
use crate::data::{Exemplar, NormalizedText, Theme, ThemeAssignment, ThemeOrigin};
use crate::lexicon::LexiconStore;
use crate::normalizer::TextNormalizer;
use crate::types::{ResponseId, ThemeId};

mod emergent;
mod seeded;
/// Token-set similarity metrics.
pub mod similarity;

use seeded::{Seed, SeedMatch};
pub use similarity::{Dice, Jaccard, OverlapCoefficient, SimilarityMetric, TokenSet, metric_for};

/// One response handed to the clusterer.
#[derive(Clone, Copy, Debug)]
pub struct ClusterInput<'a> {
    /// Caller-assigned response id.
    pub response_id: &'a str,
    /// Normalized tokens of the response.
    pub text: &'a NormalizedText,
}

/// Clusterer output for one batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThemeClustering {
    /// Ranked themes; only themes with at least one member are reported.
    pub themes: Vec<Theme>,
    /// Unique dominant theme per clustered response, in batch order.
    pub assignments: Vec<ThemeAssignment>,
    /// Responses with no usable tokens, in batch order; they belong to no theme.
    pub unclustered: Vec<ResponseId>,
    /// Number of responses that joined at least one seeded theme.
    pub seeded_matches: usize,
}

/// Seeded + emergent theme clusterer.
#[derive(Clone)]
pub struct ThemeClusterer {
    seeds: Vec<Seed>,
    metric: Arc<dyn SimilarityMetric>,
    lexicon: Arc<LexiconStore>,
    config: ClusteringConfig,
}

/// Response prepared for clustering.
struct Entry<'a> {
    position: usize,
    response_id: &'a str,
    tokens: TokenSet,
}

/// Theme under construction; `members` holds `(entry index, similarity)`.
struct Draft {
    theme_id: ThemeId,
    label: String,
    origin: ThemeOrigin,
    keywords: Vec<String>,
    members: Vec<(usize, f32)>,
}

impl ThemeClusterer {
    /// Build a clusterer; seed keywords are normalized with `normalizer`.
    pub fn new(
        config: &ClusteringConfig,
        normalizer: &TextNormalizer,
        lexicon: Arc<LexiconStore>,
    ) -> Self {
        Self {
            seeds: seeded::build_seeds(&config.seeded_themes, normalizer),
            metric: metric_for(config.metric),
            lexicon,
            config: config.clone(),
        }
    }

    /// Replace the configured metric (for example with an embedding distance).
    pub fn with_metric(mut self, metric: Arc<dyn SimilarityMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Name of the active similarity metric.
    pub fn metric_name(&self) -> &str {
        self.metric.name()
    }

    /// Number of configured seeded themes.
    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Normalized keywords of every seeded theme, de-duplicated and sorted.
    pub fn seed_keywords(&self) -> TokenSet {
        self.seeds
            .iter()
            .flat_map(|seed| seed.keywords.iter().cloned())
            .collect()
    }

    /// Cluster one batch. An empty batch yields an empty result.
    pub fn cluster(&self, batch: &[ClusterInput<'_>]) -> ThemeClustering {
        let mut outcome = ThemeClustering::default();
        let mut entries = Vec::with_capacity(batch.len());
        let mut unclustered: Vec<(usize, &str)> = Vec::new();
        for (position, input) in batch.iter().enumerate() {
            let tokens: TokenSet = input
                .text
                .tokens
                .iter()
                .filter(|token| token.as_str() != PLACEHOLDER_TOKEN)
                .cloned()
                .collect();
            if tokens.is_empty() {
                unclustered.push((position, input.response_id));
            } else {
                entries.push(Entry {
                    position,
                    response_id: input.response_id,
                    tokens,
                });
            }
        }
        if entries.is_empty() {
            outcome.unclustered = unclustered.iter().map(|(_, id)| id.to_string()).collect();
            return outcome;
        }

        let mut drafts: Vec<Draft> = self
            .seeds
            .iter()
            .map(|seed| Draft {
                theme_id: seed.theme_id,
                label: seed.label.clone(),
                origin: ThemeOrigin::Seeded,
                keywords: seed.keywords.iter().cloned().collect(),
                members: Vec::new(),
            })
            .collect();
        let mut dominant: Vec<Option<SeedMatch>> = Vec::with_capacity(entries.len());
        let mut unmatched = Vec::new();

        for (entry_idx, entry) in entries.iter().enumerate() {
            let matches = seeded::match_seeds(
                &self.seeds,
                self.metric.as_ref(),
                &entry.tokens,
                self.config.seeded_min_similarity,
            );
            let Some(best) = matches.first().copied() else {
                dominant.push(None);
                unmatched.push(entry_idx);
                continue;
            };
            let joined = match self.config.membership {
                Membership::Soft => &matches[..],
                Membership::Dominant => &matches[..1],
            };
            for found in joined {
                drafts[found.theme_id].members.push((entry_idx, found.similarity));
            }
            dominant.push(Some(best));
            outcome.seeded_matches += 1;
        }
        drafts.retain(|draft| !draft.members.is_empty());

        let mut emergent_of = vec![None; entries.len()];
        if self.config.allow_emergent && !unmatched.is_empty() {
            let mut topical: Vec<Option<TokenSet>> = vec![None; entries.len()];
            for idx in &unmatched {
                topical[*idx] = Some(emergent::topical_tokens(&entries[*idx].tokens, &self.lexicon));
            }
            let clusters = emergent::group(
                unmatched
                    .iter()
                    .filter_map(|idx| topical[*idx].as_ref().map(|tokens| (*idx, tokens))),
                self.metric.as_ref(),
                self.config.emergent_min_similarity,
            );
            for (offset, cluster) in clusters.into_iter().enumerate() {
                let theme_id = self.seeds.len() + offset;
                let member_sets: Vec<&TokenSet> = cluster
                    .members
                    .iter()
                    .filter_map(|(idx, _)| topical[*idx].as_ref())
                    .collect();
                let (label, keywords) =
                    emergent::describe(&member_sets, self.config.emergent_label_terms);
                for (idx, similarity) in &cluster.members {
                    emergent_of[*idx] = Some((theme_id, *similarity));
                }
                drafts.push(Draft {
                    theme_id,
                    label,
                    origin: ThemeOrigin::Emergent,
                    keywords,
                    members: cluster.members,
                });
            }
        }

        for (entry_idx, entry) in entries.iter().enumerate() {
            let assigned = dominant[entry_idx]
                .map(|found| (found.theme_id, found.similarity))
                .or(emergent_of[entry_idx]);
            if let Some((theme_id, similarity)) = assigned {
                outcome.assignments.push(ThemeAssignment {
                    response_id: entry.response_id.to_string(),
                    theme_id,
                    similarity,
                });
            } else {
                unclustered.push((entry.position, entry.response_id));
            }
        }
        unclustered.sort_by_key(|(position, _)| *position);
        outcome.unclustered = unclustered.iter().map(|(_, id)| id.to_string()).collect();

        let clustered = entries.len();
        outcome.themes = drafts
            .into_iter()
            .map(|draft| self.finish(draft, &entries, clustered))
            .collect();
        rank_themes(&mut outcome.themes);

        debug!(
            metric = self.metric.name(),
            responses = batch.len(),
            clustered,
            seeded_matches = outcome.seeded_matches,
            themes = outcome.themes.len(),
            unclustered = outcome.unclustered.len(),
            "theme clustering completed"
        );
        outcome
    }

    fn finish(&self, draft: Draft, entries: &[Entry<'_>], clustered: usize) -> Theme {
        let mut by_strength = draft.members.clone();
        by_strength.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let exemplars = by_strength
            .iter()
            .take(self.config.exemplars_per_theme)
            .map(|(idx, similarity)| Exemplar {
                response_id: entries[*idx].response_id.to_string(),
                similarity: *similarity,
                quote: None,
            })
            .collect();
        Theme {
            theme_id: draft.theme_id,
            label: draft.label,
            origin: draft.origin,
            keywords: draft.keywords,
            member_response_ids: draft
                .members
                .iter()
                .map(|(idx, _)| entries[*idx].response_id.to_string())
                .collect(),
            score: draft.members.len() as f32 / clustered as f32,
            exemplars,
        }
    }
}

/// Member count descending, then label, then theme id.
pub fn rank_themes(themes: &mut [Theme]) {
    themes.sort_by(|a, b| {
        b.member_count()
            .cmp(&a.member_count())
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.theme_id.cmp(&b.theme_id))
    });
}
