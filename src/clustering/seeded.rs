use std::cmp::Ordering;

use super::similarity::{SimilarityMetric, TokenSet};
use crate::config::SeededTheme;
use crate::normalizer::TextNormalizer;
use crate::types::{ThemeId, ThemeLabel};

/// Seeded theme with keywords normalized exactly like response text.
#[derive(Clone, Debug)]
pub(crate) struct Seed {
    pub theme_id: ThemeId,
    pub label: ThemeLabel,
    pub keywords: TokenSet,
}

/// One seeded theme a response cleared the threshold for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SeedMatch {
    pub theme_id: ThemeId,
    pub similarity: f32,
}

/// Build seeds in configuration order; ids are `0..seeds.len()`.
pub(crate) fn build_seeds(themes: &[SeededTheme], normalizer: &TextNormalizer) -> Vec<Seed> {
    themes
        .iter()
        .enumerate()
        .map(|(theme_id, theme)| Seed {
            theme_id,
            label: theme.label.trim().to_string(),
            keywords: theme
                .keywords
                .iter()
                .filter_map(|keyword| normalizer.keyword_token(keyword))
                .collect(),
        })
        .collect()
}

/// Score a response against every seed.
///
/// Returns the matches strictly exceeding `min_similarity`, strongest first with ties
/// broken by lowest theme id, so `matches[0]` is the dominant seeded theme.
pub(crate) fn match_seeds(
    seeds: &[Seed],
    metric: &dyn SimilarityMetric,
    tokens: &TokenSet,
    min_similarity: f32,
) -> Vec<SeedMatch> {
    let mut matches: Vec<SeedMatch> = seeds
        .iter()
        .filter_map(|seed| {
            let similarity = metric.similarity(tokens, &seed.keywords);
            (similarity > 0.0 && similarity > min_similarity).then_some(SeedMatch {
                theme_id: seed.theme_id,
                similarity,
            })
        })
        .collect();
    matches.sort_by(compare_matches);
    matches
}

pub(crate) fn compare_matches(a: &SeedMatch, b: &SeedMatch) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.theme_id.cmp(&b.theme_id))
}
