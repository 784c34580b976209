use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::MetricKind;
use crate::types::Token;

/// Ordered, de-duplicated token set; ordering keeps iteration deterministic.
pub type TokenSet = BTreeSet<Token>;

/// Similarity between two token sets, in `[0, 1]`.
///
/// Implementations must be deterministic and return 0 when either side is
/// empty. The clusterer calls this with `(response_tokens, keywords)` for
/// seeded themes and `(response_tokens, leader_tokens)` for emergent ones, so
/// an embedding-backed metric can be swapped in without touching the pipeline.
pub trait SimilarityMetric: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;
    /// Similarity in `[0, 1]`; 0 when either set is empty.
    fn similarity(&self, left: &TokenSet, right: &TokenSet) -> f32;
}

/// `|A ∩ B| / min(|A|, |B|)`: one shared keyword in a short answer counts fully.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlapCoefficient;

/// `|A ∩ B| / |A ∪ B|`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jaccard;

/// `2|A ∩ B| / (|A| + |B|)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dice;

impl SimilarityMetric for OverlapCoefficient {
    fn name(&self) -> &str {
        "overlap_coefficient"
    }

    fn similarity(&self, left: &TokenSet, right: &TokenSet) -> f32 {
        let smaller = left.len().min(right.len());
        if smaller == 0 {
            return 0.0;
        }
        intersection(left, right) as f32 / smaller as f32
    }
}

impl SimilarityMetric for Jaccard {
    fn name(&self) -> &str {
        "jaccard"
    }

    fn similarity(&self, left: &TokenSet, right: &TokenSet) -> f32 {
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        let shared = intersection(left, right);
        let union = left.len() + right.len() - shared;
        shared as f32 / union as f32
    }
}

impl SimilarityMetric for Dice {
    fn name(&self) -> &str {
        "dice"
    }

    fn similarity(&self, left: &TokenSet, right: &TokenSet) -> f32 {
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        2.0 * intersection(left, right) as f32 / (left.len() + right.len()) as f32
    }
}

/// Instantiate a built-in metric.
pub fn metric_for(kind: MetricKind) -> Arc<dyn SimilarityMetric> {
    match kind {
        MetricKind::OverlapCoefficient => Arc::new(OverlapCoefficient),
        MetricKind::Jaccard => Arc::new(Jaccard),
        MetricKind::Dice => Arc::new(Dice),
    }
}

fn intersection(left: &TokenSet, right: &TokenSet) -> usize {
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    small.iter().filter(|token| large.contains(*token)).count()
}
