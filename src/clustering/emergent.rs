use std::collections::{BTreeSet, HashMap};

use super::similarity::{SimilarityMetric, TokenSet};
use crate::constants::clustering::EMERGENT_LABEL_SEPARATOR;
use crate::lexicon::LexiconStore;
use crate::types::{ThemeLabel, Token};

/// Greedy leader cluster over responses that matched no seeded theme.
#[derive(Clone, Debug)]
pub(crate) struct EmergentCluster {
    /// Topical tokens of the founding response; later members compare against it.
    pub leader: TokenSet,
    /// `(entry index, similarity to leader)` in batch order.
    pub members: Vec<(usize, f32)>,
}

/// Group entries in the order given.
///
/// Each entry joins the most similar existing cluster (ties to the oldest)
/// when the similarity clears `min_similarity`, otherwise it founds a new
/// singleton cluster. Nothing is ever discarded.
pub(crate) fn group<'a, I>(
    entries: I,
    metric: &dyn SimilarityMetric,
    min_similarity: f32,
) -> Vec<EmergentCluster>
where
    I: IntoIterator<Item = (usize, &'a TokenSet)>,
{
    let mut clusters: Vec<EmergentCluster> = Vec::new();
    for (entry_idx, tokens) in entries {
        let mut best: Option<(usize, f32)> = None;
        for (cluster_idx, cluster) in clusters.iter().enumerate() {
            let similarity = metric.similarity(tokens, &cluster.leader);
            if similarity <= 0.0 || similarity < min_similarity {
                continue;
            }
            if best.is_none_or(|(_, current)| similarity > current) {
                best = Some((cluster_idx, similarity));
            }
        }
        match best {
            Some((cluster_idx, similarity)) => {
                clusters[cluster_idx].members.push((entry_idx, similarity));
            }
            None => clusters.push(EmergentCluster {
                leader: tokens.clone(),
                members: vec![(entry_idx, 1.0)],
            }),
        }
    }
    clusters
}

/// Tokens that say what a response is about rather than how it feels.
///
/// Falls back to the full set when every token is a sentiment word, negator
/// or intensifier.
pub(crate) fn topical_tokens(tokens: &TokenSet, lexicon: &LexiconStore) -> TokenSet {
    let topical: TokenSet = tokens
        .iter()
        .filter(|token| {
            !lexicon.is_polar(token)
                && !lexicon.is_negator(token)
                && lexicon.intensifier(token).is_none()
        })
        .cloned()
        .collect();
    if topical.is_empty() {
        tokens.clone()
    } else {
        topical
    }
}

/// Derive `(label, keywords)` for an emergent cluster from its members' topical tokens.
///
/// The label joins the `label_terms` most frequent tokens (ties alphabetical).
/// Keywords are the tokens shared by at least half of the members.
pub(crate) fn describe(members: &[&TokenSet], label_terms: usize) -> (ThemeLabel, Vec<Token>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tokens in members {
        for token in tokens.iter() {
            *counts.entry(token.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let label = ranked
        .iter()
        .take(label_terms)
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join(EMERGENT_LABEL_SEPARATOR);

    let quorum = members.len().div_ceil(2);
    let keywords: BTreeSet<&str> = ranked
        .iter()
        .filter(|(_, count)| *count >= quorum)
        .map(|(token, _)| *token)
        .collect();
    (label, keywords.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::similarity::Jaccard;

    fn set(tokens: &[&str]) -> TokenSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn similar_entries_share_a_cluster_and_outliers_stay_singletons() {
        let sets = [
            set(&["packaging", "box"]),
            set(&["onboarding", "emails"]),
            set(&["packaging", "box", "recycled"]),
            set(&["warranty"]),
        ];
        let clusters = group(sets.iter().enumerate(), &Jaccard, 0.25);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[0].members[0], (0, 1.0));
        assert_eq!(clusters[0].members[1].0, 2);
        assert_eq!(clusters[1].members, vec![(1, 1.0)]);
        assert_eq!(clusters[2].members, vec![(3, 1.0)]);
    }

    #[test]
    fn ties_prefer_the_oldest_cluster() {
        let sets = [set(&["alpha"]), set(&["beta"]), set(&["alpha", "beta"])];
        let clusters = group(sets.iter().enumerate(), &Jaccard, 0.25);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[1].members.len(), 1);
    }

    #[test]
    fn topical_tokens_drop_sentiment_words_with_fallback() {
        let lexicon = LexiconStore::english();
        assert_eq!(
            topical_tokens(&set(&["love", "packaging"]), &lexicon),
            set(&["packaging"])
        );
        assert_eq!(
            topical_tokens(&set(&["love", "great"]), &lexicon),
            set(&["great", "love"])
        );
    }

    #[test]
    fn describe_ranks_by_frequency_then_alphabet() {
        let a = set(&["packaging", "box"]);
        let b = set(&["packaging", "recycled"]);
        let c = set(&["packaging", "box", "tape"]);
        let (label, keywords) = describe(&[&a, &b, &c], 2);
        assert_eq!(label, "packaging / box");
        assert_eq!(keywords, vec!["box", "packaging"]);

        let single = set(&["warranty", "claim"]);
        let (label, keywords) = describe(&[&single], 2);
        assert_eq!(label, "claim / warranty");
        assert_eq!(keywords, vec!["claim", "warranty"]);
    }
}
