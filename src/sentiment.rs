//! Lexicon sentiment scorer.
//!
//! `polarity = clamp(sum(contribution) / token_count, -1, 1)` where each
//! token contributes its lexicon weight, multiplied by a preceding
//! intensifier and sign-flipped while inside a negation window. A negation
//! marker restarts the window rather than toggling it, so "not never good"
//! still reads as negated. Marker and intensifier tokens contribute nothing
//! themselves but count toward the token total.
//!
//! This is a heuristic: sarcasm and long-range negation scope are not modelled.

use std::sync::Arc;

use crate::config::SentimentConfig;
use crate::data::{NormalizedText, SentimentLabel, SentimentResult};
use crate::lexicon::LexiconStore;

/// Scores normalized token sequences against a shared lexicon.
#[derive(Clone, Debug)]
pub struct SentimentScorer {
    lexicon: Arc<LexiconStore>,
    config: SentimentConfig,
}

impl SentimentScorer {
    /// Scorer over a shared lexicon.
    pub fn new(lexicon: Arc<LexiconStore>, config: SentimentConfig) -> Self {
        Self { lexicon, config }
    }

    /// Score one response.
    pub fn score(&self, response_id: &str, normalized: &NormalizedText) -> SentimentResult {
        let polarity = self.polarity(normalized);
        SentimentResult {
            response_id: response_id.to_string(),
            polarity,
            label: self.label(polarity),
        }
    }

    /// Bucket a polarity with the configured thresholds.
    pub fn label(&self, polarity: f32) -> SentimentLabel {
        self.config.thresholds.label(polarity)
    }

    /// Continuous polarity in `[-1, 1]`; empty input scores 0.
    pub fn polarity(&self, normalized: &NormalizedText) -> f32 {
        if normalized.is_empty() {
            return 0.0;
        }
        let window = self.config.negation_window;
        let mut negated_remaining = 0usize;
        let mut multiplier = 1.0f64;
        // f64 keeps extreme lexicon weights from overflowing before the clamp.
        let mut sum = 0.0f64;

        for token in &normalized.tokens {
            if self.lexicon.is_negator(token) {
                negated_remaining = window;
                multiplier = 1.0;
                continue;
            }
            if let Some(boost) = self.lexicon.intensifier(token) {
                multiplier = f64::from(boost);
                if negated_remaining > 0 {
                    negated_remaining -= 1;
                }
                continue;
            }

            let mut contribution = f64::from(self.lexicon.weight(token)) * multiplier;
            multiplier = 1.0;
            if negated_remaining > 0 {
                contribution = -contribution;
                negated_remaining -= 1;
            }
            sum += contribution;
        }

        let polarity = sum / normalized.len() as f64;
        if polarity.is_nan() {
            return 0.0;
        }
        polarity.clamp(-1.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::TextNormalizer;

    fn scorer(window: usize) -> SentimentScorer {
        SentimentScorer::new(
            Arc::new(LexiconStore::english()),
            SentimentConfig {
                negation_window: window,
                ..SentimentConfig::default()
            },
        )
    }

    fn polarity_of(scorer: &SentimentScorer, text: &str) -> f32 {
        scorer.polarity(&TextNormalizer::default().normalize(text))
    }

    #[test]
    fn empty_sequence_is_neutral_zero() {
        let scorer = scorer(3);
        let result = scorer.score("r0", &TextNormalizer::default().normalize(""));
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.response_id, "r0");
    }

    #[test]
    fn polarity_is_mean_weight_over_tokens() {
        let scorer = scorer(3);
        // great(0.8) + product(0) + love(0.9) over three tokens.
        let polarity = polarity_of(&scorer, "Great product, love it");
        assert!((polarity - 1.7 / 3.0).abs() < 1e-6);
        assert!(polarity_of(&scorer, "terrible, hated it") < -0.1);
        assert_eq!(polarity_of(&scorer, "the packaging box"), 0.0);
    }

    #[test]
    fn negation_flips_following_tokens() {
        let scorer = scorer(3);
        let plain = polarity_of(&scorer, "great");
        let negated = polarity_of(&scorer, "not great");
        assert!(negated < plain);
        assert!(negated < 0.0);
        assert_eq!(
            scorer.score("r", &TextNormalizer::default().normalize("not great")).label,
            SentimentLabel::Negative
        );
    }

    #[test]
    fn negation_window_is_bounded() {
        let normalizer = TextNormalizer::default();
        let tokens = normalizer.normalize("not okay fine alright great");
        // Window of 3 covers okay/fine/alright but not great.
        assert!(scorer(3).polarity(&tokens) > 0.0);
        // Window of 4 reaches great.
        assert!(scorer(4).polarity(&tokens) < 0.0);
        // Window of 0 disables negation.
        assert!(scorer(0).polarity(&normalizer.normalize("not great")) > 0.0);
    }

    #[test]
    fn intensifiers_scale_next_token() {
        let scorer = scorer(3);
        let plain = polarity_of(&scorer, "slow app");
        let boosted = polarity_of(&scorer, "very slow app");
        // Boosted sum is spread over one extra token; compare raw sums instead.
        assert!((plain * 2.0 - (-0.5)).abs() < 1e-6);
        assert!((boosted * 3.0 - (-0.5 * 1.3)).abs() < 1e-6);
    }

    #[test]
    fn polarity_is_clamped_for_out_of_range_weights() {
        let lexicon = LexiconStore::builder()
            .polarity("stellar", 5.0)
            .polarity("dire", -5.0)
            .build()
            .unwrap();
        let scorer = SentimentScorer::new(Arc::new(lexicon), SentimentConfig::default());
        let normalizer = TextNormalizer::default();
        assert_eq!(scorer.polarity(&normalizer.normalize("stellar")), 1.0);
        assert_eq!(scorer.polarity(&normalizer.normalize("dire")), -1.0);
    }

    #[test]
    fn extreme_weights_saturate_instead_of_overflowing() {
        let lexicon = LexiconStore::builder()
            .polarity("great", f32::MAX)
            .polarity("awful", f32::MIN)
            .intensifier("very", f32::MAX)
            .build()
            .unwrap();
        let scorer = SentimentScorer::new(Arc::new(lexicon), SentimentConfig::default());
        let normalizer = TextNormalizer::default();

        let result = scorer.score("r1", &normalizer.normalize("great great"));
        assert_eq!(result.polarity, 1.0);
        assert_eq!(result.label, SentimentLabel::Positive);

        assert_eq!(scorer.polarity(&normalizer.normalize("very awful awful")), -1.0);
    }

    #[test]
    fn contraction_negators_from_a_custom_lexicon_apply() {
        let lexicon = LexiconStore::builder()
            .polarity("like", 0.5)
            .negators(["don't"])
            .build()
            .unwrap();
        let scorer = SentimentScorer::new(Arc::new(lexicon), SentimentConfig::default());
        let result = scorer.score("r1", &TextNormalizer::default().normalize("I don't like it"));
        assert_eq!(result.polarity, -0.25);
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn custom_thresholds_change_labels() {
        let mut config = SentimentConfig::default();
        config.thresholds.positive_above = 0.7;
        let scorer = SentimentScorer::new(Arc::new(LexiconStore::english()), config);
        let normalized = TextNormalizer::default().normalize("great product love");
        assert_eq!(scorer.score("r", &normalized).label, SentimentLabel::Neutral);
    }
}
