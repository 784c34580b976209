use std::collections::HashSet;
use std::sync::Arc;

use feedback_analysis::config::{AnalysisConfig, ClusteringConfig, Membership, SeededTheme};
use feedback_analysis::data::{Response, SentimentLabel};
use feedback_analysis::lexicon::LexiconStore;
use feedback_analysis::normalizer::TextNormalizer;
use feedback_analysis::pipeline::AnalysisPipeline;
use feedback_analysis::sentiment::SentimentScorer;

fn mixed_batch() -> Vec<Response> {
    let texts = [
        "The interface is really intuitive and easy to use. Love the new design!",
        "Search function is too slow and often doesn't find what I'm looking for",
        "",
        "   ",
        "not not not great great great",
        "App keeps crashing when I try to browse different categories",
        "Great job on the recent updates, much better now",
        "Voice search never understands what I'm saying, very confusing",
        "Packaging arrived dented, box was crushed",
        "the box and packaging were crushed",
        "Onboarding emails were helpful",
        "Frequent crashes and technical issues are annoying",
        "¡Excelente! 素晴らしい",
    ];
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            Response::new(format!("r{idx}"), *text)
                .with_meta("segment", if idx % 2 == 0 { "consumer" } else { "enterprise" })
        })
        .chain([
            Response::from_bytes("bad-bytes", b"\xff\xfe\xfd \xc3\x28"),
            Response::new("r0", "duplicate of the first id"),
        ])
        .collect()
}

fn pipeline(config: AnalysisConfig) -> AnalysisPipeline {
    AnalysisPipeline::new(Arc::new(LexiconStore::english()), config).unwrap()
}

#[test]
fn polarity_is_bounded_even_with_extreme_weights() {
    let lexicon = Arc::new(
        LexiconStore::builder()
            .polarity("great", 25.0)
            .polarity("awful", -40.0)
            .negators(["not"])
            .intensifier("very", 10.0)
            .build()
            .unwrap(),
    );
    let normalizer = TextNormalizer::default();
    let scorer = SentimentScorer::new(lexicon, Default::default());
    for text in [
        "great",
        "very very great great",
        "awful awful awful",
        "not very awful",
        "very",
        "",
    ] {
        let result = scorer.score("r", &normalizer.normalize(text));
        assert!(
            (-1.0..=1.0).contains(&result.polarity),
            "{text}: {}",
            result.polarity
        );
        assert!(result.polarity.is_finite());
    }
}

#[test]
fn every_response_is_either_scored_or_rejected_once() {
    let batch = mixed_batch();
    let run = pipeline(AnalysisConfig::default()).run(&batch).unwrap();
    assert_eq!(run.sentiment.len() + run.errors.len(), batch.len());

    let scored: HashSet<&str> = run.sentiment.iter().map(|s| s.response_id.as_str()).collect();
    assert_eq!(scored.len(), run.sentiment.len());
    let rejected: Vec<&str> = run.errors.iter().map(|e| e.response_id.as_str()).collect();
    assert_eq!(rejected, vec!["bad-bytes", "r0"]);
    for response in &batch {
        assert!(scored.contains(response.id.as_str()) || rejected.contains(&response.id.as_str()));
    }
}

#[test]
fn label_distribution_counts_every_analyzed_response() {
    let run = pipeline(AnalysisConfig::default()).run(&mixed_batch()).unwrap();
    let stats = &run.stats;
    assert_eq!(stats.analyzed, run.sentiment.len());
    assert_eq!(stats.distribution.counts.total(), run.sentiment.len());
    for label in SentimentLabel::ALL {
        let direct = run.sentiment.iter().filter(|s| s.label == label).count();
        assert_eq!(stats.distribution.counts.get(label), direct);
    }
    let pct = stats.distribution.percentages;
    assert!((pct.negative + pct.neutral + pct.positive - 100.0).abs() < 1e-6);

    let cross_total: usize = stats.cross_tab.iter().map(|row| row.counts.total()).sum();
    assert_eq!(cross_total, stats.analyzed);
    let segment_total: usize = stats.segments[0]
        .segments
        .iter()
        .map(|segment| segment.distribution.total)
        .sum();
    assert_eq!(segment_total + stats.segments[0].missing, stats.analyzed);
}

#[test]
fn labels_follow_configured_thresholds() {
    let mut config = AnalysisConfig::default();
    config.sentiment.thresholds.negative_below = -0.5;
    config.sentiment.thresholds.positive_above = 0.5;
    let run = pipeline(config.clone()).run(&mixed_batch()).unwrap();
    for result in &run.sentiment {
        assert_eq!(
            result.label,
            config.sentiment.thresholds.label(result.polarity),
            "{}",
            result.response_id
        );
    }
}

#[test]
fn identical_input_yields_identical_runs() {
    let batch = mixed_batch();
    let pipeline = pipeline(AnalysisConfig::default());
    let first = pipeline.run(&batch).unwrap();
    let second = pipeline.run(&batch).unwrap();
    let from_clone = pipeline.clone().run(&batch).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, from_clone);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn sentiment_does_not_depend_on_batch_order() {
    let batch: Vec<Response> = mixed_batch().into_iter().take(13).collect();
    let mut reversed = batch.clone();
    reversed.reverse();
    let pipeline = pipeline(AnalysisConfig::default());
    let forward = pipeline.run(&batch).unwrap();
    let backward = pipeline.run(&reversed).unwrap();
    for result in &forward.sentiment {
        let other = backward.sentiment_for(&result.response_id).unwrap();
        assert_eq!(result.polarity, other.polarity);
        assert_eq!(result.label, other.label);
    }
}

#[test]
fn themes_are_nonempty_ranked_and_consistent_with_assignments() {
    for membership in [Membership::Soft, Membership::Dominant] {
        let config = AnalysisConfig {
            clustering: ClusteringConfig {
                membership,
                ..ClusteringConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let run = pipeline(config).run(&mixed_batch()).unwrap();
        assert!(!run.themes.is_empty());
        for pair in run.themes.windows(2) {
            assert!(pair[0].member_count() >= pair[1].member_count());
        }
        let ids: HashSet<usize> = run.themes.iter().map(|t| t.theme_id).collect();
        assert_eq!(ids.len(), run.themes.len());
        for theme in &run.themes {
            assert!(theme.member_count() > 0);
            assert!(theme.score > 0.0 && theme.score <= 1.0);
            assert!(!theme.exemplars.is_empty());
            for exemplar in &theme.exemplars {
                assert!(theme.member_response_ids.contains(&exemplar.response_id));
                assert!(exemplar.quote.is_some());
            }
        }
        let mut seen = HashSet::new();
        for assignment in &run.assignments {
            assert!(seen.insert(assignment.response_id.clone()));
            let theme = run
                .themes
                .iter()
                .find(|t| t.theme_id == assignment.theme_id)
                .unwrap();
            assert!(theme.member_response_ids.contains(&assignment.response_id));
        }
        if membership == Membership::Dominant {
            let memberships: usize = run.themes.iter().map(|t| t.member_count()).sum();
            assert_eq!(memberships, run.assignments.len());
        }
    }
}

#[test]
fn every_response_with_tokens_lands_in_a_theme() {
    let config = AnalysisConfig {
        clustering: ClusteringConfig {
            seeded_themes: vec![SeededTheme::new("pricing", ["price", "expensive", "cheap"])],
            ..ClusteringConfig::default()
        },
        ..AnalysisConfig::default()
    };
    let normalizer = TextNormalizer::default();
    let batch = mixed_batch();
    let run = pipeline(config).run(&batch).unwrap();
    let assigned: HashSet<&str> = run.assignments.iter().map(|a| a.response_id.as_str()).collect();
    for result in &run.sentiment {
        let response = batch.iter().find(|r| r.id == result.response_id).unwrap();
        let has_tokens = normalizer
            .normalize(&response.raw_text)
            .tokens
            .iter()
            .any(|t| t != "<?>");
        assert_eq!(assigned.contains(result.response_id.as_str()), has_tokens);
    }
}
