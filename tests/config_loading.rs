use feedback_analysis::config::{AnalysisConfig, Membership, MetricKind, SegmentField};

#[test]
fn partial_json_config_takes_defaults() {
    let json = r#"{
        "sentiment": { "negation_window": 2 },
        "clustering": {
            "seeded_themes": [
                { "label": "pricing", "keywords": ["price", "expensive", "cheap"] }
            ],
            "metric": "jaccard",
            "membership": "dominant"
        },
        "aggregation": {
            "segment_fields": [{ "attribute": "segment" }, { "day": "timestamp" }]
        }
    }"#;
    let config: AnalysisConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.sentiment.negation_window, 2);
    assert_eq!(config.sentiment.thresholds, Default::default());
    assert_eq!(config.clustering.metric, MetricKind::Jaccard);
    assert_eq!(config.clustering.membership, Membership::Dominant);
    assert_eq!(config.clustering.seeded_themes.len(), 1);
    assert!(config.clustering.allow_emergent);
    assert_eq!(
        config.aggregation.segment_fields,
        vec![
            SegmentField::Attribute("segment".into()),
            SegmentField::Day("timestamp".into())
        ]
    );
    assert!(config.validate().is_ok());
}

#[test]
fn unknown_fields_are_rejected_at_load_time() {
    let json = r#"{ "sentiment": { "negation_windw": 2 } }"#;
    assert!(serde_json::from_str::<AnalysisConfig>(json).is_err());

    let json = r#"{ "clustering": { "metric": "cosine" } }"#;
    assert!(serde_json::from_str::<AnalysisConfig>(json).is_err());
}

#[test]
fn config_round_trips_through_json() {
    let config = AnalysisConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let restored: AnalysisConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn loaded_config_is_still_validated() {
    let json = r#"{ "sentiment": { "thresholds": { "negative_below": 0.4, "positive_above": 0.1 } } }"#;
    let config: AnalysisConfig = serde_json::from_str(json).unwrap();
    assert!(config.validate().is_err());
}
