//! End-to-end tests for strategy selection and configuration.

use pretty_assertions::assert_eq;
use seal_rank::{
    build_from_config, build_ranker, Error, Ranker, RankerConfig, RankerKind, WalkConfig,
};

// ============================================================================
// 1. Every strategy is reachable by tag and by name
// ============================================================================

#[test]
fn test_every_kind_builds() {
    for kind in RankerKind::ALL {
        let by_tag: RankerKind = kind.tag().parse().unwrap();
        let by_name: RankerKind = kind.name().parse().unwrap();
        assert_eq!(by_tag, kind);
        assert_eq!(by_name, kind);

        let ranker = build_ranker(kind, &RankerConfig::default()).unwrap();
        assert_eq!(ranker.kind(), kind);
        assert_eq!(ranker.feature().as_str(), kind.tag());
        assert!(!ranker.description().is_empty());
        assert_eq!(ranker.is_log_scale(), kind == RankerKind::BayesSets);
    }
}

// ============================================================================
// 2. Unknown strategies are rejected
// ============================================================================

#[test]
fn test_unknown_strategy() {
    let err = "random-forest".parse::<RankerKind>().unwrap_err();
    assert!(matches!(err, Error::UnknownRanker(ref s) if s == "random-forest"));

    let config = RankerConfig::default().with_strategy("random-forest");
    assert!(matches!(build_from_config(&config), Err(Error::UnknownRanker(_))));

    assert!(matches!(
        RankerConfig::from_json(r#"{"strategy": "nope"}"#),
        Err(Error::UnknownRanker(_))
    ));
}

#[test]
fn test_missing_strategy() {
    assert!(matches!(
        build_from_config(&RankerConfig::default()),
        Err(Error::Config(_))
    ));
}

// ============================================================================
// 3. JSON configuration
// ============================================================================

#[test]
fn test_config_from_json() {
    let config = RankerConfig::from_json(
        r#"{
            "strategy": "page-rank",
            "feature": "score",
            "walk": { "damping": 0.9, "max_iterations": 10 }
        }"#,
    )
    .unwrap();

    assert_eq!(config.kind().unwrap(), RankerKind::PageRank);
    let walk = config.walk_for(RankerKind::PageRank);
    assert_eq!(walk.damping, 0.9);
    assert_eq!(walk.max_iterations, 10);
    // Unspecified walk fields keep their defaults.
    assert_eq!(walk.threshold, WalkConfig::default().threshold);

    let ranker = build_from_config(&config).unwrap();
    assert_eq!(ranker.kind(), RankerKind::PageRank);
    assert_eq!(ranker.feature().as_str(), "score");
}

#[test]
fn test_config_without_walk_uses_policy() {
    let config = RankerConfig::from_json(r#"{"strategy": "PR"}"#).unwrap();
    assert_eq!(config.walk_for(RankerKind::PageRank), WalkConfig::page_rank());
    assert_eq!(config.walk_for(RankerKind::GraphWalk), WalkConfig::graph_walk());
}

#[test]
fn test_invalid_config_values() {
    assert!(matches!(
        RankerConfig::from_json(r#"{"walk": {"damping": 1.5}}"#),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        RankerConfig::from_json(r#"{"bayes": {"c": 0.0}}"#),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        RankerConfig::from_json(r#"{"feature": "  "}"#),
        Err(Error::Config(_))
    ));
    assert!(matches!(RankerConfig::from_json("{"), Err(Error::Json(_))));

    let config = RankerConfig::default().with_walk(WalkConfig::default().with_max_iterations(0));
    assert!(matches!(build_ranker(RankerKind::GraphWalk, &config), Err(Error::Config(_))));
}

// ============================================================================
// 4. Bayesian Sets scale switch
// ============================================================================

#[test]
fn test_bayes_product_mode_is_not_log_scale() {
    let config = RankerConfig::from_json(r#"{"bayes": {"log_score": false}}"#).unwrap();
    let ranker = build_ranker(RankerKind::BayesSets, &config).unwrap();
    assert!(!ranker.is_log_scale());
}
