//! Configuration loading tests.

use taskmatch_core::config::{MatchConfig, ScoringWeights};

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");

#[test]
fn shipped_data_matches_builtin() {
    let loaded = MatchConfig::load(DATA_DIR).expect("load data/");
    let builtin = MatchConfig::builtin();

    assert_eq!(loaded.taxonomy.len(), 8);
    assert_eq!(loaded.weights, ScoringWeights::default());
    assert_eq!(loaded.urgency, builtin.urgency);
    assert!(!loaded.apply_urgency_multiplier);
    assert_eq!(loaded.default_recommend_limit, 5);

    for domain in builtin.taxonomy.domains() {
        assert_eq!(
            loaded.taxonomy.keywords_for(domain),
            builtin.taxonomy.keywords_for(domain),
            "keywords differ for {domain}"
        );
        assert_eq!(
            loaded.taxonomy.departments_for(domain),
            builtin.taxonomy.departments_for(domain),
            "departments differ for {domain}"
        );
    }
}

#[test]
fn missing_data_dir_is_reported() {
    let err = MatchConfig::load("/definitely/not/here").unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "got: {err}");
}

#[test]
fn taxonomy_lookups_ignore_case() {
    let config = MatchConfig::builtin();
    assert!(config.taxonomy.contains(" FrontEnd "));
    assert_eq!(
        config.taxonomy.keywords_for("DEVOPS").map(|k| k.len()),
        Some(7)
    );
    assert!(config.taxonomy.keywords_for("astrology").is_none());
}

#[test]
fn urgency_defaults_to_one() {
    let config = MatchConfig::builtin();
    assert_eq!(config.urgency_for("incident"), 1.5);
    assert_eq!(config.urgency_for("bug"), 1.2);
    assert_eq!(config.urgency_for("spike"), 1.0);
}
