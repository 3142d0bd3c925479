mod common;

use std::collections::HashMap;

use carry_check::aggregator::{StatsAggregator, merge_player_stats};
use carry_check::error::FetchError;
use carry_check::model::{SkillRating, SourceStatus, TRIALS_MODE, TrialsRecord};
use carry_check::stats_cache::StatsCache;

use common::{FakeSkill, FakeTrials, skill, trials};

#[test]
fn merges_both_sources() {
    let mut record = trials(7);
    record.flawless_by_season.insert("2".to_string(), 11);
    record.flawless_by_season.insert("3".to_string(), 4);

    let stats = merge_player_stats(
        "p1",
        TRIALS_MODE,
        Ok(skill("Rival", 1688.2, 1300, 520)),
        Ok(record),
    );
    assert_eq!(stats.name, "Rival");
    assert_eq!(stats.elo, 1688.2);
    assert_eq!(stats.kdr, Some(2.5));
    assert_eq!(stats.flawless, 22);
    assert!(!stats.is_degraded());
}

#[test]
fn failed_trials_source_degrades_only_its_fields() {
    let stats = merge_player_stats(
        "p1",
        TRIALS_MODE,
        Ok(skill("Rival", 1600.0, 30, 20)),
        Err(FetchError::unavailable("destinytrialsreport", "connection reset")),
    );
    assert_eq!(stats.name, "Rival");
    assert_eq!(stats.elo, 1600.0);
    assert_eq!(stats.kdr, Some(1.5));
    assert_eq!(stats.flawless, 0);
    assert_eq!(stats.skill_source, SourceStatus::Ok);
    assert!(matches!(stats.trials_source, SourceStatus::Degraded(ref r) if r.contains("connection reset")));
}

#[test]
fn failed_skill_source_degrades_only_its_fields() {
    let mut record = trials(25);
    record.display_name = Some("FromTrials".to_string());
    let stats = merge_player_stats(
        "p1",
        TRIALS_MODE,
        Err(FetchError::malformed("guardian.gg", "missing player data")),
        Ok(record),
    );
    assert_eq!(stats.name, "FromTrials");
    assert_eq!(stats.elo, 0.0);
    assert_eq!(stats.kdr, None);
    assert_eq!(stats.flawless, 25);
    assert!(!stats.skill_source.is_ok());
    assert!(stats.trials_source.is_ok());
}

#[test]
fn both_sources_failing_still_yields_a_record() {
    let stats = merge_player_stats(
        "4611686018428389999",
        TRIALS_MODE,
        Err(FetchError::unavailable("guardian.gg", "timeout")),
        Err(FetchError::unavailable("destinytrialsreport", "timeout")),
    );
    assert_eq!(stats.name, "4611686018428389999");
    assert_eq!(stats.elo, 0.0);
    assert_eq!(stats.flawless, 0);
    assert!(stats.is_degraded());
}

#[test]
fn zero_deaths_leaves_kdr_undefined() {
    let stats = merge_player_stats(
        "p1",
        TRIALS_MODE,
        Ok(skill("Untouched", 1500.0, 12, 0)),
        Ok(trials(1)),
    );
    assert_eq!(stats.kdr, None);
    assert!(stats.skill_source.is_ok());
}

#[test]
fn missing_mode_is_degraded() {
    let rating = SkillRating {
        name: "Crucible Only".to_string(),
        modes: HashMap::new(),
    };
    let stats = merge_player_stats("p1", TRIALS_MODE, Ok(rating), Ok(TrialsRecord::default()));
    assert_eq!(stats.name, "Crucible Only");
    assert_eq!(stats.elo, 0.0);
    assert!(matches!(stats.skill_source, SourceStatus::Degraded(ref r) if r.contains("14")));
}

#[test]
fn stats_for_goes_through_the_cache() {
    let skill_svc = FakeSkill::default().with("p1", Ok(skill("Rival", 1600.0, 30, 20)));
    let trials_svc = FakeTrials::default().with("p1", Ok(trials(3)));
    let cache = StatsCache::new();
    let aggregator = StatsAggregator::new(&skill_svc, &trials_svc, &cache);

    let first = aggregator.stats_for("p1");
    let second = aggregator.stats_for("p1");

    assert_eq!(first, second);
    assert_eq!(skill_svc.calls(), 1);
    assert_eq!(trials_svc.calls(), 1);
    assert_eq!(cache.get("p1").map(|s| s.flawless), Some(3));
}

#[test]
fn degraded_records_are_cached_too() {
    let skill_svc = FakeSkill::default();
    let trials_svc = FakeTrials::default();
    let cache = StatsCache::new();
    let aggregator = StatsAggregator::new(&skill_svc, &trials_svc, &cache);

    assert!(aggregator.stats_for("gone").is_degraded());
    assert!(aggregator.stats_for("gone").is_degraded());
    assert_eq!(skill_svc.calls(), 1);
}
