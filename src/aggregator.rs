use std::sync::Arc;

use crate::error::FetchResult;
use crate::model::{PlayerStats, SkillRating, SourceStatus, TRIALS_MODE, TrialsRecord, kill_death_ratio};
use crate::services::{SkillRatingService, TrialsRecordService};
use crate::stats_cache::StatsCache;

/// Builds canonical `PlayerStats` from the skill-rating and trials-record
/// services and fills the run cache with them.
pub struct StatsAggregator<'a> {
    skill: &'a dyn SkillRatingService,
    trials: &'a dyn TrialsRecordService,
    cache: &'a StatsCache,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(
        skill: &'a dyn SkillRatingService,
        trials: &'a dyn TrialsRecordService,
        cache: &'a StatsCache,
    ) -> Self {
        Self {
            skill,
            trials,
            cache,
        }
    }

    pub fn cache(&self) -> &StatsCache {
        self.cache
    }

    /// Cached record for `identity`, aggregating it on first request.
    pub fn stats_for(&self, identity: &str) -> Arc<PlayerStats> {
        self.cache
            .get_or_compute(identity, || self.aggregate(identity))
    }

    /// Always yields a record; upstream failures degrade fields instead of
    /// propagating.
    pub fn aggregate(&self, identity: &str) -> PlayerStats {
        let (skill, trials) = rayon::join(
            || self.skill.fetch_player(identity),
            || self.trials.fetch_player(identity),
        );
        let stats = merge_player_stats(identity, TRIALS_MODE, skill, trials);
        if let SourceStatus::Degraded(reason) = &stats.skill_source {
            tracing::warn!(identity, %reason, "skill rating degraded");
        }
        if let SourceStatus::Degraded(reason) = &stats.trials_source {
            tracing::warn!(identity, %reason, "trials record degraded");
        }
        tracing::debug!(identity, name = %stats.name, elo = stats.elo, "aggregated player");
        stats
    }
}

/// Merge policy for the two sources. Name and ELO come from the skill source,
/// the flawless count is summed over every season the trials source reports.
/// A failed source contributes zero values and a `Degraded` status.
pub fn merge_player_stats(
    identity: &str,
    mode: &str,
    skill: FetchResult<SkillRating>,
    trials: FetchResult<TrialsRecord>,
) -> PlayerStats {
    let (skill_name, elo, kdr, skill_source) = match skill {
        Ok(rating) => match rating.modes.get(mode) {
            Some(stats) => (
                rating.name,
                stats.elo,
                kill_death_ratio(stats.kills, stats.deaths),
                SourceStatus::Ok,
            ),
            None => (
                rating.name,
                0.0,
                None,
                SourceStatus::Degraded(format!("no stats for mode {mode}")),
            ),
        },
        Err(err) => (String::new(), 0.0, None, SourceStatus::Degraded(err.to_string())),
    };

    let (trials_name, flawless, trials_source) = match trials {
        Ok(record) => {
            let total = record.flawless_total();
            (record.display_name, total, SourceStatus::Ok)
        }
        Err(err) => (None, 0, SourceStatus::Degraded(err.to_string())),
    };

    let name = if !skill_name.trim().is_empty() {
        skill_name
    } else {
        trials_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| identity.to_string())
    };

    PlayerStats {
        name,
        elo,
        kdr,
        flawless,
        skill_source,
        trials_source,
    }
}
