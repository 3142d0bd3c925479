use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;

use crate::aggregator::StatsAggregator;
use crate::config::DEFAULT_FETCH_PARALLELISM;
use crate::error::FetchResult;
use crate::heuristics::CarryHeuristicEngine;
use crate::model::{MatchRecord, PlayerStats, Summary};
use crate::report::{EvalEvent, ReportSink};
use crate::roster::RosterResolver;
use crate::services::MatchReportService;

/// Result of checking one match, before anything is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Opposing players in roster order.
    pub opponents: Vec<(String, Arc<PlayerStats>)>,
    pub triggered: Vec<&'static str>,
}

impl MatchOutcome {
    pub fn flagged(&self) -> bool {
        !self.triggered.is_empty()
    }
}

pub struct MatchEvaluator<'a> {
    roster: RosterResolver<'a>,
    aggregator: StatsAggregator<'a>,
    engine: &'a CarryHeuristicEngine,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> MatchEvaluator<'a> {
    pub fn new(
        reports: &'a dyn MatchReportService,
        aggregator: StatsAggregator<'a>,
        engine: &'a CarryHeuristicEngine,
    ) -> Self {
        Self {
            roster: RosterResolver::new(reports),
            aggregator,
            engine,
            pool: build_fetch_pool(DEFAULT_FETCH_PARALLELISM),
        }
    }

    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.pool = build_fetch_pool(threads);
        self
    }

    /// Resolve the roster, gather stats for every opponent and run the
    /// heuristics. Opponent stats are fetched in parallel but come back in
    /// roster order.
    pub fn evaluate_match(&self, record: &MatchRecord) -> FetchResult<MatchOutcome> {
        let split = self.roster.resolve(record)?;
        let opponents: Vec<(String, Arc<PlayerStats>)> = with_fetch_pool(&self.pool, || {
            split
                .opposing
                .par_iter()
                .map(|entry| {
                    (
                        entry.membership_id.clone(),
                        self.aggregator.stats_for(&entry.membership_id),
                    )
                })
                .collect()
        });
        let roster: Vec<Arc<PlayerStats>> =
            opponents.iter().map(|(_, stats)| stats.clone()).collect();
        let triggered = self.engine.evaluate(&roster);
        Ok(MatchOutcome {
            opponents,
            triggered,
        })
    }

    /// Checks `matches` one after another, streaming events into `sink` as
    /// each match completes. A match whose roster cannot be resolved is
    /// reported as skipped and never counts as flagged.
    pub fn evaluate(&self, matches: &[MatchRecord], sink: &mut dyn ReportSink) -> Result<Summary> {
        let mut summary = Summary {
            total_matches: matches.len(),
            ..Summary::default()
        };

        for record in matches {
            sink.emit(EvalEvent::MatchStarted {
                match_id: record.match_id.clone(),
                period: record.period,
            })?;

            let outcome = match self.evaluate_match(record) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(match_id = %record.match_id, error = %err, "skipping match");
                    summary.skipped_matches += 1;
                    sink.emit(EvalEvent::MatchSkipped {
                        match_id: record.match_id.clone(),
                        reason: err.to_string(),
                    })?;
                    continue;
                }
            };

            for (identity, stats) in &outcome.opponents {
                sink.emit(EvalEvent::PlayerLine {
                    match_id: record.match_id.clone(),
                    identity: identity.clone(),
                    stats: stats.clone(),
                })?;
            }
            for &condition in &outcome.triggered {
                sink.emit(EvalEvent::ConditionTriggered {
                    match_id: record.match_id.clone(),
                    condition,
                })?;
            }

            let flagged = outcome.flagged();
            if flagged {
                summary.total_flagged += 1;
            }
            tracing::info!(
                match_id = %record.match_id,
                opponents = outcome.opponents.len(),
                triggered = ?outcome.triggered,
                "match evaluated"
            );
            sink.emit(EvalEvent::MatchFinished {
                match_id: record.match_id.clone(),
                flagged,
            })?;
        }

        summary.degraded_players = self
            .aggregator
            .cache()
            .snapshot()
            .iter()
            .filter(|(_, stats)| stats.is_degraded())
            .count();
        Ok(summary)
    }
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}
