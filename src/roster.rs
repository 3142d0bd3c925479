use crate::error::{FetchError, FetchResult};
use crate::model::{MatchRecord, RosterEntry};
use crate::services::MatchReportService;

const SERVICE: &str = "post-game report";

/// A match roster split around the local player's standing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitRoster {
    pub own: Vec<RosterEntry>,
    pub opposing: Vec<RosterEntry>,
}

pub struct RosterResolver<'a> {
    reports: &'a dyn MatchReportService,
}

impl<'a> RosterResolver<'a> {
    pub fn new(reports: &'a dyn MatchReportService) -> Self {
        Self { reports }
    }

    pub fn resolve(&self, record: &MatchRecord) -> FetchResult<SplitRoster> {
        let report = self.reports.fetch_report(&record.match_id)?;
        split_roster(report.entries, record.standing)
    }
}

/// Entries whose standing differs from `own_standing` are the opposing team.
/// That rule only holds for two-team matches the local player appears in, so
/// a roster carrying more than two distinct standings, or none equal to
/// `own_standing`, is rejected instead of being mis-partitioned.
pub fn split_roster(entries: Vec<RosterEntry>, own_standing: f64) -> FetchResult<SplitRoster> {
    let mut standings: Vec<f64> = entries.iter().map(|e| e.standing).collect();
    standings.sort_by(f64::total_cmp);
    standings.dedup_by(|a, b| same_standing(*a, *b));
    if standings.len() > 2 {
        return Err(FetchError::malformed(
            SERVICE,
            format!("expected two teams, found standings {standings:?}"),
        ));
    }
    if !entries.is_empty() && !standings.iter().any(|&s| same_standing(s, own_standing)) {
        return Err(FetchError::malformed(
            SERVICE,
            format!("own standing {own_standing} not among roster standings {standings:?}"),
        ));
    }

    let (own, opposing): (Vec<RosterEntry>, Vec<RosterEntry>) = entries
        .into_iter()
        .partition(|entry| same_standing(entry.standing, own_standing));
    Ok(SplitRoster { own, opposing })
}

// Same ordering as the sort, so NaN standings group together.
fn same_standing(a: f64, b: f64) -> bool {
    a.total_cmp(&b).is_eq()
}
