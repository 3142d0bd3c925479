use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::{PlayerStats, Summary};

/// Structured progress of an evaluation run, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalEvent {
    MatchStarted {
        match_id: String,
        period: Option<DateTime<Utc>>,
    },
    PlayerLine {
        match_id: String,
        identity: String,
        stats: Arc<PlayerStats>,
    },
    ConditionTriggered {
        match_id: String,
        condition: &'static str,
    },
    MatchSkipped {
        match_id: String,
        reason: String,
    },
    MatchFinished {
        match_id: String,
        flagged: bool,
    },
}

pub trait ReportSink {
    fn emit(&mut self, event: EvalEvent) -> Result<()>;
}

/// Keeps every event; used by tests and by callers that render later.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<EvalEvent>,
}

impl ReportSink for EventLog {
    fn emit(&mut self, event: EvalEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}

/// Plain-text report. Rows are tab-separated and aligned per match block,
/// each block is written as soon as its match finishes.
pub struct TextReport<W: Write> {
    out: W,
    rows: Vec<String>,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_summary(&mut self, summary: &Summary) -> Result<()> {
        self.flush_block()?;
        let mut rows = vec![
            format!("total games:\t{}", summary.total_matches),
            format!("total potential carries:\t{}", summary.total_flagged),
        ];
        if summary.skipped_matches > 0 {
            rows.push(format!("skipped games:\t{}", summary.skipped_matches));
        }
        if summary.degraded_players > 0 {
            rows.push(format!("players with partial data:\t{}", summary.degraded_players));
        }
        writeln!(self.out).context("write report")?;
        for line in align_rows(&rows) {
            writeln!(self.out, "{line}").context("write report")?;
        }
        self.out.flush().context("flush report")
    }

    fn flush_block(&mut self) -> Result<()> {
        let rows = std::mem::take(&mut self.rows);
        for line in align_rows(&rows) {
            writeln!(self.out, "{line}").context("write report")?;
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn emit(&mut self, event: EvalEvent) -> Result<()> {
        match event {
            EvalEvent::MatchStarted { match_id, period } => {
                let when = period
                    .map(|p| p.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                self.rows.push(format!("match {match_id}\t{when}"));
            }
            EvalEvent::PlayerLine { stats, .. } => self.rows.push(stats.to_string()),
            EvalEvent::ConditionTriggered { condition, .. } => {
                self.rows.push(format!("maybe a carry based on {condition}"));
            }
            EvalEvent::MatchSkipped { reason, .. } => {
                self.rows.push(format!("skipped: {reason}"));
                self.rows.push("---".to_string());
                self.flush_block()?;
            }
            EvalEvent::MatchFinished { .. } => {
                self.rows.push("---".to_string());
                self.flush_block()?;
            }
        }
        Ok(())
    }
}

/// Pads every tab-separated cell to its column's width plus one space.
pub fn align_rows(rows: &[String]) -> Vec<String> {
    let split: Vec<Vec<&str>> = rows.iter().map(|r| r.split('\t').collect()).collect();
    let mut widths: Vec<usize> = Vec::new();
    for cells in &split {
        // The last cell of a row is never padded, so it does not widen its column.
        for (idx, cell) in cells.iter().enumerate().take(cells.len().saturating_sub(1)) {
            let len = cell.chars().count();
            match widths.get_mut(idx) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    split
        .iter()
        .map(|cells| {
            let mut line = String::new();
            let last = cells.len().saturating_sub(1);
            for (idx, cell) in cells.iter().enumerate() {
                line.push_str(cell);
                if idx < last {
                    let pad = widths[idx] + 1 - cell.chars().count();
                    line.push_str(&" ".repeat(pad));
                }
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::align_rows;

    #[test]
    fn aligns_columns_across_rows() {
        let rows = vec!["ab\tx".to_string(), "abcd\ty\tz".to_string(), "---".to_string()];
        assert_eq!(align_rows(&rows), vec!["ab   x", "abcd y z", "---"]);
    }
}
