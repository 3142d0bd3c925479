use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Game-mode key for Trials of Osiris on the skill-rating service.
pub const TRIALS_MODE: &str = "14";
/// Activity-history mode name for Trials of Osiris on Bungie.
pub const TRIALS_ACTIVITY_MODE: &str = "TrialsOfOsiris";

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_id: String,
    pub character_id: String,
    pub standing: f64,
    pub period: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub membership_id: String,
    pub membership_type: i32,
    pub display_name: String,
    pub character_id: String,
    pub character_class: String,
    pub light_level: i32,
    pub standing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding {
    pub team_id: i32,
    pub standing: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    pub entries: Vec<RosterEntry>,
    pub teams: Vec<TeamStanding>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeStats {
    pub elo: f64,
    pub kills: u32,
    pub deaths: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillRating {
    pub name: String,
    pub modes: HashMap<String, ModeStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialsRecord {
    pub display_name: Option<String>,
    /// Flawless runs keyed by season ("year") label.
    pub flawless_by_season: HashMap<String, u32>,
}

impl TrialsRecord {
    pub fn flawless_total(&self) -> u32 {
        self.flawless_by_season
            .values()
            .copied()
            .fold(0, u32::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Ok,
    Degraded(String),
}

impl SourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Canonical merged record for one player, built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub name: String,
    pub elo: f64,
    /// `None` when the player has no recorded deaths.
    pub kdr: Option<f64>,
    pub flawless: u32,
    pub skill_source: SourceStatus,
    pub trials_source: SourceStatus,
}

impl PlayerStats {
    pub fn is_degraded(&self) -> bool {
        !self.skill_source.is_ok() || !self.trials_source.is_ok()
    }
}

impl fmt::Display for PlayerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kdr = match self.kdr {
            Some(kdr) => format!("{kdr:.2}"),
            None => "-".to_string(),
        };
        write!(
            f,
            "{}\telo: {:.0},\tkdr: {},\tflawless: {}",
            self.name, self.elo, kdr, self.flawless
        )?;
        if self.is_degraded() {
            write!(f, "\t(partial)")?;
        }
        Ok(())
    }
}

pub fn kill_death_ratio(kills: u32, deaths: u32) -> Option<f64> {
    if deaths == 0 {
        return None;
    }
    Some(f64::from(kills) / f64::from(deaths))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_matches: usize,
    pub total_flagged: usize,
    pub skipped_matches: usize,
    pub degraded_players: usize,
}
