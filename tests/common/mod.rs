#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use carry_check::error::{FetchError, FetchResult};
use carry_check::model::{
    MatchRecord, MatchReport, ModeStats, PlayerStats, RosterEntry, SkillRating, SourceStatus,
    TRIALS_MODE, TrialsRecord,
};
use carry_check::services::{
    IdentityResolver, MatchHistoryService, MatchReportService, SkillRatingService,
    TrialsRecordService,
};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn stats(elo: f64, kdr: Option<f64>, flawless: u32) -> Arc<PlayerStats> {
    Arc::new(PlayerStats {
        name: format!("p{elo}"),
        elo,
        kdr,
        flawless,
        skill_source: SourceStatus::Ok,
        trials_source: SourceStatus::Ok,
    })
}

pub fn skill(name: &str, elo: f64, kills: u32, deaths: u32) -> SkillRating {
    let mut modes = HashMap::new();
    modes.insert(
        TRIALS_MODE.to_string(),
        ModeStats { elo, kills, deaths },
    );
    SkillRating {
        name: name.to_string(),
        modes,
    }
}

pub fn trials(flawless: u32) -> TrialsRecord {
    let mut flawless_by_season = HashMap::new();
    flawless_by_season.insert("1".to_string(), flawless);
    TrialsRecord {
        display_name: None,
        flawless_by_season,
    }
}

pub fn entry(id: &str, standing: f64) -> RosterEntry {
    RosterEntry {
        membership_id: id.to_string(),
        membership_type: 2,
        display_name: id.to_string(),
        character_id: format!("c-{id}"),
        character_class: "Hunter".to_string(),
        light_level: 400,
        standing,
    }
}

pub fn record(match_id: &str, standing: f64) -> MatchRecord {
    MatchRecord {
        match_id: match_id.to_string(),
        character_id: "c-self".to_string(),
        standing,
        period: None,
    }
}

#[derive(Default)]
pub struct FakeSkill {
    pub players: HashMap<String, FetchResult<SkillRating>>,
    pub calls: AtomicUsize,
}

impl FakeSkill {
    pub fn with(mut self, id: &str, rating: FetchResult<SkillRating>) -> Self {
        self.players.insert(id.to_string(), rating);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SkillRatingService for FakeSkill {
    fn fetch_player(&self, account_id: &str) -> FetchResult<SkillRating> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.players
            .get(account_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::unavailable("fake skill", "unknown player")))
    }
}

#[derive(Default)]
pub struct FakeTrials {
    pub players: HashMap<String, FetchResult<TrialsRecord>>,
    pub calls: AtomicUsize,
}

impl FakeTrials {
    pub fn with(mut self, id: &str, record: FetchResult<TrialsRecord>) -> Self {
        self.players.insert(id.to_string(), record);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrialsRecordService for FakeTrials {
    fn fetch_player(&self, account_id: &str) -> FetchResult<TrialsRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.players
            .get(account_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::unavailable("fake trials", "unknown player")))
    }
}

#[derive(Default)]
pub struct FakeReports {
    pub reports: HashMap<String, FetchResult<MatchReport>>,
}

impl FakeReports {
    pub fn with(mut self, match_id: &str, entries: Vec<RosterEntry>) -> Self {
        self.reports.insert(
            match_id.to_string(),
            Ok(MatchReport {
                entries,
                teams: Vec::new(),
            }),
        );
        self
    }

    pub fn failing(mut self, match_id: &str, err: FetchError) -> Self {
        self.reports.insert(match_id.to_string(), Err(err));
        self
    }
}

impl MatchReportService for FakeReports {
    fn fetch_report(&self, match_id: &str) -> FetchResult<MatchReport> {
        self.reports
            .get(match_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::unavailable("fake reports", "unknown match")))
    }
}

#[derive(Default)]
pub struct FakeAccount {
    pub account_id: Option<String>,
    pub characters: Vec<String>,
    pub histories: HashMap<String, FetchResult<Vec<MatchRecord>>>,
}

impl IdentityResolver for FakeAccount {
    fn resolve_handle(&self, _handle: &str, _membership_type: i32) -> FetchResult<String> {
        self.account_id
            .clone()
            .ok_or_else(|| FetchError::malformed("fake identity", "no player matched the handle"))
    }

    fn list_characters(&self, _membership_type: i32, _account_id: &str) -> FetchResult<Vec<String>> {
        Ok(self.characters.clone())
    }
}

impl MatchHistoryService for FakeAccount {
    fn fetch_matches(
        &self,
        _membership_type: i32,
        _account_id: &str,
        character_id: &str,
        _count: u32,
        _mode: &str,
    ) -> FetchResult<Vec<MatchRecord>> {
        self.histories
            .get(character_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
