//! Contracts for the network-backed collaborators the evaluation core depends
//! on. The HTTP implementations live in [`crate::bungie`], [`crate::guardian`]
//! and [`crate::trials_report`]; tests substitute in-memory fakes.

use crate::error::FetchResult;
use crate::model::{MatchRecord, MatchReport, SkillRating, TrialsRecord};

pub trait MatchHistoryService: Send + Sync {
    /// First page of `count` matches for one character in `mode`.
    fn fetch_matches(
        &self,
        membership_type: i32,
        account_id: &str,
        character_id: &str,
        count: u32,
        mode: &str,
    ) -> FetchResult<Vec<MatchRecord>>;
}

pub trait MatchReportService: Send + Sync {
    fn fetch_report(&self, match_id: &str) -> FetchResult<MatchReport>;
}

pub trait SkillRatingService: Send + Sync {
    fn fetch_player(&self, account_id: &str) -> FetchResult<SkillRating>;
}

pub trait TrialsRecordService: Send + Sync {
    fn fetch_player(&self, account_id: &str) -> FetchResult<TrialsRecord>;
}

pub trait IdentityResolver: Send + Sync {
    fn resolve_handle(&self, handle: &str, membership_type: i32) -> FetchResult<String>;
    fn list_characters(&self, membership_type: i32, account_id: &str) -> FetchResult<Vec<String>>;
}
