use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, FetchResult};
use crate::http_client::fetch_body;
use crate::model::{MatchRecord, MatchReport, RosterEntry, TeamStanding};
use crate::services::{IdentityResolver, MatchHistoryService, MatchReportService};

const SERVICE: &str = "bungie";
const BUNGIE_BASE_URL: &str = "https://www.bungie.net/Platform/Destiny";
const API_KEY_HEADER: &str = "X-API-Key";
const SUCCESS_CODE: i64 = 1;

/// Bungie platform API: identity search, account summary, activity history
/// and post-game carnage reports.
#[derive(Debug, Clone)]
pub struct BungieClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BungieClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BUNGIE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn get(&self, url: &str) -> FetchResult<String> {
        fetch_body(&self.client, SERVICE, url, &[(API_KEY_HEADER, &self.api_key)])
    }
}

impl MatchHistoryService for BungieClient {
    fn fetch_matches(
        &self,
        membership_type: i32,
        account_id: &str,
        character_id: &str,
        count: u32,
        mode: &str,
    ) -> FetchResult<Vec<MatchRecord>> {
        let url = format!(
            "{}/Stats/ActivityHistory/{membership_type}/{account_id}/{character_id}/?page=0&count={count}&mode={mode}",
            self.base_url
        );
        let body = self.get(&url)?;
        parse_activity_history_json(&body, character_id)
    }
}

impl MatchReportService for BungieClient {
    fn fetch_report(&self, match_id: &str) -> FetchResult<MatchReport> {
        let url = format!("{}/Stats/PostGameCarnageReport/{match_id}/", self.base_url);
        let body = self.get(&url)?;
        parse_pgcr_json(&body)
    }
}

impl IdentityResolver for BungieClient {
    fn resolve_handle(&self, handle: &str, membership_type: i32) -> FetchResult<String> {
        let base = format!("{}/SearchDestinyPlayer/{membership_type}/", self.base_url);
        let mut url = Url::parse(&base)
            .map_err(|err| FetchError::malformed(SERVICE, format!("bad search url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::malformed(SERVICE, "search url cannot take a handle"))?
            .pop_if_empty()
            .push(handle)
            .push("");
        let body = self.get(url.as_str())?;
        parse_search_player_json(&body)
    }

    fn list_characters(&self, membership_type: i32, account_id: &str) -> FetchResult<Vec<String>> {
        let url = format!("{}/{membership_type}/Account/{account_id}/Summary/", self.base_url);
        let body = self.get(&url)?;
        parse_account_summary_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Response")]
    response: Option<T>,
    #[serde(rename = "ErrorCode", default)]
    error_code: Option<i64>,
    #[serde(rename = "ErrorStatus", default)]
    error_status: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

fn decode_envelope<T: DeserializeOwned>(raw: &str) -> FetchResult<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::malformed(SERVICE, "empty payload"));
    }
    let envelope: Envelope<T> = serde_json::from_str(trimmed)
        .map_err(|err| FetchError::malformed(SERVICE, format!("invalid json: {err}")))?;
    if let Some(code) = envelope.error_code {
        if code != SUCCESS_CODE {
            let status = envelope.error_status.unwrap_or_else(|| "Unknown".to_string());
            let message = envelope.message.unwrap_or_default();
            return Err(FetchError::unavailable(
                SERVICE,
                format!("{status} ({code}): {message}"),
            ));
        }
    }
    envelope
        .response
        .ok_or_else(|| FetchError::malformed(SERVICE, "missing Response"))
}

#[derive(Debug, Default, Deserialize)]
struct StatValue {
    #[serde(default)]
    basic: BasicValue,
}

#[derive(Debug, Default, Deserialize)]
struct BasicValue {
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct ActivityHistoryResponse {
    #[serde(default)]
    data: ActivityHistoryData,
}

#[derive(Debug, Default, Deserialize)]
struct ActivityHistoryData {
    #[serde(default)]
    activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(default)]
    period: Option<String>,
    #[serde(rename = "activityDetails")]
    activity_details: ActivityDetails,
    #[serde(default)]
    values: ActivityValues,
}

#[derive(Debug, Deserialize)]
struct ActivityDetails {
    #[serde(rename = "instanceId")]
    instance_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ActivityValues {
    #[serde(default)]
    standing: Option<StatValue>,
}

pub fn parse_activity_history_json(raw: &str, character_id: &str) -> FetchResult<Vec<MatchRecord>> {
    let parsed: ActivityHistoryResponse = decode_envelope(raw)?;
    let mut matches = Vec::with_capacity(parsed.data.activities.len());
    for activity in parsed.data.activities {
        let Some(standing) = activity.values.standing else {
            tracing::warn!(
                match_id = %activity.activity_details.instance_id,
                "activity has no standing; skipping"
            );
            continue;
        };
        matches.push(MatchRecord {
            match_id: activity.activity_details.instance_id,
            character_id: character_id.to_string(),
            standing: standing.basic.value,
            period: activity.period.as_deref().and_then(parse_period),
        });
    }
    Ok(matches)
}

fn parse_period(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
struct PgcrResponse {
    #[serde(default)]
    data: PgcrData,
}

#[derive(Debug, Default, Deserialize)]
struct PgcrData {
    #[serde(default)]
    entries: Vec<PgcrEntry>,
    #[serde(default)]
    teams: Vec<PgcrTeam>,
}

#[derive(Debug, Deserialize)]
struct PgcrEntry {
    #[serde(default)]
    standing: f64,
    player: PgcrPlayer,
    #[serde(rename = "characterId", default)]
    character_id: String,
}

#[derive(Debug, Deserialize)]
struct PgcrPlayer {
    #[serde(rename = "destinyUserInfo")]
    user_info: UserInfo,
    #[serde(rename = "characterClass", default)]
    character_class: String,
    #[serde(rename = "lightLevel", default)]
    light_level: i32,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(rename = "membershipId")]
    membership_id: String,
    #[serde(rename = "membershipType", default)]
    membership_type: i32,
    #[serde(rename = "displayName", default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct PgcrTeam {
    #[serde(rename = "teamId", default)]
    team_id: i32,
    #[serde(default)]
    standing: StatValue,
    #[serde(default)]
    score: StatValue,
}

pub fn parse_pgcr_json(raw: &str) -> FetchResult<MatchReport> {
    let parsed: PgcrResponse = decode_envelope(raw)?;
    let entries = parsed
        .data
        .entries
        .into_iter()
        .map(|entry| RosterEntry {
            membership_id: entry.player.user_info.membership_id,
            membership_type: entry.player.user_info.membership_type,
            display_name: entry.player.user_info.display_name,
            character_id: entry.character_id,
            character_class: entry.player.character_class,
            light_level: entry.player.light_level,
            standing: entry.standing,
        })
        .collect();
    let teams = parsed
        .data
        .teams
        .into_iter()
        .map(|team| TeamStanding {
            team_id: team.team_id,
            standing: team.standing.basic.value,
            score: team.score.basic.value,
        })
        .collect();
    Ok(MatchReport { entries, teams })
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "membershipId")]
    membership_id: String,
}

pub fn parse_search_player_json(raw: &str) -> FetchResult<String> {
    let hits: Vec<SearchHit> = decode_envelope(raw)?;
    hits.into_iter()
        .next()
        .map(|hit| hit.membership_id)
        .ok_or_else(|| FetchError::malformed(SERVICE, "no player matched the handle"))
}

#[derive(Debug, Deserialize)]
struct AccountSummaryResponse {
    #[serde(default)]
    data: AccountSummaryData,
}

#[derive(Debug, Default, Deserialize)]
struct AccountSummaryData {
    #[serde(default)]
    characters: Vec<AccountCharacter>,
}

#[derive(Debug, Deserialize)]
struct AccountCharacter {
    #[serde(rename = "characterBase")]
    character_base: CharacterBase,
}

#[derive(Debug, Deserialize)]
struct CharacterBase {
    #[serde(rename = "characterId")]
    character_id: String,
}

pub fn parse_account_summary_json(raw: &str) -> FetchResult<Vec<String>> {
    let parsed: AccountSummaryResponse = decode_envelope(raw)?;
    Ok(parsed
        .data
        .characters
        .into_iter()
        .map(|c| c.character_base.character_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_is_unavailable() {
        let raw = r#"{"ErrorCode":31,"ErrorStatus":"PerEndpointRequestThrottleExceeded","Message":"slow down","ThrottleSeconds":10}"#;
        let err = parse_pgcr_json(raw).unwrap_err();
        assert!(matches!(err, FetchError::UpstreamUnavailable { .. }));
        assert!(err.to_string().contains("PerEndpointRequestThrottleExceeded"));
    }

    #[test]
    fn missing_response_is_malformed() {
        let err = parse_account_summary_json(r#"{"ErrorCode":1}"#).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn period_parses_rfc3339() {
        let dt = parse_period("2017-03-18T19:22:05Z").expect("valid period");
        assert_eq!(dt.to_rfc3339(), "2017-03-18T19:22:05+00:00");
        assert!(parse_period("yesterday").is_none());
    }
}
