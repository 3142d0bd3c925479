use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{FetchError, FetchResult};
use crate::http_client::fetch_body;
use crate::model::TrialsRecord;
use crate::services::TrialsRecordService;

const SERVICE: &str = "destinytrialsreport";
const TRIALS_REPORT_URL: &str = "https://api.destinytrialsreport.com/player";

#[derive(Debug, Clone)]
pub struct TrialsReportClient {
    client: Client,
    base_url: String,
}

impl TrialsReportClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: TRIALS_REPORT_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl TrialsRecordService for TrialsReportClient {
    fn fetch_player(&self, account_id: &str) -> FetchResult<TrialsRecord> {
        let url = format!("{}/{account_id}", self.base_url);
        let body = fetch_body(&self.client, SERVICE, &url, &[])?;
        parse_trials_player_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct TrialsPlayer {
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    // An object keyed by year for players with runs, `[]` for everyone else.
    #[serde(default)]
    flawless: Value,
}

#[derive(Debug, Deserialize)]
struct FlawlessHistory {
    #[serde(default)]
    years: HashMap<String, FlawlessYear>,
}

#[derive(Debug, Deserialize)]
struct FlawlessYear {
    #[serde(default)]
    count: u32,
}

/// The service answers with a one-element array per player. An empty array
/// means it has never seen the player, which is an empty record rather than
/// an error.
pub fn parse_trials_player_json(raw: &str) -> FetchResult<TrialsRecord> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::malformed(SERVICE, "empty payload"));
    }
    let players: Vec<TrialsPlayer> = serde_json::from_str(trimmed)
        .map_err(|err| FetchError::malformed(SERVICE, format!("invalid json: {err}")))?;
    let Some(player) = players.into_iter().next() else {
        return Ok(TrialsRecord::default());
    };

    let flawless_by_season = match player.flawless {
        Value::Null | Value::Array(_) => HashMap::new(),
        Value::Object(map) => {
            let history: FlawlessHistory = serde_json::from_value(Value::Object(map))
                .map_err(|err| {
                    FetchError::malformed(SERVICE, format!("invalid flawless history: {err}"))
                })?;
            history
                .years
                .into_iter()
                .map(|(season, year)| (season, year.count))
                .collect()
        }
        other => {
            return Err(FetchError::malformed(
                SERVICE,
                format!("unexpected flawless value: {other}"),
            ));
        }
    };

    Ok(TrialsRecord {
        display_name: player.display_name,
        flawless_by_season,
    })
}
