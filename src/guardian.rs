use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{FetchError, FetchResult};
use crate::http_client::fetch_body;
use crate::model::{ModeStats, SkillRating};
use crate::services::SkillRatingService;

const SERVICE: &str = "guardian.gg";
const GUARDIAN_GG_URL: &str = "https://api.guardian.gg/v2/players";

#[derive(Debug, Clone)]
pub struct GuardianGgClient {
    client: Client,
    base_url: String,
}

impl GuardianGgClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GUARDIAN_GG_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl SkillRatingService for GuardianGgClient {
    fn fetch_player(&self, account_id: &str) -> FetchResult<SkillRating> {
        let url = format!("{}/{account_id}", self.base_url);
        let body = fetch_body(&self.client, SERVICE, &url, &[])?;
        parse_guardian_player_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GuardianResponse {
    data: Option<GuardianPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianPlayer {
    #[serde(default)]
    name: String,
    #[serde(default)]
    modes: HashMap<String, GuardianMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianMode {
    #[serde(default)]
    elo: f64,
    #[serde(default)]
    kills: u32,
    #[serde(default)]
    deaths: u32,
}

pub fn parse_guardian_player_json(raw: &str) -> FetchResult<SkillRating> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::malformed(SERVICE, "empty payload"));
    }
    let parsed: GuardianResponse = serde_json::from_str(trimmed)
        .map_err(|err| FetchError::malformed(SERVICE, format!("invalid json: {err}")))?;
    let player = parsed
        .data
        .ok_or_else(|| FetchError::malformed(SERVICE, "missing player data"))?;

    let modes = player
        .modes
        .into_iter()
        .map(|(key, mode)| {
            (
                key,
                ModeStats {
                    elo: mode.elo,
                    kills: mode.kills,
                    deaths: mode.deaths,
                },
            )
        })
        .collect();

    Ok(SkillRating {
        name: player.name,
        modes,
    })
}
