use std::time::Duration;

use clap::Parser;

use crate::heuristics::HeuristicThresholds;
use crate::http_client::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_FETCH_PARALLELISM: usize = 6;
/// Membership type used by the Bungie API for PlayStation accounts.
pub const DEFAULT_PLATFORM: i32 = 2;

/// Flag recent Trials matches where the opposing team looks like a carry.
#[derive(Debug, Clone, Parser)]
#[command(name = "carry_check", version)]
pub struct Cli {
    /// Bungie membership type of the account (1 = Xbox, 2 = PlayStation).
    #[arg(long, env = "CARRY_PLATFORM", default_value_t = DEFAULT_PLATFORM)]
    pub platform: i32,

    /// Gamertag / PSN id to check.
    #[arg(long, env = "CARRY_GAMERTAG")]
    pub gamertag: String,

    /// Bungie API key.
    #[arg(long = "api-key", env = "BNETAPI", hide_env_values = true)]
    pub api_key: String,

    /// How many games to check on each character.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=250))]
    pub count: u32,

    /// Per-request timeout for every upstream call.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Worker threads used to fetch opponent stats.
    #[arg(long, env = "FETCH_PARALLELISM")]
    pub parallelism: Option<usize>,

    #[arg(long, default_value_t = 500.0)]
    pub elo_spread: f64,

    #[arg(long, default_value_t = 1.0)]
    pub kdr_spread: f64,

    #[arg(long, default_value_t = 5)]
    pub flawless_low: u32,

    #[arg(long, default_value_t = 20)]
    pub flawless_high: u32,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
            .unwrap_or(DEFAULT_FETCH_PARALLELISM)
            .clamp(2, 32)
    }

    pub fn thresholds(&self) -> HeuristicThresholds {
        HeuristicThresholds {
            elo_spread: self.elo_spread,
            kdr_spread: self.kdr_spread,
            flawless_low: self.flawless_low,
            flawless_high: self.flawless_high,
        }
    }
}
