pub mod aggregator;
pub mod bungie;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod guardian;
pub mod heuristics;
pub mod history;
pub mod http_client;
pub mod model;
pub mod report;
pub mod roster;
pub mod services;
pub mod stats_cache;
pub mod trials_report;
