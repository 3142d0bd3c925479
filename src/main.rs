use std::io;

use anyhow::Result;
use clap::Parser;

use carry_check::aggregator::StatsAggregator;
use carry_check::bungie::BungieClient;
use carry_check::config::Cli;
use carry_check::evaluator::MatchEvaluator;
use carry_check::guardian::GuardianGgClient;
use carry_check::heuristics::CarryHeuristicEngine;
use carry_check::history::collect_matches;
use carry_check::http_client::init_http_client;
use carry_check::report::TextReport;
use carry_check::stats_cache::StatsCache;
use carry_check::trials_report::TrialsReportClient;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so the report on stdout stays clean.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let client = init_http_client(cli.timeout())?.clone();
    let bungie = BungieClient::new(client.clone(), cli.api_key.clone());
    let guardian = GuardianGgClient::new(client.clone());
    let trials = TrialsReportClient::new(client);

    let matches = collect_matches(&bungie, &bungie, &cli.gamertag, cli.platform, cli.count)?;
    tracing::info!(matches = matches.len(), "evaluating matches");

    let cache = StatsCache::new();
    let engine = CarryHeuristicEngine::with_thresholds(cli.thresholds());
    let aggregator = StatsAggregator::new(&guardian, &trials, &cache);
    let evaluator =
        MatchEvaluator::new(&bungie, aggregator, &engine).with_parallelism(cli.parallelism());

    let stdout = io::stdout();
    let mut report = TextReport::new(stdout.lock());
    let summary = evaluator.evaluate(&matches, &mut report)?;
    report.write_summary(&summary)?;

    Ok(())
}
