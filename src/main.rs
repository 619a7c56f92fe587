//! SkySmuggler: autonomous trading agent for the SkySmuggler space-trader game.
//!
//! Entry point. Loads configuration, initialises structured logging and
//! plays the configured number of games against the live server.

use anyhow::Result;
use tracing::{info, warn};

use skysmuggler::config::AppConfig;
use skysmuggler::engine::session::SessionRunner;
use skysmuggler::server::http::HttpGameServer;
use skysmuggler::storage;

const BANNER: &str = r#"
  ____  _          ____                              _
 / ___|| | ___   _/ ___| _ __ ___  _   _  __ _  __ _| | ___ _ __
 \___ \| |/ / | | \___ \| '_ ` _ \| | | |/ _` |/ _` | |/ _ \ '__|
  ___) |   <| |_| |___) | | | | | | |_| | (_| | (_| | |  __/ |
 |____/|_|\_\\__, |____/|_| |_| |_|\__,_|\__, |\__, |_|\___|_|
             |___/                       |___/ |___/
  v0.1.0 - Autopilot
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = AppConfig::path_from_env();
    let cfg = AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        config = %config_path,
        captain = %cfg.agent.name,
        games = cfg.agent.games_to_play,
        cargo_policy = ?cfg.rules.cargo_policy,
        seed = ?cfg.agent.seed,
        game_url = %cfg.server.game_url,
        "SkySmuggler starting up"
    );

    match storage::read_scores(Some(&cfg.agent.score_log)) {
        Ok(scores) if !scores.is_empty() => info!(
            recorded = scores.len(),
            best = scores.iter().max().copied().unwrap_or_default(),
            "Score log history"
        ),
        Ok(_) => {}
        Err(e) => warn!(error = format!("{e:#}"), "Could not read score log"),
    }

    let server = HttpGameServer::new(&cfg.server)?;
    let mut runner = SessionRunner::new(Box::new(server), &cfg);
    let report = runner.run().await?;

    info!(
        played = report.games_played(),
        failed = report.games_failed,
        best = ?report.best_score(),
        mean = ?report.mean_score().map(|m| format!("{m:.0}")),
        "SkySmuggler shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("skysmuggler=info"));

    let json_logging = std::env::var("SKYSMUGGLER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
