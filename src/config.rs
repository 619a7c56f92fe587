//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the path in `SKYSMUGGLER_CONFIG`) into
//! strongly-typed structs. Every field has a default, so a partial file or
//! no file at all yields the reference behaviour.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::storage::DEFAULT_SCORE_LOG;
use crate::strategy::rules::GameRules;
use crate::types::SmugglerError;

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "SKYSMUGGLER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub server: ServerConfig,
    pub rules: GameRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Leaderboard display name claimed on a new high score.
    pub name: String,
    pub games_to_play: u32,
    /// Append-only file receiving one score per finished game.
    pub score_log: String,
    /// Seed for destination picks. Entropy when absent.
    pub seed: Option<u64>,
    /// Consecutive rejected travels before a game is abandoned.
    pub max_stalled_turns: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "El Capitan".into(),
            games_to_play: 1,
            score_log: DEFAULT_SCORE_LOG.into(),
            seed: None,
            max_stalled_turns: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub game_url: String,
    pub scores_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            game_url: "https://skysmuggler.com/game".into(),
            scores_url: "https://skysmuggler.com/scores".into(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Like `load`, but a missing file means the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Config path from the environment, else `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn validate(&self) -> Result<(), SmugglerError> {
        self.rules.validate()?;
        if self.agent.max_stalled_turns == 0 {
            return Err(SmugglerError::Config(
                "agent.max_stalled_turns must be positive".into(),
            ));
        }
        if self.server.timeout_secs == 0 {
            return Err(SmugglerError::Config(
                "server.timeout_secs must be positive".into(),
            ));
        }
        if self.agent.score_log.trim().is_empty() {
            return Err(SmugglerError::Config("agent.score_log is empty".into()));
        }
        Ok(())
    }
}
