//! Game server integration.
//!
//! Defines the `GameServer` trait the engine drives, and the HTTP
//! implementation talking to the public SkySmuggler API.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{GameResponse, Intent};

/// Result of submitting one transaction.
#[derive(Debug, Clone)]
pub enum TxOutcome {
    /// The server applied the transaction and returned the new state.
    Accepted(GameResponse),
    /// The server refused it (insufficient credits, full hold, bad planet).
    Rejected { status: u16, reason: String },
}

/// Leaderboard response to a score submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScoreReceipt {
    #[serde(default)]
    pub message: String,
}

impl ScoreReceipt {
    /// The leaderboard flags a new high score with a message containing "New".
    pub fn is_new_high_score(&self) -> bool {
        self.message.contains("New")
    }
}

/// Abstraction over the remote game.
///
/// Transport and parse failures are errors; a transaction the game refuses
/// is a `TxOutcome::Rejected`, which the executor reconciles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameServer: Send + Sync {
    /// Start a fresh game. The response carries the game id.
    async fn new_game(&self) -> Result<GameResponse>;

    /// Authoritative state of a running game. May omit the market.
    async fn fetch_state(&self, game_id: &str) -> Result<GameResponse>;

    /// Submit a trade, purchase, bank, loan or travel transaction.
    async fn submit(&self, game_id: &str, intent: &Intent) -> Result<TxOutcome>;

    /// Post the finished game to the leaderboard.
    async fn submit_score(&self, game_id: &str) -> Result<ScoreReceipt>;

    /// Attach a display name to a leaderboard entry.
    async fn update_name(&self, game_id: &str, name: &str) -> Result<()>;
}
