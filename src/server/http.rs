//! SkySmuggler HTTP API client.
//!
//! Base URL: https://skysmuggler.com/game/{action}
//! Leaderboard: https://skysmuggler.com/scores/{action}
//! Auth: none. Every game action is keyed by the `gameId` from `new_game`.
//!
//! Mutations are POSTs with a JSON body; a non-2xx status is the game
//! refusing the transaction and comes back as `TxOutcome::Rejected`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use super::{GameServer, ScoreReceipt, TxOutcome};
use crate::config::ServerConfig;
use crate::types::{GameResponse, Intent, SmugglerError};

const USER_AGENT: &str = "SkySmuggler/0.1.0 (trading-agent)";

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Route and JSON body for a transaction.
fn transaction_request(game_id: &str, intent: &Intent) -> (&'static str, Value) {
    let counted = |side: &str, qty: u64| {
        json!({
            "gameId": game_id,
            "transaction": { "side": side, "qty": qty },
        })
    };

    match *intent {
        Intent::Sell { kind, quantity } => {
            ("trade", trade_body(game_id, "sell", kind.as_str(), quantity))
        }
        Intent::Buy { kind, quantity } => {
            ("trade", trade_body(game_id, "buy", kind.as_str(), quantity))
        }
        Intent::BuyBays { quantity } => ("shipyard", counted("buy", quantity)),
        Intent::BuyFuel { quantity } => ("fueldepot", counted("buy", quantity)),
        Intent::RepayLoan { amount } => ("loanshark", counted("repay", amount)),
        Intent::Deposit { amount } => ("bank", counted("deposit", amount)),
        Intent::Withdraw { amount } => ("bank", counted("withdraw", amount)),
        Intent::Travel { to } => (
            "travel",
            json!({ "gameId": game_id, "toPlanet": to.as_str() }),
        ),
    }
}

/// Trades key the quantity by cargo name.
fn trade_body(game_id: &str, side: &str, cargo: &str, quantity: u64) -> Value {
    let mut transaction = Map::new();
    transaction.insert("side".into(), Value::from(side));
    transaction.insert(cargo.into(), Value::from(quantity));
    json!({ "gameId": game_id, "transaction": transaction })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HttpGameServer {
    http: Client,
    game_url: String,
    scores_url: String,
}

impl HttpGameServer {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for the game server")?;

        Ok(Self {
            http,
            game_url: config.game_url.trim_end_matches('/').to_string(),
            scores_url: config.scores_url.trim_end_matches('/').to_string(),
        })
    }

    fn game_endpoint(&self, action: &str) -> String {
        format!("{}/{action}", self.game_url)
    }

    fn scores_endpoint(&self, action: &str) -> String {
        format!("{}/{action}", self.scores_url)
    }

    /// Fail with `SmugglerError::Server` unless the status is 2xx.
    async fn require_success(route: &str, resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(SmugglerError::Server {
            route: route.to_string(),
            status,
            message,
        }
        .into())
    }

    async fn get_game(&self, action: &str, query: &[(&str, &str)]) -> Result<GameResponse> {
        let url = self.game_endpoint(action);
        debug!(url = %url, "GET game endpoint");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Game server request failed: {action}"))?;
        let resp = Self::require_success(action, resp).await?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse {action} response"))
    }

    async fn post_scores(&self, action: &str, body: &Value) -> Result<Response> {
        let url = self.scores_endpoint(action);
        debug!(url = %url, body = %body, "POST scores endpoint");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Scores request failed: {action}"))?;
        Self::require_success(action, resp).await
    }
}

// ---------------------------------------------------------------------------
// GameServer trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl GameServer for HttpGameServer {
    async fn new_game(&self) -> Result<GameResponse> {
        self.get_game("new_game", &[]).await
    }

    async fn fetch_state(&self, game_id: &str) -> Result<GameResponse> {
        self.get_game("game_state", &[("gameId", game_id)]).await
    }

    async fn submit(&self, game_id: &str, intent: &Intent) -> Result<TxOutcome> {
        let (action, body) = transaction_request(game_id, intent);
        let url = self.game_endpoint(action);
        debug!(url = %url, body = %body, "Submitting transaction");

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Game server request failed: {action}"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let reason = resp.text().await.unwrap_or_default();
            return Ok(TxOutcome::Rejected { status, reason });
        }

        let response: GameResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse {action} response"))?;
        Ok(TxOutcome::Accepted(response))
    }

    async fn submit_score(&self, game_id: &str) -> Result<ScoreReceipt> {
        let resp = self
            .post_scores("submit", &json!({ "gameId": game_id }))
            .await?;
        resp.json()
            .await
            .context("Failed to parse score submission response")
    }

    async fn update_name(&self, game_id: &str, name: &str) -> Result<()> {
        self.post_scores("update_name", &json!({ "newName": name, "gameId": game_id }))
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
