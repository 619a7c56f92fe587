//! Session runner: plays games back to back and settles each one.
//!
//! NewGame → turns until one is left → settlement (final sale, score log,
//! leaderboard) → next game, for `agent.games_to_play` games.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use super::accountant::{Accountant, GameReport, SessionReport};
use super::executor::Executor;
use super::turn::{play_turn, TurnOutcome};
use crate::config::AppConfig;
use crate::server::GameServer;
use crate::storage;
use crate::strategy::DecisionEngine;
use crate::types::{GameSnapshot, SmugglerError};

pub struct SessionRunner {
    server: Box<dyn GameServer>,
    engine: DecisionEngine,
    rng: StdRng,
    display_name: String,
    games_to_play: u32,
    score_log: String,
    max_stalled_turns: u32,
}

impl SessionRunner {
    pub fn new(server: Box<dyn GameServer>, config: &AppConfig) -> Self {
        let rng = match config.agent.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            server,
            engine: DecisionEngine::new(&config.rules),
            rng,
            display_name: config.agent.name.clone(),
            games_to_play: config.agent.games_to_play,
            score_log: config.agent.score_log.clone(),
            max_stalled_turns: config.agent.max_stalled_turns,
        }
    }

    /// Play every configured game. A failed game is logged and counted;
    /// the session only fails when no game could be played at all.
    pub async fn run(&mut self) -> Result<SessionReport> {
        let mut session = SessionReport::default();
        let mut last_error = None;

        for n in 1..=self.games_to_play {
            info!(game = n, of = self.games_to_play, "Starting game");
            match self.play_game().await {
                Ok(report) => {
                    info!(game = n, report = %report, "Game complete");
                    session.record(report);
                }
                Err(e) => {
                    error!(game = n, error = format!("{e:#}"), "Game failed");
                    session.games_failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if session.games_played() == 0 {
            if let Some(e) = last_error {
                return Err(e.context("Every game in the session failed"));
            }
        }

        info!(summary = %session, "Session complete");
        Ok(session)
    }

    /// Play one game from `new_game` through settlement.
    pub async fn play_game(&mut self) -> Result<GameReport> {
        let initial = self
            .server
            .new_game()
            .await
            .context("Failed to start a new game")?;
        let game_id = initial.game_id.clone().ok_or_else(|| {
            SmugglerError::MalformedResponse("new_game response has no gameId".into())
        })?;
        let mut snapshot = GameSnapshot::from_response(initial)?;
        info!(game_id = %game_id, start = %snapshot, "New game");

        let mut executor = Executor::new(self.server.as_ref(), &game_id);
        let mut turns_played: u32 = 0;
        let mut stalled: u32 = 0;

        let last = loop {
            let (outcome, report) =
                play_turn(&self.engine, &mut executor, snapshot, &mut self.rng).await?;
            turns_played += 1;
            debug!(turn = turns_played, "{report}");

            match outcome {
                TurnOutcome::Travelled { next, .. } => {
                    stalled = 0;
                    snapshot = next;
                }
                TurnOutcome::TravelRefused { next, route } => {
                    stalled += 1;
                    if stalled >= self.max_stalled_turns {
                        return Err(SmugglerError::TravelStalled {
                            planet: next.planet,
                            attempts: stalled,
                        }
                        .into());
                    }
                    warn!(
                        to = %route.destination,
                        attempts = stalled,
                        "Travel refused, replaying turn"
                    );
                    snapshot = next;
                }
                TurnOutcome::Endgame(last) => break last,
            }
        };

        settle(
            self.server.as_ref(),
            &mut executor,
            last,
            turns_played,
            &self.score_log,
            &self.display_name,
        )
        .await
    }
}

/// Sell what is left, record the score and report it to the leaderboard.
///
/// The score log is written before the leaderboard is contacted; a
/// leaderboard failure is logged and does not fail the game.
async fn settle(
    server: &dyn GameServer,
    executor: &mut Executor<'_>,
    mut snapshot: GameSnapshot,
    turns_played: u32,
    score_log: &str,
    display_name: &str,
) -> Result<GameReport> {
    let proceeds = executor.sell_all(&mut snapshot).await?;
    let score = Accountant::score(&snapshot);
    info!(proceeds, score, "Final cargo sold");

    storage::append_score(score, Some(score_log))?;

    let game_id = executor.game_id().to_string();
    let high_score = match server.submit_score(&game_id).await {
        Ok(receipt) if receipt.is_new_high_score() => {
            info!(message = %receipt.message, "High score achieved");
            if let Err(e) = server.update_name(&game_id, display_name).await {
                warn!(error = format!("{e:#}"), "Failed to claim high score name");
            }
            true
        }
        Ok(receipt) => {
            info!(message = %receipt.message, "Score submitted");
            false
        }
        Err(e) => {
            warn!(error = format!("{e:#}"), "Score submission failed");
            false
        }
    };

    Ok(Accountant::close_game(&game_id, &snapshot, turns_played, high_score))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
