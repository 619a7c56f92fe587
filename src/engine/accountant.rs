//! Accountant: final scoring and game/session reports.
//!
//! The score of a game is what the captain walks away with: credits plus
//! the bank balance minus whatever is still owed to the loan shark.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

use crate::types::GameSnapshot;

// ---------------------------------------------------------------------------
// Game report
// ---------------------------------------------------------------------------

/// Outcome of one settled game.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub game_id: String,
    pub score: i64,
    pub credits: u64,
    pub bank_balance: u64,
    pub loan_balance: u64,
    pub turns_played: u32,
    pub high_score: bool,
    pub finished_at: DateTime<Utc>,
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game {} | score={} credits={} bank={} loan={} turns={}{}",
            self.game_id,
            self.score,
            self.credits,
            self.bank_balance,
            self.loan_balance,
            self.turns_played,
            if self.high_score { " [HIGH SCORE]" } else { "" },
        )
    }
}

// ---------------------------------------------------------------------------
// Session report
// ---------------------------------------------------------------------------

/// Aggregate over every game a session played.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub games: Vec<GameReport>,
    pub games_failed: u32,
}

impl SessionReport {
    pub fn record(&mut self, game: GameReport) {
        self.games.push(game);
    }

    pub fn games_played(&self) -> usize {
        self.games.len()
    }

    pub fn best_score(&self) -> Option<i64> {
        self.games.iter().map(|g| g.score).max()
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.games.is_empty() {
            return None;
        }
        let total: i64 = self.games.iter().map(|g| g.score).sum();
        Some(total as f64 / self.games.len() as f64)
    }

    pub fn high_scores(&self) -> usize {
        self.games.iter().filter(|g| g.high_score).count()
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games played, {} failed",
            self.games_played(),
            self.games_failed
        )?;
        if let (Some(best), Some(mean)) = (self.best_score(), self.mean_score()) {
            write!(f, " | best={best} mean={mean:.0}")?;
        }
        if self.high_scores() > 0 {
            write!(f, " | {} high score(s)", self.high_scores())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Accountant
// ---------------------------------------------------------------------------

pub struct Accountant;

impl Accountant {
    /// Credits plus bank minus loan.
    pub fn score(snapshot: &GameSnapshot) -> i64 {
        snapshot.net_worth()
    }

    /// Close the books on a finished game.
    pub fn close_game(
        game_id: &str,
        snapshot: &GameSnapshot,
        turns_played: u32,
        high_score: bool,
    ) -> GameReport {
        let report = GameReport {
            game_id: game_id.to_string(),
            score: Self::score(snapshot),
            credits: snapshot.credits,
            bank_balance: snapshot.bank_balance,
            loan_balance: snapshot.loan_balance,
            turns_played,
            high_score,
            finished_at: Utc::now(),
        };

        info!(
            game_id = %report.game_id,
            score = report.score,
            credits = report.credits,
            bank = report.bank_balance,
            loan = report.loan_balance,
            turns = report.turns_played,
            high_score = report.high_score,
            "Game settled"
        );

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
