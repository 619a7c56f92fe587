//! Transaction executor.
//!
//! Submits intents to the game server one at a time and folds the server's
//! answer back into the turn's `GameSnapshot`. Only the fields a
//! transaction can touch are folded; the market stays as it was on arrival.
//!
//! A rejected transaction is reconciled: the executor re-fetches the
//! authoritative state, logs a diagnostic dump, folds the same fields from
//! it and treats the action as not having happened.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::server::{GameServer, TxOutcome};
use crate::types::{GameSnapshot, GameState, Intent, Planet};

// ---------------------------------------------------------------------------
// Execution result
// ---------------------------------------------------------------------------

/// Transactions submitted since the last `take_report`.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub executed: Vec<Intent>,
    pub rejected: Vec<RejectedTx>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTx {
    pub intent: Intent,
    pub status: u16,
    pub reason: String,
}

/// Where a travel attempt left the ship.
#[derive(Debug, Clone)]
pub enum TravelOutcome {
    /// Arrived; the snapshot is the destination's first view.
    Arrived(GameSnapshot),
    /// Refused; the snapshot is the re-fetched state at the same planet.
    Refused(GameSnapshot),
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

pub struct Executor<'a> {
    server: &'a dyn GameServer,
    game_id: &'a str,
    report: ExecutionReport,
}

impl<'a> Executor<'a> {
    pub fn new(server: &'a dyn GameServer, game_id: &'a str) -> Self {
        Self {
            server,
            game_id,
            report: ExecutionReport::default(),
        }
    }

    pub fn game_id(&self) -> &str {
        self.game_id
    }

    /// Hand over the transactions recorded so far and start a fresh report.
    pub fn take_report(&mut self) -> ExecutionReport {
        std::mem::take(&mut self.report)
    }

    /// Submit a non-travel intent and fold the result into `snapshot`.
    ///
    /// Returns whether the server accepted it. Zero-quantity intents are
    /// never sent and count as not accepted.
    pub async fn execute(&mut self, snapshot: &mut GameSnapshot, intent: Intent) -> Result<bool> {
        if let Intent::Travel { to } = intent {
            anyhow::bail!("travel to {to} must go through Executor::travel");
        }
        if amount_of(&intent) == 0 {
            debug!(intent = %intent, "Skipping zero-quantity transaction");
            return Ok(false);
        }

        debug!(game_id = self.game_id, intent = %intent, "Executing");
        let outcome = self
            .server
            .submit(self.game_id, &intent)
            .await
            .with_context(|| format!("Failed to submit: {intent}"))?;

        match outcome {
            TxOutcome::Accepted(response) => {
                fold(snapshot, &intent, &response.game_state);
                info!(intent = %intent, credits = snapshot.credits, "Transaction accepted");
                self.report.executed.push(intent);
                Ok(true)
            }
            TxOutcome::Rejected { status, reason } => {
                let state = self.reconcile(&intent, status, &reason).await?;
                fold(snapshot, &intent, &state);
                self.report.rejected.push(RejectedTx {
                    intent,
                    status,
                    reason,
                });
                Ok(false)
            }
        }
    }

    /// Sell every held kind that has a listed price here. Returns the
    /// credits gained.
    pub async fn sell_all(&mut self, snapshot: &mut GameSnapshot) -> Result<u64> {
        let before = snapshot.credits;
        let held: Vec<_> = snapshot.hold.held().collect();

        for (kind, quantity) in held {
            if snapshot.market.price(kind).is_none() {
                debug!(
                    cargo = %kind,
                    quantity,
                    planet = %snapshot.planet,
                    "Not traded here, keeping"
                );
                continue;
            }
            self.execute(snapshot, Intent::Sell { kind, quantity }).await?;
        }

        Ok(snapshot.credits.saturating_sub(before))
    }

    /// Fly to `to`. A refusal is reconciled into a fresh snapshot of the
    /// current planet, keeping the arrival market if the server omits it.
    pub async fn travel(&mut self, snapshot: &GameSnapshot, to: Planet) -> Result<TravelOutcome> {
        let intent = Intent::Travel { to };
        debug!(game_id = self.game_id, from = %snapshot.planet, to = %to, "Travelling");

        let outcome = self
            .server
            .submit(self.game_id, &intent)
            .await
            .with_context(|| format!("Failed to submit: {intent}"))?;

        match outcome {
            TxOutcome::Accepted(response) => {
                let next = GameSnapshot::from_response(response)?;
                self.report.executed.push(intent);
                Ok(TravelOutcome::Arrived(next))
            }
            TxOutcome::Rejected { status, reason } => {
                let response = self
                    .server
                    .fetch_state(self.game_id)
                    .await
                    .context("Failed to fetch state after rejected travel")?;
                let next = GameSnapshot::from_response_or(response, &snapshot.market);
                warn!(
                    intent = %intent,
                    status,
                    reason = %reason,
                    planet = %next.planet,
                    credits = next.credits,
                    hold = %next.hold,
                    "Travel rejected"
                );
                self.report.rejected.push(RejectedTx {
                    intent,
                    status,
                    reason,
                });
                Ok(TravelOutcome::Refused(next))
            }
        }
    }

    async fn reconcile(&self, intent: &Intent, status: u16, reason: &str) -> Result<GameState> {
        let response = self
            .server
            .fetch_state(self.game_id)
            .await
            .with_context(|| format!("Failed to fetch state after rejected {intent}"))?;
        let state = response.game_state;

        warn!(
            intent = %intent,
            status,
            reason = %reason,
            planet = %state.planet,
            credits = state.credits,
            used_bays = state.used_bays,
            total_bays = state.total_bays,
            bank = state.bank_balance,
            loan = state.loan_balance,
            hold = %state.current_hold,
            "Transaction rejected, reconciled from server state"
        );
        Ok(state)
    }
}

/// Quantity or credit amount carried by an intent.
fn amount_of(intent: &Intent) -> u64 {
    match *intent {
        Intent::Sell { quantity, .. }
        | Intent::Buy { quantity, .. }
        | Intent::BuyBays { quantity }
        | Intent::BuyFuel { quantity } => quantity,
        Intent::RepayLoan { amount } | Intent::Deposit { amount } | Intent::Withdraw { amount } => {
            amount
        }
        Intent::Travel { .. } => 1,
    }
}

/// Copy the fields `intent` can change from `state` into `snapshot`.
///
/// Fuel only folds credits; the turn adds the granted turns itself.
fn fold(snapshot: &mut GameSnapshot, intent: &Intent, state: &GameState) {
    snapshot.credits = state.credits;
    match intent {
        Intent::Sell { .. } | Intent::Buy { .. } => {
            snapshot.hold = state.current_hold.clone();
            snapshot.used_bays = state.used_bays;
        }
        Intent::BuyBays { .. } => {
            snapshot.total_bays = state.total_bays;
            snapshot.used_bays = state.used_bays;
        }
        Intent::RepayLoan { .. } => snapshot.loan_balance = state.loan_balance,
        Intent::Deposit { .. } | Intent::Withdraw { .. } => {
            snapshot.bank_balance = state.bank_balance
        }
        Intent::BuyFuel { .. } | Intent::Travel { .. } => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
