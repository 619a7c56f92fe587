//! One game turn.
//!
//! The order is fixed: sell, fuel, loan, withdraw, buy cargo, deposit,
//! bays (and a second cargo buy into the new bays), then travel or hand
//! over to settlement when the last turn is reached.

use anyhow::Result;
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

use super::executor::{ExecutionReport, Executor, TravelOutcome};
use crate::strategy::navigation::Route;
use crate::strategy::DecisionEngine;
use crate::types::{CargoKind, GameSnapshot, Intent, Planet, SmugglerError};

/// How a turn ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Travel succeeded; play the next turn from this snapshot.
    Travelled { next: GameSnapshot, route: Route },
    /// Travel was refused; replay from the re-fetched snapshot.
    TravelRefused { next: GameSnapshot, route: Route },
    /// No turns left to travel; settle the game from this snapshot.
    Endgame(GameSnapshot),
}

/// What happened during a turn, for the turn log.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub planet: Planet,
    pub turns_left: u32,
    pub credits: u64,
    pub low_cargo: Option<CargoKind>,
    pub sale_proceeds: u64,
    pub transactions: ExecutionReport,
}

impl fmt::Display for TurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | turns={} credits={} sold_for={}",
            self.planet, self.turns_left, self.credits, self.sale_proceeds
        )?;
        if let Some(kind) = self.low_cargo {
            write!(f, " low={kind}")?;
        }
        for intent in &self.transactions.executed {
            write!(f, "\n  + {intent}")?;
        }
        for rejected in &self.transactions.rejected {
            write!(f, "\n  ! {} ({})", rejected.intent, rejected.status)?;
        }
        Ok(())
    }
}

/// Play the turn starting at `snapshot`.
pub async fn play_turn<R: Rng + ?Sized>(
    engine: &DecisionEngine,
    executor: &mut Executor<'_>,
    mut snapshot: GameSnapshot,
    rng: &mut R,
) -> Result<(TurnOutcome, TurnReport)> {
    debug!(game_id = executor.game_id(), snapshot = %snapshot, "Turn start");

    let low_cargo = engine.low_market(&snapshot);

    let sale_proceeds = executor.sell_all(&mut snapshot).await?;

    if let Some(intent) = engine.fuel_purchase(&snapshot) {
        if executor.execute(&mut snapshot, intent).await? {
            if let Intent::BuyFuel { quantity } = intent {
                snapshot.turns_left += engine.fuel_turns(quantity);
                snapshot.fuel_purchases += 1;
            }
        }
    }

    if let Some(intent) = engine.loan_repayment(&snapshot, low_cargo) {
        executor.execute(&mut snapshot, intent).await?;
    }

    let withdrew = match engine.bank_withdrawal(&snapshot) {
        Some(intent) => executor.execute(&mut snapshot, intent).await?,
        None => false,
    };

    let order = engine.cargo_order(&snapshot);
    if let Some(order) = &order {
        executor.execute(&mut snapshot, order.intent()).await?;
    }

    if let Some(intent) = engine.bank_deposit(&snapshot, withdrew) {
        executor.execute(&mut snapshot, intent).await?;
    }

    if let Some(intent) = engine.bay_purchase(&snapshot, order.as_ref()) {
        if executor.execute(&mut snapshot, intent).await? {
            if let Some(refill) = engine.cargo_order(&snapshot) {
                executor.execute(&mut snapshot, refill.intent()).await?;
            }
        }
    }

    let mut report = TurnReport {
        planet: snapshot.planet,
        turns_left: snapshot.turns_left,
        credits: snapshot.credits,
        low_cargo,
        sale_proceeds,
        transactions: executor.take_report(),
    };
    info!(
        planet = %report.planet,
        turns_left = report.turns_left,
        credits = report.credits,
        loan = snapshot.loan_balance,
        bank = snapshot.bank_balance,
        bays = format!("{}/{}", snapshot.used_bays, snapshot.total_bays),
        hold = %snapshot.hold,
        executed = report.transactions.executed.len(),
        rejected = report.transactions.rejected.len(),
        "Turn complete"
    );

    if snapshot.turns_left <= 1 {
        return Ok((TurnOutcome::Endgame(snapshot), report));
    }

    let route = engine
        .destination(&snapshot, rng)
        .ok_or_else(|| SmugglerError::NoDestination {
            planet: snapshot.planet,
            hold: snapshot.hold.clone(),
        })?;
    info!(to = %route.destination, reason = %route.reason, "Travelling");

    let outcome = match executor.travel(&snapshot, route.destination).await? {
        TravelOutcome::Arrived(next) => TurnOutcome::Travelled { next, route },
        TravelOutcome::Refused(next) => TurnOutcome::TravelRefused { next, route },
    };
    let travel = executor.take_report();
    report.transactions.executed.extend(travel.executed);
    report.transactions.rejected.extend(travel.rejected);

    Ok((outcome, report))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
