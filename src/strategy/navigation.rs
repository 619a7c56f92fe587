//! Destination selection.
//!
//! Planets that cannot buy something in the hold are never candidates.
//! Among the rest, the first matching rule wins, in strict priority:
//! debt, capacity, banking, fuel, then a random pick that avoids the loan
//! shark and the bank.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use super::rules::{BannedCargo, Landmarks};
use crate::types::{GameSnapshot, Hold, Planet};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Head for the loan shark once fewer turns than this remain.
    pub loan_turns_below: u32,
    /// Bank visits happen while turns left is strictly inside
    /// (`bank_turns_above`, `bank_turns_below`).
    pub bank_turns_above: u32,
    pub bank_turns_below: u32,
    /// Head for the fuel depot once fewer turns than this remain.
    pub fuel_turns_below: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            loan_turns_below: 18,
            bank_turns_above: 2,
            bank_turns_below: 16,
            fuel_turns_below: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// Which rule picked the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteReason {
    RepayLoan,
    BuyBays,
    Bank,
    BuyFuel,
    Explore,
}

impl fmt::Display for RouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteReason::RepayLoan => write!(f, "repay loan"),
            RouteReason::BuyBays => write!(f, "buy bays"),
            RouteReason::Bank => write!(f, "bank"),
            RouteReason::BuyFuel => write!(f, "buy fuel"),
            RouteReason::Explore => write!(f, "explore"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub destination: Planet,
    pub reason: RouteReason,
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

pub struct Navigator {
    config: NavigationConfig,
    landmarks: Landmarks,
    banned: BannedCargo,
    max_bays: u64,
}

impl Navigator {
    pub fn new(
        config: NavigationConfig,
        landmarks: Landmarks,
        banned: BannedCargo,
        max_bays: u64,
    ) -> Self {
        Self {
            config,
            landmarks,
            banned,
            max_bays,
        }
    }

    /// Every planet except the current one and those banning held cargo.
    pub fn candidates(&self, current: Planet, hold: &Hold) -> Vec<Planet> {
        let closed: Vec<Planet> = hold
            .held()
            .filter_map(|(kind, _)| self.banned.planet_banning(kind))
            .collect();
        Planet::ALL
            .into_iter()
            .filter(|planet| *planet != current && !closed.contains(planet))
            .collect()
    }

    /// Pick the next destination. `None` only when the hold bans every
    /// other planet.
    pub fn choose<R: Rng + ?Sized>(&self, snapshot: &GameSnapshot, rng: &mut R) -> Option<Route> {
        let candidates = self.candidates(snapshot.planet, &snapshot.hold);
        let has = |planet: Planet| candidates.contains(&planet);
        let turns = snapshot.turns_left;
        let cfg = &self.config;
        let lm = &self.landmarks;

        let route = |destination, reason| Some(Route { destination, reason });

        let chosen = if snapshot.loan_balance > 0
            && turns < cfg.loan_turns_below
            && has(lm.loan_market)
        {
            route(lm.loan_market, RouteReason::RepayLoan)
        } else if has(lm.bay_market) && snapshot.total_bays < self.max_bays {
            route(lm.bay_market, RouteReason::BuyBays)
        } else if has(lm.bank) && cfg.bank_turns_above < turns && turns < cfg.bank_turns_below {
            route(lm.bank, RouteReason::Bank)
        } else if has(lm.fuel_market) && turns < cfg.fuel_turns_below {
            route(lm.fuel_market, RouteReason::BuyFuel)
        } else {
            let explore: Vec<Planet> = candidates
                .iter()
                .copied()
                .filter(|p| *p != lm.loan_market && *p != lm.bank)
                .collect();
            let pool = if explore.is_empty() {
                &candidates
            } else {
                &explore
            };
            pool.choose(rng)
                .and_then(|planet| route(*planet, RouteReason::Explore))
        };

        debug!(
            from = %snapshot.planet,
            candidates = ?candidates,
            chosen = ?chosen,
            "Destination chosen"
        );
        chosen
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
