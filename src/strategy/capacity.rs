//! Capacity purchases: cargo bays at the shipyard and fuel cells (extra
//! turns) at the fuel depot.

use serde::Deserialize;
use tracing::debug;

use super::market::CargoOrder;
use crate::types::{GameSnapshot, Intent, Planet};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BayConfig {
    /// Credits per bay.
    pub cost: u64,
    /// Hard cap on bays owned.
    pub max_bays: u64,
    /// Credits that must be on hand before buying bays.
    pub surplus_credits: u64,
    /// Bays are only bought while more than this many turns remain.
    pub min_turns_left: u32,
}

impl Default for BayConfig {
    fn default() -> Self {
        Self {
            cost: 800,
            max_bays: 1_000,
            surplus_credits: 1_600,
            min_turns_left: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    /// Fuel is only bought when fewer turns than this remain.
    pub max_turns_left: u32,
    /// Lifetime cap on fuel purchases per game.
    pub max_purchases: u32,
    /// Fuel cells per purchase.
    pub cells_per_purchase: u64,
    /// Turns granted by each fuel cell.
    pub turns_per_cell: u32,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            max_turns_left: 5,
            max_purchases: 8,
            cells_per_purchase: 5,
            turns_per_cell: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Bays
// ---------------------------------------------------------------------------

pub struct BayPolicy {
    config: BayConfig,
    bay_market: Planet,
}

impl BayPolicy {
    pub fn new(config: BayConfig, bay_market: Planet) -> Self {
        Self { config, bay_market }
    }

    /// At the shipyard and still under the bay cap.
    pub fn can_buy(&self, planet: Planet, total_bays: u64) -> bool {
        planet == self.bay_market && total_bays < self.config.max_bays
    }

    /// Enough turns left to use the bays, cargo was chosen this turn, and
    /// credits above the surplus threshold.
    pub fn should_buy(&self, turns_left: u32, has_cargo_order: bool, credits: u64) -> bool {
        turns_left > self.config.min_turns_left
            && has_cargo_order
            && credits > self.config.surplus_credits
    }

    /// Half of the bays the credits could pay for, clamped to the cap.
    pub fn quantity(&self, credits: u64, total_bays: u64) -> u64 {
        let potential = (credits / self.config.cost) / 2;
        if total_bays + potential <= self.config.max_bays {
            potential
        } else {
            self.config.max_bays.saturating_sub(total_bays)
        }
    }

    /// Bay purchase for this turn, if any.
    pub fn plan(&self, snapshot: &GameSnapshot, order: Option<&CargoOrder>) -> Option<Intent> {
        if !self.can_buy(snapshot.planet, snapshot.total_bays) {
            return None;
        }
        if !self.should_buy(snapshot.turns_left, order.is_some(), snapshot.credits) {
            debug!(
                turns_left = snapshot.turns_left,
                credits = snapshot.credits,
                "Bay purchase not worthwhile"
            );
            return None;
        }
        match self.quantity(snapshot.credits, snapshot.total_bays) {
            0 => None,
            quantity => Some(Intent::BuyBays { quantity }),
        }
    }
}

// ---------------------------------------------------------------------------
// Fuel
// ---------------------------------------------------------------------------

pub struct FuelPolicy {
    config: FuelConfig,
    fuel_market: Planet,
}

impl FuelPolicy {
    pub fn new(config: FuelConfig, fuel_market: Planet) -> Self {
        Self {
            config,
            fuel_market,
        }
    }

    pub fn should_buy(&self, planet: Planet, turns_left: u32, fuel_purchases: u32) -> bool {
        planet == self.fuel_market
            && turns_left < self.config.max_turns_left
            && fuel_purchases < self.config.max_purchases
    }

    pub fn plan(&self, snapshot: &GameSnapshot) -> Option<Intent> {
        self.should_buy(snapshot.planet, snapshot.turns_left, snapshot.fuel_purchases)
            .then_some(Intent::BuyFuel {
                quantity: self.config.cells_per_purchase,
            })
    }

    /// Turns granted by `cells` fuel cells.
    pub fn turns_granted(&self, cells: u64) -> u32 {
        (cells as u32).saturating_mul(self.config.turns_per_cell)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
