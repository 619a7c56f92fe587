//! Static game rules.
//!
//! Price tables, the planet ban map, the designated market planets and
//! every policy threshold. Loaded once from `config.toml` (each field
//! defaults to the reference value) and handed to `DecisionEngine::new`.

use serde::Deserialize;
use std::collections::HashSet;

use super::capacity::{BayConfig, FuelConfig};
use super::finance::BankConfig;
use super::market::{CargoPolicy, DiscountConfig};
use super::navigation::NavigationConfig;
use crate::types::{CargoKind, Planet, SmugglerError};

// ---------------------------------------------------------------------------
// Per-cargo tables
// ---------------------------------------------------------------------------

/// One value per cargo kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PerCargo<T> {
    pub mining: T,
    pub medical: T,
    pub narcotics: T,
    pub weapons: T,
    pub water: T,
    pub metal: T,
}

impl<T: Copy> PerCargo<T> {
    pub fn get(&self, kind: CargoKind) -> T {
        match kind {
            CargoKind::Mining => self.mining,
            CargoKind::Medical => self.medical,
            CargoKind::Narcotics => self.narcotics,
            CargoKind::Weapons => self.weapons,
            CargoKind::Water => self.water,
            CargoKind::Metal => self.metal,
        }
    }
}

/// Credits per unit of cargo.
pub type PriceTable = PerCargo<u64>;

impl PriceTable {
    /// Long-run average price of each cargo.
    pub fn average_defaults() -> Self {
        Self {
            mining: 2_150,
            medical: 3_650,
            narcotics: 40_000,
            weapons: 70_000,
            water: 17_500,
            metal: 700,
        }
    }

    /// Price floor; anything listed below it is a low-market event.
    pub fn minimum_defaults() -> Self {
        Self {
            mining: 1_500,
            medical: 1_800,
            narcotics: 20_000,
            weapons: 50_000,
            water: 14_000,
            metal: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// Planets
// ---------------------------------------------------------------------------

/// The cargo each planet refuses to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BannedCargo {
    pub pertia: CargoKind,
    pub earth: CargoKind,
    pub taspra: CargoKind,
    pub caliban: CargoKind,
    pub umbriel: CargoKind,
    pub setebos: CargoKind,
}

impl Default for BannedCargo {
    fn default() -> Self {
        Self {
            pertia: CargoKind::Metal,
            earth: CargoKind::Narcotics,
            taspra: CargoKind::Medical,
            caliban: CargoKind::Mining,
            umbriel: CargoKind::Weapons,
            setebos: CargoKind::Water,
        }
    }
}

impl BannedCargo {
    pub fn banned_at(&self, planet: Planet) -> CargoKind {
        match planet {
            Planet::Pertia => self.pertia,
            Planet::Earth => self.earth,
            Planet::Taspra => self.taspra,
            Planet::Caliban => self.caliban,
            Planet::Umbriel => self.umbriel,
            Planet::Setebos => self.setebos,
        }
    }

    /// The planet that will not buy `kind`.
    pub fn planet_banning(&self, kind: CargoKind) -> Option<Planet> {
        Planet::ALL
            .into_iter()
            .find(|planet| self.banned_at(*planet) == kind)
    }
}

/// Planets hosting the shipyard, fuel depot, loan shark and bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    pub bay_market: Planet,
    pub fuel_market: Planet,
    pub loan_market: Planet,
    pub bank: Planet,
}

impl Default for Landmarks {
    fn default() -> Self {
        Self {
            bay_market: Planet::Taspra,
            fuel_market: Planet::Pertia,
            loan_market: Planet::Umbriel,
            bank: Planet::Earth,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Every constant the decision engine reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub cargo_policy: CargoPolicy,
    pub average_prices: PriceTable,
    pub minimum_prices: PriceTable,
    pub banned_cargo: BannedCargo,
    pub landmarks: Landmarks,
    pub bays: BayConfig,
    pub fuel: FuelConfig,
    pub bank: BankConfig,
    pub navigation: NavigationConfig,
    pub discount: DiscountConfig,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            cargo_policy: CargoPolicy::default(),
            average_prices: PriceTable::average_defaults(),
            minimum_prices: PriceTable::minimum_defaults(),
            banned_cargo: BannedCargo::default(),
            landmarks: Landmarks::default(),
            bays: BayConfig::default(),
            fuel: FuelConfig::default(),
            bank: BankConfig::default(),
            navigation: NavigationConfig::default(),
            discount: DiscountConfig::default(),
        }
    }
}

impl GameRules {
    /// Reject rule sets the engine cannot run on.
    pub fn validate(&self) -> Result<(), SmugglerError> {
        let banned: HashSet<CargoKind> = Planet::ALL
            .into_iter()
            .map(|planet| self.banned_cargo.banned_at(planet))
            .collect();
        if banned.len() != CargoKind::ALL.len() {
            return Err(SmugglerError::Config(
                "banned_cargo must map each planet to a different cargo kind".into(),
            ));
        }

        for kind in CargoKind::ALL {
            let average = self.average_prices.get(kind);
            let floor = self.minimum_prices.get(kind);
            if average == 0 {
                return Err(SmugglerError::Config(format!(
                    "average price for {kind} must be positive"
                )));
            }
            if floor > average {
                return Err(SmugglerError::Config(format!(
                    "minimum price for {kind} ({floor}) exceeds its average ({average})"
                )));
            }
        }

        if self.bays.cost == 0 {
            return Err(SmugglerError::Config("bays.cost must be positive".into()));
        }
        if self.bays.max_bays == 0 {
            return Err(SmugglerError::Config("bays.max_bays must be positive".into()));
        }
        if self.navigation.bank_turns_above >= self.navigation.bank_turns_below {
            return Err(SmugglerError::Config(
                "navigation bank window is empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
