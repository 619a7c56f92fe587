//! Decision engine: the heuristic rules that pick each turn's actions.
//!
//! Every rule is a pure function of the current `GameSnapshot` and the
//! static `GameRules`. The engine never talks to the server; the executor
//! submits what it returns.

pub mod capacity;
pub mod finance;
pub mod market;
pub mod navigation;
pub mod rules;

use rand::Rng;

use crate::types::{CargoKind, GameSnapshot, Intent};
use capacity::{BayPolicy, FuelPolicy};
use finance::{BankPolicy, LoanPolicy};
use market::{CargoOrder, CargoSelector, LowMarketDetector};
use navigation::{Navigator, Route};
use rules::GameRules;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Bundles the individual policies behind one per-turn interface.
///
/// Build once per session from the loaded rules; all methods take `&self`.
pub struct DecisionEngine {
    low_market: LowMarketDetector,
    cargo: CargoSelector,
    bays: BayPolicy,
    fuel: FuelPolicy,
    loan: LoanPolicy,
    bank: BankPolicy,
    navigator: Navigator,
}

impl DecisionEngine {
    pub fn new(rules: &GameRules) -> Self {
        let lm = rules.landmarks;
        Self {
            low_market: LowMarketDetector::new(rules.minimum_prices),
            cargo: CargoSelector::new(rules.average_prices, rules.cargo_policy, rules.discount),
            bays: BayPolicy::new(rules.bays, lm.bay_market),
            fuel: FuelPolicy::new(rules.fuel, lm.fuel_market),
            loan: LoanPolicy::new(lm.loan_market),
            bank: BankPolicy::new(rules.bank, lm.bank),
            navigator: Navigator::new(
                rules.navigation,
                lm,
                rules.banned_cargo,
                rules.bays.max_bays,
            ),
        }
    }

    /// Cargo listed below its floor on the arrival market, if any.
    pub fn low_market(&self, snapshot: &GameSnapshot) -> Option<CargoKind> {
        self.low_market.detect(&snapshot.market)
    }

    pub fn cargo_order(&self, snapshot: &GameSnapshot) -> Option<CargoOrder> {
        self.cargo
            .select(&snapshot.market, snapshot.credits, snapshot.free_bays())
    }

    pub fn fuel_purchase(&self, snapshot: &GameSnapshot) -> Option<Intent> {
        self.fuel.plan(snapshot)
    }

    /// Turns granted by a successful fuel purchase of `cells`.
    pub fn fuel_turns(&self, cells: u64) -> u32 {
        self.fuel.turns_granted(cells)
    }

    pub fn loan_repayment(
        &self,
        snapshot: &GameSnapshot,
        low_cargo: Option<CargoKind>,
    ) -> Option<Intent> {
        self.loan.plan(snapshot, low_cargo)
    }

    pub fn bank_withdrawal(&self, snapshot: &GameSnapshot) -> Option<Intent> {
        self.bank.plan_withdrawal(snapshot)
    }

    pub fn bank_deposit(&self, snapshot: &GameSnapshot, withdrew: bool) -> Option<Intent> {
        self.bank.plan_deposit(snapshot, withdrew)
    }

    pub fn bay_purchase(
        &self,
        snapshot: &GameSnapshot,
        order: Option<&CargoOrder>,
    ) -> Option<Intent> {
        self.bays.plan(snapshot, order)
    }

    pub fn destination<R: Rng + ?Sized>(
        &self,
        snapshot: &GameSnapshot,
        rng: &mut R,
    ) -> Option<Route> {
        self.navigator.choose(snapshot, rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
