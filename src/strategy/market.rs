//! Market reading: low-market detection and cargo selection.
//!
//! The selector runs one of two policies, chosen in configuration:
//! the profit policy (default) ranks cargo by the credits a full purchase
//! would make if sold at the average price; the discount policy ranks by
//! weighted percentage below average.

use serde::Deserialize;
use tracing::debug;

use super::rules::{PerCargo, PriceTable};
use crate::types::{CargoKind, Intent, Market};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which cargo-selection policy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CargoPolicy {
    #[default]
    Profit,
    Discount,
}

/// Settings for the discount policy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscountConfig {
    /// Minimum fraction below average before a cargo is considered.
    pub min_discount: f64,
    /// Preference weight per cargo kind.
    pub weights: PerCargo<f64>,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            min_discount: 0.09,
            weights: PerCargo {
                mining: 0.90,
                medical: 0.95,
                narcotics: 0.95,
                weapons: 1.0,
                water: 0.75,
                metal: 0.35,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Low-market detection
// ---------------------------------------------------------------------------

/// Flags a cargo listed below its price floor.
pub struct LowMarketDetector {
    floors: PriceTable,
}

impl LowMarketDetector {
    pub fn new(floors: PriceTable) -> Self {
        Self { floors }
    }

    /// First listed kind (declaration order) priced strictly below its floor.
    pub fn detect(&self, market: &Market) -> Option<CargoKind> {
        let low = market
            .listed()
            .find(|(kind, price)| *price < self.floors.get(*kind))
            .map(|(kind, _)| kind);

        if let Some(kind) = low {
            debug!(
                cargo = %kind,
                price = market.price(kind),
                floor = self.floors.get(kind),
                "Low market event"
            );
        }
        low
    }
}

// ---------------------------------------------------------------------------
// Cargo selection
// ---------------------------------------------------------------------------

/// A sized cargo purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CargoOrder {
    pub kind: CargoKind,
    pub price: u64,
    pub quantity: u64,
}

impl CargoOrder {
    pub fn cost(&self) -> u64 {
        self.price * self.quantity
    }

    pub fn intent(&self) -> Intent {
        Intent::Buy {
            kind: self.kind,
            quantity: self.quantity,
        }
    }
}

/// Chooses which cargo to buy and how much.
pub struct CargoSelector {
    averages: PriceTable,
    policy: CargoPolicy,
    discount: DiscountConfig,
}

impl CargoSelector {
    pub fn new(averages: PriceTable, policy: CargoPolicy, discount: DiscountConfig) -> Self {
        Self {
            averages,
            policy,
            discount,
        }
    }

    /// Pick a cargo for the current market, or `None` when nothing is worth
    /// buying. The quantity never exceeds what the credits pay for nor the
    /// free bays.
    pub fn select(&self, market: &Market, credits: u64, free_bays: u64) -> Option<CargoOrder> {
        match self.policy {
            CargoPolicy::Profit => self.by_profit(market, credits, free_bays),
            CargoPolicy::Discount => self.by_discount(market, credits, free_bays),
        }
    }

    fn by_profit(&self, market: &Market, credits: u64, free_bays: u64) -> Option<CargoOrder> {
        let mut chosen: Option<CargoOrder> = None;
        let mut chosen_profit: i64 = 0;

        for (kind, price) in market.listed() {
            let quantity = affordable(credits, price, free_bays);
            let margin = self.averages.get(kind) as i64 - price as i64;
            let profit = quantity as i64 * margin;

            if profit > chosen_profit {
                chosen = Some(CargoOrder {
                    kind,
                    price,
                    quantity,
                });
                chosen_profit = profit;
            }
        }

        if let Some(order) = chosen {
            debug!(
                cargo = %order.kind,
                price = order.price,
                quantity = order.quantity,
                cost = order.cost(),
                expected_profit = chosen_profit,
                "Cargo selected by profit"
            );
        }
        chosen
    }

    fn by_discount(&self, market: &Market, credits: u64, free_bays: u64) -> Option<CargoOrder> {
        let weights = &self.discount.weights;
        let mut chosen: Option<(CargoKind, u64, f64)> = None;

        for (kind, price) in market.listed() {
            let average = self.averages.get(kind) as f64;
            let under = (average - price as f64) / average;

            // no selection yet scores as zero discount at weight 1.0
            let best = chosen
                .map(|(k, _, u)| u * weights.get(k))
                .unwrap_or(0.0);

            if under > self.discount.min_discount
                && price < credits
                && under * weights.get(kind) > best
            {
                chosen = Some((kind, price, under));
            }
        }

        let (kind, price, under) = chosen?;
        let quantity = affordable(credits, price, free_bays);
        if quantity == 0 {
            return None;
        }

        let order = CargoOrder {
            kind,
            price,
            quantity,
        };
        debug!(
            cargo = %kind,
            price,
            quantity,
            cost = order.cost(),
            discount = format!("{:.1}%", under * 100.0),
            "Cargo selected by discount"
        );
        Some(order)
    }
}

/// Units the credits pay for, capped at the free bays.
fn affordable(credits: u64, price: u64, free_bays: u64) -> u64 {
    (credits / price).min(free_bays)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
