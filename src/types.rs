//! Shared types for the SkySmuggler agent.
//!
//! These types form the data model used across all modules: the fixed
//! cargo and planet enumerations, the wire shapes returned by the game
//! server, the per-turn `GameSnapshot`, and the transaction intents the
//! executor submits.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Tradable commodity. Declaration order is the iteration order used by
/// every rule that scans the market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CargoKind {
    Mining,
    Medical,
    Narcotics,
    Weapons,
    Water,
    Metal,
}

impl CargoKind {
    /// All cargo kinds in declaration order.
    pub const ALL: [CargoKind; 6] = [
        CargoKind::Mining,
        CargoKind::Medical,
        CargoKind::Narcotics,
        CargoKind::Weapons,
        CargoKind::Water,
        CargoKind::Metal,
    ];

    /// Wire name used by the game server.
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoKind::Mining => "mining",
            CargoKind::Medical => "medical",
            CargoKind::Narcotics => "narcotics",
            CargoKind::Weapons => "weapons",
            CargoKind::Water => "water",
            CargoKind::Metal => "metal",
        }
    }
}

impl fmt::Display for CargoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CargoKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CargoKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown cargo kind: {s}"))
    }
}

/// A location in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Pertia,
    Earth,
    Taspra,
    Caliban,
    Umbriel,
    Setebos,
}

impl Planet {
    /// All planets in declaration order.
    pub const ALL: [Planet; 6] = [
        Planet::Pertia,
        Planet::Earth,
        Planet::Taspra,
        Planet::Caliban,
        Planet::Umbriel,
        Planet::Setebos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Planet::Pertia => "pertia",
            Planet::Earth => "earth",
            Planet::Taspra => "taspra",
            Planet::Caliban => "caliban",
            Planet::Umbriel => "umbriel",
            Planet::Setebos => "setebos",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Planet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Planet::ALL
            .into_iter()
            .find(|planet| planet.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown planet: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Market & hold
// ---------------------------------------------------------------------------

/// Prices listed on the current planet.
///
/// The server sends `null` for kinds that are not traded here; those and
/// zero prices are dropped on the way in, so a kind is either listed with a
/// positive price or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<CargoKind, Option<u64>>")]
pub struct Market {
    prices: BTreeMap<CargoKind, u64>,
}

impl From<HashMap<CargoKind, Option<u64>>> for Market {
    fn from(raw: HashMap<CargoKind, Option<u64>>) -> Self {
        Market::from_prices(raw.into_iter().filter_map(|(k, p)| p.map(|p| (k, p))))
    }
}

impl Market {
    /// Build a market from `(kind, price)` pairs. Zero prices are skipped.
    pub fn from_prices(prices: impl IntoIterator<Item = (CargoKind, u64)>) -> Self {
        Self {
            prices: prices.into_iter().filter(|(_, p)| *p > 0).collect(),
        }
    }

    /// Listed price for a kind, if it trades here.
    pub fn price(&self, kind: CargoKind) -> Option<u64> {
        self.prices.get(&kind).copied()
    }

    /// Listed `(kind, price)` pairs in declaration order.
    pub fn listed(&self) -> impl Iterator<Item = (CargoKind, u64)> + '_ {
        self.prices.iter().map(|(k, p)| (*k, *p))
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.listed().map(|(k, p)| format!("{k}={p}")).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// Cargo currently carried, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<CargoKind, u64>")]
pub struct Hold {
    quantities: BTreeMap<CargoKind, u64>,
}

impl From<HashMap<CargoKind, u64>> for Hold {
    fn from(raw: HashMap<CargoKind, u64>) -> Self {
        Hold::from_quantities(raw)
    }
}

impl Hold {
    pub fn from_quantities(quantities: impl IntoIterator<Item = (CargoKind, u64)>) -> Self {
        Self {
            quantities: quantities.into_iter().filter(|(_, q)| *q > 0).collect(),
        }
    }

    pub fn quantity(&self, kind: CargoKind) -> u64 {
        self.quantities.get(&kind).copied().unwrap_or(0)
    }

    /// Kinds held in positive quantity, in declaration order.
    pub fn held(&self) -> impl Iterator<Item = (CargoKind, u64)> + '_ {
        self.quantities.iter().map(|(k, q)| (*k, *q))
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl fmt::Display for Hold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[empty]");
        }
        let parts: Vec<String> = self.held().map(|(k, q)| format!("{k}={q}")).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The `gameState` object returned by every game endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub planet: Planet,
    pub credits: u64,
    pub turns_left: u32,
    pub current_hold: Hold,
    pub fuel_purchases: u32,
    pub loan_balance: u64,
    pub total_bays: u64,
    pub used_bays: u64,
    /// Absent on servers without the bank.
    #[serde(default)]
    pub bank_balance: u64,
}

/// Full response body from the game server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    #[serde(default)]
    pub game_id: Option<String>,
    pub game_state: GameState,
    #[serde(default)]
    pub current_market: Option<Market>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Flat per-turn view of the game, read from a server response.
///
/// The executor folds the fields touched by each accepted (or reconciled)
/// transaction back into the snapshot as the turn progresses. The market is
/// fixed for the whole turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub planet: Planet,
    pub credits: u64,
    pub turns_left: u32,
    pub market: Market,
    pub hold: Hold,
    pub fuel_purchases: u32,
    pub loan_balance: u64,
    pub total_bays: u64,
    pub used_bays: u64,
    pub bank_balance: u64,
}

impl GameSnapshot {
    /// Read a snapshot from a response that must carry a market.
    pub fn from_response(response: GameResponse) -> Result<Self, SmugglerError> {
        let GameResponse {
            game_state,
            current_market,
            ..
        } = response;
        let market = current_market.ok_or_else(|| {
            SmugglerError::MalformedResponse(format!(
                "response for {} has no currentMarket",
                game_state.planet
            ))
        })?;
        Ok(Self::from_parts(game_state, market))
    }

    /// Read a snapshot, falling back to `market` when the response has none
    /// (the state endpoint may omit it).
    pub fn from_response_or(response: GameResponse, market: &Market) -> Self {
        let market = response.current_market.unwrap_or_else(|| market.clone());
        Self::from_parts(response.game_state, market)
    }

    fn from_parts(state: GameState, market: Market) -> Self {
        Self {
            planet: state.planet,
            credits: state.credits,
            turns_left: state.turns_left,
            market,
            hold: state.current_hold,
            fuel_purchases: state.fuel_purchases,
            loan_balance: state.loan_balance,
            total_bays: state.total_bays,
            used_bays: state.used_bays,
            bank_balance: state.bank_balance,
        }
    }

    /// Bays not currently holding cargo.
    pub fn free_bays(&self) -> u64 {
        self.total_bays.saturating_sub(self.used_bays)
    }

    /// Credits plus bank balance minus outstanding loan.
    pub fn net_worth(&self) -> i64 {
        self.credits as i64 + self.bank_balance as i64 - self.loan_balance as i64
    }
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | turns={} credits={} bays={}/{} loan={} bank={} hold={}",
            self.planet,
            self.turns_left,
            self.credits,
            self.used_bays,
            self.total_bays,
            self.loan_balance,
            self.bank_balance,
            self.hold,
        )
    }
}

// ---------------------------------------------------------------------------
// Transaction intents
// ---------------------------------------------------------------------------

/// A single action to submit to the game server. Built and consumed within
/// one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Sell { kind: CargoKind, quantity: u64 },
    Buy { kind: CargoKind, quantity: u64 },
    BuyBays { quantity: u64 },
    BuyFuel { quantity: u64 },
    RepayLoan { amount: u64 },
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
    Travel { to: Planet },
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Sell { kind, quantity } => write!(f, "sell {quantity} {kind}"),
            Intent::Buy { kind, quantity } => write!(f, "buy {quantity} {kind}"),
            Intent::BuyBays { quantity } => write!(f, "buy {quantity} bays"),
            Intent::BuyFuel { quantity } => write!(f, "buy {quantity} fuel cells"),
            Intent::RepayLoan { amount } => write!(f, "repay {amount} credits of loan"),
            Intent::Deposit { amount } => write!(f, "deposit {amount} credits"),
            Intent::Withdraw { amount } => write!(f, "withdraw {amount} credits"),
            Intent::Travel { to } => write!(f, "travel to {to}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the agent.
#[derive(Debug, thiserror::Error)]
pub enum SmugglerError {
    #[error("Game server error ({route}): status {status}: {message}")]
    Server {
        route: String,
        status: u16,
        message: String,
    },

    #[error("Malformed game response: {0}")]
    MalformedResponse(String),

    #[error("No destination reachable from {planet} with hold {hold}")]
    NoDestination { planet: Planet, hold: Hold },

    #[error("Travel stalled at {planet} after {attempts} rejected attempts")]
    TravelStalled { planet: Planet, attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
