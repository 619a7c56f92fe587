//! Simulated game server for integration testing.
//!
//! Provides a deterministic in-memory `GameServer` that enforces the game
//! rules (credits, bay capacity, planet-specific services, banned cargo)
//! and records every call, with no network access.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use skysmuggler::server::{GameServer, ScoreReceipt, TxOutcome};
use skysmuggler::types::*;

pub const BAY_COST: u64 = 800;
pub const FUEL_CELL_COST: u64 = 1_000;
pub const MAX_BAYS: u64 = 1_000;

/// Cargo each planet's customs seize on arrival.
pub const CONTRABAND: [(Planet, CargoKind); 6] = [
    (Planet::Pertia, CargoKind::Metal),
    (Planet::Earth, CargoKind::Narcotics),
    (Planet::Taspra, CargoKind::Medical),
    (Planet::Caliban, CargoKind::Mining),
    (Planet::Umbriel, CargoKind::Weapons),
    (Planet::Setebos, CargoKind::Water),
];

/// An in-memory SkySmuggler game.
///
/// Clones share all mutable state, so a test can keep one handle and give
/// the other to the session runner.
#[derive(Clone)]
pub struct SimulatedServer {
    template: GameState,
    markets: HashMap<Planet, Market>,
    state: Arc<Mutex<GameState>>,
    game_id: Arc<Mutex<Option<String>>>,
    games_started: Arc<Mutex<u32>>,
    calls: Arc<Mutex<Vec<Intent>>>,
    rejections: Arc<Mutex<Vec<(Intent, String)>>>,
    state_fetches: Arc<Mutex<u32>>,
    submitted_scores: Arc<Mutex<Vec<(String, i64)>>>,
    names: Arc<Mutex<Vec<(String, String)>>>,
    score_message: Arc<Mutex<String>>,
    block_travel: Arc<Mutex<bool>>,
    reject_buys: Arc<Mutex<u32>>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl SimulatedServer {
    /// A server whose games start from `start`, with the default markets.
    pub fn new(start: GameState) -> Self {
        Self {
            state: Arc::new(Mutex::new(start.clone())),
            template: start,
            markets: Self::default_markets(),
            game_id: Arc::new(Mutex::new(None)),
            games_started: Arc::new(Mutex::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            rejections: Arc::new(Mutex::new(Vec::new())),
            state_fetches: Arc::new(Mutex::new(0)),
            submitted_scores: Arc::new(Mutex::new(Vec::new())),
            names: Arc::new(Mutex::new(Vec::new())),
            score_message: Arc::new(Mutex::new("Score submitted".to_string())),
            block_travel: Arc::new(Mutex::new(false)),
            reject_buys: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the market listed on `planet`.
    pub fn with_market(mut self, planet: Planet, market: Market) -> Self {
        self.markets.insert(planet, market);
        self
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Refuse every travel request.
    pub fn block_travel(&self) {
        *self.block_travel.lock().unwrap() = true;
    }

    /// Refuse the next `n` cargo purchases regardless of their validity.
    pub fn reject_next_buys(&self, n: u32) {
        *self.reject_buys.lock().unwrap() = n;
    }

    pub fn set_score_message(&self, msg: &str) {
        *self.score_message.lock().unwrap() = msg.to_string();
    }

    pub fn calls(&self) -> Vec<Intent> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rejections(&self) -> Vec<(Intent, String)> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn state_fetches(&self) -> u32 {
        *self.state_fetches.lock().unwrap()
    }

    pub fn submitted_scores(&self) -> Vec<(String, i64)> {
        self.submitted_scores.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<(String, String)> {
        self.names.lock().unwrap().clone()
    }

    pub fn games_started(&self) -> u32 {
        *self.games_started.lock().unwrap()
    }

    pub fn current_state(&self) -> GameState {
        self.state.lock().unwrap().clone()
    }

    /// Each planet lists every cargo except the one it bans.
    fn default_markets() -> HashMap<Planet, Market> {
        use CargoKind::*;
        HashMap::from([
            (
                Planet::Pertia,
                Market::from_prices([
                    (Mining, 1_900),
                    (Medical, 3_000),
                    (Narcotics, 38_000),
                    (Weapons, 65_000),
                    (Water, 16_000),
                ]),
            ),
            (
                Planet::Earth,
                Market::from_prices([
                    (Mining, 2_300),
                    (Medical, 3_900),
                    (Weapons, 72_000),
                    (Water, 18_500),
                    (Metal, 800),
                ]),
            ),
            (
                Planet::Taspra,
                Market::from_prices([
                    (Mining, 2_000),
                    (Narcotics, 42_000),
                    (Weapons, 68_000),
                    (Water, 17_000),
                    (Metal, 650),
                ]),
            ),
            (
                Planet::Caliban,
                Market::from_prices([
                    (Medical, 3_400),
                    (Narcotics, 36_000),
                    (Weapons, 74_000),
                    (Water, 19_000),
                    (Metal, 500),
                ]),
            ),
            (
                Planet::Umbriel,
                Market::from_prices([
                    (Mining, 2_500),
                    (Medical, 4_000),
                    (Narcotics, 44_000),
                    (Water, 17_800),
                    (Metal, 760),
                ]),
            ),
            (
                Planet::Setebos,
                Market::from_prices([
                    (Mining, 1_700),
                    (Medical, 3_200),
                    (Narcotics, 39_000),
                    (Weapons, 71_000),
                    (Metal, 720),
                ]),
            ),
        ])
    }

    fn check_error(&self) -> Result<()> {
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(())
    }

    fn check_game(&self, game_id: &str) -> Result<()> {
        match self.game_id.lock().unwrap().as_deref() {
            Some(id) if id == game_id => Ok(()),
            other => bail!("unknown game {game_id} (current: {other:?})"),
        }
    }

    fn market(&self, planet: Planet) -> Market {
        self.markets.get(&planet).cloned().unwrap_or_default()
    }

    fn response(&self, game_id: Option<String>, with_market: bool) -> GameResponse {
        let state = self.current_state();
        let current_market = with_market.then(|| self.market(state.planet));
        GameResponse {
            game_id,
            game_state: state,
            current_market,
        }
    }

    /// Apply a transaction to `s`, or explain why the game refuses it.
    fn apply(&self, s: &mut GameState, intent: &Intent) -> Result<(), String> {
        let market = self.market(s.planet);
        match *intent {
            Intent::Sell { kind, quantity } => {
                let price = market
                    .price(kind)
                    .ok_or_else(|| format!("{kind} is not traded on {}", s.planet))?;
                let held = s.current_hold.quantity(kind);
                if quantity > held {
                    return Err(format!("only {held} {kind} in hold"));
                }
                s.credits += quantity * price;
                s.current_hold = with_quantity(&s.current_hold, kind, held - quantity);
                s.used_bays -= quantity;
            }
            Intent::Buy { kind, quantity } => {
                {
                    let mut pending = self.reject_buys.lock().unwrap();
                    if *pending > 0 {
                        *pending -= 1;
                        return Err("market closed".into());
                    }
                }
                let price = market
                    .price(kind)
                    .ok_or_else(|| format!("{kind} is not traded on {}", s.planet))?;
                let cost = quantity * price;
                if cost > s.credits {
                    return Err(format!("{cost} credits needed, {} available", s.credits));
                }
                if s.used_bays + quantity > s.total_bays {
                    return Err("not enough free bays".into());
                }
                let held = s.current_hold.quantity(kind);
                s.credits -= cost;
                s.current_hold = with_quantity(&s.current_hold, kind, held + quantity);
                s.used_bays += quantity;
            }
            Intent::BuyBays { quantity } => {
                if s.planet != Planet::Taspra {
                    return Err("no shipyard here".into());
                }
                let cost = quantity * BAY_COST;
                if cost > s.credits {
                    return Err("cannot afford bays".into());
                }
                if s.total_bays + quantity > MAX_BAYS {
                    return Err("bay limit reached".into());
                }
                s.credits -= cost;
                s.total_bays += quantity;
            }
            Intent::BuyFuel { quantity } => {
                if s.planet != Planet::Pertia {
                    return Err("no fuel depot here".into());
                }
                let cost = quantity * FUEL_CELL_COST;
                if cost > s.credits {
                    return Err("cannot afford fuel".into());
                }
                s.credits -= cost;
                s.turns_left += quantity as u32;
                s.fuel_purchases += 1;
            }
            Intent::RepayLoan { amount } => {
                if s.planet != Planet::Umbriel {
                    return Err("no loan shark here".into());
                }
                if amount > s.credits || amount > s.loan_balance {
                    return Err("bad repayment".into());
                }
                s.credits -= amount;
                s.loan_balance -= amount;
            }
            Intent::Deposit { amount } => {
                if s.planet != Planet::Earth {
                    return Err("no bank here".into());
                }
                if amount > s.credits {
                    return Err("cannot deposit more than credits".into());
                }
                s.credits -= amount;
                s.bank_balance += amount;
            }
            Intent::Withdraw { amount } => {
                if s.planet != Planet::Earth {
                    return Err("no bank here".into());
                }
                if amount > s.bank_balance {
                    return Err("cannot withdraw more than balance".into());
                }
                s.bank_balance -= amount;
                s.credits += amount;
            }
            Intent::Travel { to } => {
                if *self.block_travel.lock().unwrap() {
                    return Err("out of fuel".into());
                }
                if to == s.planet {
                    return Err("already there".into());
                }
                if s.turns_left == 0 {
                    return Err("game over".into());
                }
                let seized = CONTRABAND
                    .iter()
                    .find(|(planet, kind)| *planet == to && s.current_hold.quantity(*kind) > 0);
                if let Some((_, kind)) = seized {
                    return Err(format!("{kind} is contraband on {to}"));
                }
                s.planet = to;
                s.turns_left -= 1;
            }
        }
        Ok(())
    }
}

fn with_quantity(hold: &Hold, kind: CargoKind, quantity: u64) -> Hold {
    Hold::from_quantities(CargoKind::ALL.map(|k| {
        if k == kind {
            (k, quantity)
        } else {
            (k, hold.quantity(k))
        }
    }))
}

#[async_trait]
impl GameServer for SimulatedServer {
    async fn new_game(&self) -> Result<GameResponse> {
        self.check_error()?;
        let id = {
            let mut started = self.games_started.lock().unwrap();
            *started += 1;
            format!("sim-{}", *started)
        };
        *self.game_id.lock().unwrap() = Some(id.clone());
        *self.state.lock().unwrap() = self.template.clone();
        Ok(self.response(Some(id), true))
    }

    async fn fetch_state(&self, game_id: &str) -> Result<GameResponse> {
        self.check_error()?;
        self.check_game(game_id)?;
        *self.state_fetches.lock().unwrap() += 1;
        Ok(self.response(None, false))
    }

    async fn submit(&self, game_id: &str, intent: &Intent) -> Result<TxOutcome> {
        self.check_error()?;
        self.check_game(game_id)?;
        self.calls.lock().unwrap().push(*intent);

        let mut next = self.current_state();
        match self.apply(&mut next, intent) {
            Ok(()) => {
                *self.state.lock().unwrap() = next;
                Ok(TxOutcome::Accepted(self.response(None, true)))
            }
            Err(reason) => {
                self.rejections.lock().unwrap().push((*intent, reason.clone()));
                Ok(TxOutcome::Rejected {
                    status: 400,
                    reason,
                })
            }
        }
    }

    async fn submit_score(&self, game_id: &str) -> Result<ScoreReceipt> {
        self.check_error()?;
        self.check_game(game_id)?;
        let s = self.current_state();
        let score = s.credits as i64 + s.bank_balance as i64 - s.loan_balance as i64;
        self.submitted_scores
            .lock()
            .unwrap()
            .push((game_id.to_string(), score));
        Ok(ScoreReceipt {
            message: self.score_message.lock().unwrap().clone(),
        })
    }

    async fn update_name(&self, game_id: &str, name: &str) -> Result<()> {
        self.check_error()?;
        self.check_game(game_id)?;
        self.names
            .lock()
            .unwrap()
            .push((game_id.to_string(), name.to_string()));
        Ok(())
    }
}

/// A fresh-game state on `planet` with an empty hold.
pub fn start_state(planet: Planet, credits: u64, turns_left: u32) -> GameState {
    GameState {
        planet,
        credits,
        turns_left,
        current_hold: Hold::default(),
        fuel_purchases: 0,
        loan_balance: 0,
        total_bays: 100,
        used_bays: 0,
        bank_balance: 0,
    }
}
