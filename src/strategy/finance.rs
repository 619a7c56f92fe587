//! Loan shark and bank decisions.

use serde::Deserialize;
use tracing::debug;

use crate::types::{CargoKind, GameSnapshot, Intent, Planet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Credits above which half is parked in the bank.
    pub deposit_threshold: u64,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            deposit_threshold: 500_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

pub struct LoanPolicy {
    loan_market: Planet,
}

impl LoanPolicy {
    pub fn new(loan_market: Planet) -> Self {
        Self { loan_market }
    }

    /// Repay at the loan shark while debt is outstanding, except on a
    /// low-market turn when the credits go to cheap cargo instead.
    pub fn should_repay(&self, planet: Planet, loan: u64, low_cargo: Option<CargoKind>) -> bool {
        planet == self.loan_market && loan > 0 && low_cargo.is_none()
    }

    pub fn repay_amount(&self, credits: u64, loan: u64) -> u64 {
        credits.min(loan)
    }

    pub fn plan(&self, snapshot: &GameSnapshot, low_cargo: Option<CargoKind>) -> Option<Intent> {
        if !self.should_repay(snapshot.planet, snapshot.loan_balance, low_cargo) {
            if snapshot.planet == self.loan_market && low_cargo.is_some() {
                debug!(low_cargo = ?low_cargo, "Skipping loan repayment on low-market turn");
            }
            return None;
        }
        match self.repay_amount(snapshot.credits, snapshot.loan_balance) {
            0 => None,
            amount => Some(Intent::RepayLoan { amount }),
        }
    }
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

pub struct BankPolicy {
    config: BankConfig,
    bank: Planet,
}

impl BankPolicy {
    pub fn new(config: BankConfig, bank: Planet) -> Self {
        Self { config, bank }
    }

    /// Withdraw the whole balance whenever we are at the bank.
    pub fn plan_withdrawal(&self, snapshot: &GameSnapshot) -> Option<Intent> {
        (snapshot.planet == self.bank && snapshot.bank_balance > 0).then_some(Intent::Withdraw {
            amount: snapshot.bank_balance,
        })
    }

    pub fn should_deposit(&self, planet: Planet, withdrew: bool, credits: u64) -> bool {
        planet == self.bank && (credits > self.config.deposit_threshold || withdrew)
    }

    /// Everything after a withdrawal this turn, otherwise half.
    pub fn deposit_amount(&self, credits: u64, withdrew: bool) -> u64 {
        if withdrew {
            credits
        } else {
            credits / 2
        }
    }

    pub fn plan_deposit(&self, snapshot: &GameSnapshot, withdrew: bool) -> Option<Intent> {
        if !self.should_deposit(snapshot.planet, withdrew, snapshot.credits) {
            return None;
        }
        match self.deposit_amount(snapshot.credits, withdrew) {
            0 => None,
            amount => Some(Intent::Deposit { amount }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
