use anchor_lang::prelude::*;
use crate::errors::ErrorCode;

/// One investor of a page. Supplied per call, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvestorEntry {
    /// Owner of the receiving account
    pub investor: Pubkey,
    /// Token account receiving the payout
    pub destination: Pubkey,
    /// Asset held by the receiving account
    pub destination_asset: Pubkey,
    /// Account the lock oracle reads the locked balance from
    pub lock_source: Pubkey,
}

/// Result of draining accrued fees into the escrow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeClaim {
    /// Asset the claimed amount is denominated in
    pub asset: Pubkey,
    pub amount: u64,
    /// Amount of the non-designated asset collected alongside
    pub foreign_amount: u64,
}

impl FeeClaim {
    pub fn is_pure(&self) -> bool {
        self.foreign_amount == 0
    }
}

/// Lock state of one investor at a timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockedBalance {
    /// Still locked at the requested timestamp
    pub locked: u64,
    /// Total allocation the lock source was funded with
    pub allocated: u64,
}

/// Collects accrued fees for a subject
pub trait FeeSource {
    fn claim(&mut self, vault: &Pubkey) -> Result<FeeClaim>;
}

/// Reports how much of an investor's allocation is still locked
pub trait LockOracle {
    fn locked_balance(&self, investor: &InvestorEntry, timestamp: i64) -> Result<LockedBalance>;
}

/// Custodial balance of the designated asset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Escrow {
    pub asset: Pubkey,
    pub balance: u64,
}

impl Escrow {
    pub fn new(asset: Pubkey, balance: u64) -> Self {
        Self { asset, balance }
    }

    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(())
    }
}
