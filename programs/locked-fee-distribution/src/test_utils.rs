use std::collections::HashMap;

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use crate::engine::{FeeClaim, FeeSource, InvestorEntry, LockOracle, LockedBalance};
use crate::errors::ErrorCode;
use crate::states::{DistributionPolicy, PolicyParams, PolicySubject};

pub fn anchor_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => panic!("expected an anchor error, got {:?}", e),
    }
}

pub fn policy(
    allocation_baseline: u64,
    investor_share_cap_bps: u16,
    daily_cap: u64,
    min_payout: u64,
    investor_count: u32,
) -> DistributionPolicy {
    let subject = PolicySubject {
        vault: Pubkey::new_unique(),
        asset_mint: Pubkey::new_unique(),
        foreign_mint: Pubkey::new_unique(),
        creator_destination: Pubkey::new_unique(),
        foreign_destination: Pubkey::new_unique(),
        stream_program: Pubkey::new_unique(),
    };
    let params = PolicyParams {
        allocation_baseline,
        investor_share_cap_bps,
        daily_cap,
        min_payout,
        investor_count,
    };
    DistributionPolicy::new(subject, params, 255).unwrap()
}

pub fn entry(policy: &DistributionPolicy) -> InvestorEntry {
    InvestorEntry {
        investor: Pubkey::new_unique(),
        destination: Pubkey::new_unique(),
        destination_asset: policy.asset_mint,
        lock_source: Pubkey::new_unique(),
    }
}

/// Fee source returning the same claim on every call
pub struct StaticFees {
    pub asset: Pubkey,
    pub amount: u64,
    pub foreign_amount: u64,
}

impl StaticFees {
    pub fn pure(policy: &DistributionPolicy, amount: u64) -> Self {
        Self {
            asset: policy.asset_mint,
            amount,
            foreign_amount: 0,
        }
    }

    pub fn with_foreign(mut self, foreign_amount: u64) -> Self {
        self.foreign_amount = foreign_amount;
        self
    }
}

impl FeeSource for StaticFees {
    fn claim(&mut self, _vault: &Pubkey) -> Result<FeeClaim> {
        Ok(FeeClaim {
            asset: self.asset,
            amount: self.amount,
            foreign_amount: self.foreign_amount,
        })
    }
}

/// Lock oracle with time-independent readings keyed by lock source
#[derive(Default)]
pub struct FixedLocks {
    readings: HashMap<Pubkey, LockedBalance>,
}

impl FixedLocks {
    pub fn with(mut self, entry: &InvestorEntry, locked: u64, allocated: u64) -> Self {
        self.readings
            .insert(entry.lock_source, LockedBalance { locked, allocated });
        self
    }
}

impl LockOracle for FixedLocks {
    fn locked_balance(&self, investor: &InvestorEntry, _timestamp: i64) -> Result<LockedBalance> {
        self.readings
            .get(&investor.lock_source)
            .copied()
            .ok_or_else(|| error!(ErrorCode::InvalidStreamAccount))
    }
}
