//! Lock oracle backed by vesting stream accounts.
//!
//! A stream account starts with a fixed [`LockStreamHeader`]; the locked amount
//! at time `t` is the deposit minus what the cliff + linear schedule has
//! released by `t`.

use anchor_lang::prelude::*;
use bytemuck::{Pod, Zeroable};
use crate::constants::LOCK_STREAM_DISCRIMINATOR;
use crate::engine::{InvestorEntry, LockOracle, LockedBalance};
use crate::errors::ErrorCode;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct LockStreamHeader {
    pub discriminator: [u8; 8],
    /// Wallet the stream vests to
    pub recipient: [u8; 32],
    pub deposited_amount: u64,
    /// Released at once when the cliff passes
    pub cliff_amount: u64,
    pub start_ts: i64,
    pub cliff_ts: i64,
    pub end_ts: i64,
}

impl LockStreamHeader {
    pub const LEN: usize = core::mem::size_of::<LockStreamHeader>();

    pub fn parse(data: &[u8]) -> Result<Self> {
        let span = data
            .get(..Self::LEN)
            .ok_or_else(|| error!(ErrorCode::InvalidStreamAccount))?;
        let header = bytemuck::try_pod_read_unaligned::<LockStreamHeader>(span)
            .map_err(|_| error!(ErrorCode::InvalidStreamAccount))?;

        require!(
            header.discriminator == LOCK_STREAM_DISCRIMINATOR,
            ErrorCode::InvalidStreamAccount
        );
        require!(
            header.start_ts <= header.cliff_ts && header.cliff_ts <= header.end_ts,
            ErrorCode::InvalidStreamAccount
        );
        require!(
            header.cliff_amount <= header.deposited_amount,
            ErrorCode::InvalidStreamAccount
        );
        Ok(header)
    }

    pub fn recipient(&self) -> Pubkey {
        Pubkey::new_from_array(self.recipient)
    }

    pub fn unlocked_at(&self, ts: i64) -> Result<u64> {
        if ts < self.cliff_ts {
            return Ok(0);
        }
        if ts >= self.end_ts {
            return Ok(self.deposited_amount);
        }

        // cliff_ts <= ts < end_ts, so the duration is non-zero
        let linear = (self.deposited_amount - self.cliff_amount) as u128;
        let elapsed = (ts - self.cliff_ts) as u128;
        let duration = (self.end_ts - self.cliff_ts) as u128;
        let released = linear
            .checked_mul(elapsed)
            .ok_or(ErrorCode::ArithmeticOverflow)?
            / duration;

        let released = u64::try_from(released).map_err(|_| error!(ErrorCode::ArithmeticOverflow))?;
        Ok(self.cliff_amount + released)
    }

    pub fn locked_at(&self, ts: i64) -> Result<LockedBalance> {
        let unlocked = self.unlocked_at(ts)?;
        Ok(LockedBalance {
            locked: self.deposited_amount - unlocked,
            allocated: self.deposited_amount,
        })
    }
}

/// Reads stream accounts passed alongside the page's investors
pub struct StreamLockOracle<'a, 'info> {
    stream_program: Pubkey,
    accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> StreamLockOracle<'a, 'info> {
    pub fn new(stream_program: Pubkey, accounts: &'a [AccountInfo<'info>]) -> Self {
        Self {
            stream_program,
            accounts,
        }
    }
}

impl LockOracle for StreamLockOracle<'_, '_> {
    fn locked_balance(&self, investor: &InvestorEntry, timestamp: i64) -> Result<LockedBalance> {
        let stream = self
            .accounts
            .iter()
            .find(|a| a.key == &investor.lock_source)
            .ok_or_else(|| error!(ErrorCode::InvalidStreamAccount))?;
        require_keys_eq!(
            *stream.owner,
            self.stream_program,
            ErrorCode::InvalidStreamAccount
        );

        let header = {
            let data = stream.try_borrow_data()?;
            LockStreamHeader::parse(&data)?
        };
        // Stream must vest to the owner of the receiving account
        require_keys_eq!(
            header.recipient(),
            investor.investor,
            ErrorCode::InvalidInvestorATA
        );

        header.locked_at(timestamp)
    }
}
