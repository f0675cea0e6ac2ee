use anchor_lang::prelude::*;
use crate::errors::ErrorCode;
use crate::events::{DustSwept, ForeignFeesRecovered};
use crate::states::{DistributionPolicy, DistributionProgress};
use super::collaborators::Escrow;
use super::crank::{Payout, PayoutKind};

#[derive(Clone, Debug)]
pub struct DustSweep {
    pub progress: DistributionProgress,
    pub escrow: Escrow,
    pub payout: Payout,
    pub event: DustSwept,
}

/// Releases carried dust to the creator between windows.
/// The sweep spends the cap budget left over by the last window.
pub fn sweep_dust(
    policy: &DistributionPolicy,
    progress: &DistributionProgress,
    escrow: &Escrow,
    now: i64,
) -> Result<DustSweep> {
    require!(!progress.is_window_open(), ErrorCode::WindowInProgress);
    require!(progress.dust > 0, ErrorCode::NoDustToSweep);
    require!(progress.cap_remaining > 0, ErrorCode::DailyCapExceeded);

    let mut next = progress.clone();
    let mut escrow = *escrow;

    let amount = next.take_cap(next.dust);
    next.dust -= amount;
    escrow.debit(amount)?;

    msg!("Swept {} units of dust, {} remaining", amount, next.dust);

    Ok(DustSweep {
        event: DustSwept {
            creator: policy.creator_destination,
            amount,
            remaining_dust: next.dust,
            timestamp: now,
        },
        payout: Payout {
            kind: PayoutKind::Creator,
            destination: policy.creator_destination,
            amount,
        },
        progress: next,
        escrow,
    })
}

/// Hands the whole foreign inbox balance to the policy's foreign destination.
/// Windows cannot open while that inbox holds anything, so this is allowed at any time.
pub fn recover_foreign_fees(
    policy: &DistributionPolicy,
    foreign_balance: u64,
    now: i64,
) -> Result<ForeignFeesRecovered> {
    require!(foreign_balance > 0, ErrorCode::NoForeignFees);

    msg!(
        "Recovering {} units of foreign fees to {}",
        foreign_balance,
        policy.foreign_destination
    );

    Ok(ForeignFeesRecovered {
        vault: policy.vault,
        foreign_mint: policy.foreign_mint,
        destination: policy.foreign_destination,
        amount: foreign_balance,
        timestamp: now,
    })
}
