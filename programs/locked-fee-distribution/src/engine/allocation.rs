//! Pro-rata allocation of claimed fees between investors and the creator.
//!
//! All ratios are carried as integers scaled by [`BASIS_POINTS_DIVISOR`] or as
//! u128 products floored by a single division, so the sum of investor payouts
//! never exceeds the investor pool.

use anchor_lang::prelude::*;
use crate::constants::BASIS_POINTS_DIVISOR;
use crate::errors::ErrorCode;

/// Investor share of one window, fixed once the lock snapshot closes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowAllocation {
    /// locked_total / allocation_baseline in basis points, capped at 10000
    pub locked_fraction_bps: u64,
    /// min(investor_share_cap_bps, locked_fraction_bps)
    pub eligible_bps: u64,
    /// floor(claimed * eligible_bps / 10000)
    pub investor_pool: u64,
}

/// What happens to a single investor's computed share
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayoutDecision {
    /// Transfer `amount`; `withheld` of the share could not be paid this window
    Pay { amount: u64, withheld: u64 },
    /// Nothing moves; the whole share goes to dust
    Withhold(u64),
    /// The share floored to zero
    Nothing,
}

/// f_locked(t) = locked_total(t) / Y0, in basis points
pub fn locked_fraction_bps(locked_total: u64, allocation_baseline: u64) -> Result<u64> {
    let fraction = (locked_total as u128)
        .checked_mul(BASIS_POINTS_DIVISOR as u128)
        .ok_or(ErrorCode::ArithmeticOverflow)?
        .checked_div(allocation_baseline as u128)
        .ok_or(ErrorCode::InvalidPoolConfiguration)?;

    Ok(fraction.min(BASIS_POINTS_DIVISOR as u128) as u64)
}

pub fn eligible_share_bps(investor_share_cap_bps: u16, locked_fraction_bps: u64) -> u64 {
    (investor_share_cap_bps as u64).min(locked_fraction_bps)
}

pub fn investor_pool(claimed: u64, eligible_bps: u64) -> Result<u64> {
    let pool = (claimed as u128)
        .checked_mul(eligible_bps as u128)
        .ok_or(ErrorCode::ArithmeticOverflow)?
        / BASIS_POINTS_DIVISOR as u128;

    u64::try_from(pool).map_err(|_| error!(ErrorCode::ArithmeticOverflow))
}

pub fn compute_window_allocation(
    claimed: u64,
    locked_total: u64,
    allocation_baseline: u64,
    investor_share_cap_bps: u16,
) -> Result<WindowAllocation> {
    let locked_fraction_bps = locked_fraction_bps(locked_total, allocation_baseline)?;
    let eligible_bps = eligible_share_bps(investor_share_cap_bps, locked_fraction_bps);
    let investor_pool = investor_pool(claimed, eligible_bps)?;

    Ok(WindowAllocation {
        locked_fraction_bps,
        eligible_bps,
        investor_pool,
    })
}

/// Investor weight in basis points, reported in payout events only
pub fn weight_bps(locked: u64, locked_total: u64) -> u64 {
    if locked_total == 0 {
        return 0;
    }
    ((locked as u128 * BASIS_POINTS_DIVISOR as u128) / locked_total as u128) as u64
}

/// payout_i = floor(investor_pool * locked_i / locked_total)
pub fn pro_rata_payout(investor_pool: u64, locked: u64, locked_total: u64) -> Result<u64> {
    if locked_total == 0 {
        return Ok(0);
    }
    require!(locked <= locked_total, ErrorCode::InvalidStreamAccount);

    let payout = (investor_pool as u128)
        .checked_mul(locked as u128)
        .ok_or(ErrorCode::ArithmeticOverflow)?
        / locked_total as u128;

    u64::try_from(payout).map_err(|_| error!(ErrorCode::ArithmeticOverflow))
}

/// Applies the payout floor, then clamps what is left to the cap budget.
/// A clamped amount that drops below the floor is withheld entirely.
pub fn decide_payout(share: u64, min_payout: u64, cap_remaining: u64) -> PayoutDecision {
    if share == 0 {
        return PayoutDecision::Nothing;
    }
    if share < min_payout {
        return PayoutDecision::Withhold(share);
    }

    let amount = share.min(cap_remaining);
    if amount == 0 || amount < min_payout {
        return PayoutDecision::Withhold(share);
    }

    PayoutDecision::Pay {
        amount,
        withheld: share - amount,
    }
}

/// Payout decisions for every investor of one page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageDecision {
    pub decisions: Vec<PayoutDecision>,
    /// The page had to be scaled down to the cap budget
    pub cap_reached: bool,
}

/// Decides a whole page against the cap budget.
///
/// Shares at or above the floor are paid in full while their sum fits
/// `cap_remaining`. Otherwise each of them is scaled by
/// `cap_remaining / page_total`, floored, and the cap counts as reached.
pub fn decide_page(shares: &[u64], min_payout: u64, cap_remaining: u64) -> Result<PageDecision> {
    let payable = |share: u64| share > 0 && share >= min_payout;

    let page_total = shares
        .iter()
        .filter(|s| payable(**s))
        .try_fold(0u128, |acc, s| acc.checked_add(*s as u128))
        .ok_or(ErrorCode::ArithmeticOverflow)?;

    if page_total <= cap_remaining as u128 {
        return Ok(PageDecision {
            decisions: shares
                .iter()
                .map(|s| decide_payout(*s, min_payout, u64::MAX))
                .collect(),
            cap_reached: false,
        });
    }

    let mut decisions = Vec::with_capacity(shares.len());
    for &share in shares {
        if !payable(share) {
            decisions.push(decide_payout(share, min_payout, u64::MAX));
            continue;
        }
        // page_total > cap_remaining, so the scaled share fits in u64
        let scaled = (share as u128)
            .checked_mul(cap_remaining as u128)
            .ok_or(ErrorCode::ArithmeticOverflow)?
            / page_total;
        decisions.push(decide_payout(share, min_payout, scaled as u64));
    }

    Ok(PageDecision {
        decisions,
        cap_reached: true,
    })
}
