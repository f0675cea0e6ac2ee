use anchor_lang::prelude::*;
use crate::constants::{MAX_PAGE_SIZE, MIN_PAGE_SIZE, WINDOW_DURATION_SECS};
use crate::errors::ErrorCode;
use crate::events::{
    CreatorPayoutWindowClosed, FeesClaimed, InvestorPayout, InvestorPayoutPage, LockSnapshotPage,
};
use crate::states::{DistributionPolicy, DistributionProgress, WindowPhase};
use super::allocation::{self, PayoutDecision};
use super::collaborators::{Escrow, FeeSource, InvestorEntry, LockOracle, LockedBalance};

/// One call of the crank
#[derive(Clone, Copy, Debug)]
pub struct PageRequest<'a> {
    /// Must equal the persisted cursor of the active pass
    pub page_start: u32,
    /// Requested page size (1-50)
    pub page_size: u8,
    /// Investors of this page, in window order
    pub investors: &'a [InvestorEntry],
    /// Host clock
    pub now: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayoutKind {
    Investor,
    Creator,
}

/// A transfer out of escrow the host must execute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub kind: PayoutKind,
    pub destination: Pubkey,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CrankEvent {
    FeesClaimed(FeesClaimed),
    LockSnapshotPage(LockSnapshotPage),
    InvestorPayoutPage(InvestorPayoutPage),
    InvestorPayout(InvestorPayout),
    CreatorPayoutWindowClosed(CreatorPayoutWindowClosed),
}

/// Everything a successful page produces. The host commits all of it or nothing.
#[derive(Clone, Debug)]
pub struct PageOutcome {
    pub progress: DistributionProgress,
    pub escrow: Escrow,
    /// Amount drained from the fee source when this page opened a window
    pub claimed: Option<u64>,
    pub payouts: Vec<Payout>,
    pub events: Vec<CrankEvent>,
}

impl PageOutcome {
    pub fn investor_total(&self) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.kind == PayoutKind::Investor)
            .map(|p| p.amount)
            .sum()
    }

    pub fn creator_payout(&self) -> Option<&Payout> {
        self.payouts.iter().find(|p| p.kind == PayoutKind::Creator)
    }

    pub fn closed_window(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, CrankEvent::CreatorPayoutWindowClosed(_)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gate {
    OpenWindow,
    Continue,
}

/// Paginated distribution state machine for one subject
pub struct DistributionCrank<'a, F, L> {
    policy: &'a DistributionPolicy,
    fee_source: F,
    lock_oracle: L,
    window_duration: i64,
}

impl<'a, F: FeeSource, L: LockOracle> DistributionCrank<'a, F, L> {
    pub fn new(policy: &'a DistributionPolicy, fee_source: F, lock_oracle: L) -> Self {
        Self {
            policy,
            fee_source,
            lock_oracle,
            window_duration: WINDOW_DURATION_SECS,
        }
    }

    pub fn with_window_duration(mut self, window_duration: i64) -> Self {
        self.window_duration = window_duration;
        self
    }

    /// Processes one page against copies of `progress` and `escrow`.
    /// Nothing is mutated in place, so a failed page leaves the caller's state untouched.
    pub fn run_page(
        &mut self,
        progress: &DistributionProgress,
        escrow: &Escrow,
        request: PageRequest<'_>,
    ) -> Result<PageOutcome> {
        require!(
            (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&request.page_size),
            ErrorCode::InvalidPageSize
        );
        require!(
            self.policy.investor_count > 0,
            ErrorCode::InvalidPoolConfiguration
        );
        require_keys_eq!(
            escrow.asset,
            self.policy.asset_mint,
            ErrorCode::InvalidAssetConfiguration
        );

        let mut out = PageOutcome {
            progress: progress.clone(),
            escrow: *escrow,
            claimed: None,
            payouts: Vec::new(),
            events: Vec::new(),
        };

        if self.gate(&out.progress, request.now)? == Gate::OpenWindow {
            out.progress
                .start_new_window(request.now, self.policy.window_cap())?;
            let claimed =
                self.claim_window_fees(&mut out.progress, &mut out.escrow)?;
            out.claimed = Some(claimed.amount);
            out.events.push(CrankEvent::FeesClaimed(claimed));
        }

        match out.progress.phase(self.policy.investor_count) {
            WindowPhase::Snapshot => self.snapshot_page(&mut out, &request)?,
            WindowPhase::Payout => self.payout_page(&mut out, &request)?,
            WindowPhase::Closed => return err!(ErrorCode::DayAlreadyCompleted),
        }

        Ok(out)
    }

    fn gate(&self, progress: &DistributionProgress, now: i64) -> Result<Gate> {
        if progress.is_fresh() {
            return Ok(Gate::OpenWindow);
        }

        require!(
            now >= progress.window_start_ts,
            ErrorCode::TooSoonToDistribute
        );

        if progress.window_complete {
            require!(
                progress.window_elapsed(now, self.window_duration)?,
                ErrorCode::DayAlreadyCompleted
            );
            return Ok(Gate::OpenWindow);
        }

        Ok(Gate::Continue)
    }

    /// Drains the fee source into escrow. Only legal before either pass has advanced.
    pub fn claim_window_fees(
        &mut self,
        progress: &mut DistributionProgress,
        escrow: &mut Escrow,
    ) -> Result<FeesClaimed> {
        require!(
            progress.cursor == 0 && progress.snapshot_cursor == 0,
            ErrorCode::NotFirstPage
        );

        let claim = self.fee_source.claim(&self.policy.vault)?;

        msg!("Foreign asset fees: {} units", claim.foreign_amount);
        msg!("Designated asset fees: {} units", claim.amount);

        // Contamination is a hard failure, nothing is claimed
        require!(claim.is_pure(), ErrorCode::BaseFeesNotAllowed);
        require_keys_eq!(
            claim.asset,
            self.policy.asset_mint,
            ErrorCode::InvalidAssetConfiguration
        );

        escrow.credit(claim.amount)?;
        progress.claimed_this_window = claim.amount;

        Ok(FeesClaimed {
            window_index: progress.window_index,
            amount: claim.amount,
            timestamp: progress.window_start_ts,
        })
    }

    fn page_bounds(&self, request: &PageRequest<'_>, cursor: u32) -> Result<(u32, u32)> {
        let investor_count = self.policy.investor_count;
        require!(
            request.page_start <= investor_count,
            ErrorCode::InvalidPaginationCursor
        );
        require!(
            request.page_start == cursor,
            ErrorCode::PaginationNotSequential
        );

        let remaining = investor_count
            .checked_sub(cursor)
            .ok_or(ErrorCode::InvalidPaginationCursor)?;
        let len = remaining.min(request.page_size as u32);
        require!(
            request.investors.len() == len as usize,
            ErrorCode::InvalidPageSize
        );

        Ok((cursor, cursor + len))
    }

    fn read_lock(&self, entry: &InvestorEntry, timestamp: i64) -> Result<LockedBalance> {
        require_keys_eq!(
            entry.destination_asset,
            self.policy.asset_mint,
            ErrorCode::InvalidInvestorATA
        );
        let reading = self.lock_oracle.locked_balance(entry, timestamp)?;
        require!(
            reading.locked <= reading.allocated,
            ErrorCode::InvalidStreamAccount
        );
        Ok(reading)
    }

    fn snapshot_page(&mut self, out: &mut PageOutcome, request: &PageRequest<'_>) -> Result<()> {
        let (start, end) = self.page_bounds(request, out.progress.snapshot_cursor)?;
        let at = out.progress.window_start_ts;

        let mut locked_subtotal: u64 = 0;
        for entry in request.investors {
            out.progress.advance_lock_source(entry.lock_source)?;
            let reading = self.read_lock(entry, at)?;
            locked_subtotal = locked_subtotal
                .checked_add(reading.locked)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
            out.progress.allocated_total = out
                .progress
                .allocated_total
                .checked_add(reading.allocated)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
        }

        out.progress.locked_total = out
            .progress
            .locked_total
            .checked_add(locked_subtotal)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        out.progress.snapshot_cursor = end;

        msg!(
            "Lock snapshot page {}..{}: {} locked, {} so far",
            start,
            end,
            locked_subtotal,
            out.progress.locked_total
        );
        out.events.push(CrankEvent::LockSnapshotPage(LockSnapshotPage {
            window_index: out.progress.window_index,
            page_start: start,
            page_end: end,
            locked_subtotal,
            locked_total: out.progress.locked_total,
        }));

        if end < self.policy.investor_count {
            push_idle_payout_page(out, start, end);
            return Ok(());
        }

        self.close_snapshot(out)?;

        if out.progress.investor_pool == 0 {
            // Nothing is owed to investors, skip straight to the creator
            push_idle_payout_page(out, start, end);
            out.progress.cursor = self.policy.investor_count;
            self.close_window(out)
        } else if start == 0 {
            // The page held every investor, pay them in the same call
            self.payout_page(out, request)
        } else {
            push_idle_payout_page(out, start, end);
            Ok(())
        }
    }

    fn close_snapshot(&self, out: &mut PageOutcome) -> Result<()> {
        require!(
            out.progress.locked_total > 0 || out.progress.allocated_total > 0,
            ErrorCode::NoLockedTokens
        );

        let window = allocation::compute_window_allocation(
            out.progress.claimed_this_window,
            out.progress.locked_total,
            self.policy.allocation_baseline,
            self.policy.investor_share_cap_bps,
        )?;
        out.progress.investor_pool = window.investor_pool;

        msg!("Total locked: {} units", out.progress.locked_total);
        msg!("Y0 allocation: {} units", self.policy.allocation_baseline);
        msg!("f_locked: {} bps", window.locked_fraction_bps);
        msg!(
            "Eligible investor share: {} bps (max: {} bps)",
            window.eligible_bps,
            self.policy.investor_share_cap_bps
        );
        msg!("Investor pool: {} units", window.investor_pool);
        Ok(())
    }

    fn payout_page(&mut self, out: &mut PageOutcome, request: &PageRequest<'_>) -> Result<()> {
        let (start, end) = self.page_bounds(request, out.progress.cursor)?;
        let at = out.progress.window_start_ts;
        let locked_total = out.progress.locked_total;
        let investor_pool = out.progress.investor_pool;

        if start == 0 {
            out.progress.last_lock_source = Pubkey::default();
        }

        let mut readings = Vec::with_capacity(request.investors.len());
        let mut shares = Vec::with_capacity(request.investors.len());
        for entry in request.investors {
            out.progress.advance_lock_source(entry.lock_source)?;
            let reading = self.read_lock(entry, at)?;

            // The payout pass may never settle more lock than the snapshot saw
            let settled = out
                .progress
                .locked_settled
                .checked_add(reading.locked)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
            require!(settled <= locked_total, ErrorCode::InvalidStreamAccount);
            out.progress.locked_settled = settled;

            shares.push(allocation::pro_rata_payout(investor_pool, reading.locked, locked_total)?);
            readings.push(reading);
        }

        let budget = if out.progress.cap_reached {
            0
        } else {
            out.progress.cap_remaining
        };
        let page = allocation::decide_page(&shares, self.policy.min_payout, budget)?;
        if page.cap_reached && !out.progress.cap_reached {
            msg!("Daily cap reached, scaling page {}..{} to {} units", start, end, budget);
            out.progress.cap_reached = true;
        }

        let mut page_paid: u64 = 0;
        let mut page_withheld: u64 = 0;
        let mut investors_paid: u8 = 0;

        for (((entry, reading), share), decision) in request
            .investors
            .iter()
            .zip(&readings)
            .zip(&shares)
            .zip(page.decisions)
        {
            let (paid, withheld) = match decision {
                PayoutDecision::Pay { amount, withheld } => {
                    out.progress.take_cap(amount);
                    out.escrow.debit(amount)?;
                    out.payouts.push(Payout {
                        kind: PayoutKind::Investor,
                        destination: entry.destination,
                        amount,
                    });
                    (amount, withheld)
                }
                PayoutDecision::Withhold(withheld) => {
                    msg!("Payout {} below minimum or cap, carrying as dust", withheld);
                    (0, withheld)
                }
                PayoutDecision::Nothing => (0, 0),
            };

            if withheld > 0 {
                out.progress.withhold(withheld)?;
            }
            if paid > 0 {
                investors_paid += 1;
            }
            out.progress.distributed_to_investors_this_window = out
                .progress
                .distributed_to_investors_this_window
                .checked_add(paid)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
            page_paid = page_paid
                .checked_add(paid)
                .ok_or(ErrorCode::ArithmeticOverflow)?;
            page_withheld = page_withheld
                .checked_add(withheld)
                .ok_or(ErrorCode::ArithmeticOverflow)?;

            out.events.push(CrankEvent::InvestorPayout(InvestorPayout {
                window_index: out.progress.window_index,
                investor: entry.investor,
                destination: entry.destination,
                locked: reading.locked,
                weight_bps: allocation::weight_bps(reading.locked, locked_total),
                calculated_payout: *share,
                actual_payout: paid,
                withheld,
            }));
        }

        out.progress.cursor = end;

        msg!(
            "Investor page {}..{}: {} paid {} units, {} withheld",
            start,
            end,
            investors_paid,
            page_paid,
            page_withheld
        );
        out.events.push(CrankEvent::InvestorPayoutPage(InvestorPayoutPage {
            window_index: out.progress.window_index,
            page_start: start,
            page_end: end,
            investors_paid,
            total_amount: page_paid,
            withheld_amount: page_withheld,
        }));

        if end == self.policy.investor_count {
            // Both passes must have covered the same locked balances
            require!(
                out.progress.locked_settled == locked_total,
                ErrorCode::InvalidStreamAccount
            );
            self.close_window(out)?;
        }
        Ok(())
    }

    fn close_window(&self, out: &mut PageOutcome) -> Result<()> {
        let remainder = out.progress.creator_remainder()?;
        let amount = out.progress.take_cap(remainder);
        let excess = remainder - amount;
        if excess > 0 {
            msg!("Daily cap reached, carrying {} units of creator remainder", excess);
            out.progress.withhold(excess)?;
        }

        if amount > 0 {
            out.escrow.debit(amount)?;
            out.payouts.push(Payout {
                kind: PayoutKind::Creator,
                destination: self.policy.creator_destination,
                amount,
            });
        }
        out.progress.distributed_to_creator_this_window = amount;
        out.progress.window_complete = true;

        msg!(
            "Closed distribution window {}: creator {} units, investors {} units, dust {}",
            out.progress.window_index,
            amount,
            out.progress.distributed_to_investors_this_window,
            out.progress.dust
        );
        out.events
            .push(CrankEvent::CreatorPayoutWindowClosed(CreatorPayoutWindowClosed {
                window_index: out.progress.window_index,
                creator: self.policy.creator_destination,
                amount,
                window_timestamp: out.progress.window_start_ts,
                distributed_to_investors: out.progress.distributed_to_investors_this_window,
                carried_dust: out.progress.dust,
            }));
        Ok(())
    }
}

/// Payout page record for a call that only advanced the snapshot pass
fn push_idle_payout_page(out: &mut PageOutcome, start: u32, end: u32) {
    out.events.push(CrankEvent::InvestorPayoutPage(InvestorPayoutPage {
        window_index: out.progress.window_index,
        page_start: start,
        page_end: end,
        investors_paid: 0,
        total_amount: 0,
        withheld_amount: 0,
    }));
}
