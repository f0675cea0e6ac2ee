#![cfg(all(test, not(target_arch = "bpf")))]

// Host-only tests driving whole windows through the crank: pagination,
// pro-rata payouts, dust carry, cap clamp and conservation of escrow funds.

use std::collections::HashMap;

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use locked_fee_distribution::constants::SECONDS_PER_DAY;
use locked_fee_distribution::engine::{
    recover_foreign_fees, sweep_dust, CrankEvent, DistributionCrank, Escrow, FeeClaim, FeeSource, InvestorEntry,
    LockOracle, LockedBalance, PageOutcome, PageRequest, PayoutKind,
};
use locked_fee_distribution::errors::ErrorCode;
use locked_fee_distribution::states::{
    DistributionPolicy, DistributionProgress, PolicyParams, PolicySubject, WindowPhase,
};
use proptest::prelude::*;

const T0: i64 = 1_700_000_000;

fn anchor_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => panic!("expected an anchor error, got {:?}", e),
    }
}

/// Fee inbox drained by the first claim of a window
struct Inbox {
    asset: Pubkey,
    pending: u64,
    /// Balance of the foreign asset inbox
    foreign: u64,
}

impl FeeSource for Inbox {
    fn claim(&mut self, _vault: &Pubkey) -> Result<FeeClaim> {
        let amount = core::mem::take(&mut self.pending);
        Ok(FeeClaim {
            asset: self.asset,
            amount,
            foreign_amount: self.foreign,
        })
    }
}

// The crank owns its fee source; a window's pages share one inbox
impl FeeSource for &mut Inbox {
    fn claim(&mut self, vault: &Pubkey) -> Result<FeeClaim> {
        (**self).claim(vault)
    }
}

#[derive(Clone, Default)]
struct Locks(HashMap<Pubkey, LockedBalance>);

impl LockOracle for Locks {
    fn locked_balance(&self, investor: &InvestorEntry, _timestamp: i64) -> Result<LockedBalance> {
        self.0
            .get(&investor.lock_source)
            .copied()
            .ok_or_else(|| error!(ErrorCode::InvalidStreamAccount))
    }
}

/// A subject with its progress and escrow, committing page outcomes the way
/// the instruction handler does
struct Subject {
    policy: DistributionPolicy,
    progress: DistributionProgress,
    escrow: Escrow,
    investors: Vec<InvestorEntry>,
    locks: Locks,
    paid: HashMap<Pubkey, u64>,
    creator_paid: u64,
}

impl Subject {
    fn new(params: PolicyParams, locks: &[(u64, u64)]) -> Self {
        let subject = PolicySubject {
            vault: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            foreign_mint: Pubkey::new_unique(),
            creator_destination: Pubkey::new_unique(),
            foreign_destination: Pubkey::new_unique(),
            stream_program: Pubkey::new_unique(),
        };
        let policy = DistributionPolicy::new(subject, params, 255).unwrap();
        let progress = DistributionProgress::new(policy.vault, 254);
        let escrow = Escrow::new(policy.asset_mint, 0);

        let mut investors = Vec::new();
        let mut readings = Locks::default();
        for &(locked, allocated) in locks {
            let entry = InvestorEntry {
                investor: Pubkey::new_unique(),
                destination: Pubkey::new_unique(),
                destination_asset: policy.asset_mint,
                lock_source: Pubkey::new_unique(),
            };
            readings
                .0
                .insert(entry.lock_source, LockedBalance { locked, allocated });
            investors.push(entry);
        }

        Self {
            policy,
            progress,
            escrow,
            investors,
            locks: readings,
            paid: HashMap::new(),
            creator_paid: 0,
        }
    }

    fn inbox(&self, pending: u64) -> Inbox {
        Inbox {
            asset: self.policy.asset_mint,
            pending,
            foreign: 0,
        }
    }

    fn page(
        &mut self,
        inbox: &mut Inbox,
        page_start: u32,
        page_size: u8,
        now: i64,
    ) -> Result<PageOutcome> {
        let end = (page_start as usize + page_size as usize).min(self.investors.len());
        let investors = self
            .investors
            .get(page_start as usize..end)
            .unwrap_or(&[])
            .to_vec();
        self.page_with(inbox, page_start, page_size, &investors, now)
    }

    /// Runs one page with a caller-chosen investor list
    fn page_with(
        &mut self,
        inbox: &mut Inbox,
        page_start: u32,
        page_size: u8,
        investors: &[InvestorEntry],
        now: i64,
    ) -> Result<PageOutcome> {
        let outcome = DistributionCrank::new(&self.policy, &mut *inbox, self.locks.clone())
            .run_page(
                &self.progress,
                &self.escrow,
                PageRequest {
                    page_start,
                    page_size,
                    investors,
                    now,
                },
            )?;
        self.commit(&outcome);
        Ok(outcome)
    }

    fn commit(&mut self, outcome: &PageOutcome) {
        for payout in &outcome.payouts {
            match payout.kind {
                PayoutKind::Investor => *self.paid.entry(payout.destination).or_default() += payout.amount,
                PayoutKind::Creator => self.creator_paid += payout.amount,
            }
        }
        self.progress = outcome.progress.clone();
        self.escrow = outcome.escrow;
    }

    /// Runs every page of one window
    fn run_window(&mut self, fees: u64, page_size: u8, now: i64) -> Result<()> {
        let mut inbox = self.inbox(fees);
        let mut page_start = 0;
        loop {
            let outcome = self.page(&mut inbox, page_start, page_size, now)?;
            if outcome.closed_window() {
                return Ok(());
            }
            page_start = match self.progress.phase(self.policy.investor_count) {
                WindowPhase::Snapshot => self.progress.snapshot_cursor,
                WindowPhase::Payout => self.progress.cursor,
                WindowPhase::Closed => return Ok(()),
            };
        }
    }

    fn paid_to(&self, index: usize) -> u64 {
        self.paid
            .get(&self.investors[index].destination)
            .copied()
            .unwrap_or_default()
    }
}

fn params(
    allocation_baseline: u64,
    investor_share_cap_bps: u16,
    daily_cap: u64,
    min_payout: u64,
    investor_count: u32,
) -> PolicyParams {
    PolicyParams {
        allocation_baseline,
        investor_share_cap_bps,
        daily_cap,
        min_payout,
        investor_count,
    }
}

#[test]
fn half_locked_pool_splits_pro_rata() {
    let mut subject = Subject::new(
        params(1_000_000, 5_000, 0, 1, 2),
        &[(300_000, 600_000), (200_000, 400_000)],
    );
    let mut inbox = subject.inbox(100);

    let outcome = subject.page(&mut inbox, 0, 2, T0).unwrap();

    assert_eq!(outcome.claimed, Some(100));
    assert_eq!(subject.paid_to(0), 30);
    assert_eq!(subject.paid_to(1), 20);
    assert_eq!(subject.creator_paid, 50);
    assert_eq!(outcome.creator_payout().map(|p| p.amount), Some(50));
    assert_eq!(outcome.investor_total(), 50);
    assert_eq!(subject.escrow.balance, 0);
    assert!(subject.progress.window_complete);
    assert_eq!(subject.progress.investor_pool, 50);
    assert!(matches!(outcome.events.first(), Some(CrankEvent::FeesClaimed(e)) if e.amount == 100));
    assert!(matches!(
        outcome.events.last(),
        Some(CrankEvent::CreatorPayoutWindowClosed(e)) if e.amount == 50 && e.distributed_to_investors == 50
    ));

    // Same window again
    let err = subject.page(&mut inbox, 0, 2, T0 + 60).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::DayAlreadyCompleted));
}

#[test]
fn fully_unlocked_window_goes_to_creator() {
    let mut subject = Subject::new(
        params(1_000_000, 5_000, 0, 1, 2),
        &[(0, 600_000), (0, 400_000)],
    );

    subject.run_window(100, 50, T0).unwrap();

    assert_eq!(subject.creator_paid, 100);
    assert!(subject.paid.is_empty());
    assert_eq!(subject.progress.distributed_to_creator_this_window, 100);
    assert_eq!(subject.escrow.balance, 0);
}

#[test]
fn multi_page_window_snapshots_before_paying() {
    let mut subject = Subject::new(
        params(1_000_000, 10_000, 0, 1, 3),
        &[(100_000, 100_000), (200_000, 200_000), (300_000, 300_000)],
    );
    let mut inbox = subject.inbox(1_000);

    let first = subject.page(&mut inbox, 0, 2, T0).unwrap();
    assert_eq!(first.claimed, Some(1_000));
    assert!(first.payouts.is_empty());
    assert_eq!(subject.progress.snapshot_cursor, 2);

    let second = subject.page(&mut inbox, 2, 2, T0 + 5).unwrap();
    assert!(second.payouts.is_empty());
    assert_eq!(subject.progress.locked_total, 600_000);
    assert_eq!(subject.progress.investor_pool, 600);
    assert_eq!(subject.progress.phase(3), WindowPhase::Payout);

    subject.page(&mut inbox, 0, 2, T0 + 10).unwrap();
    assert_eq!(subject.paid_to(0), 100);
    assert_eq!(subject.paid_to(1), 200);

    // Replaying the page that was just paid is refused
    let err = subject.page(&mut inbox, 0, 2, T0 + 11).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::PaginationNotSequential));
    let err = subject.page(&mut inbox, 5, 2, T0 + 11).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::InvalidPaginationCursor));
    assert_eq!(subject.progress.cursor, 2);

    let last = subject.page(&mut inbox, 2, 2, T0 + 12).unwrap();
    assert!(last.closed_window());
    assert_eq!(subject.paid_to(2), 300);
    assert_eq!(subject.creator_paid, 400);
    assert_eq!(subject.escrow.balance, 0);
}

#[test]
fn sub_minimum_payout_carries_as_dust_until_swept() {
    let mut subject = Subject::new(params(1_000, 10_000, 0, 1_000, 1), &[(500, 1_000)]);

    subject.run_window(10, 1, T0).unwrap();

    // pool = 10 * 5000 / 10000 = 5, below the floor of 1000
    assert_eq!(subject.paid_to(0), 0);
    assert!(subject.paid.is_empty());
    assert_eq!(subject.progress.dust, 5);
    assert_eq!(subject.creator_paid, 5);
    assert_eq!(subject.escrow.balance, 5);

    // Dust survives the next window
    subject.run_window(0, 1, T0 + SECONDS_PER_DAY).unwrap();
    assert_eq!(subject.progress.window_index, 2);
    assert_eq!(subject.progress.dust, 5);
    assert_eq!(subject.escrow.balance, 5);

    let sweep = sweep_dust(&subject.policy, &subject.progress, &subject.escrow, T0 + SECONDS_PER_DAY + 1)
        .unwrap();
    assert_eq!(sweep.payout.amount, 5);
    assert_eq!(sweep.progress.dust, 0);
    assert_eq!(sweep.escrow.balance, 0);
}

#[test]
fn daily_cap_scales_the_page_and_carries_the_rest() {
    let mut subject = Subject::new(params(1_000, 10_000, 50, 1, 2), &[(500, 500), (500, 500)]);

    subject.run_window(200, 2, T0).unwrap();

    // Both shares of 100 are scaled to the 50 budget
    assert_eq!(subject.paid_to(0), 25);
    assert_eq!(subject.paid_to(1), 25);
    assert_eq!(subject.creator_paid, 0);
    assert_eq!(subject.progress.cap_remaining, 0);
    assert_eq!(subject.progress.dust, 150);
    assert_eq!(subject.escrow.balance, 150);
    assert!(subject.progress.window_complete);

    let err = sweep_dust(&subject.policy, &subject.progress, &subject.escrow, T0 + 1).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::DailyCapExceeded));

    // A quiet window restores the budget and the sweep can spend it
    subject.run_window(0, 2, T0 + SECONDS_PER_DAY).unwrap();
    let sweep = sweep_dust(&subject.policy, &subject.progress, &subject.escrow, T0 + SECONDS_PER_DAY)
        .unwrap();
    assert_eq!(sweep.payout.amount, 50);
    assert_eq!(sweep.progress.dust, 100);
}

#[test]
fn repeated_investor_cannot_take_a_neighbours_share() {
    let mut subject = Subject::new(
        params(1_500, 10_000, 0, 1, 3),
        &[(500, 500), (500, 500), (500, 500)],
    );
    let mut inbox = subject.inbox(300);

    subject.page(&mut inbox, 0, 2, T0).unwrap();
    subject.page(&mut inbox, 2, 2, T0).unwrap();
    assert_eq!(subject.progress.phase(3), WindowPhase::Payout);
    assert_eq!(subject.progress.investor_pool, 300);

    let a = subject.investors[0];
    let err = subject.page_with(&mut inbox, 0, 2, &[a, a], T0).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::InvestorsNotOrdered));
    assert_eq!(subject.progress.cursor, 0);
    assert_eq!(subject.paid_to(0), 0);

    subject.page(&mut inbox, 0, 2, T0).unwrap();
    let last = subject.page(&mut inbox, 2, 2, T0).unwrap();
    assert!(last.closed_window());
    for index in 0..3 {
        assert_eq!(subject.paid_to(index), 100);
    }
    assert_eq!(subject.creator_paid, 0);
}

#[test]
fn foreign_fees_block_windows_until_recovered() {
    let mut subject = Subject::new(params(1_000, 5_000, 0, 1, 1), &[(1_000, 1_000)]);
    let mut inbox = subject.inbox(100);
    inbox.foreign = 7;

    let err = subject.page(&mut inbox, 0, 1, T0).unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::BaseFeesNotAllowed));
    assert!(subject.progress.is_fresh());
    assert_eq!(subject.escrow.balance, 0);

    let recovered = recover_foreign_fees(&subject.policy, inbox.foreign, T0 + 1).unwrap();
    assert_eq!(recovered.destination, subject.policy.foreign_destination);
    assert_eq!(recovered.amount, 7);
    inbox.foreign -= recovered.amount;
    // The failed transaction left the designated fees in the inbox
    inbox.pending = 100;

    let outcome = subject.page(&mut inbox, 0, 1, T0 + 1).unwrap();
    assert!(outcome.closed_window());
    assert_eq!(subject.paid_to(0), 50);
    assert_eq!(subject.creator_paid, 50);
}

#[test]
fn window_reopens_only_after_duration() {
    let mut subject = Subject::new(params(1_000, 5_000, 0, 1, 1), &[(1_000, 1_000)]);
    subject.run_window(100, 1, T0).unwrap();

    let err = subject
        .run_window(100, 1, T0 + SECONDS_PER_DAY - 1)
        .unwrap_err();
    assert_eq!(anchor_code(err), u32::from(ErrorCode::DayAlreadyCompleted));
    assert_eq!(subject.progress.window_index, 1);

    subject.run_window(100, 1, T0 + SECONDS_PER_DAY).unwrap();
    assert_eq!(subject.progress.window_index, 2);
    assert_eq!(subject.paid_to(0), 100);
    assert_eq!(subject.creator_paid, 100);
}

fn lock_strategy() -> impl Strategy<Value = (u64, u64)> {
    (1u64..1_000_000).prop_flat_map(|allocated| (0..=allocated, Just(allocated)))
}

proptest! {
    #[test]
    fn escrow_holds_exactly_the_carried_dust(
        locks in prop::collection::vec(lock_strategy(), 1..12),
        baseline in 1u64..20_000_000,
        cap_bps in 0u16..=10_000,
        daily_cap in prop_oneof![Just(0u64), 1u64..5_000_000],
        min_payout in 0u64..5_000,
        page_size in 1u8..=50,
        claims in prop::collection::vec(0u64..10_000_000, 1..4),
    ) {
        let count = locks.len() as u32;
        let mut subject = Subject::new(
            params(baseline, cap_bps, daily_cap, min_payout, count),
            &locks,
        );

        let mut claimed_total: u64 = 0;
        for (day, fees) in claims.iter().enumerate() {
            let now = T0 + day as i64 * SECONDS_PER_DAY;
            subject.run_window(*fees, page_size, now).unwrap();
            claimed_total += fees;

            let progress = &subject.progress;
            prop_assert!(progress.window_complete);
            prop_assert_eq!(subject.escrow.balance, progress.dust);
            prop_assert_eq!(
                progress.distributed_to_investors_this_window
                    + progress.distributed_to_creator_this_window
                    + progress.withheld_this_window,
                progress.claimed_this_window
            );
            prop_assert!(progress.distributed_to_investors_this_window <= progress.investor_pool);
            if daily_cap > 0 {
                prop_assert!(
                    progress.distributed_to_investors_this_window
                        + progress.distributed_to_creator_this_window
                        <= daily_cap
                );
            }
        }

        let investors_paid: u64 = subject.paid.values().sum();
        prop_assert_eq!(
            investors_paid + subject.creator_paid + subject.escrow.balance,
            claimed_total
        );
    }
}
