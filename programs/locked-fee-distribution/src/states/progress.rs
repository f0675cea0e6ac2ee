use anchor_lang::prelude::*;
use crate::errors::ErrorCode;

/// Which pass of the window a page belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPhase {
    /// No window has been opened, or the last one completed
    Closed,
    /// Summing locked balances before any payout
    Snapshot,
    /// Paying investors against the fixed snapshot
    Payout,
}

/// Tracks the state of the ongoing distribution across windows and pages
#[account]
#[derive(InitSpace, Debug)]
pub struct DistributionProgress {
    /// Vault this progress belongs to
    pub vault: Pubkey,
    /// Start timestamp of the last opened window (0 before the first run)
    pub window_start_ts: i64,
    /// Number of windows opened so far
    pub window_index: u32,
    /// Next investor to pay in the current window
    pub cursor: u32,
    /// Next investor to snapshot in the current window
    pub snapshot_cursor: u32,
    /// Whether the current window paid every investor and the creator
    pub window_complete: bool,
    /// Fees claimed when the window opened
    pub claimed_this_window: u64,
    /// Fees transferred to investors this window
    pub distributed_to_investors_this_window: u64,
    /// Fees transferred to the creator this window
    pub distributed_to_creator_this_window: u64,
    /// Amount routed into dust this window
    pub withheld_this_window: u64,
    /// Withheld residue carried across pages and windows
    pub dust: u64,
    /// Cap budget left for this window (u64::MAX when uncapped)
    pub cap_remaining: u64,
    /// Sum of locked balances fixed by the snapshot pass
    pub locked_total: u64,
    /// Sum of allocations reported by lock sources during the snapshot
    pub allocated_total: u64,
    /// Locked balances of investors already settled by the payout pass
    pub locked_settled: u64,
    /// Eligible investor share of the claimed fees
    pub investor_pool: u64,
    /// Lock source of the last investor read by the active pass
    pub last_lock_source: Pubkey,
    /// Set once a page had to be scaled down to the cap; later investors are withheld
    pub cap_reached: bool,
    /// Bump seed for the PDA
    pub bump: u8,
}

impl DistributionProgress {
    /// Zero progress for a freshly created policy
    pub fn new(vault: Pubkey, bump: u8) -> Self {
        Self {
            vault,
            window_start_ts: 0,
            window_index: 0,
            cursor: 0,
            snapshot_cursor: 0,
            window_complete: false,
            claimed_this_window: 0,
            distributed_to_investors_this_window: 0,
            distributed_to_creator_this_window: 0,
            withheld_this_window: 0,
            dust: 0,
            cap_remaining: 0,
            locked_total: 0,
            allocated_total: 0,
            locked_settled: 0,
            investor_pool: 0,
            last_lock_source: Pubkey::default(),
            cap_reached: false,
            bump,
        }
    }

    /// True until the first window opens
    pub fn is_fresh(&self) -> bool {
        self.window_index == 0
    }

    /// A window has been opened and not yet completed
    pub fn is_window_open(&self) -> bool {
        !self.is_fresh() && !self.window_complete
    }

    pub fn phase(&self, investor_count: u32) -> WindowPhase {
        if !self.is_window_open() {
            WindowPhase::Closed
        } else if self.snapshot_cursor < investor_count {
            WindowPhase::Snapshot
        } else {
            WindowPhase::Payout
        }
    }

    /// Whether the window duration has passed since the last window opened
    pub fn window_elapsed(&self, now: i64, window_duration: i64) -> Result<bool> {
        let elapsed = now
            .checked_sub(self.window_start_ts)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(elapsed >= window_duration)
    }

    /// Resets the per-window state. Dust is a liability and survives.
    pub fn start_new_window(&mut self, now: i64, cap: u64) -> Result<()> {
        self.window_start_ts = now;
        self.window_index = self
            .window_index
            .checked_add(1)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        self.cursor = 0;
        self.snapshot_cursor = 0;
        self.window_complete = false;
        self.claimed_this_window = 0;
        self.distributed_to_investors_this_window = 0;
        self.distributed_to_creator_this_window = 0;
        self.withheld_this_window = 0;
        self.cap_remaining = cap;
        self.locked_total = 0;
        self.allocated_total = 0;
        self.locked_settled = 0;
        self.investor_pool = 0;
        self.last_lock_source = Pubkey::default();
        self.cap_reached = false;

        msg!("Started distribution window {} at {}", self.window_index, now);
        Ok(())
    }

    /// Routes an unpaid amount into the dust liability
    pub fn withhold(&mut self, amount: u64) -> Result<()> {
        self.withheld_this_window = self
            .withheld_this_window
            .checked_add(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        self.dust = self
            .dust
            .checked_add(amount)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(())
    }

    /// Consumes cap budget for a transfer, returning how much may move
    pub fn take_cap(&mut self, requested: u64) -> u64 {
        let granted = requested.min(self.cap_remaining);
        self.cap_remaining -= granted;
        granted
    }

    /// Each pass must walk the investor set in strictly increasing lock source order
    pub fn advance_lock_source(&mut self, lock_source: Pubkey) -> Result<()> {
        require!(
            lock_source > self.last_lock_source,
            ErrorCode::InvestorsNotOrdered
        );
        self.last_lock_source = lock_source;
        Ok(())
    }

    /// Amount the creator is owed when the window closes
    pub fn creator_remainder(&self) -> Result<u64> {
        let remainder = self
            .claimed_this_window
            .checked_sub(self.distributed_to_investors_this_window)
            .ok_or(ErrorCode::ArithmeticOverflow)?
            .checked_sub(self.withheld_this_window)
            .ok_or(ErrorCode::ArithmeticOverflow)?;
        Ok(remainder)
    }
}
