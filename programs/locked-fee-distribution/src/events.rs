use anchor_lang::prelude::*;

/// Event emitted when a distribution policy and its escrow are created
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyInitialized {
    /// Vault the policy is bound to
    pub vault: Pubkey,
    /// Designated asset
    pub asset_mint: Pubkey,
    /// Asset whose presence in a claim is rejected
    pub foreign_mint: Pubkey,
    /// Creator token account receiving remainders
    pub creator_destination: Pubkey,
    /// Token account receiving recovered foreign fees
    pub foreign_destination: Pubkey,
    /// Escrow token account
    pub treasury: Pubkey,
    /// Y0 allocation (total investor allocation at the reference epoch)
    pub allocation_baseline: u64,
    /// Investor share cap in basis points
    pub investor_share_cap_bps: u16,
    /// Per-window cap (0 = no cap)
    pub daily_cap: u64,
    /// Minimum payout threshold
    pub min_payout: u64,
    /// Investors per window
    pub investor_count: u32,
    /// Timestamp of initialization
    pub timestamp: i64,
}

/// Event emitted when the opening page of a window claims fees into escrow
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeesClaimed {
    /// Window number
    pub window_index: u32,
    /// Amount of the designated asset claimed
    pub amount: u64,
    /// Window start timestamp
    pub timestamp: i64,
}

/// Event emitted for each page of the lock snapshot pass
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSnapshotPage {
    pub window_index: u32,
    pub page_start: u32,
    pub page_end: u32,
    /// Locked balances summed on this page
    pub locked_subtotal: u64,
    /// Running locked total for the window
    pub locked_total: u64,
}

/// Event emitted for each page of investor payouts
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorPayoutPage {
    /// Window number
    pub window_index: u32,
    /// First investor index of the page
    pub page_start: u32,
    /// One past the last investor index of the page
    pub page_end: u32,
    /// Investors that received a transfer
    pub investors_paid: u8,
    /// Amount transferred on this page
    pub total_amount: u64,
    /// Amount routed into dust on this page
    pub withheld_amount: u64,
}

/// Event emitted for each investor settled on a payout page
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorPayout {
    pub window_index: u32,
    /// Investor wallet
    pub investor: Pubkey,
    /// Investor token account
    pub destination: Pubkey,
    /// Locked balance at window start
    pub locked: u64,
    /// Investor weight in basis points
    pub weight_bps: u64,
    /// Pro-rata share before floor and cap
    pub calculated_payout: u64,
    /// Amount actually transferred
    pub actual_payout: u64,
    /// Amount routed into dust
    pub withheld: u64,
}

/// Event emitted when the final page pays the creator and closes the window
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorPayoutWindowClosed {
    pub window_index: u32,
    /// Creator token account
    pub creator: Pubkey,
    /// Remainder transferred to the creator
    pub amount: u64,
    /// Start timestamp of the closed window
    pub window_timestamp: i64,
    /// Total transferred to investors this window
    pub distributed_to_investors: u64,
    /// Dust liability carried after the window
    pub carried_dust: u64,
}

/// Event emitted when carried dust is swept to the creator
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustSwept {
    /// Creator token account
    pub creator: Pubkey,
    /// Amount swept
    pub amount: u64,
    /// Dust left after the sweep
    pub remaining_dust: u64,
    /// Timestamp of the sweep
    pub timestamp: i64,
}

/// Event emitted when foreign asset fees are moved out of the foreign inbox
#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignFeesRecovered {
    /// Vault the inbox belongs to
    pub vault: Pubkey,
    /// Mint of the recovered tokens
    pub foreign_mint: Pubkey,
    /// Policy-designated token account that received them
    pub destination: Pubkey,
    /// Amount recovered
    pub amount: u64,
    /// Timestamp of the recovery
    pub timestamp: i64,
}
