use anchor_lang::prelude::*;
use crate::constants::MAX_INVESTOR_SHARE_CAP_BPS;
use crate::errors::ErrorCode;

/// Numeric terms of a distribution policy, supplied once at creation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyParams {
    /// Total investor allocation at the reference epoch (Y0)
    pub allocation_baseline: u64,
    /// Maximum investor share of claimed fees in basis points
    pub investor_share_cap_bps: u16,
    /// Ceiling on investors + creator per window (0 = no cap)
    pub daily_cap: u64,
    /// Per-investor payout floor, smaller amounts accrue to dust
    pub min_payout: u64,
    /// Investors expected across all pages of a window
    pub investor_count: u32,
}

/// Identifiers binding a policy to its subject and assets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicySubject {
    pub vault: Pubkey,
    pub asset_mint: Pubkey,
    pub foreign_mint: Pubkey,
    pub creator_destination: Pubkey,
    pub foreign_destination: Pubkey,
    pub stream_program: Pubkey,
}

/// Distribution policy, immutable after creation
#[account]
#[derive(InitSpace, Debug)]
pub struct DistributionPolicy {
    /// Vault this policy belongs to
    pub vault: Pubkey,
    /// The single asset fees are distributed in
    pub asset_mint: Pubkey,
    /// Second pool asset; any amount of it in a claim is contamination
    pub foreign_mint: Pubkey,
    /// Creator token account receiving the window remainder
    pub creator_destination: Pubkey,
    /// Token account receiving foreign asset fees recovered from the inbox
    pub foreign_destination: Pubkey,
    /// Program owning the lock stream accounts investors present
    pub stream_program: Pubkey,
    /// Total investor allocation at the reference epoch (Y0)
    pub allocation_baseline: u64,
    /// Maximum investor fee share in basis points (0-10000)
    /// Actual share = min(this, locked fraction * 10000)
    pub investor_share_cap_bps: u16,
    /// Ceiling on total distributed per window (0 = no cap)
    pub daily_cap: u64,
    /// Minimum payout per investor
    pub min_payout: u64,
    /// Total investors in the distribution set
    pub investor_count: u32,
    /// Bump seed for the PDA
    pub bump: u8,
}

impl DistributionPolicy {
    pub fn validate_params(params: &PolicyParams) -> Result<()> {
        require!(
            params.investor_share_cap_bps <= MAX_INVESTOR_SHARE_CAP_BPS,
            ErrorCode::InvalidBasisPoints
        );
        require!(
            params.allocation_baseline > 0,
            ErrorCode::InvalidPoolConfiguration
        );
        require!(
            params.investor_count > 0,
            ErrorCode::InvalidPoolConfiguration
        );
        Ok(())
    }

    /// Validates the terms and binds them to the subject
    pub fn new(subject: PolicySubject, params: PolicyParams, bump: u8) -> Result<Self> {
        Self::validate_params(&params)?;
        require!(
            subject.asset_mint != subject.foreign_mint,
            ErrorCode::InvalidAssetConfiguration
        );

        Ok(Self {
            vault: subject.vault,
            asset_mint: subject.asset_mint,
            foreign_mint: subject.foreign_mint,
            creator_destination: subject.creator_destination,
            foreign_destination: subject.foreign_destination,
            stream_program: subject.stream_program,
            allocation_baseline: params.allocation_baseline,
            investor_share_cap_bps: params.investor_share_cap_bps,
            daily_cap: params.daily_cap,
            min_payout: params.min_payout,
            investor_count: params.investor_count,
            bump,
        })
    }

    pub fn is_capped(&self) -> bool {
        self.daily_cap > 0
    }

    /// Cap budget a freshly opened window starts with
    pub fn window_cap(&self) -> u64 {
        if self.is_capped() {
            self.daily_cap
        } else {
            u64::MAX
        }
    }
}
