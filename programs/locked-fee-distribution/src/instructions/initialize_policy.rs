use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::constants::{
    FEE_INBOX_SEED, FOREIGN_INBOX_SEED, POLICY_SEED, PROGRESS_SEED, TREASURY_AUTHORITY_SEED,
    TREASURY_SEED, VAULT_SEED,
};
use crate::errors::ErrorCode;
use crate::events::PolicyInitialized;
use crate::states::{DistributionPolicy, DistributionProgress, PolicyParams, PolicySubject};

/// Creates the policy, zeroed progress, escrow and fee inboxes for a vault
#[derive(Accounts)]
pub struct InitializePolicy<'info> {
    /// Pays for every account created here
    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Used only for PDA derivation
    pub vault: UncheckedAccount<'info>,

    /// The designated asset
    pub asset_mint: Box<Account<'info, Mint>>,

    /// The pool's other asset
    pub foreign_mint: Box<Account<'info, Mint>>,

    /// Creator token account receiving window remainders
    #[account(
        constraint = creator_destination.mint == asset_mint.key() @ ErrorCode::InvalidAssetConfiguration
    )]
    pub creator_destination: Box<Account<'info, TokenAccount>>,

    /// Token account receiving foreign asset fees recovered from the inbox
    #[account(
        constraint = foreign_destination.mint == foreign_mint.key() @ ErrorCode::InvalidAssetConfiguration
    )]
    pub foreign_destination: Box<Account<'info, TokenAccount>>,

    /// CHECK: Program expected to own investors' lock streams
    #[account(executable)]
    pub stream_program: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        space = DistributionPolicy::DISCRIMINATOR.len() + DistributionPolicy::INIT_SPACE,
        seeds = [VAULT_SEED, vault.key().as_ref(), POLICY_SEED],
        bump
    )]
    pub policy: Box<Account<'info, DistributionPolicy>>,

    #[account(
        init,
        payer = authority,
        space = DistributionProgress::DISCRIMINATOR.len() + DistributionProgress::INIT_SPACE,
        seeds = [VAULT_SEED, vault.key().as_ref(), PROGRESS_SEED],
        bump
    )]
    pub progress: Box<Account<'info, DistributionProgress>>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_SEED],
        bump,
        token::mint = asset_mint,
        token::authority = treasury_authority,
    )]
    pub treasury: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, vault.key().as_ref(), FEE_INBOX_SEED],
        bump,
        token::mint = asset_mint,
        token::authority = treasury_authority,
    )]
    pub fee_inbox: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, vault.key().as_ref(), FOREIGN_INBOX_SEED],
        bump,
        token::mint = foreign_mint,
        token::authority = treasury_authority,
    )]
    pub foreign_inbox: Box<Account<'info, TokenAccount>>,

    /// CHECK: PDA that owns the treasury and both inboxes
    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_AUTHORITY_SEED],
        bump
    )]
    pub treasury_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

impl<'info> InitializePolicy<'info> {
    pub fn handle(ctx: Context<InitializePolicy>, params: PolicyParams) -> Result<()> {
        msg!("Initializing distribution policy for vault {}", ctx.accounts.vault.key());

        let vault = ctx.accounts.vault.key();
        let policy = DistributionPolicy::new(
            PolicySubject {
                vault,
                asset_mint: ctx.accounts.asset_mint.key(),
                foreign_mint: ctx.accounts.foreign_mint.key(),
                creator_destination: ctx.accounts.creator_destination.key(),
                foreign_destination: ctx.accounts.foreign_destination.key(),
                stream_program: ctx.accounts.stream_program.key(),
            },
            params,
            ctx.bumps.policy,
        )?;

        msg!("Allocation baseline: {}", params.allocation_baseline);
        msg!("Investor share cap: {} bps", params.investor_share_cap_bps);
        msg!("Daily cap: {} (0 = uncapped)", params.daily_cap);
        msg!("Minimum payout: {}", params.min_payout);
        msg!("Investors per window: {}", params.investor_count);

        ctx.accounts.policy.set_inner(policy);
        ctx.accounts
            .progress
            .set_inner(DistributionProgress::new(vault, ctx.bumps.progress));

        emit!(PolicyInitialized {
            vault,
            asset_mint: ctx.accounts.asset_mint.key(),
            foreign_mint: ctx.accounts.foreign_mint.key(),
            creator_destination: ctx.accounts.creator_destination.key(),
            foreign_destination: ctx.accounts.foreign_destination.key(),
            treasury: ctx.accounts.treasury.key(),
            allocation_baseline: params.allocation_baseline,
            investor_share_cap_bps: params.investor_share_cap_bps,
            daily_cap: params.daily_cap,
            min_payout: params.min_payout,
            investor_count: params.investor_count,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }
}
