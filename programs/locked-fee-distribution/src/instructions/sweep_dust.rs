use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::adapters::transfer_signed;
use crate::constants::{POLICY_SEED, PROGRESS_SEED, TREASURY_AUTHORITY_SEED, TREASURY_SEED, VAULT_SEED};
use crate::engine::{self, Escrow};
use crate::states::{DistributionPolicy, DistributionProgress};

/// Pays carried dust to the creator while no window is open
#[derive(Accounts)]
pub struct SweepDust<'info> {
    pub caller: Signer<'info>,

    /// CHECK: Used only for PDA derivation
    pub vault: UncheckedAccount<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), POLICY_SEED],
        bump = policy.bump,
        has_one = vault,
        has_one = asset_mint,
        has_one = creator_destination,
    )]
    pub policy: Box<Account<'info, DistributionPolicy>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.key().as_ref(), PROGRESS_SEED],
        bump = progress.bump,
        has_one = vault,
    )]
    pub progress: Box<Account<'info, DistributionProgress>>,

    pub asset_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_SEED],
        bump,
        token::mint = asset_mint,
        token::authority = treasury_authority,
    )]
    pub treasury: Box<Account<'info, TokenAccount>>,

    /// CHECK: PDA that owns the treasury
    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_AUTHORITY_SEED],
        bump
    )]
    pub treasury_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = asset_mint,
    )]
    pub creator_destination: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

impl<'info> SweepDust<'info> {
    pub fn handle(ctx: Context<SweepDust>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let escrow = Escrow::new(ctx.accounts.treasury.mint, ctx.accounts.treasury.amount);
        let sweep = engine::sweep_dust(&ctx.accounts.policy, &ctx.accounts.progress, &escrow, now)?;

        let vault_key = ctx.accounts.vault.key();
        let authority_bump = ctx.bumps.treasury_authority;
        let signer_seeds: &[&[&[u8]]] = &[&[
            VAULT_SEED,
            vault_key.as_ref(),
            TREASURY_AUTHORITY_SEED,
            &[authority_bump],
        ]];

        transfer_signed(
            &ctx.accounts.token_program,
            ctx.accounts.treasury.to_account_info(),
            ctx.accounts.creator_destination.to_account_info(),
            ctx.accounts.treasury_authority.to_account_info(),
            signer_seeds,
            sweep.payout.amount,
        )?;

        emit!(sweep.event);
        ctx.accounts.progress.set_inner(sweep.progress);

        Ok(())
    }
}
