use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::adapters::transfer_signed;
use crate::constants::{FOREIGN_INBOX_SEED, POLICY_SEED, TREASURY_AUTHORITY_SEED, VAULT_SEED};
use crate::engine;
use crate::states::DistributionPolicy;

/// Empties the foreign inbox into the policy's foreign destination so windows can open again
#[derive(Accounts)]
pub struct RecoverForeignFees<'info> {
    pub caller: Signer<'info>,

    /// CHECK: Used only for PDA derivation
    pub vault: UncheckedAccount<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), POLICY_SEED],
        bump = policy.bump,
        has_one = vault,
        has_one = foreign_mint,
        has_one = foreign_destination,
    )]
    pub policy: Box<Account<'info, DistributionPolicy>>,

    pub foreign_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.key().as_ref(), FOREIGN_INBOX_SEED],
        bump,
        token::mint = foreign_mint,
        token::authority = treasury_authority,
    )]
    pub foreign_inbox: Box<Account<'info, TokenAccount>>,

    /// CHECK: PDA that owns the foreign inbox
    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_AUTHORITY_SEED],
        bump
    )]
    pub treasury_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = foreign_mint,
    )]
    pub foreign_destination: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

impl<'info> RecoverForeignFees<'info> {
    pub fn handle(ctx: Context<RecoverForeignFees>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let recovered = engine::recover_foreign_fees(
            &ctx.accounts.policy,
            ctx.accounts.foreign_inbox.amount,
            now,
        )?;

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
            ctx.accounts.foreign_inbox.to_account_info(),
            ctx.accounts.foreign_destination.to_account_info(),
            ctx.accounts.treasury_authority.to_account_info(),
            signer_seeds,
            recovered.amount,
        )?;

        emit!(recovered);
        Ok(())
    }
}
