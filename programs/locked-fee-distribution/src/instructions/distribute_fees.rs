use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount};
use crate::adapters::{transfer_signed, InboxFeeSource, StreamLockOracle};
use crate::constants::{
    ACCOUNTS_PER_INVESTOR, FEE_INBOX_SEED, FOREIGN_INBOX_SEED, POLICY_SEED, PROGRESS_SEED,
    TREASURY_AUTHORITY_SEED, TREASURY_SEED, VAULT_SEED,
};
use crate::engine::{
    CrankEvent, DistributionCrank, Escrow, InvestorEntry, PageRequest, PayoutKind,
};
use crate::errors::ErrorCode;
use crate::states::{DistributionPolicy, DistributionProgress};

/// Permissionless crank processing one page of a distribution window.
///
/// Remaining accounts carry the page's investors as pairs of
/// (receiving token account, lock stream account), ordered by ascending stream
/// account key across the whole window.
#[derive(Accounts)]
pub struct DistributeFees<'info> {
    /// Anyone may crank
    pub caller: Signer<'info>,

    /// CHECK: Used only for PDA derivation
    pub vault: UncheckedAccount<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.key().as_ref(), POLICY_SEED],
        bump = policy.bump,
        has_one = vault,
        has_one = asset_mint,
        has_one = foreign_mint,
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

    pub foreign_mint: Box<Account<'info, Mint>>,

    /// Escrow holding claimed fees until they are paid out
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.key().as_ref(), TREASURY_SEED],
        bump,
        token::mint = asset_mint,
        token::authority = treasury_authority,
    )]
    pub treasury: Box<Account<'info, TokenAccount>>,

    /// Inbox accruing designated asset fees
    #[account(
        mut,
        seeds = [VAULT_SEED, vault.key().as_ref(), FEE_INBOX_SEED],
        bump,
        token::mint = asset_mint,
        token::authority = treasury_authority,
    )]
    pub fee_inbox: Box<Account<'info, TokenAccount>>,

    /// Inbox accruing fees in the foreign asset
    #[account(
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

    /// Creator token account receiving the window remainder
    #[account(
        mut,
        token::mint = asset_mint,
    )]
    pub creator_destination: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct DistributeFeesParams {
    /// Index of the first investor on this page
    pub page_start: u32,
    /// Investors per page (1-50)
    pub page_size: u8,
}

impl<'info> DistributeFees<'info> {
    pub fn handle(
        ctx: Context<'_, '_, '_, 'info, DistributeFees<'info>>,
        params: DistributeFeesParams,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        msg!(
            "Distribution crank - page start {}, page size {}",
            params.page_start,
            params.page_size
        );

        let remaining = ctx.remaining_accounts;
        require!(
            remaining.len() % ACCOUNTS_PER_INVESTOR == 0,
            ErrorCode::InvalidPageSize
        );
        let investors = remaining
            .chunks(ACCOUNTS_PER_INVESTOR)
            .map(investor_entry)
            .collect::<Result<Vec<_>>>()?;

        let outcome = {
            let fee_source = InboxFeeSource::new(&ctx.accounts.fee_inbox, &ctx.accounts.foreign_inbox);
            let lock_oracle = StreamLockOracle::new(ctx.accounts.policy.stream_program, remaining);
            let escrow = Escrow::new(ctx.accounts.treasury.mint, ctx.accounts.treasury.amount);

            DistributionCrank::new(&ctx.accounts.policy, fee_source, lock_oracle).run_page(
                &ctx.accounts.progress,
                &escrow,
                PageRequest {
                    page_start: params.page_start,
                    page_size: params.page_size,
                    investors: &investors,
                    now,
                },
            )?
        };

        let vault_key = ctx.accounts.vault.key();
        let authority_bump = ctx.bumps.treasury_authority;
        let signer_seeds: &[&[&[u8]]] = &[&[
            VAULT_SEED,
            vault_key.as_ref(),
            TREASURY_AUTHORITY_SEED,
            &[authority_bump],
        ]];

        if let Some(claimed) = outcome.claimed {
            transfer_signed(
                &ctx.accounts.token_program,
                ctx.accounts.fee_inbox.to_account_info(),
                ctx.accounts.treasury.to_account_info(),
                ctx.accounts.treasury_authority.to_account_info(),
                signer_seeds,
                claimed,
            )?;
        }

        for payout in &outcome.payouts {
            let destination = match payout.kind {
                PayoutKind::Investor => remaining
                    .iter()
                    .find(|a| a.key == &payout.destination)
                    .cloned()
                    .ok_or_else(|| error!(ErrorCode::InvalidInvestorATA))?,
                PayoutKind::Creator => ctx.accounts.creator_destination.to_account_info(),
            };

            transfer_signed(
                &ctx.accounts.token_program,
                ctx.accounts.treasury.to_account_info(),
                destination,
                ctx.accounts.treasury_authority.to_account_info(),
                signer_seeds,
                payout.amount,
            )?;
        }

        msg!(
            "Page paid {} units to investors, {} units of dust carried",
            outcome.investor_total(),
            outcome.progress.dust
        );

        for event in outcome.events {
            emit_crank_event(event);
        }
        ctx.accounts.progress.set_inner(outcome.progress);

        Ok(())
    }
}

/// Reads one (receiving account, stream account) pair
fn investor_entry(pair: &[AccountInfo<'_>]) -> Result<InvestorEntry> {
    let [destination, stream] = pair else {
        return err!(ErrorCode::InvalidPageSize);
    };

    require_keys_eq!(*destination.owner, token::ID, ErrorCode::InvalidInvestorATA);
    let token_account = {
        let data = destination.try_borrow_data()?;
        TokenAccount::try_deserialize(&mut &data[..])
            .map_err(|_| error!(ErrorCode::InvalidInvestorATA))?
    };

    Ok(InvestorEntry {
        investor: token_account.owner,
        destination: destination.key(),
        destination_asset: token_account.mint,
        lock_source: stream.key(),
    })
}

fn emit_crank_event(event: CrankEvent) {
    match event {
        CrankEvent::FeesClaimed(e) => emit!(e),
        CrankEvent::LockSnapshotPage(e) => emit!(e),
        CrankEvent::InvestorPayoutPage(e) => emit!(e),
        CrankEvent::InvestorPayout(e) => emit!(e),
        CrankEvent::CreatorPayoutWindowClosed(e) => emit!(e),
    }
}
