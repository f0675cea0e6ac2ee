use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::engine::{FeeClaim, FeeSource};

/// Fee source backed by the vault's inbox token accounts.
///
/// Fees accrue into two inboxes, one per mint. A claim reports both balances;
/// the caller moves the designated balance into the treasury once the engine
/// accepts it.
#[derive(Clone, Copy, Debug)]
pub struct InboxFeeSource {
    asset: Pubkey,
    asset_amount: u64,
    foreign_amount: u64,
}

impl InboxFeeSource {
    pub fn new(fee_inbox: &TokenAccount, foreign_inbox: &TokenAccount) -> Self {
        Self {
            asset: fee_inbox.mint,
            asset_amount: fee_inbox.amount,
            foreign_amount: foreign_inbox.amount,
        }
    }
}

impl FeeSource for InboxFeeSource {
    fn claim(&mut self, _vault: &Pubkey) -> Result<FeeClaim> {
        let claim = FeeClaim {
            asset: self.asset,
            amount: self.asset_amount,
            foreign_amount: self.foreign_amount,
        };
        // A second claim in the same instruction finds the inboxes drained
        self.asset_amount = 0;
        self.foreign_amount = 0;
        Ok(claim)
    }
}

/// Moves tokens out of an account owned by the treasury authority PDA
pub fn transfer_signed<'info>(
    token_program: &Program<'info, Token>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            Transfer {
                from,
                to,
                authority,
            },
            signer_seeds,
        ),
        amount,
    )
}
