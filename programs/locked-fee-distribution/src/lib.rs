use anchor_lang::prelude::*;

declare_id!("FAAk54pcwJFvHD76YaB5sZzqXCEhUCVpP3cBvggKofuS");

pub mod adapters;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod states;

#[cfg(test)]
mod test_utils;

pub use instructions::*;
pub use events::*;
pub use states::PolicyParams;

#[program]
pub mod locked_fee_distribution {
    use super::*;

    pub fn initialize_policy(ctx: Context<InitializePolicy>, params: PolicyParams) -> Result<()> {
        InitializePolicy::handle(ctx, params)
    }

    pub fn distribute_fees<'info>(
        ctx: Context<'_, '_, '_, 'info, DistributeFees<'info>>,
        params: DistributeFeesParams,
    ) -> Result<()> {
        DistributeFees::handle(ctx, params)
    }

    pub fn sweep_dust(ctx: Context<SweepDust>) -> Result<()> {
        SweepDust::handle(ctx)
    }

    pub fn recover_foreign_fees(ctx: Context<RecoverForeignFees>) -> Result<()> {
        RecoverForeignFees::handle(ctx)
    }
}
