use anchor_lang::prelude::*;

use crate::errors::*;
use crate::state::*;

#[derive(Accounts)]
pub struct RefundEscrow<'info> {
    #[account(mut)]
    pub escrow: Account<'info, Escrow>,

    #[account(mut, constraint = advertiser.key() == escrow.advertiser @ EscrowError::InvalidPartyAddress)]
    pub advertiser: Signer<'info>,

    #[account(seeds = [ProgramConfig::SEED], bump = program_config.bump)]
    pub program_config: Account<'info, ProgramConfig>,
}

/// refund_escrow: allowed only if no leg has settled and the refund
/// timeout has elapsed since creation. Returns the full balance to the
/// advertiser and closes the account.
pub fn refund_escrow(ctx: Context<RefundEscrow>) -> Result<()> {
    let escrow = &ctx.accounts.escrow;
    require!(escrow.untouched(), EscrowError::NotRefundable);

    let now = Clock::get()?.unix_timestamp;
    let elapsed = now
        .checked_sub(escrow.created_at)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    require!(
        elapsed >= ctx.accounts.program_config.refund_timeout_secs,
        EscrowError::NotRefundable
    );

    let advertiser = ctx.accounts.advertiser.to_account_info();
    ctx.accounts.escrow.close(advertiser)?;

    Ok(())
}
