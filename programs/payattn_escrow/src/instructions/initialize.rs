use anchor_lang::prelude::*;

use crate::constants::DEFAULT_REFUND_TIMEOUT_SECS;
use crate::state::*;

/// Initialize the program-wide config PDA. Called once per deployment.
#[derive(Accounts)]
pub struct InitializeProgram<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = ProgramConfig::space(),
        seeds = [ProgramConfig::SEED],
        bump
    )]
    pub program_config: Account<'info, ProgramConfig>,
    pub system_program: Program<'info, System>,
}

pub fn initialize_program(
    ctx: Context<InitializeProgram>,
    refund_timeout_secs: Option<i64>,
) -> Result<()> {
    let program_config = &mut ctx.accounts.program_config;

    program_config.authority = ctx.accounts.authority.key();
    program_config.refund_timeout_secs =
        refund_timeout_secs.unwrap_or(DEFAULT_REFUND_TIMEOUT_SECS);
    program_config.bump = ctx.bumps.program_config;

    Ok(())
}
