use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::constants::{seeds, MAX_OFFER_ID_LEN};
use crate::errors::*;
use crate::state::*;

/// Create a new escrow for an ad offer. Locks advertiser lamports in the
/// escrow PDA until the three settlement legs land.
#[derive(Accounts)]
#[instruction(offer_id: Vec<u8>, amount: u64)]
pub struct CreateEscrow<'info> {
    #[account(
        mut,
        constraint = offer_id.len() <= MAX_OFFER_ID_LEN @ EscrowError::OfferIdTooLong
    )]
    pub advertiser: Signer<'info>,

    /// CHECK: captured into escrow.user; ownership proven at settle_user.
    pub user: UncheckedAccount<'info>,

    /// CHECK: captured into escrow.platform; ownership proven at settle_platform.
    pub platform: UncheckedAccount<'info>,

    #[account(
        init,
        payer = advertiser,
        space = Escrow::space(),
        seeds = [seeds::ESCROW, offer_id.as_slice()],
        bump
    )]
    pub escrow: Account<'info, Escrow>,

    pub system_program: Program<'info, System>,
}

pub fn create_escrow(ctx: Context<CreateEscrow>, offer_id: Vec<u8>, amount: u64) -> Result<()> {
    require!(amount > 0, EscrowError::AmountZero);
    require!(
        ctx.accounts.advertiser.lamports() >= amount,
        EscrowError::InsufficientFunds
    );

    let cpi_context = CpiContext::new(
        ctx.accounts.system_program.to_account_info(),
        system_program::Transfer {
            from: ctx.accounts.advertiser.to_account_info(),
            to: ctx.accounts.escrow.to_account_info(),
        },
    );
    system_program::transfer(cpi_context, amount)?;

    let escrow = &mut ctx.accounts.escrow;
    escrow.offer_id = offer_id;
    escrow.advertiser = ctx.accounts.advertiser.key();
    escrow.user = ctx.accounts.user.key();
    escrow.platform = ctx.accounts.platform.key();
    escrow.amount = amount;
    escrow.created_at = Clock::get()?.unix_timestamp;
    escrow.user_settled = false;
    escrow.publisher_settled = false;
    escrow.platform_settled = false;
    escrow.bump = ctx.bumps.escrow;

    emit!(EscrowCreated {
        offer_id: escrow.offer_id.clone(),
        advertiser: escrow.advertiser,
        user: escrow.user,
        amount,
    });

    msg!(
        "escrow created: advertiser={}, amount={} lamports",
        escrow.advertiser,
        amount
    );

    Ok(())
}

#[event]
pub struct EscrowCreated {
    pub offer_id: Vec<u8>,
    pub advertiser: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
}
