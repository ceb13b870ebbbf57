use anchor_lang::prelude::*;

use crate::errors::*;
use crate::instructions::utils::{compute_splits, distributable_amount, transfer_from_escrow};
use crate::state::*;

/// Which of the three settlement legs an instruction call or event concerns.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementLeg {
    User,
    Publisher,
    Platform,
}

#[derive(Accounts)]
pub struct SettleUser<'info> {
    #[account(mut)]
    pub escrow: Account<'info, Escrow>,

    /// CHECK: must equal escrow.user, enforced below.
    #[account(mut, constraint = user.key() == escrow.user @ EscrowError::InvalidPartyAddress)]
    pub user: UncheckedAccount<'info>,
}

/// settle_user: pays the 70% share. Commutative with settle_publisher —
/// either may land first.
pub fn settle_user(ctx: Context<SettleUser>) -> Result<()> {
    require!(!ctx.accounts.escrow.user_settled, EscrowError::AlreadySettled);

    let distributable = distributable_amount(&ctx.accounts.escrow)?;
    let (user_share, _, _) = compute_splits(distributable)?;

    transfer_from_escrow(
        &ctx.accounts.escrow.to_account_info(),
        &ctx.accounts.user.to_account_info(),
        user_share,
    )?;

    ctx.accounts.escrow.user_settled = true;

    emit!(LegSettled {
        offer_id: ctx.accounts.escrow.offer_id.clone(),
        leg: SettlementLeg::User,
        amount: user_share,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SettlePublisher<'info> {
    #[account(mut)]
    pub escrow: Account<'info, Escrow>,

    /// CHECK: the publisher is bound at settlement time, not at creation —
    /// any account supplied here is trusted by design (see DESIGN.md).
    #[account(mut)]
    pub publisher: UncheckedAccount<'info>,
}

/// settle_publisher: pays the 25% share. Commutative with settle_user.
pub fn settle_publisher(ctx: Context<SettlePublisher>) -> Result<()> {
    require!(
        !ctx.accounts.escrow.publisher_settled,
        EscrowError::AlreadySettled
    );

    let distributable = distributable_amount(&ctx.accounts.escrow)?;
    let (_, publisher_share, _) = compute_splits(distributable)?;

    transfer_from_escrow(
        &ctx.accounts.escrow.to_account_info(),
        &ctx.accounts.publisher.to_account_info(),
        publisher_share,
    )?;

    ctx.accounts.escrow.publisher_settled = true;

    emit!(LegSettled {
        offer_id: ctx.accounts.escrow.offer_id.clone(),
        leg: SettlementLeg::Publisher,
        amount: publisher_share,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SettlePlatform<'info> {
    #[account(mut)]
    pub escrow: Account<'info, Escrow>,

    /// CHECK: must equal escrow.platform, enforced below.
    #[account(mut, constraint = platform.key() == escrow.platform @ EscrowError::InvalidPartyAddress)]
    pub platform: UncheckedAccount<'info>,

    /// CHECK: must equal escrow.advertiser; receives the rent reserve once
    /// all three legs have landed and the account closes.
    #[account(mut, constraint = advertiser.key() == escrow.advertiser @ EscrowError::InvalidPartyAddress)]
    pub advertiser: UncheckedAccount<'info>,
}

/// settle_platform: pays the 5% remainder share. Must observe
/// user_settled && publisher_settled — this is the only ordering gate in
/// the state machine. Closes the escrow and returns the rent reserve to
/// the advertiser once all three flags are true.
pub fn settle_platform(ctx: Context<SettlePlatform>) -> Result<()> {
    require!(
        !ctx.accounts.escrow.platform_settled,
        EscrowError::AlreadySettled
    );
    require!(
        ctx.accounts.escrow.user_settled && ctx.accounts.escrow.publisher_settled,
        EscrowError::PrerequisiteNotSettled
    );

    let distributable = distributable_amount(&ctx.accounts.escrow)?;
    let (_, _, platform_share) = compute_splits(distributable)?;

    transfer_from_escrow(
        &ctx.accounts.escrow.to_account_info(),
        &ctx.accounts.platform.to_account_info(),
        platform_share,
    )?;

    ctx.accounts.escrow.platform_settled = true;

    emit!(LegSettled {
        offer_id: ctx.accounts.escrow.offer_id.clone(),
        leg: SettlementLeg::Platform,
        amount: platform_share,
    });

    if ctx.accounts.escrow.fully_settled() {
        let advertiser = ctx.accounts.advertiser.to_account_info();
        ctx.accounts.escrow.close(advertiser)?;
    }

    Ok(())
}

#[event]
pub struct LegSettled {
    pub offer_id: Vec<u8>,
    pub leg: SettlementLeg,
    pub amount: u64,
}
