use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::state::*;

/// Lamports an escrow must retain to stay rent-exempt; subtracted from
/// `amount` before computing the 70/25/5 split.
pub fn rent_reserve() -> Result<u64> {
    Ok(Rent::get()?.minimum_balance(Escrow::space()))
}

/// `amount` minus the rent reserve. This is the pool the three settlement
/// legs divide.
pub fn distributable_amount(escrow: &Escrow) -> Result<u64> {
    escrow
        .amount
        .checked_sub(rent_reserve()?)
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))
}

/// Splits `distributable` into (user_share, publisher_share, platform_share)
/// with platform absorbing the rounding remainder. Each share is
/// independently derivable from `distributable` alone, so any leg can be
/// recomputed without reading the others.
pub fn compute_splits(distributable: u64) -> Result<(u64, u64, u64)> {
    let user_share = distributable
        .checked_mul(USER_SHARE_BPS)
        .and_then(|v| v.checked_div(BPS_DENOMINATOR))
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))?;
    let publisher_share = distributable
        .checked_mul(PUBLISHER_SHARE_BPS)
        .and_then(|v| v.checked_div(BPS_DENOMINATOR))
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))?;
    let platform_share = distributable
        .checked_sub(user_share)
        .and_then(|v| v.checked_sub(publisher_share))
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))?;

    Ok((user_share, publisher_share, platform_share))
}

/// Move `amount` lamports directly between two accounts owned by this
/// program. The escrow PDA is owned by `payattn_escrow`, not the system
/// program, so a `system_program::transfer` CPI is unavailable here; direct
/// lamport mutation under the program's own authority is the standard
/// pattern for paying out of a program-owned PDA.
pub fn transfer_from_escrow<'info>(
    escrow: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    **escrow.try_borrow_mut_lamports()? = escrow
        .lamports()
        .checked_sub(amount)
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))?;
    **to.try_borrow_mut_lamports()? = to
        .lamports()
        .checked_add(amount)
        .ok_or_else(|| error!(EscrowError::ArithmeticOverflow))?;
    Ok(())
}
