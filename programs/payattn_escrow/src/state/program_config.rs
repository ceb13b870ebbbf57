use anchor_lang::prelude::*;

/// Program configuration account. A single global PDA, set once at
/// `initialize_program` and read by `refund_escrow` — the refund timeout is
/// not part of the escrow account's bit-exact wire layout, so it lives here
/// instead of being captured per-escrow.
#[account]
#[derive(Debug)]
pub struct ProgramConfig {
    /// Program authority, allowed to update the refund timeout.
    pub authority: Pubkey,
    /// Seconds an escrow must sit untouched before `refund_escrow` is
    /// callable.
    pub refund_timeout_secs: i64,
    /// Bump seed for PDA.
    pub bump: u8,
}

impl ProgramConfig {
    /// Calculate space needed for account.
    pub const fn space() -> usize {
        8 + // discriminator
        32 + // authority
        8 + // refund_timeout_secs
        1 // bump
    }

    /// Program config PDA seed.
    pub const SEED: &'static [u8] = b"program_config";
}
