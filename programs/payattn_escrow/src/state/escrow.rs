use anchor_lang::prelude::*;

use crate::constants::MAX_OFFER_ID_LEN;

/// Escrow account: sole on-chain custodian of one offer's locked funds.
///
/// Address is `derive(program_id, seeds=["escrow", offer_id])`. `publisher`
/// is intentionally absent here — it is bound at `settle_publisher` time,
/// not at creation (see DESIGN.md open question 1).
#[account]
#[derive(Debug)]
pub struct Escrow {
    /// Opaque offer id, also the PDA seed payload (<= MAX_OFFER_ID_LEN bytes).
    pub offer_id: Vec<u8>,
    /// Advertiser who funded the escrow and who receives any refund.
    pub advertiser: Pubkey,
    /// User who proved the demographic match and receives the 70% share.
    pub user: Pubkey,
    /// Platform key that receives the 5% share and absorbs rounding.
    pub platform: Pubkey,
    /// Lamports locked at creation. Never rewritten.
    pub amount: u64,
    /// Unix timestamp at creation.
    pub created_at: i64,
    pub user_settled: bool,
    pub publisher_settled: bool,
    pub platform_settled: bool,
    /// Bump seed for the escrow PDA.
    pub bump: u8,
}

impl Escrow {
    /// Account space: discriminator + Vec<u8> length prefix and payload +
    /// three Pubkeys + amount + created_at + three flags + bump.
    pub const fn space() -> usize {
        8   // discriminator
        + 4 + MAX_OFFER_ID_LEN // offer_id (length-prefixed)
        + 32 // advertiser
        + 32 // user
        + 32 // platform
        + 8  // amount
        + 8  // created_at
        + 1  // user_settled
        + 1  // publisher_settled
        + 1  // platform_settled
        + 1 // bump
    }

    /// All three parties have settled; the escrow is eligible to close.
    pub fn fully_settled(&self) -> bool {
        self.user_settled && self.publisher_settled && self.platform_settled
    }

    /// No party has settled yet; the only state from which a refund is
    /// ever eligible.
    pub fn untouched(&self) -> bool {
        !self.user_settled && !self.publisher_settled && !self.platform_settled
    }
}
