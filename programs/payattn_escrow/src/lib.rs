use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("6ZEekbTJZ6D6KrfSGDY2ByoWENWfe8RzhvpBS4KtPdZr");

#[program]
pub mod payattn_escrow {
    use super::*;

    /// Initialize the program-wide config PDA (refund timeout). Called
    /// once per deployment.
    pub fn initialize_program(
        ctx: Context<InitializeProgram>,
        refund_timeout_secs: Option<i64>,
    ) -> Result<()> {
        instructions::initialize_program(ctx, refund_timeout_secs)
    }

    /// Create a new escrow for an ad offer and lock `amount` lamports.
    pub fn create_escrow(ctx: Context<CreateEscrow>, offer_id: Vec<u8>, amount: u64) -> Result<()> {
        instructions::create_escrow(ctx, offer_id, amount)
    }

    /// Pay the user's 70% share. Commutative with `settle_publisher`.
    pub fn settle_user(ctx: Context<SettleUser>) -> Result<()> {
        instructions::settle_user(ctx)
    }

    /// Pay the publisher's 25% share. Commutative with `settle_user`.
    /// The publisher is bound here, not at `create_escrow` time.
    pub fn settle_publisher(ctx: Context<SettlePublisher>) -> Result<()> {
        instructions::settle_publisher(ctx)
    }

    /// Pay the platform's 5% remainder share. Requires the other two legs
    /// to have already settled; closes the escrow once all three have.
    pub fn settle_platform(ctx: Context<SettlePlatform>) -> Result<()> {
        instructions::settle_platform(ctx)
    }

    /// Refund the advertiser in full. Only callable before any leg has
    /// settled and after the configured refund timeout has elapsed.
    pub fn refund_escrow(ctx: Context<RefundEscrow>) -> Result<()> {
        instructions::refund_escrow(ctx)
    }
}
