//! Bit-exact on-chain account layout (spec.md §6 "On-chain: account
//! layout"), decoded by reusing the escrow program's own Anchor account
//! structs rather than hand-rolling a parallel byte parser — the program
//! crate's `AccountDeserialize` impl (derived by `#[account]`) already
//! produces exactly this layout.

use anchor_lang::AccountDeserialize;
use chrono::{DateTime, Utc};
use payattn_escrow::state::{Escrow, ProgramConfig};
use payattn_types::entities::EscrowView;
use payattn_types::error::PayattnError;
use payattn_types::OfferId;
use solana_sdk::pubkey::Pubkey;

/// Decode a fetched escrow account's raw bytes into the program's `Escrow`
/// struct. Fails if the discriminator doesn't match (wrong account type or
/// corrupt data).
pub fn decode_escrow(mut data: &[u8]) -> Result<Escrow, PayattnError> {
    Escrow::try_deserialize(&mut data)
        .map_err(|e| PayattnError::MalformedInput(format!("escrow account decode failed: {e}")))
}

/// Decode a fetched program-config account's raw bytes.
pub fn decode_program_config(mut data: &[u8]) -> Result<ProgramConfig, PayattnError> {
    ProgramConfig::try_deserialize(&mut data)
        .map_err(|e| PayattnError::MalformedInput(format!("program config decode failed: {e}")))
}

/// Project the program's `Escrow` into the off-chain `EscrowView` the
/// coordinator and store operate on.
pub fn escrow_view(address: &Pubkey, escrow: &Escrow) -> Result<EscrowView, PayattnError> {
    let offer_id = OfferId::new(escrow.offer_id.clone())?;
    let created_at = DateTime::<Utc>::from_timestamp(escrow.created_at, 0)
        .ok_or_else(|| PayattnError::MalformedInput("escrow created_at out of range".into()))?;

    Ok(EscrowView {
        offer_id,
        address: address.to_string(),
        advertiser: escrow.advertiser.to_string(),
        user: escrow.user.to_string(),
        platform: escrow.platform.to_string(),
        amount: escrow.amount,
        created_at,
        user_settled: escrow.user_settled,
        publisher_settled: escrow.publisher_settled,
        platform_settled: escrow.platform_settled,
    })
}
