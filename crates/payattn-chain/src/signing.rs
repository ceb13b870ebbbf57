//! Signing authority capability (spec.md §9: "Ad-hoc 'wallet wrapper'
//! classes around signing" -> "model the signing authority as a capability
//! (`sign(tx) -> signed_tx`) passed into the settlement engine at
//! construction. No inheritance chain.").
//!
//! `FileKeypairAuthority` is the dev-mode implementation, loaded from
//! `PLATFORM_KEYPAIR_PATH` (spec.md §6). A KMS-backed implementation is a
//! production concern of the out-of-scope "key management infrastructure"
//! collaborator (spec.md §1) and is expected to implement this same trait;
//! no stub lives here since there is nothing in the pack to ground one on.

use std::fs;
use std::path::Path;

use payattn_types::error::PayattnError;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;

/// Anything that can sign a transaction as the platform party. Implemented
/// once per keystore backend; callers depend only on this trait.
pub trait SigningAuthority: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Sign `transaction` in place against `recent_blockhash`.
    fn sign(&self, transaction: &mut Transaction, recent_blockhash: Hash);
}

/// File-backed keystore (spec.md §9: "`keypair.json` file loads"), reading
/// the standard Solana CLI keypair JSON array format, grounded on
/// `percmarket-percolator-CLI-excefy/cli/src/config.rs::load_keypair`.
pub struct FileKeypairAuthority {
    keypair: Keypair,
}

impl FileKeypairAuthority {
    pub fn load(path: &Path) -> Result<Self, PayattnError> {
        if !path.exists() {
            return Err(PayattnError::MissingConfig("PLATFORM_KEYPAIR_PATH"));
        }

        let data = fs::read_to_string(path).map_err(|e| PayattnError::InvalidConfig {
            key: "PLATFORM_KEYPAIR_PATH",
            reason: format!("failed to read keypair file: {e}"),
        })?;

        let bytes: Vec<u8> = serde_json::from_str(&data).map_err(|e| PayattnError::InvalidConfig {
            key: "PLATFORM_KEYPAIR_PATH",
            reason: format!("failed to parse keypair JSON: {e}"),
        })?;

        let keypair = Keypair::from_bytes(&bytes).map_err(|e| PayattnError::InvalidConfig {
            key: "PLATFORM_KEYPAIR_PATH",
            reason: format!("invalid keypair bytes: {e}"),
        })?;

        Ok(Self { keypair })
    }
}

impl SigningAuthority for FileKeypairAuthority {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn sign(&self, transaction: &mut Transaction, recent_blockhash: Hash) {
        transaction.sign(&[&self.keypair], recent_blockhash);
    }
}
