//! Offer lifecycle coordinator (spec.md §4.2): the authoritative keeper of
//! an offer's off-chain status, the x402 payment-required gatekeeper, and
//! the batch/single assessment entry point. This crate is a library so the
//! binary entrypoint (`src/bin/payattn-coordinator-server.rs`) and
//! integration tests can both build the router without duplicating wiring.

pub mod config;
pub mod error;
pub mod handlers;
pub mod oracle;
pub mod routes;
pub mod state;

use std::sync::Arc;

use payattn_chain::{ChainClient, FileKeypairAuthority};
use payattn_proof::VerificationKeyRegistry;
use payattn_settlement::SettlementEngine;
use payattn_store::Store;

pub use config::Config;
pub use state::AppState;

/// Builds the full `AppState` from a loaded `Config`: opens the database
/// pool, runs migrations, constructs the chain client and signing
/// authority, and wires the settlement engine. Split out of `main` so
/// tests can build the same state against a test database.
pub async fn bootstrap(config: Config) -> Result<AppState, payattn_types::error::PayattnError> {
    let pool = payattn_store::connect(&config.database_url, 10).await?;
    let store = Store::new(pool, config.database_mode);

    let chain = Arc::new(ChainClient::new(config.rpc_url.clone(), config.program_id));
    let authority: Arc<dyn payattn_chain::SigningAuthority> =
        Arc::new(FileKeypairAuthority::load(&config.platform_keypair_path)?);
    let registry = Arc::new(VerificationKeyRegistry::load_from_dir(
        &config.verification_keys_dir,
    )?);

    let settlement = Arc::new(SettlementEngine::new(
        chain.clone(),
        authority,
        store.offers.clone(),
        store.queue.clone(),
        config.max_retry_attempts,
    ));

    let oracle: Arc<dyn oracle::PolicyOracle> = Arc::new(oracle::DefaultPolicyOracle);

    Ok(AppState {
        store,
        chain,
        registry,
        settlement,
        oracle,
        advertiser_locks: Arc::new(dashmap::DashMap::new()),
        config: Arc::new(config),
    })
}
