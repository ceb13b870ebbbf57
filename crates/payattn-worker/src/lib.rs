//! Retry worker (spec.md §4.4): a periodic process that drains the
//! settlement queue and reconciles failed legs against on-chain truth
//! without violating per-leg idempotency.

pub mod config;
pub mod tick;

use std::sync::Arc;

use payattn_chain::{ChainClient, FileKeypairAuthority};
use payattn_store::Store;

pub use config::WorkerConfig;
pub use tick::{RetryWorker, TickReport};

/// Builds a `RetryWorker` from a loaded `WorkerConfig`: opens the database
/// pool, runs migrations, and constructs the chain client and signing
/// authority. Mirrors `payattn_coordinator::bootstrap`'s shape for the
/// worker's narrower dependency set.
pub async fn bootstrap(config: WorkerConfig) -> Result<RetryWorker, payattn_types::error::PayattnError> {
    let pool = payattn_store::connect(&config.database_url, 5).await?;
    // The retry worker never touches the ad-creative catalog, so the mode
    // choice here is inert; production is the safer default for the one
    // call site (`Store::new`) that requires it.
    let store = Store::new(pool, payattn_store::DatabaseMode::Production);

    let chain = Arc::new(ChainClient::new(config.rpc_url.clone(), config.program_id));
    let authority: Arc<dyn payattn_chain::SigningAuthority> =
        Arc::new(FileKeypairAuthority::load(&config.platform_keypair_path)?);

    Ok(RetryWorker::new(
        store,
        chain,
        authority,
        config.batch_size,
        config.retry_interval,
    ))
}
