//! Shared application state handed to every Axum handler (spec.md §5: the
//! coordinator's request handlers are preemptible at awaited I/O points and
//! must not hold a process-wide lock). Assessment's "coarse per-advertiser
//! mutex" is the one exception, scoped to a single advertiser id via a
//! `DashMap` of `tokio::sync::Mutex` guards, grounded on `x402-rs`'s use of
//! `dashmap` for concurrent in-memory maps.

use std::sync::Arc;

use dashmap::DashMap;
use payattn_chain::ChainClient;
use payattn_proof::VerificationKeyRegistry;
use payattn_settlement::SettlementEngine;
use payattn_store::Store;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::oracle::PolicyOracle;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub chain: Arc<ChainClient>,
    pub registry: Arc<VerificationKeyRegistry>,
    pub settlement: Arc<SettlementEngine>,
    pub oracle: Arc<dyn PolicyOracle>,
    pub advertiser_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Returns the mutex guarding assessment for `advertiser_id`, creating
    /// one on first use. Never removed: the number of distinct advertisers
    /// is small and bounded by the party directory.
    pub fn advertiser_lock(&self, advertiser_id: &str) -> Arc<Mutex<()>> {
        self.advertiser_locks
            .entry(advertiser_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
