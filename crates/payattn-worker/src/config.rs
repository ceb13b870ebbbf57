//! Worker process configuration (spec.md §6), the subset of the
//! environment the retry worker needs: chain access, a signing authority,
//! and the tick schedule. Mirrors `payattn-coordinator::config`'s
//! env-loading shape but without the HTTP-only fields.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use payattn_types::error::PayattnError;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub platform_keypair_path: PathBuf,
    pub database_url: String,
    pub retry_interval: Duration,
    pub batch_size: i64,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, PayattnError> {
        let rpc_url = require_env("RPC_URL")?;
        let program_id = parse_pubkey("PROGRAM_ID", &require_env("PROGRAM_ID")?)?;
        let platform_keypair_path = PathBuf::from(require_env("PLATFORM_KEYPAIR_PATH")?);
        let database_url = require_env("DATABASE_URL")?;

        let retry_interval_secs = optional_env("RETRY_INTERVAL")
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|_| PayattnError::InvalidConfig {
                key: "RETRY_INTERVAL",
                reason: "expected a whole number of seconds".to_string(),
            })?
            .unwrap_or(5 * 60);

        // MAX_RETRY_ATTEMPTS is not read here: each queue entry's
        // `max_attempts` is stamped by the settlement engine at enqueue
        // time (spec.md §3 "Settlement Queue Entry") and is what
        // `tick.rs`'s give-up check gates on; the worker never creates or
        // upserts entries, only the engine does (spec.md §5), so a
        // worker-local copy of this knob would have nothing to apply to.
        let batch_size = optional_env("RETRY_BATCH_SIZE")
            .map(|v| v.parse::<i64>())
            .transpose()
            .map_err(|_| PayattnError::InvalidConfig {
                key: "RETRY_BATCH_SIZE",
                reason: "not a valid integer".to_string(),
            })?
            .unwrap_or(50);

        Ok(Self {
            rpc_url,
            program_id,
            platform_keypair_path,
            database_url,
            retry_interval: Duration::from_secs(retry_interval_secs),
            batch_size,
        })
    }
}

fn require_env(key: &'static str) -> Result<String, PayattnError> {
    std::env::var(key).map_err(|_| PayattnError::MissingConfig(key))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_pubkey(key: &'static str, value: &str) -> Result<Pubkey, PayattnError> {
    Pubkey::from_str(value).map_err(|_| PayattnError::InvalidConfig {
        key,
        reason: format!("'{value}' is not a valid base58 pubkey"),
    })
}
