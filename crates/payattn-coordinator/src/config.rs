//! Process configuration, loaded once at startup from the environment
//! (spec.md §6 "Configuration"), grounded on
//! `percmarket-percolator-CLI-excefy/cli/src/config.rs::NetworkConfig::new`'s
//! env-driven construction. Every missing required variable is a fatal
//! `PayattnError::MissingConfig` that aborts the process before it binds a
//! socket (spec.md §7 "configuration errors are fatal at process start").

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use payattn_store::DatabaseMode;
use payattn_types::error::PayattnError;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub platform_keypair_path: PathBuf,
    pub platform_pubkey: Pubkey,
    pub database_url: String,
    pub database_mode: DatabaseMode,
    pub max_retry_attempts: u32,
    pub refund_timeout: Duration,
    pub bind_addr: String,
    pub chain: String,
    pub network: String,
    pub token: String,
    pub verification_endpoint_path: String,
    pub verification_keys_dir: PathBuf,
}

impl Config {
    /// Reads every recognized variable from spec.md §6, plus the ambient
    /// `DATABASE_URL`/`BIND_ADDR` this service needs that the distilled
    /// spec didn't enumerate.
    pub fn from_env() -> Result<Self, PayattnError> {
        let rpc_url = require_env("RPC_URL")?;
        let program_id = parse_pubkey("PROGRAM_ID", &require_env("PROGRAM_ID")?)?;
        let platform_keypair_path = PathBuf::from(require_env("PLATFORM_KEYPAIR_PATH")?);
        let platform_pubkey = parse_pubkey("PLATFORM_PUBKEY", &require_env("PLATFORM_PUBKEY")?)?;
        let database_url = require_env("DATABASE_URL")?;

        let database_mode = match optional_env("DATABASE_MODE").as_deref() {
            Some("production") => DatabaseMode::Production,
            Some("test") | None => DatabaseMode::Test,
            Some(other) => {
                return Err(PayattnError::InvalidConfig {
                    key: "DATABASE_MODE",
                    reason: format!("expected 'test' or 'production', got '{other}'"),
                })
            }
        };

        let max_retry_attempts = optional_env("MAX_RETRY_ATTEMPTS")
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|_| PayattnError::InvalidConfig {
                key: "MAX_RETRY_ATTEMPTS",
                reason: "not a valid integer".to_string(),
            })?
            .unwrap_or(10);

        let refund_timeout_secs = optional_env("REFUND_TIMEOUT")
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|_| PayattnError::InvalidConfig {
                key: "REFUND_TIMEOUT",
                reason: "expected a whole number of seconds".to_string(),
            })?
            .unwrap_or(72 * 3600);

        Ok(Self {
            rpc_url,
            program_id,
            platform_keypair_path,
            platform_pubkey,
            database_url,
            database_mode,
            max_retry_attempts,
            refund_timeout: Duration::from_secs(refund_timeout_secs),
            bind_addr: optional_env("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            chain: optional_env("PAYMENT_CHAIN").unwrap_or_else(|| "solana".to_string()),
            network: optional_env("PAYMENT_NETWORK").unwrap_or_else(|| "devnet".to_string()),
            token: optional_env("PAYMENT_TOKEN").unwrap_or_else(|| "native".to_string()),
            verification_endpoint_path: "/offers/{offer_id}/verify-payment".to_string(),
            verification_keys_dir: PathBuf::from(
                optional_env("VERIFICATION_KEYS_DIR").unwrap_or_else(|| "./keys".to_string()),
            ),
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
