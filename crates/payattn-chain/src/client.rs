//! Thin async RPC wrapper around the escrow program (spec.md §5
//! "Suspension points" / §7 "one retry with jitter at the RPC layer for
//! transient transport errors"). Synchronous helper naming (`account_exists`,
//! `lamports_to_sol`) is grounded on `percmarket-percolator-CLI-excefy`'s
//! `cli/src/client.rs`; the async, nonblocking RPC client and bounded
//! timeouts are the ambient addition this service-shaped crate needs that
//! the teacher's synchronous CLI didn't.

use std::time::Duration;

use payattn_types::entities::EscrowView;
use payattn_types::error::PayattnError;
use rand::Rng;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::layout::{decode_escrow, escrow_view};
use crate::pda::escrow_pda;
use crate::signing::SigningAuthority;

/// Submission timeout (spec.md §5: "suggested 30s for submission").
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
/// Confirmation timeout (spec.md §5: "60s for confirmation").
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ChainClient {
    rpc: RpcClient,
    pub program_id: Pubkey,
}

impl ChainClient {
    pub fn new(rpc_url: String, program_id: Pubkey) -> Self {
        let rpc = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
        Self { rpc, program_id }
    }

    /// Send and confirm a single-instruction transaction signed by
    /// `authority`, with one bounded retry with jitter on a transient
    /// transport error. A timed-out submission is surfaced as
    /// `RpcTimeout` — callers (the settlement engine) must treat this as
    /// an unknown-outcome failure and enqueue for retry rather than assume
    /// failure (spec.md §5).
    pub async fn send_instruction(
        &self,
        instruction: Instruction,
        authority: &dyn SigningAuthority,
    ) -> Result<Signature, PayattnError> {
        let mut last_err = None;
        for attempt in 0..2u8 {
            if attempt > 0 {
                let jitter_ms = rand::thread_rng().gen_range(50..250);
                tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
            }

            match self.try_send_once(&instruction, authority).await {
                Ok(sig) => return Ok(sig),
                Err(err) if is_transient(&err) => {
                    last_err = Some(err);
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or(PayattnError::RpcTimeout {
            seconds: CONFIRM_TIMEOUT.as_secs(),
        }))
    }

    async fn try_send_once(
        &self,
        instruction: &Instruction,
        authority: &dyn SigningAuthority,
    ) -> Result<Signature, PayattnError> {
        let recent_blockhash = tokio::time::timeout(SUBMIT_TIMEOUT, self.rpc.get_latest_blockhash())
            .await
            .map_err(|_| PayattnError::RpcTimeout {
                seconds: SUBMIT_TIMEOUT.as_secs(),
            })?
            .map_err(map_client_error)?;

        let mut transaction =
            Transaction::new_with_payer(&[instruction.clone()], Some(&authority.pubkey()));
        authority.sign(&mut transaction, recent_blockhash);

        tokio::time::timeout(
            CONFIRM_TIMEOUT,
            self.rpc.send_and_confirm_transaction(&transaction),
        )
        .await
        .map_err(|_| PayattnError::RpcTimeout {
            seconds: CONFIRM_TIMEOUT.as_secs(),
        })?
        .map_err(map_client_error)
    }

    /// Fetch and decode the escrow account for `offer_id`, re-deriving its
    /// address to cross-check against any caller-supplied address.
    pub async fn fetch_escrow(&self, offer_id: &[u8]) -> Result<EscrowView, PayattnError> {
        let (address, _bump) = escrow_pda(&self.program_id, offer_id);
        let account = self
            .rpc
            .get_account(&address)
            .await
            .map_err(|_| PayattnError::EscrowNotFound {
                offer_id: bs58::encode(offer_id).into_string(),
            })?;
        let escrow = decode_escrow(&account.data)?;
        escrow_view(&address, &escrow)
    }

    /// Whether an account exists at `address` (grounded on
    /// `percolator-cli`'s `account_exists`).
    pub async fn account_exists(&self, address: &Pubkey) -> bool {
        self.rpc.get_account(address).await.is_ok()
    }

    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64, PayattnError> {
        self.rpc.get_balance(address).await.map_err(map_client_error)
    }

    /// Whether `tx_id` exists on-chain and succeeded (spec.md §4.2
    /// `verify_payment` check 1). A signature with no recorded status, or
    /// one carrying an on-chain error, is not a success.
    pub async fn transaction_succeeded(&self, tx_id: &str) -> Result<bool, PayattnError> {
        let signature = tx_id
            .parse::<Signature>()
            .map_err(|_| PayattnError::MalformedInput(format!("'{tx_id}' is not a valid transaction signature")))?;

        let statuses = self
            .rpc
            .get_signature_statuses(&[signature])
            .await
            .map_err(map_client_error)?;

        Ok(statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| status.err.is_none())
            .unwrap_or(false))
    }
}

/// Classifies a `ClientError` as transient (worth one retry) vs. terminal.
/// Network/timeout-shaped errors are transient; anything that decoded an
/// on-chain program error is terminal (retrying won't change the outcome).
fn is_transient(err: &PayattnError) -> bool {
    matches!(err, PayattnError::RpcTimeout { .. })
}

fn map_client_error(err: ClientError) -> PayattnError {
    PayattnError::TransactionFailed {
        tx_id: String::new(),
        reason: err.to_string(),
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * 1_000_000_000.0) as u64
}
