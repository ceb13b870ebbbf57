//! Per-tick algorithm (spec.md §4.4 steps 1-5): select ready queue entries,
//! dispatch each to its on-chain instruction, reconcile idempotently
//! against the escrow's settled flags, and close out offers whose legs
//! have all landed.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use payattn_chain::errors::classify_escrow_log;
use payattn_chain::instructions::{settle_platform_ix, settle_publisher_ix, settle_user_ix};
use payattn_chain::signing::SigningAuthority;
use payattn_chain::ChainClient;
use payattn_store::Store;
use payattn_types::entities::{QueueEntryStatus, SettlementLeg, SettlementQueueEntry};
use payattn_types::error::PayattnError;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

/// One tick's outcome, reported to the caller for logging/metrics.
#[derive(Debug, Default)]
pub struct TickReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub gave_up: u32,
    pub offers_settled: u32,
}

pub struct RetryWorker {
    store: Store,
    chain: Arc<ChainClient>,
    authority: Arc<dyn SigningAuthority>,
    batch_size: i64,
    backoff: Duration,
}

impl RetryWorker {
    pub fn new(
        store: Store,
        chain: Arc<ChainClient>,
        authority: Arc<dyn SigningAuthority>,
        batch_size: i64,
        backoff: Duration,
    ) -> Self {
        Self {
            store,
            chain,
            authority,
            batch_size,
            backoff,
        }
    }

    /// spec.md §4.4 per-tick algorithm. Reentrancy-safe: a concurrent tick
    /// (e.g. an overlapping external scheduler invocation) races only over
    /// individually-consistent per-row `UPDATE`s, never a single cursor.
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::default();

        let entries = match self.store.queue.fetch_ready(self.batch_size).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "failed to fetch ready settlement queue entries");
                return report;
            }
        };

        // spec.md §4.4 step 1: only entries whose last attempt is older
        // than the backoff threshold are due this tick.
        let due = entries
            .into_iter()
            .filter(|entry| is_due(entry.last_attempt_at, self.backoff));

        for entry in due {
            report.attempted += 1;
            match self.process_entry(&entry).await {
                Ok(true) => report.succeeded += 1,
                Ok(false) => {
                    if entry.attempts + 1 >= entry.max_attempts {
                        report.gave_up += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Err(err) => {
                    warn!(offer_id = %entry.offer_id, leg = entry.tx_type.as_str(), error = %err, "settlement queue entry processing error");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Processes one queue entry. Returns `Ok(true)` on success (including
    /// the `AlreadySettled` idempotency case), `Ok(false)` on a recorded
    /// failure.
    async fn process_entry(&self, entry: &SettlementQueueEntry) -> Result<bool, PayattnError> {
        let escrow = self.chain.fetch_escrow(entry.offer_id.as_bytes()).await?;
        let (escrow_address, _bump) =
            payattn_chain::escrow_pda(&self.chain.program_id, entry.offer_id.as_bytes());

        // spec.md §5: a prior "failed" leg may have actually landed on
        // chain (a timed-out submission with an unknown outcome). Read the
        // settled flags before re-submitting and skip the leg if so.
        let already_landed = match entry.tx_type {
            SettlementLeg::User => escrow.user_settled,
            SettlementLeg::Publisher => escrow.publisher_settled,
            SettlementLeg::Platform => escrow.platform_settled,
        };

        if already_landed {
            info!(offer_id = %entry.offer_id, leg = entry.tx_type.as_str(), "leg already settled on chain, reconciling");
            self.store
                .queue
                .record_success(&entry.offer_id, entry.tx_type, "already_settled")
                .await?;
            self.maybe_close_offer(&entry.offer_id).await?;
            return Ok(true);
        }

        let recipient = Pubkey::from_str(&entry.recipient_pubkey).map_err(|_| {
            PayattnError::MalformedInput(format!(
                "queue entry recipient '{}' is not a valid pubkey",
                entry.recipient_pubkey
            ))
        })?;

        let program_id = self.chain.program_id;
        let instruction = match entry.tx_type {
            SettlementLeg::User => settle_user_ix(&program_id, &escrow_address, &recipient),
            SettlementLeg::Publisher => settle_publisher_ix(&program_id, &escrow_address, &recipient),
            SettlementLeg::Platform => {
                let advertiser = Pubkey::from_str(&escrow.advertiser).map_err(|_| {
                    PayattnError::MalformedInput("escrow advertiser is not a valid pubkey".into())
                })?;
                settle_platform_ix(&program_id, &escrow_address, &recipient, &advertiser)
            }
        };

        match self.chain.send_instruction(instruction, self.authority.as_ref()).await {
            Ok(signature) => {
                info!(offer_id = %entry.offer_id, leg = entry.tx_type.as_str(), tx_id = %signature, "retry leg succeeded");
                self.store
                    .queue
                    .record_success(&entry.offer_id, entry.tx_type, &signature.to_string())
                    .await?;
                self.maybe_close_offer(&entry.offer_id).await?;
                Ok(true)
            }
            Err(PayattnError::TransactionFailed { reason, .. }) => {
                let classified = classify_escrow_log(&entry.offer_id.to_string(), &[reason]);
                if matches!(classified, PayattnError::AlreadySettled { .. }) {
                    self.store
                        .queue
                        .record_success(&entry.offer_id, entry.tx_type, "already_settled")
                        .await?;
                    self.maybe_close_offer(&entry.offer_id).await?;
                    return Ok(true);
                }
                self.store
                    .queue
                    .record_failure(&entry.offer_id, entry.tx_type, &classified.to_string())
                    .await?;
                Ok(false)
            }
            Err(err) => {
                self.store
                    .queue
                    .record_failure(&entry.offer_id, entry.tx_type, &err.to_string())
                    .await?;
                Ok(false)
            }
        }
    }

    /// spec.md §4.4 step 3: once a leg succeeds, check whether any sibling
    /// leg for the same offer remains pending; if none, transition the
    /// offer to `settled`.
    async fn maybe_close_offer(&self, offer_id: &payattn_types::OfferId) -> Result<(), PayattnError> {
        let siblings = self.store.queue.legs_for_offer(offer_id).await?;
        let all_settled = siblings
            .iter()
            .all(|leg| leg.status == QueueEntryStatus::Succeeded);

        if all_settled {
            match self.store.offers.mark_settled(offer_id).await {
                Ok(()) => info!(%offer_id, "offer settled by retry worker reconciliation"),
                Err(PayattnError::ConcurrentModification { .. }) => {
                    // Another writer (the engine, or a racing tick) already
                    // moved this offer; not an error.
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

/// A fresh entry (`last_attempt_at = None`) is always due; otherwise due
/// once `backoff` has elapsed since the last attempt (spec.md §4.4 step 1).
fn is_due(last_attempt_at: Option<chrono::DateTime<Utc>>, backoff: Duration) -> bool {
    match last_attempt_at {
        Some(last) => Utc::now()
            .signed_duration_since(last)
            .to_std()
            .unwrap_or_default()
            >= backoff,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_with_no_prior_attempt_is_due() {
        assert!(is_due(None, Duration::from_secs(300)));
    }

    #[test]
    fn entry_attempted_within_backoff_window_is_not_due() {
        let last = Utc::now() - chrono::Duration::seconds(60);
        assert!(!is_due(Some(last), Duration::from_secs(300)));
    }

    #[test]
    fn entry_attempted_before_backoff_window_is_due() {
        let last = Utc::now() - chrono::Duration::seconds(600);
        assert!(is_due(Some(last), Duration::from_secs(300)));
    }
}
