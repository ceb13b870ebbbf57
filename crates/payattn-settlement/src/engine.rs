//! The settlement protocol itself (spec.md §4.3 steps 1-7): acquire the
//! `settling` compare-and-set guard, draw a uniform permutation of the
//! three legs, sleep a bounded random delay between legs, submit each leg's
//! instruction, and either close out the offer or hand failed legs to the
//! retry queue.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use payattn_chain::errors::classify_escrow_log;
use payattn_chain::instructions::{settle_platform_ix, settle_publisher_ix, settle_user_ix};
use payattn_chain::signing::SigningAuthority;
use payattn_chain::ChainClient;
use payattn_store::{OfferRepository, QueueRepository};
use payattn_types::entities::{Offer, SettlementLeg, SettlementQueueEntry};
use payattn_types::error::PayattnError;
use payattn_types::wire::{ImpressionResponse, SettlementLegReport};
use rand::seq::SliceRandom;
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::splits::compute_splits;

/// Upper bound of the inter-leg random delay (spec.md §4.3 step 3).
const MAX_INTER_LEG_DELAY: Duration = Duration::from_secs(5);

/// Per-leg submission outcome, carrying enough to both log structurally and
/// build the `/impressions` response.
pub struct LegOutcome {
    pub leg: SettlementLeg,
    pub recipient: Pubkey,
    pub amount: u64,
    pub tx_id: Option<String>,
    pub error: Option<PayattnError>,
}

impl LegOutcome {
    fn succeeded(&self) -> bool {
        self.tx_id.is_some()
    }
}

/// Full result of one `settle_impression` call.
pub struct ImpressionOutcome {
    pub settled: bool,
    pub legs: Vec<LegOutcome>,
}

impl ImpressionOutcome {
    pub fn into_response(self) -> ImpressionResponse {
        ImpressionResponse {
            settled: self.settled,
            transactions: self
                .legs
                .into_iter()
                .map(|leg| SettlementLegReport {
                    leg: leg.leg,
                    tx_id: leg.tx_id,
                    explorer_url: None,
                })
                .collect(),
        }
    }
}

/// Transforms one qualifying impression into three settlement transactions
/// (spec.md §4.3). Holds no per-offer state: every call is independent,
/// serialized only by the offer's own `settling` CAS flag in the store.
pub struct SettlementEngine {
    chain: Arc<ChainClient>,
    authority: Arc<dyn SigningAuthority>,
    offers: OfferRepository,
    queue: QueueRepository,
    max_attempts: u32,
}

impl SettlementEngine {
    pub fn new(
        chain: Arc<ChainClient>,
        authority: Arc<dyn SigningAuthority>,
        offers: OfferRepository,
        queue: QueueRepository,
        max_attempts: u32,
    ) -> Self {
        Self {
            chain,
            authority,
            offers,
            queue,
            max_attempts,
        }
    }

    /// spec.md §4.3 full protocol. `offer` must be `funded`; `publisher`
    /// is the impression's late-bound publisher key (spec.md §9 open
    /// question 1).
    pub async fn settle_impression(
        &self,
        offer: &Offer,
        publisher: Pubkey,
    ) -> Result<ImpressionOutcome, PayattnError> {
        // Step 1: refund-freeze marker, compare-and-set against `funded`.
        self.offers.begin_settling(&offer.offer_id).await?;

        let result = self.run_legs(offer, publisher).await;

        // Whatever happens inside run_legs, the `settling` flag must not be
        // left set — either we transition to `settled`, or we fall back to
        // the partial/funded state the retry worker closes out later
        // (spec.md §4.3 step 7).
        match &result {
            Ok(outcome) if outcome.settled => {
                self.offers.mark_settled(&offer.offer_id).await?;
            }
            _ => {
                self.offers.clear_settling(&offer.offer_id).await?;
            }
        }

        result
    }

    async fn run_legs(
        &self,
        offer: &Offer,
        publisher: Pubkey,
    ) -> Result<ImpressionOutcome, PayattnError> {
        let escrow = self.chain.fetch_escrow(offer.offer_id.as_bytes()).await?;
        let (escrow_address, _bump) =
            payattn_chain::escrow_pda(&self.chain.program_id, offer.offer_id.as_bytes());

        let user = Pubkey::from_str(&escrow.user)
            .map_err(|_| PayattnError::MalformedInput("escrow user is not a valid pubkey".into()))?;
        let platform = Pubkey::from_str(&escrow.platform).map_err(|_| {
            PayattnError::MalformedInput("escrow platform is not a valid pubkey".into())
        })?;
        let advertiser = Pubkey::from_str(&escrow.advertiser).map_err(|_| {
            PayattnError::MalformedInput("escrow advertiser is not a valid pubkey".into())
        })?;

        let splits = compute_splits(escrow.amount);

        // Step 2: form the leg set and draw a uniform permutation.
        let mut legs = [
            (SettlementLeg::User, user, splits.user_share),
            (SettlementLeg::Publisher, publisher, splits.publisher_share),
            (SettlementLeg::Platform, platform, splits.platform_share),
        ];
        legs.shuffle(&mut rand::thread_rng());

        let mut outcomes = Vec::with_capacity(3);
        for (index, (leg, recipient, amount)) in legs.into_iter().enumerate() {
            // Step 3: bounded random delay before every leg after the first.
            if index > 0 {
                let delay_ms = rand::thread_rng().gen_range(0..=MAX_INTER_LEG_DELAY.as_millis() as u64);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let outcome = self
                .submit_leg(offer, leg, &escrow_address, recipient, amount, advertiser)
                .await;

            info!(
                offer_id = %offer.offer_id,
                leg = leg.as_str(),
                succeeded = outcome.succeeded(),
                "settlement leg submitted"
            );

            if !outcome.succeeded() {
                self.enqueue_failed_leg(offer, &outcome).await?;
            }

            outcomes.push(outcome);
        }

        let settled = outcomes.iter().all(LegOutcome::succeeded);
        Ok(ImpressionOutcome {
            settled,
            legs: outcomes,
        })
    }

    async fn submit_leg(
        &self,
        offer: &Offer,
        leg: SettlementLeg,
        escrow: &Pubkey,
        recipient: Pubkey,
        amount: u64,
        advertiser: Pubkey,
    ) -> LegOutcome {
        let program_id = self.chain.program_id;
        let instruction = match leg {
            SettlementLeg::User => settle_user_ix(&program_id, escrow, &recipient),
            SettlementLeg::Publisher => settle_publisher_ix(&program_id, escrow, &recipient),
            SettlementLeg::Platform => {
                settle_platform_ix(&program_id, escrow, &recipient, &advertiser)
            }
        };

        match self
            .chain
            .send_instruction(instruction, self.authority.as_ref())
            .await
        {
            Ok(signature) => LegOutcome {
                leg,
                recipient,
                amount,
                tx_id: Some(signature.to_string()),
                error: None,
            },
            Err(PayattnError::TransactionFailed { reason, .. }) => {
                let classified = classify_escrow_log(&offer.offer_id.to_string(), &[reason]);
                // `AlreadySettled` on-chain is this leg's idempotency contract
                // (spec.md §4.1 "every instruction is idempotent w.r.t. its
                // own leg"): treat the second submission as a success.
                if matches!(classified, PayattnError::AlreadySettled { .. }) {
                    LegOutcome {
                        leg,
                        recipient,
                        amount,
                        tx_id: Some("already_settled".to_string()),
                        error: None,
                    }
                } else {
                    LegOutcome {
                        leg,
                        recipient,
                        amount,
                        tx_id: None,
                        error: Some(classified),
                    }
                }
            }
            Err(err) => LegOutcome {
                leg,
                recipient,
                amount,
                tx_id: None,
                error: Some(err),
            },
        }
    }

    async fn enqueue_failed_leg(
        &self,
        offer: &Offer,
        outcome: &LegOutcome,
    ) -> Result<(), PayattnError> {
        let mut entry = SettlementQueueEntry::new(
            offer.offer_id.clone(),
            outcome.leg,
            outcome.recipient.to_string(),
            outcome.amount,
            self.max_attempts,
        );
        entry.last_error = outcome.error.as_ref().map(|e| e.to_string());

        warn!(
            offer_id = %offer.offer_id,
            leg = outcome.leg.as_str(),
            error = ?entry.last_error,
            "settlement leg enqueued for retry"
        );

        self.queue.upsert_pending(&entry).await
    }
}
