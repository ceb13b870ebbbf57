//! Pluggable policy oracle (spec.md §1: "LLM-based offer scoring (treated
//! as a pluggable policy oracle)" — out of scope, only its interface is
//! specified here). Modeled as a capability trait injected at construction,
//! the same re-architecture spec.md §9 prescribes for the signing
//! authority: no inheritance chain, callers depend only on the trait.

use async_trait::async_trait;
use payattn_proof::ProofValidationSummary;
use payattn_types::entities::{AdCreative, Offer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Accept,
    Reject,
}

impl PolicyDecision {
    pub fn accepted(&self) -> bool {
        matches!(self, PolicyDecision::Accept)
    }
}

/// Decides whether an assessed offer should be accepted or rejected.
/// Implementations may call out to an external scoring service; the
/// coordinator itself only depends on this trait.
#[async_trait]
pub trait PolicyOracle: Send + Sync {
    async fn decide(
        &self,
        offer: &Offer,
        creative: &AdCreative,
        proof_result: &ProofValidationSummary,
    ) -> (PolicyDecision, String);
}

/// Deterministic default: accepts an offer whose proofs validated and
/// whose creative is still servable, rejects otherwise (spec.md §4.2
/// "Assessment skips offers whose ad creative is no longer active or whose
/// remaining budget is insufficient"). Used for tests and any environment
/// without an external oracle configured.
pub struct DefaultPolicyOracle;

#[async_trait]
impl PolicyOracle for DefaultPolicyOracle {
    async fn decide(
        &self,
        _offer: &Offer,
        creative: &AdCreative,
        proof_result: &ProofValidationSummary,
    ) -> (PolicyDecision, String) {
        if !creative.is_servable() {
            return (
                PolicyDecision::Reject,
                "ad creative is not active or has exhausted its budget".to_string(),
            );
        }
        if !proof_result.valid {
            return (
                PolicyDecision::Reject,
                format!("proof validation failed: {}", proof_result.summary),
            );
        }
        (
            PolicyDecision::Accept,
            "proofs valid and creative has remaining budget".to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payattn_types::entities::{AdCreativeStatus, Targeting};

    fn creative(status: AdCreativeStatus, spent: u64, total_budget: u64) -> AdCreative {
        AdCreative {
            ad_creative_id: "ad_1".into(),
            advertiser_id: "adv_1".into(),
            headline: "h".into(),
            body: "b".into(),
            cta: "c".into(),
            destination: "https://example.com".into(),
            targeting: Targeting {
                age_min: None,
                age_max: None,
                interest_tags: vec![],
                minimum_income: None,
                countries: vec![],
            },
            budget_per_impression: 10,
            total_budget,
            spent,
            impressions: 0,
            clicks: 0,
            status,
        }
    }

    #[tokio::test]
    async fn rejects_when_budget_exhausted() {
        let oracle = DefaultPolicyOracle;
        let creative = creative(AdCreativeStatus::Active, 100, 100);
        let proof_result = ProofValidationSummary {
            valid: true,
            summary: "ok".into(),
            valid_circuits: vec!["age_range".into()],
            invalid_circuits: vec![],
        };
        let offer = sample_offer();
        let (decision, _) = oracle.decide(&offer, &creative, &proof_result).await;
        assert_eq!(decision, PolicyDecision::Reject);
    }

    #[tokio::test]
    async fn accepts_when_valid_and_servable() {
        let oracle = DefaultPolicyOracle;
        let creative = creative(AdCreativeStatus::Active, 0, 100);
        let proof_result = ProofValidationSummary {
            valid: true,
            summary: "ok".into(),
            valid_circuits: vec!["age_range".into()],
            invalid_circuits: vec![],
        };
        let offer = sample_offer();
        let (decision, _) = oracle.decide(&offer, &creative, &proof_result).await;
        assert_eq!(decision, PolicyDecision::Accept);
    }

    fn sample_offer() -> Offer {
        use payattn_types::entities::OfferStatus;
        use payattn_types::OfferId;
        use std::collections::HashMap;

        Offer {
            offer_id: OfferId::new(vec![1, 2, 3]).unwrap(),
            advertiser_id: "adv_1".into(),
            user_id: "user_1".into(),
            user_pubkey: "11111111111111111111111111111111".into(),
            ad_id: "ad_1".into(),
            amount: 1_000,
            status: OfferStatus::OfferMade,
            escrow_address: None,
            funding_tx_id: None,
            settling: false,
            settled_at: None,
            zk_proofs: HashMap::new(),
            ad_creative_ref: "ad_1".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }
}
