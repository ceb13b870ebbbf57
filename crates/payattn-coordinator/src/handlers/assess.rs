//! `POST /advertisers/{id}/assess` and `POST /offers/{id}/assess` (spec.md
//! §4.2 `assess_batch`/`assess_single`). Shares one assessment routine:
//! validate proofs against the ad creative's targeting, hand the result to
//! the policy oracle, and transition the offer to `accepted` or `rejected`.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use payattn_proof::{validate_batch, CircuitRequirements};
use payattn_types::entities::{Offer, OfferDecision, OfferStatus, SessionRecord, Targeting};
use payattn_types::error::PayattnError;
use payattn_proof::SubmittedProof;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_offer_id;

/// Targeting criteria translate to circuit requirements one-for-one: an
/// age bound requires the `age_range` circuit, interest tags require
/// `set_membership`. A creative with neither has nothing to assess (the
/// batch falls through to the oracle with an empty, vacuously-valid
/// summary).
fn build_requirements(targeting: &Targeting) -> HashMap<String, CircuitRequirements> {
    let mut required = HashMap::new();
    if let (Some(min), Some(max)) = (targeting.age_min, targeting.age_max) {
        required.insert(
            "age_range".to_string(),
            CircuitRequirements::Range {
                min: min as i64,
                max: max as i64,
            },
        );
    }
    if !targeting.interest_tags.is_empty() {
        required.insert(
            "set_membership".to_string(),
            CircuitRequirements::SetMembership {
                expected_set: targeting.interest_tags.clone(),
            },
        );
    }
    required
}

fn build_submitted_proofs(offer: &Offer) -> HashMap<String, SubmittedProof<'_>> {
    offer
        .zk_proofs
        .iter()
        .filter_map(|(circuit_name, bundle)| match bundle {
            payattn_types::entities::ProofBundle::Groth16Bn128 {
                circuit,
                proof,
                public_signals,
            } => Some((
                circuit_name.clone(),
                SubmittedProof {
                    circuit_name: circuit,
                    proof_bytes: proof,
                    public_signals,
                },
            )),
        })
        .collect()
}

async fn assess_one(state: &AppState, offer: Offer) -> Result<OfferDecision, PayattnError> {
    let creative = state.store.creatives.get(&offer.ad_creative_ref).await?;

    if !creative.is_servable() {
        state.store.offers.reject(&offer.offer_id).await?;
        return Ok(OfferDecision {
            offer_id: offer.offer_id,
            accepted: false,
            reasoning: "ad creative is not active or has exhausted its budget".to_string(),
            proof_summary: "skipped".to_string(),
        });
    }

    let submitted = build_submitted_proofs(&offer);
    let required = build_requirements(&creative.targeting);
    let proof_result = validate_batch(&state.registry, &submitted, &required);

    let (decision, reasoning) = state.oracle.decide(&offer, &creative, &proof_result).await;

    if decision.accepted() {
        state.store.offers.accept(&offer.offer_id).await?;
    } else {
        state.store.offers.reject(&offer.offer_id).await?;
    }

    Ok(OfferDecision {
        offer_id: offer.offer_id,
        accepted: decision.accepted(),
        reasoning,
        proof_summary: proof_result.summary,
    })
}

pub async fn assess_single(
    State(state): State<AppState>,
    Path(raw_offer_id): Path<String>,
) -> ApiResult<Json<OfferDecision>> {
    let offer_id = parse_offer_id(&raw_offer_id)?;
    let offer = state.store.offers.get(&offer_id).await?;

    if offer.status != OfferStatus::OfferMade {
        return Err(PayattnError::WrongStatus {
            offer_id: offer_id.to_string(),
            actual: offer.status,
            expected: vec![OfferStatus::OfferMade],
        }
        .into());
    }

    let lock = state.advertiser_lock(&offer.advertiser_id);
    let _guard = lock.lock().await;

    let decision = assess_one(&state, offer).await?;
    Ok(Json(decision))
}

pub async fn assess_batch(
    State(state): State<AppState>,
    Path(advertiser_id): Path<String>,
) -> ApiResult<Json<SessionRecord>> {
    let lock = state.advertiser_lock(&advertiser_id);
    let _guard = lock.lock().await;

    let offers = state
        .store
        .offers
        .list_offer_made_by_advertiser(&advertiser_id)
        .await?;

    let mut decisions = Vec::with_capacity(offers.len());
    let mut total_accepted = 0u32;
    let mut total_rejected = 0u32;

    for offer in offers {
        let decision = assess_one(&state, offer).await?;
        if decision.accepted {
            total_accepted += 1;
        } else {
            total_rejected += 1;
        }
        decisions.push(decision);
    }

    let session = SessionRecord {
        id: Uuid::new_v4(),
        advertiser_id,
        timestamp: Utc::now(),
        total_assessed: decisions.len() as u32,
        total_accepted,
        total_rejected,
        decisions,
    };

    state.store.sessions.insert(&session).await?;

    Ok(Json(session))
}
