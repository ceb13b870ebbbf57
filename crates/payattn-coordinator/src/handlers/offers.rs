//! `POST /offers`, `POST /offers/{id}/accept`, `POST /offers/{id}/verify-payment`
//! (spec.md §4.2). Grounded on `x402-rs`'s handler shape: thin functions over
//! `State<AppState>` that validate, call into the store/chain, and return a
//! typed JSON body or a structured error via `ApiError`.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use payattn_types::entities::{Offer, OfferStatus};
use payattn_types::error::PayattnError;
use payattn_types::wire::{
    OfferStatusResponse, PaymentRequiredBundle, SubmitOfferRequest, SubmitOfferResponse,
    VerifyPaymentRequest,
};
use payattn_types::OfferId;

use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_offer_id;

/// spec.md §4.2 `submit_offer`. Does not move funds; persists the candidate
/// as `offer_made`.
pub async fn submit_offer(
    State(state): State<AppState>,
    Json(req): Json<SubmitOfferRequest>,
) -> ApiResult<(StatusCode, Json<SubmitOfferResponse>)> {
    if req.amount == 0 {
        return Err(PayattnError::AmountZero.into());
    }

    let offer_id = OfferId::new(rand::random::<[u8; 16]>().to_vec())?;
    let now = Utc::now();

    let offer = Offer {
        offer_id: offer_id.clone(),
        advertiser_id: req.advertiser_id,
        user_id: req.user_id,
        user_pubkey: req.user_pubkey,
        ad_id: req.ad_id,
        amount: req.amount,
        status: OfferStatus::OfferMade,
        escrow_address: None,
        funding_tx_id: None,
        settling: false,
        settled_at: None,
        zk_proofs: req.zk_proofs,
        ad_creative_ref: req.ad_creative_ref,
        created_at: now,
        updated_at: now,
    };

    state.store.offers.insert(&offer).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitOfferResponse {
            offer_id: offer_id.to_string(),
            status: OfferStatus::OfferMade.as_str().to_string(),
        }),
    ))
}

/// spec.md §4.2 `accept_offer`: transitions `offer_made -> accepted` and
/// returns the x402 payment-required bundle as both headers and a JSON
/// mirror. Idempotent on an already-`accepted` offer.
pub async fn accept_offer(
    State(state): State<AppState>,
    Path(raw_offer_id): Path<String>,
) -> ApiResult<Response> {
    let offer_id = parse_offer_id(&raw_offer_id)?;
    let mut offer = state.store.offers.get(&offer_id).await?;

    match offer.status {
        OfferStatus::OfferMade => {
            state.store.offers.accept(&offer_id).await?;
            offer.status = OfferStatus::Accepted;
        }
        OfferStatus::Accepted => {}
        other => {
            return Err(PayattnError::WrongStatus {
                offer_id: offer_id.to_string(),
                actual: other,
                expected: vec![OfferStatus::OfferMade, OfferStatus::Accepted],
            }
            .into());
        }
    }

    let (escrow_pda, _bump) =
        payattn_chain::escrow_pda(&state.chain.program_id, offer_id.as_bytes());

    let bundle = PaymentRequiredBundle {
        chain: state.config.chain.clone(),
        network: state.config.network.clone(),
        amount: offer.amount,
        token: state.config.token.clone(),
        offer_id: offer_id.to_string(),
        user_pubkey: offer.user_pubkey.clone(),
        platform_pubkey: state.config.platform_pubkey.to_string(),
        escrow_program: state.chain.program_id.to_string(),
        escrow_pda: escrow_pda.to_string(),
        verification_endpoint: state
            .config
            .verification_endpoint_path
            .replace("{offer_id}", &offer_id.to_string()),
    };

    let mut response = (StatusCode::PAYMENT_REQUIRED, Json(bundle.clone())).into_response();
    for (name, value) in bundle.headers() {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(name, header_value);
        }
    }
    Ok(response)
}

/// spec.md §4.2 `verify_payment`. Idempotent on an already-`funded` offer.
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(raw_offer_id): Path<String>,
    Json(req): Json<VerifyPaymentRequest>,
) -> ApiResult<Json<OfferStatusResponse>> {
    let offer_id = parse_offer_id(&raw_offer_id)?;
    let offer = state.store.offers.get(&offer_id).await?;

    if offer.status == OfferStatus::Funded {
        return Ok(Json(OfferStatusResponse {
            offer_id: offer_id.to_string(),
            status: OfferStatus::Funded.as_str().to_string(),
        }));
    }

    if offer.status != OfferStatus::Accepted {
        return Err(PayattnError::WrongStatus {
            offer_id: offer_id.to_string(),
            actual: offer.status,
            expected: vec![OfferStatus::Accepted, OfferStatus::Funded],
        }
        .into());
    }

    if !state.chain.transaction_succeeded(&req.tx_id).await? {
        return Err(PayattnError::TransactionFailed {
            tx_id: req.tx_id.clone(),
            reason: "transaction not found or did not succeed".to_string(),
        }
        .into());
    }

    let (expected_address, _bump) =
        payattn_chain::escrow_pda(&state.chain.program_id, offer_id.as_bytes());
    if expected_address.to_string() != req.escrow_address {
        return Err(PayattnError::PdaMismatch.into());
    }

    let escrow = state.chain.fetch_escrow(offer_id.as_bytes()).await?;
    if escrow.amount != offer.amount {
        return Err(PayattnError::AmountMismatch {
            expected: offer.amount,
            on_chain: escrow.amount,
        }
        .into());
    }
    if escrow.user != offer.user_pubkey {
        return Err(PayattnError::UserKeyMismatch.into());
    }

    let advertiser = state.store.parties.get_advertiser(&offer.advertiser_id).await?;
    if escrow.advertiser != advertiser.pubkey {
        return Err(PayattnError::AdvertiserKeyMismatch.into());
    }

    state
        .store
        .offers
        .mark_funded(&offer_id, &req.escrow_address, &req.tx_id)
        .await?;

    Ok(Json(OfferStatusResponse {
        offer_id: offer_id.to_string(),
        status: OfferStatus::Funded.as_str().to_string(),
    }))
}
