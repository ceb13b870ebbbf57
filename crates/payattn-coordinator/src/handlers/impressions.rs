//! `POST /impressions` (spec.md §4.3 entry point): the publisher's
//! settlement report. A qualifying impression debits the ad creative's
//! budget and hands the offer to the settlement engine.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use payattn_types::error::PayattnError;
use payattn_types::wire::{ImpressionReport, ImpressionResponse};
use solana_sdk::pubkey::Pubkey;

use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_offer_id;

pub async fn report_impression(
    State(state): State<AppState>,
    Json(report): Json<ImpressionReport>,
) -> ApiResult<Json<ImpressionResponse>> {
    if !report.is_qualifying() {
        return Err(PayattnError::MalformedInput(
            "impression duration below the 1000ms qualifying threshold".to_string(),
        )
        .into());
    }

    let offer_id = parse_offer_id(&report.offer_id)?;
    let offer = state.store.offers.get(&offer_id).await?;

    let publisher = state.store.parties.get_publisher(&report.publisher_id).await?;
    let publisher_pubkey = Pubkey::from_str(&publisher.pubkey)
        .map_err(|_| PayattnError::MalformedInput("publisher pubkey is not valid base58".to_string()))?;

    state.store.creatives.record_impression(&offer.ad_creative_ref).await?;

    let outcome = state.settlement.settle_impression(&offer, publisher_pubkey).await?;

    Ok(Json(outcome.into_response()))
}
