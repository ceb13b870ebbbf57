//! Router assembly (spec.md §4.2 HTTP surface), grounded on `zeratul-server`'s
//! `axum` + `tower-http` (cors, trace) service skeleton.

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::assess::{assess_batch, assess_single};
use crate::handlers::impressions::report_impression;
use crate::handlers::offers::{accept_offer, submit_offer, verify_payment};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/offers", post(submit_offer))
        .route("/offers/{id}/accept", post(accept_offer))
        .route("/offers/{id}/verify-payment", post(verify_payment))
        .route("/offers/{id}/assess", post(assess_single))
        .route("/advertisers/{id}/assess", post(assess_batch))
        .route("/impressions", post(report_impression))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
