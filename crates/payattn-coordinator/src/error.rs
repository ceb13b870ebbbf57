//! Maps `PayattnError` to an HTTP response (spec.md §7: "every error
//! response carries a machine-readable `error` code and human-readable
//! `details`"), grounded on `x402-rs`'s facilitator error mapping and the
//! pack's `(StatusCode, Json<T>)` `IntoResponse` convention
//! (`rotkonetworks-zeratul/.../pss/http.rs`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use payattn_types::error::PayattnError;
use payattn_types::wire::{http_status_for, ErrorBody};

pub struct ApiError(pub PayattnError);

impl From<PayattnError> for ApiError {
    fn from(err: PayattnError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(http_status_for(&self.0)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody::from(&self.0);
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
