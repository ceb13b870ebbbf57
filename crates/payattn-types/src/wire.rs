//! Wire contracts from spec.md §6: the x402 payment-required bundle, the
//! `/impressions` settlement report, and the structured error body every
//! handler returns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::ProofBundle;
use crate::error::{ErrorKind, PayattnError};

/// `POST /offers` request body (spec.md §4.2 `submit_offer`).
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOfferRequest {
    pub advertiser_id: String,
    pub user_id: String,
    pub user_pubkey: String,
    pub ad_id: String,
    pub amount: u64,
    pub ad_creative_ref: String,
    #[serde(default)]
    pub zk_proofs: HashMap<String, ProofBundle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOfferResponse {
    pub offer_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferStatusResponse {
    pub offer_id: String,
    pub status: String,
}

/// x402 payment-required bundle, mirrored as both HTTP headers and a JSON
/// body (spec.md §6 "Wire: x402 payment-required response").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequiredBundle {
    pub chain: String,
    pub network: String,
    pub amount: u64,
    pub token: String,
    pub offer_id: String,
    pub user_pubkey: String,
    pub platform_pubkey: String,
    pub escrow_program: String,
    pub escrow_pda: String,
    pub verification_endpoint: String,
}

impl PaymentRequiredBundle {
    /// Header name/value pairs in the exact order of spec.md §6's table.
    pub fn headers(&self) -> [(&'static str, String); 10] {
        [
            ("X-Payment-Chain", self.chain.clone()),
            ("X-Payment-Network", self.network.clone()),
            ("X-Payment-Amount", self.amount.to_string()),
            ("X-Payment-Token", self.token.clone()),
            ("X-Offer-Id", self.offer_id.clone()),
            ("X-User-Pubkey", self.user_pubkey.clone()),
            ("X-Platform-Pubkey", self.platform_pubkey.clone()),
            ("X-Escrow-Program", self.escrow_program.clone()),
            ("X-Escrow-PDA", self.escrow_pda.clone()),
            ("X-Verification-Endpoint", self.verification_endpoint.clone()),
        ]
    }
}

/// `POST /impressions` request body (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct ImpressionReport {
    pub offer_id: String,
    pub publisher_id: String,
    pub duration_ms: u64,
}

impl ImpressionReport {
    /// spec.md §6 precondition: `duration_ms >= 1000`.
    pub fn is_qualifying(&self) -> bool {
        self.duration_ms >= 1000
    }
}

/// One settlement leg's outcome, part of the `/impressions` response.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementLegReport {
    #[serde(rename = "type")]
    pub leg: crate::entities::SettlementLeg,
    pub tx_id: Option<String>,
    pub explorer_url: Option<String>,
}

/// `POST /impressions` response body (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct ImpressionResponse {
    pub settled: bool,
    pub transactions: Vec<SettlementLegReport>,
}

/// `verify_payment` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub tx_id: String,
    pub escrow_address: String,
}

/// Structured error body every handler returns (spec.md §7: "Every error
/// response carries a machine-readable `error` code and human-readable
/// `details`").
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl From<&PayattnError> for ErrorBody {
    fn from(err: &PayattnError) -> Self {
        ErrorBody {
            error: err.code().to_string(),
            details: err.to_string(),
        }
    }
}

/// Maps a `PayattnError`'s kind to the HTTP status spec.md §7 prescribes.
/// `402` is handled separately by `accept_offer` itself (a protocol
/// response, not an error).
pub fn http_status_for(err: &PayattnError) -> u16 {
    match err.kind() {
        ErrorKind::Validation => 400,
        ErrorKind::State => 409,
        ErrorKind::Crypto => 400,
        ErrorKind::Custody => match err {
            PayattnError::EscrowNotFound { .. } => 404,
            _ => 409,
        },
        ErrorKind::Transport => 503,
        ErrorKind::Configuration => 500,
    }
}
