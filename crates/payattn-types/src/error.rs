//! Closed error taxonomy shared by every off-chain crate (spec.md §7).
//!
//! Mirrors the on-chain program's `#[error_code] enum EscrowError` in spirit:
//! a single closed enumeration, each variant carrying a machine-readable
//! `code()` and a human `#[error(...)]` message, with no silent catch-alls.

use thiserror::Error;

/// The six coarse kinds from spec.md §7, surfaced alongside the specific
/// variant so callers can branch on category without matching every arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    State,
    Crypto,
    Custody,
    Transport,
    Configuration,
}

#[derive(Debug, Error)]
pub enum PayattnError {
    // --- Validation ---
    #[error("offer id is {len} bytes, exceeding the maximum of {max}")]
    OfferIdTooLong { len: usize, max: usize },

    #[error("amount must be greater than zero")]
    AmountZero,

    #[error("missing required header: {0}")]
    MissingHeader(String),

    #[error("unknown circuit: {0}")]
    UnknownCircuit(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    // --- State ---
    #[error("offer {offer_id} has status {actual:?}, expected one of {expected:?}")]
    WrongStatus {
        offer_id: String,
        actual: crate::entities::OfferStatus,
        expected: Vec<crate::entities::OfferStatus>,
    },

    #[error("{leg:?} leg for offer {offer_id} is already settled")]
    AlreadySettled {
        offer_id: String,
        leg: crate::entities::SettlementLeg,
    },

    #[error("platform leg for offer {offer_id} attempted before user/publisher settled")]
    PrerequisiteNotSettled { offer_id: String },

    #[error("offer {offer_id} was modified concurrently; retry against current state")]
    ConcurrentModification { offer_id: String },

    #[error("escrow for offer {offer_id} is not eligible for refund yet")]
    NotRefundable { offer_id: String },

    #[error("settlement for offer {offer_id} is already in progress")]
    ConcurrentSettlement { offer_id: String },

    // --- Crypto ---
    #[error("proof verification failed for circuit {circuit}")]
    InvalidProof { circuit: String },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("public signals do not match campaign requirements: {reason}")]
    SignalsMismatchRequirements { reason: String },

    // --- Custody ---
    #[error("derived escrow PDA does not match supplied address")]
    PdaMismatch,

    #[error("escrow amount {on_chain} does not match expected {expected}")]
    AmountMismatch { expected: u64, on_chain: u64 },

    #[error("escrow user key does not match expected user")]
    UserKeyMismatch,

    #[error("escrow advertiser key does not match expected advertiser")]
    AdvertiserKeyMismatch,

    #[error("escrow not found at derived address for offer {offer_id}")]
    EscrowNotFound { offer_id: String },

    #[error("advertiser has insufficient funds to cover amount and rent")]
    InsufficientFunds,

    // --- Transport ---
    #[error("RPC call timed out after {seconds}s")]
    RpcTimeout { seconds: u64 },

    #[error("transaction {tx_id} not found")]
    TransactionNotFound { tx_id: String },

    #[error("transaction {tx_id} failed on-chain: {reason}")]
    TransactionFailed { tx_id: String, reason: String },

    // --- Configuration ---
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    // --- Persistence passthrough (ambient, not in spec.md's taxonomy but
    // required so store errors propagate through the same enum) ---
    #[error("storage error: {0}")]
    Storage(String),
}

impl PayattnError {
    /// Machine-readable error code, stable across releases, used in both
    /// HTTP error bodies and structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            PayattnError::OfferIdTooLong { .. } => "offer_id_too_long",
            PayattnError::AmountZero => "amount_zero",
            PayattnError::MissingHeader(_) => "missing_header",
            PayattnError::UnknownCircuit(_) => "unknown_circuit",
            PayattnError::MalformedInput(_) => "malformed_input",
            PayattnError::WrongStatus { .. } => "wrong_status",
            PayattnError::AlreadySettled { .. } => "already_settled",
            PayattnError::PrerequisiteNotSettled { .. } => "prerequisite_not_settled",
            PayattnError::ConcurrentModification { .. } => "concurrent_modification",
            PayattnError::NotRefundable { .. } => "not_refundable",
            PayattnError::ConcurrentSettlement { .. } => "concurrent_settlement",
            PayattnError::InvalidProof { .. } => "invalid_proof",
            PayattnError::SignatureVerificationFailed => "signature_verification_failed",
            PayattnError::SignalsMismatchRequirements { .. } => "signals_mismatch_requirements",
            PayattnError::PdaMismatch => "pda_mismatch",
            PayattnError::AmountMismatch { .. } => "amount_mismatch",
            PayattnError::UserKeyMismatch => "user_key_mismatch",
            PayattnError::AdvertiserKeyMismatch => "advertiser_key_mismatch",
            PayattnError::EscrowNotFound { .. } => "escrow_not_found",
            PayattnError::InsufficientFunds => "insufficient_funds",
            PayattnError::RpcTimeout { .. } => "rpc_timeout",
            PayattnError::TransactionNotFound { .. } => "transaction_not_found",
            PayattnError::TransactionFailed { .. } => "transaction_failed",
            PayattnError::MissingConfig(_) => "missing_config",
            PayattnError::InvalidConfig { .. } => "invalid_config",
            PayattnError::Storage(_) => "storage_error",
        }
    }

    /// Coarse taxonomy kind (spec.md §7), used to pick an HTTP status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PayattnError::OfferIdTooLong { .. }
            | PayattnError::AmountZero
            | PayattnError::MissingHeader(_)
            | PayattnError::UnknownCircuit(_)
            | PayattnError::MalformedInput(_) => ErrorKind::Validation,

            PayattnError::WrongStatus { .. }
            | PayattnError::AlreadySettled { .. }
            | PayattnError::PrerequisiteNotSettled { .. }
            | PayattnError::ConcurrentModification { .. }
            | PayattnError::NotRefundable { .. }
            | PayattnError::ConcurrentSettlement { .. } => ErrorKind::State,

            PayattnError::InvalidProof { .. }
            | PayattnError::SignatureVerificationFailed
            | PayattnError::SignalsMismatchRequirements { .. } => ErrorKind::Crypto,

            PayattnError::PdaMismatch
            | PayattnError::AmountMismatch { .. }
            | PayattnError::UserKeyMismatch
            | PayattnError::AdvertiserKeyMismatch
            | PayattnError::EscrowNotFound { .. }
            | PayattnError::InsufficientFunds => ErrorKind::Custody,

            PayattnError::RpcTimeout { .. }
            | PayattnError::TransactionNotFound { .. }
            | PayattnError::TransactionFailed { .. }
            | PayattnError::Storage(_) => ErrorKind::Transport,

            PayattnError::MissingConfig(_) | PayattnError::InvalidConfig { .. } => {
                ErrorKind::Configuration
            }
        }
    }
}
