//! Maps the on-chain program's closed `EscrowError` enum, as it appears in
//! simulation/transaction logs, to the off-chain `PayattnError` taxonomy
//! (spec.md §7: "`payattn-chain` maps each on-chain error code to the
//! corresponding `PayattnError` variant when decoding a failed
//! transaction's logs").

use payattn_types::error::PayattnError;

/// Best-effort classification of a failed transaction's log lines. Anchor
/// programs log `"Error Code: <Name>. Error Number: ..."`; we match on the
/// variant name substring since the numeric code is only stable within one
/// build of the program.
pub fn classify_escrow_log(offer_id: &str, logs: &[String]) -> PayattnError {
    let joined = logs.join("\n");

    if joined.contains("AlreadySettled") {
        // Leg kind isn't recoverable from the log alone; callers that know
        // which leg they submitted should prefer constructing this variant
        // directly. This is the generic fallback for log-only classification.
        return PayattnError::AlreadySettled {
            offer_id: offer_id.to_string(),
            leg: payattn_types::entities::SettlementLeg::User,
        };
    }
    if joined.contains("PrerequisiteNotSettled") {
        return PayattnError::PrerequisiteNotSettled {
            offer_id: offer_id.to_string(),
        };
    }
    if joined.contains("NotRefundable") {
        return PayattnError::NotRefundable {
            offer_id: offer_id.to_string(),
        };
    }
    if joined.contains("InsufficientFunds") {
        return PayattnError::InsufficientFunds;
    }
    if joined.contains("AmountZero") {
        return PayattnError::AmountZero;
    }
    if joined.contains("OfferIdTooLong") {
        return PayattnError::OfferIdTooLong {
            len: 0,
            max: payattn_types::offer_id::MAX_OFFER_ID_LEN,
        };
    }
    if joined.contains("InvalidPartyAddress") {
        return PayattnError::UserKeyMismatch;
    }

    PayattnError::TransactionFailed {
        tx_id: String::new(),
        reason: joined,
    }
}
