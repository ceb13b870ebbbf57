//! Entities from spec.md §3: `Offer`, `Escrow` (off-chain mirror),
//! `AdCreative`, `SettlementQueueEntry`, `SessionRecord`, and the party
//! directory rows. Plain data with `serde` derives and `FromStr`/`as_str`
//! for the status enums `payattn-store` maps to and from TEXT columns; no
//! I/O here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::offer_id::OfferId;

/// Off-chain offer status (spec.md §4.2). On-chain settlement flags remain
/// authoritative for `settling`/`settled`; the coordinator reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    OfferMade,
    Accepted,
    Funded,
    Settling,
    Settled,
    Rejected,
    Refunded,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::OfferMade => "offer_made",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Funded => "funded",
            OfferStatus::Settling => "settling",
            OfferStatus::Settled => "settled",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Refunded => "refunded",
        }
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = crate::error::PayattnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer_made" => Ok(OfferStatus::OfferMade),
            "accepted" => Ok(OfferStatus::Accepted),
            "funded" => Ok(OfferStatus::Funded),
            "settling" => Ok(OfferStatus::Settling),
            "settled" => Ok(OfferStatus::Settled),
            "rejected" => Ok(OfferStatus::Rejected),
            "refunded" => Ok(OfferStatus::Refunded),
            other => Err(crate::error::PayattnError::MalformedInput(format!(
                "unknown offer status: {other}"
            ))),
        }
    }
}

/// One of the three settlement legs (mirrors the on-chain program's
/// `SettlementLeg` enum, duplicated here since off-chain crates don't
/// depend on the Anchor program crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementLeg {
    User,
    Publisher,
    Platform,
}

impl SettlementLeg {
    pub const ALL: [SettlementLeg; 3] = [
        SettlementLeg::User,
        SettlementLeg::Publisher,
        SettlementLeg::Platform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementLeg::User => "user",
            SettlementLeg::Publisher => "publisher",
            SettlementLeg::Platform => "platform",
        }
    }
}

impl std::str::FromStr for SettlementLeg {
    type Err = crate::error::PayattnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(SettlementLeg::User),
            "publisher" => Ok(SettlementLeg::Publisher),
            "platform" => Ok(SettlementLeg::Platform),
            other => Err(crate::error::PayattnError::MalformedInput(format!(
                "unknown settlement leg: {other}"
            ))),
        }
    }
}

/// Supported ZK circuit kinds (spec.md §4.5), enumerated at compile time per
/// the "dynamic JSON typed maps" re-architecture note in spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitKind {
    AgeRange,
    RangeCheck,
    SetMembership,
}

/// One submitted ZK proof bundle, tagged by proof system and circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofBundle {
    Groth16Bn128 {
        circuit: String,
        proof: Vec<u8>,
        public_signals: Vec<String>,
    },
}

/// One per advertiser<->user intent (spec.md §3 "Offer").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub advertiser_id: String,
    pub user_id: String,
    pub user_pubkey: String,
    pub ad_id: String,
    pub amount: u64,
    pub status: OfferStatus,
    pub escrow_address: Option<String>,
    pub funding_tx_id: Option<String>,
    pub settling: bool,
    pub settled_at: Option<DateTime<Utc>>,
    pub zk_proofs: HashMap<String, ProofBundle>,
    pub ad_creative_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// The `(status, settling)` pair used as the compare-and-set guard for
    /// every writer (spec.md §5).
    pub fn cas_key(&self) -> (OfferStatus, bool) {
        (self.status, self.settling)
    }
}

/// Off-chain mirror of the on-chain escrow account, used by the coordinator
/// to validate funding without re-deriving from raw account bytes in every
/// call site. The on-chain account (see `payattn-chain::layout`) remains
/// the authoritative source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowView {
    pub offer_id: OfferId,
    pub address: String,
    pub advertiser: String,
    pub user: String,
    pub platform: String,
    pub amount: u64,
    pub created_at: DateTime<Utc>,
    pub user_settled: bool,
    pub publisher_settled: bool,
    pub platform_settled: bool,
}

impl EscrowView {
    pub fn fully_settled(&self) -> bool {
        self.user_settled && self.publisher_settled && self.platform_settled
    }
}

/// Targeting criteria an offer's proofs must satisfy (spec.md §3 "Ad
/// Creative").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Targeting {
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub interest_tags: Vec<String>,
    pub minimum_income: Option<u64>,
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdCreativeStatus {
    Active,
    Paused,
    Completed,
    Rejected,
}

impl AdCreativeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdCreativeStatus::Active => "active",
            AdCreativeStatus::Paused => "paused",
            AdCreativeStatus::Completed => "completed",
            AdCreativeStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for AdCreativeStatus {
    type Err = crate::error::PayattnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AdCreativeStatus::Active),
            "paused" => Ok(AdCreativeStatus::Paused),
            "completed" => Ok(AdCreativeStatus::Completed),
            "rejected" => Ok(AdCreativeStatus::Rejected),
            other => Err(crate::error::PayattnError::MalformedInput(format!(
                "unknown ad creative status: {other}"
            ))),
        }
    }
}

/// Catalog record the coordinator reads to admit offers (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdCreative {
    pub ad_creative_id: String,
    pub advertiser_id: String,
    pub headline: String,
    pub body: String,
    pub cta: String,
    pub destination: String,
    pub targeting: Targeting,
    pub budget_per_impression: u64,
    pub total_budget: u64,
    pub spent: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub status: AdCreativeStatus,
}

impl AdCreative {
    /// An ad creative may be served only while active and under budget
    /// (spec.md §3 invariant).
    pub fn is_servable(&self) -> bool {
        self.status == AdCreativeStatus::Active && self.spent < self.total_budget
    }

    pub fn remaining_budget(&self) -> u64 {
        self.total_budget.saturating_sub(self.spent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEntryStatus {
    Pending,
    Retrying,
    Succeeded,
    Failed,
}

impl QueueEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueEntryStatus::Pending => "pending",
            QueueEntryStatus::Retrying => "retrying",
            QueueEntryStatus::Succeeded => "succeeded",
            QueueEntryStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for QueueEntryStatus {
    type Err = crate::error::PayattnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QueueEntryStatus::Pending),
            "retrying" => Ok(QueueEntryStatus::Retrying),
            "succeeded" => Ok(QueueEntryStatus::Succeeded),
            "failed" => Ok(QueueEntryStatus::Failed),
            other => Err(crate::error::PayattnError::MalformedInput(format!(
                "unknown queue entry status: {other}"
            ))),
        }
    }
}

/// One failed settlement leg awaiting retry (spec.md §3 "Settlement Queue
/// Entry"). Composite unique key `(offer_id, tx_type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementQueueEntry {
    pub offer_id: OfferId,
    pub tx_type: SettlementLeg,
    pub recipient_pubkey: String,
    pub amount: u64,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub status: QueueEntryStatus,
    pub success_tx_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SettlementQueueEntry {
    pub fn new(
        offer_id: OfferId,
        tx_type: SettlementLeg,
        recipient_pubkey: String,
        amount: u64,
        max_attempts: u32,
    ) -> Self {
        Self {
            offer_id,
            tx_type,
            recipient_pubkey,
            amount,
            attempts: 0,
            max_attempts,
            last_error: None,
            last_attempt_at: None,
            status: QueueEntryStatus::Pending,
            success_tx_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// One reasoned decision within a batch-assess session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDecision {
    pub offer_id: OfferId,
    pub accepted: bool,
    pub reasoning: String,
    pub proof_summary: String,
}

/// Append-only audit artifact of one coordinator "batch assess" run
/// (spec.md §3 "Session / Assessment Record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub advertiser_id: String,
    pub timestamp: DateTime<Utc>,
    pub total_assessed: u32,
    pub total_accepted: u32,
    pub total_rejected: u32,
    pub decisions: Vec<OfferDecision>,
}

/// Minimal party-directory row referenced by offers via soft (text) foreign
/// keys (spec.md §6 "Persisted state").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advertiser {
    pub advertiser_id: String,
    pub pubkey: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub pubkey: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: String,
    pub pubkey: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn offer_status_round_trips_through_str() {
        for status in [
            OfferStatus::OfferMade,
            OfferStatus::Accepted,
            OfferStatus::Funded,
            OfferStatus::Settling,
            OfferStatus::Settled,
            OfferStatus::Rejected,
            OfferStatus::Refunded,
        ] {
            assert_eq!(OfferStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn settlement_leg_round_trips_through_str() {
        for leg in SettlementLeg::ALL {
            assert_eq!(SettlementLeg::from_str(leg.as_str()).unwrap(), leg);
        }
    }

    #[test]
    fn ad_creative_not_servable_when_budget_exhausted() {
        let creative = AdCreative {
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
            budget_per_impression: 100,
            total_budget: 1_000,
            spent: 1_000,
            impressions: 10,
            clicks: 1,
            status: AdCreativeStatus::Active,
        };
        assert!(!creative.is_servable());
        assert_eq!(creative.remaining_budget(), 0);
    }
}
