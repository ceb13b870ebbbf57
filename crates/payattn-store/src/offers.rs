//! Offer repository: the primary shared resource (spec.md §5). All writes
//! pass through conditional `UPDATE ... WHERE status = $expected AND
//! settling = $expected` statements whose affected-row-count determines the
//! compare-and-set winner — the idiomatic `sqlx` expression of optimistic
//! concurrency without a separate distributed lock manager.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use payattn_types::entities::{Offer, OfferStatus, ProofBundle};
use payattn_types::error::PayattnError;
use payattn_types::OfferId;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct OfferRepository {
    pool: PgPool,
}

impl OfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, offer: &Offer) -> Result<(), PayattnError> {
        let zk_proofs = serde_json::to_value(&offer.zk_proofs)
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO offers
                (offer_id, advertiser_id, user_id, user_pubkey, ad_id, amount, status,
                 escrow_address, funding_tx_id, settling, settled_at, zk_proofs,
                 ad_creative_ref, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
            "#,
        )
        .bind(offer.offer_id.to_string())
        .bind(&offer.advertiser_id)
        .bind(&offer.user_id)
        .bind(&offer.user_pubkey)
        .bind(&offer.ad_id)
        .bind(offer.amount as i64)
        .bind(offer.status.as_str())
        .bind(&offer.escrow_address)
        .bind(&offer.funding_tx_id)
        .bind(offer.settling)
        .bind(offer.settled_at)
        .bind(zk_proofs)
        .bind(&offer.ad_creative_ref)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn get(&self, offer_id: &OfferId) -> Result<Offer, PayattnError> {
        let row = sqlx::query(r#"SELECT * FROM offers WHERE offer_id = $1"#)
            .bind(offer_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?
            .ok_or_else(|| PayattnError::EscrowNotFound {
                offer_id: offer_id.to_string(),
            })?;

        row_to_offer(row)
    }

    /// Generic compare-and-set transition: succeeds only if the offer's
    /// current `(status, settling)` matches `expected`. Returns
    /// `ConcurrentModification` if another writer already moved it.
    async fn cas_update(
        &self,
        offer_id: &OfferId,
        expected: (OfferStatus, bool),
        set_status: Option<OfferStatus>,
        set_settling: Option<bool>,
        set_escrow_address: Option<&str>,
        set_funding_tx_id: Option<&str>,
        set_settled_at: Option<DateTime<Utc>>,
    ) -> Result<(), PayattnError> {
        let new_status = set_status.unwrap_or(expected.0);
        let new_settling = set_settling.unwrap_or(expected.1);

        let result = sqlx::query(
            r#"
            UPDATE offers
            SET status = $1,
                settling = $2,
                escrow_address = COALESCE($3, escrow_address),
                funding_tx_id = COALESCE($4, funding_tx_id),
                settled_at = COALESCE($5, settled_at),
                updated_at = now()
            WHERE offer_id = $6 AND status = $7 AND settling = $8
            "#,
        )
        .bind(new_status.as_str())
        .bind(new_settling)
        .bind(set_escrow_address)
        .bind(set_funding_tx_id)
        .bind(set_settled_at)
        .bind(offer_id.to_string())
        .bind(expected.0.as_str())
        .bind(expected.1)
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PayattnError::ConcurrentModification {
                offer_id: offer_id.to_string(),
            });
        }
        Ok(())
    }

    /// `offer_made -> accepted`. Idempotent: a caller that observes the
    /// offer already `accepted` should not call this again (spec.md §4.2
    /// "Calling accept on anything past accepted returns the current
    /// state").
    pub async fn accept(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        self.cas_update(
            offer_id,
            (OfferStatus::OfferMade, false),
            Some(OfferStatus::Accepted),
            None,
            None,
            None,
            None,
        )
        .await
    }

    pub async fn reject(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        self.cas_update(
            offer_id,
            (OfferStatus::OfferMade, false),
            Some(OfferStatus::Rejected),
            None,
            None,
            None,
            None,
        )
        .await
    }

    /// `accepted -> funded`, recording the funding transaction id and
    /// derived escrow address (spec.md §4.2 `verify_payment`).
    pub async fn mark_funded(
        &self,
        offer_id: &OfferId,
        escrow_address: &str,
        funding_tx_id: &str,
    ) -> Result<(), PayattnError> {
        self.cas_update(
            offer_id,
            (OfferStatus::Accepted, false),
            Some(OfferStatus::Funded),
            None,
            Some(escrow_address),
            Some(funding_tx_id),
            None,
        )
        .await
    }

    /// `funded -> settling`, the refund-freeze marker (spec.md §4.3 step 1).
    /// Fails with `ConcurrentSettlement` if already settling.
    pub async fn begin_settling(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        self.cas_update(
            offer_id,
            (OfferStatus::Funded, false),
            Some(OfferStatus::Settling),
            Some(true),
            None,
            None,
            None,
        )
        .await
        .map_err(|_| PayattnError::ConcurrentSettlement {
            offer_id: offer_id.to_string(),
        })
    }

    /// Clears `settling` without changing status (spec.md §4.3 step 7:
    /// partial-failure path — offer stays `funded`-equivalent while the
    /// worker closes out remaining legs).
    pub async fn clear_settling(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        self.cas_update(
            offer_id,
            (OfferStatus::Settling, true),
            Some(OfferStatus::Settling),
            Some(false),
            None,
            None,
            None,
        )
        .await
    }

    /// `settling -> settled`, all three legs landed. Called from two
    /// distinct sites with two distinct `settling` values: the engine's
    /// own happy path (spec.md §4.3 step 7) calls this while `settling` is
    /// still `true`; the worker's reconciliation path (spec.md §4.4 step
    /// 3) calls it after `clear_settling` already flipped it to `false`
    /// once legs failed and were later closed out by retries. The CAS
    /// guard is therefore keyed on `status = 'settling'` alone, not the
    /// `settling` flag's value.
    pub async fn mark_settled(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        let result = sqlx::query(
            r#"
            UPDATE offers
            SET status = 'settled', settling = false, settled_at = now(), updated_at = now()
            WHERE offer_id = $1 AND status = 'settling'
            "#,
        )
        .bind(offer_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PayattnError::ConcurrentModification {
                offer_id: offer_id.to_string(),
            });
        }
        Ok(())
    }

    /// Unconditional refund marker, called once the on-chain `refund_escrow`
    /// instruction has landed.
    pub async fn mark_refunded(&self, offer_id: &OfferId) -> Result<(), PayattnError> {
        let result = sqlx::query(
            r#"UPDATE offers SET status = 'refunded', updated_at = now() WHERE offer_id = $1"#,
        )
        .bind(offer_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PayattnError::EscrowNotFound {
                offer_id: offer_id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn list_offer_made_by_advertiser(
        &self,
        advertiser_id: &str,
    ) -> Result<Vec<Offer>, PayattnError> {
        let rows = sqlx::query(
            r#"SELECT * FROM offers WHERE advertiser_id = $1 AND status = 'offer_made'"#,
        )
        .bind(advertiser_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        rows.into_iter().map(row_to_offer).collect()
    }
}

fn row_to_offer(row: sqlx::postgres::PgRow) -> Result<Offer, PayattnError> {
    let offer_id_str: String = row
        .try_get("offer_id")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let offer_id = OfferId::new(bs58_or_raw_bytes(&offer_id_str))?;

    let status_str: String = row
        .try_get("status")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let status = OfferStatus::from_str(&status_str)?;

    let zk_proofs_json: serde_json::Value = row
        .try_get("zk_proofs")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let zk_proofs: HashMap<String, ProofBundle> = serde_json::from_value(zk_proofs_json)
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    let amount: i64 = row
        .try_get("amount")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    Ok(Offer {
        offer_id,
        advertiser_id: row
            .try_get("advertiser_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        user_pubkey: row
            .try_get("user_pubkey")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        ad_id: row
            .try_get("ad_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        amount: amount as u64,
        status,
        escrow_address: row
            .try_get("escrow_address")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        funding_tx_id: row
            .try_get("funding_tx_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        settling: row
            .try_get("settling")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        settled_at: row
            .try_get("settled_at")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        zk_proofs,
        ad_creative_ref: row
            .try_get("ad_creative_ref")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
    })
}

/// `OfferId`s are persisted in their base58 display form; decode back to
/// bytes on read.
fn bs58_or_raw_bytes(s: &str) -> Vec<u8> {
    bs58::decode(s).into_vec().unwrap_or_else(|_| s.as_bytes().to_vec())
}
