//! Settlement queue repository (spec.md §3 "Settlement Queue Entry", §4.4
//! worker reconciliation). Rows are upserted on the composite key
//! `(offer_id, tx_type)`: a leg enqueued twice (settlement retry racing a
//! worker tick) collapses to one row rather than duplicating work.

use std::str::FromStr;

use payattn_types::entities::{QueueEntryStatus, SettlementLeg, SettlementQueueEntry};
use payattn_types::error::PayattnError;
use payattn_types::OfferId;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct QueueRepository {
    pool: PgPool,
}

impl QueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new queue entry, or resets an existing one back to
    /// `pending` if the prior attempt for this `(offer_id, tx_type)` had
    /// already given up (spec.md §4.3 step 7: enqueue on submission
    /// failure).
    pub async fn upsert_pending(&self, entry: &SettlementQueueEntry) -> Result<(), PayattnError> {
        sqlx::query(
            r#"
            INSERT INTO settlement_queue
                (offer_id, tx_type, recipient_pubkey, amount, attempts, max_attempts,
                 last_error, last_attempt_at, status, success_tx_id, created_at)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            ON CONFLICT (offer_id, tx_type) DO UPDATE SET
                status = CASE WHEN settlement_queue.status = 'succeeded'
                              THEN settlement_queue.status
                              ELSE 'pending' END
            "#,
        )
        .bind(entry.offer_id.to_string())
        .bind(entry.tx_type.as_str())
        .bind(&entry.recipient_pubkey)
        .bind(entry.amount as i64)
        .bind(entry.attempts as i32)
        .bind(entry.max_attempts as i32)
        .bind(&entry.last_error)
        .bind(entry.last_attempt_at)
        .bind(entry.status.as_str())
        .bind(&entry.success_tx_id)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Entries the worker should attempt this tick: not yet succeeded and
    /// not yet exhausted (spec.md §4.4 step 1).
    pub async fn fetch_ready(&self, limit: i64) -> Result<Vec<SettlementQueueEntry>, PayattnError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM settlement_queue
            WHERE status IN ('pending', 'retrying')
              AND attempts < max_attempts
            ORDER BY last_attempt_at ASC NULLS FIRST, created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        rows.into_iter().map(row_to_entry).collect()
    }

    /// Records a failed attempt, bumping `attempts` and moving to `failed`
    /// once `max_attempts` is reached (spec.md §4.4 step 4 "terminal
    /// giveup").
    pub async fn record_failure(
        &self,
        offer_id: &OfferId,
        tx_type: SettlementLeg,
        error: &str,
    ) -> Result<(), PayattnError> {
        sqlx::query(
            r#"
            UPDATE settlement_queue
            SET attempts = attempts + 1,
                last_error = $1,
                last_attempt_at = now(),
                status = CASE WHEN attempts + 1 >= max_attempts THEN 'failed' ELSE 'retrying' END
            WHERE offer_id = $2 AND tx_type = $3
            "#,
        )
        .bind(error)
        .bind(offer_id.to_string())
        .bind(tx_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn record_success(
        &self,
        offer_id: &OfferId,
        tx_type: SettlementLeg,
        tx_id: &str,
    ) -> Result<(), PayattnError> {
        sqlx::query(
            r#"
            UPDATE settlement_queue
            SET status = 'succeeded', success_tx_id = $1, last_attempt_at = now()
            WHERE offer_id = $2 AND tx_type = $3
            "#,
        )
        .bind(tx_id)
        .bind(offer_id.to_string())
        .bind(tx_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn legs_for_offer(
        &self,
        offer_id: &OfferId,
    ) -> Result<Vec<SettlementQueueEntry>, PayattnError> {
        let rows = sqlx::query(r#"SELECT * FROM settlement_queue WHERE offer_id = $1"#)
            .bind(offer_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<SettlementQueueEntry, PayattnError> {
    let offer_id_str: String = row
        .try_get("offer_id")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let offer_id = OfferId::new(
        bs58::decode(&offer_id_str)
            .into_vec()
            .unwrap_or_else(|_| offer_id_str.as_bytes().to_vec()),
    )?;

    let tx_type_str: String = row
        .try_get("tx_type")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let tx_type = SettlementLeg::from_str(&tx_type_str)?;

    let status_str: String = row
        .try_get("status")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let status = QueueEntryStatus::from_str(&status_str)?;

    let amount: i64 = row
        .try_get("amount")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let attempts: i32 = row
        .try_get("attempts")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let max_attempts: i32 = row
        .try_get("max_attempts")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    Ok(SettlementQueueEntry {
        offer_id,
        tx_type,
        recipient_pubkey: row
            .try_get("recipient_pubkey")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        amount: amount as u64,
        attempts: attempts as u32,
        max_attempts: max_attempts as u32,
        last_error: row
            .try_get("last_error")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        last_attempt_at: row
            .try_get("last_attempt_at")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        status,
        success_tx_id: row
            .try_get("success_tx_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_entry_exhausted_when_attempts_reach_max() {
        let mut entry = SettlementQueueEntry::new(
            OfferId::new(vec![1, 2, 3]).unwrap(),
            SettlementLeg::Publisher,
            "pub_pubkey".into(),
            1_000,
            3,
        );
        assert!(!entry.exhausted());
        entry.attempts = 3;
        assert!(entry.exhausted());
    }
}
