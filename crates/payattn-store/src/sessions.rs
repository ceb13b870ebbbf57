//! Session records: append-only audit trail of batch-assess runs
//! (spec.md §3 "Session / Assessment Record", §4.2 `assess_batch`).

use payattn_types::entities::{OfferDecision, SessionRecord};
use payattn_types::error::PayattnError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, session: &SessionRecord) -> Result<(), PayattnError> {
        let decisions = serde_json::to_value(&session.decisions)
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions
                (id, advertiser_id, timestamp, total_assessed, total_accepted,
                 total_rejected, decisions)
            VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(session.id)
        .bind(&session.advertiser_id)
        .bind(session.timestamp)
        .bind(session.total_assessed as i32)
        .bind(session.total_accepted as i32)
        .bind(session.total_rejected as i32)
        .bind(decisions)
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionRecord, PayattnError> {
        let row = sqlx::query(r#"SELECT * FROM sessions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?
            .ok_or_else(|| PayattnError::Storage(format!("no session {id}")))?;

        let decisions_json: serde_json::Value = row
            .try_get("decisions")
            .map_err(|e| PayattnError::Storage(e.to_string()))?;
        let decisions: Vec<OfferDecision> = serde_json::from_value(decisions_json)
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        let total_assessed: i32 = row
            .try_get("total_assessed")
            .map_err(|e| PayattnError::Storage(e.to_string()))?;
        let total_accepted: i32 = row
            .try_get("total_accepted")
            .map_err(|e| PayattnError::Storage(e.to_string()))?;
        let total_rejected: i32 = row
            .try_get("total_rejected")
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(SessionRecord {
            id: row
                .try_get("id")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            advertiser_id: row
                .try_get("advertiser_id")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            timestamp: row
                .try_get("timestamp")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            total_assessed: total_assessed as u32,
            total_accepted: total_accepted as u32,
            total_rejected: total_rejected as u32,
            decisions,
        })
    }
}
