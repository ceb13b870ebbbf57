//! Ad creative catalog (spec.md §3 "Ad Creative", §4.1 `submit_offer`
//! admission check).

use std::str::FromStr;

use payattn_types::entities::{AdCreative, AdCreativeStatus, Targeting};
use payattn_types::error::PayattnError;
use sqlx::{PgPool, Row};

/// Selects which ad-creative table a deployment reads and writes
/// (spec.md §6 "`DATABASE_MODE`: `test` or `production` selects the
/// ad-creative table"): `test` keeps seed/scratch creatives out of the
/// production catalog entirely, rather than tagging rows in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseMode {
    Test,
    Production,
}

impl DatabaseMode {
    fn table(self) -> &'static str {
        match self {
            DatabaseMode::Test => "ad_creatives_test",
            DatabaseMode::Production => "ad_creatives",
        }
    }
}

#[derive(Clone)]
pub struct CreativeRepository {
    pool: PgPool,
    table: &'static str,
}

impl CreativeRepository {
    pub fn new(pool: PgPool, mode: DatabaseMode) -> Self {
        Self {
            pool,
            table: mode.table(),
        }
    }

    pub async fn get(&self, ad_creative_id: &str) -> Result<AdCreative, PayattnError> {
        let row = sqlx::query(&format!(
            "SELECT * FROM {} WHERE ad_creative_id = $1",
            self.table
        ))
        .bind(ad_creative_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?
        .ok_or_else(|| {
            PayattnError::MalformedInput(format!("unknown ad creative {ad_creative_id}"))
        })?;

        row_to_creative(row)
    }

    pub async fn insert(&self, creative: &AdCreative) -> Result<(), PayattnError> {
        let targeting = serde_json::to_value(&creative.targeting)
            .map_err(|e| PayattnError::Storage(e.to_string()))?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {}
                (ad_creative_id, advertiser_id, headline, body, cta, destination,
                 targeting, budget_per_impression, total_budget, spent, impressions,
                 clicks, status)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
            self.table
        ))
        .bind(&creative.ad_creative_id)
        .bind(&creative.advertiser_id)
        .bind(&creative.headline)
        .bind(&creative.body)
        .bind(&creative.cta)
        .bind(&creative.destination)
        .bind(targeting)
        .bind(creative.budget_per_impression as i64)
        .bind(creative.total_budget as i64)
        .bind(creative.spent as i64)
        .bind(creative.impressions as i64)
        .bind(creative.clicks as i64)
        .bind(creative.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Applied once an impression qualifies (spec.md §4.3 step 1: "debit the
    /// ad's budget by `budget_per_impression`, increment impressions").
    pub async fn record_impression(&self, ad_creative_id: &str) -> Result<(), PayattnError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET spent = spent + budget_per_impression,
                impressions = impressions + 1
            WHERE ad_creative_id = $1
            "#,
            self.table
        ))
        .bind(ad_creative_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PayattnError::MalformedInput(format!(
                "unknown ad creative {ad_creative_id}"
            )));
        }
        Ok(())
    }
}

fn row_to_creative(row: sqlx::postgres::PgRow) -> Result<AdCreative, PayattnError> {
    let targeting_json: serde_json::Value = row
        .try_get("targeting")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let targeting: Targeting = serde_json::from_value(targeting_json)
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    let status_str: String = row
        .try_get("status")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let status = AdCreativeStatus::from_str(&status_str)?;

    let budget_per_impression: i64 = row
        .try_get("budget_per_impression")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let total_budget: i64 = row
        .try_get("total_budget")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let spent: i64 = row
        .try_get("spent")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let impressions: i64 = row
        .try_get("impressions")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;
    let clicks: i64 = row
        .try_get("clicks")
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    Ok(AdCreative {
        ad_creative_id: row
            .try_get("ad_creative_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        advertiser_id: row
            .try_get("advertiser_id")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        headline: row
            .try_get("headline")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        body: row
            .try_get("body")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        cta: row
            .try_get("cta")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        destination: row
            .try_get("destination")
            .map_err(|e| PayattnError::Storage(e.to_string()))?,
        targeting,
        budget_per_impression: budget_per_impression as u64,
        total_budget: total_budget as u64,
        spent: spent as u64,
        impressions: impressions as u64,
        clicks: clicks as u64,
        status,
    })
}
