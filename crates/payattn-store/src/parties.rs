//! Party directories: advertisers, users, publishers (spec.md §3, §6
//! "Persisted state"). Thin lookup tables; offers reference them by text id
//! rather than a SQL foreign key since advertiser/user/publisher onboarding
//! is out of scope (spec.md §1 Non-goals).

use payattn_types::entities::{Advertiser, Publisher, User};
use payattn_types::error::PayattnError;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_advertiser(&self, advertiser_id: &str) -> Result<Advertiser, PayattnError> {
        let row = sqlx::query(r#"SELECT * FROM advertisers WHERE advertiser_id = $1"#)
            .bind(advertiser_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?
            .ok_or_else(|| {
                PayattnError::MalformedInput(format!("unknown advertiser {advertiser_id}"))
            })?;

        Ok(Advertiser {
            advertiser_id: row
                .try_get("advertiser_id")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            pubkey: row
                .try_get("pubkey")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
        })
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, PayattnError> {
        let row = sqlx::query(r#"SELECT * FROM users WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?
            .ok_or_else(|| PayattnError::MalformedInput(format!("unknown user {user_id}")))?;

        Ok(User {
            user_id: row
                .try_get("user_id")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            pubkey: row
                .try_get("pubkey")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
        })
    }

    pub async fn get_publisher(&self, publisher_id: &str) -> Result<Publisher, PayattnError> {
        let row = sqlx::query(r#"SELECT * FROM publishers WHERE publisher_id = $1"#)
            .bind(publisher_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PayattnError::Storage(e.to_string()))?
            .ok_or_else(|| {
                PayattnError::MalformedInput(format!("unknown publisher {publisher_id}"))
            })?;

        Ok(Publisher {
            publisher_id: row
                .try_get("publisher_id")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            pubkey: row
                .try_get("pubkey")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| PayattnError::Storage(e.to_string()))?,
        })
    }
}
