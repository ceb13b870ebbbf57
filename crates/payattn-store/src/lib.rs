//! Postgres persistence layer (spec.md §6 "Persisted state"). One
//! repository struct per table family, each holding a cloned `PgPool`
//! (pools are `Arc`-backed internally, so cloning is cheap and shareable
//! across the coordinator's and worker's tokio tasks).

pub mod creatives;
pub mod offers;
pub mod parties;
pub mod queue;
pub mod sessions;

pub use creatives::{CreativeRepository, DatabaseMode};
pub use offers::OfferRepository;
pub use parties::PartyRepository;
pub use queue::QueueRepository;
pub use sessions::SessionRepository;

use payattn_types::error::PayattnError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Opens the pool and runs pending migrations (spec.md §6: the store owns
/// its schema). `max_connections` should track the expected worker +
/// coordinator concurrency.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, PayattnError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| PayattnError::Storage(e.to_string()))?;

    Ok(pool)
}

/// Bundle of all repositories, handed to the coordinator and worker at
/// startup so each call site takes the narrow slice it needs rather than a
/// raw `PgPool`.
#[derive(Clone)]
pub struct Store {
    pub offers: OfferRepository,
    pub queue: QueueRepository,
    pub sessions: SessionRepository,
    pub creatives: CreativeRepository,
    pub parties: PartyRepository,
}

impl Store {
    pub fn new(pool: PgPool, database_mode: DatabaseMode) -> Self {
        Self {
            offers: OfferRepository::new(pool.clone()),
            queue: QueueRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            creatives: CreativeRepository::new(pool.clone(), database_mode),
            parties: PartyRepository::new(pool),
        }
    }
}
