use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use pricedrop_core::domain::product::ProductId;
use pricedrop_core::domain::watchlist::{NewWatchlistEntry, PricePoint, WatchlistEntry};

pub mod deal_votes;
pub mod memory;
pub mod price_history;
pub mod watchlist;

pub use deal_votes::SqlDealVoteRepository;
pub use memory::InMemoryStore;
pub use price_history::SqlPriceHistoryRepository;
pub use watchlist::SqlWatchlistRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Prices persist as TEXT so SQLite never coerces them through floats.
pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>().map_err(|error| {
        RepositoryError::Decode(format!("column `{column}` held `{raw}`: {error}"))
    })
}

/// The watchlist store. At most one entry per product id; `add` reports a
/// duplicate as `false` rather than an error.
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// Insert a new entry and record its first price point in the same
    /// transaction. Returns `false` when the product is already watched.
    async fn add(&self, entry: NewWatchlistEntry) -> Result<bool, RepositoryError>;

    /// Idempotent delete; removing an absent entry is not an error.
    async fn remove(&self, product_id: &ProductId) -> Result<(), RepositoryError>;

    /// All entries, most recently added first.
    async fn list(&self) -> Result<Vec<WatchlistEntry>, RepositoryError>;

    async fn contains(&self, product_id: &ProductId) -> Result<bool, RepositoryError>;

    /// In-place price refresh; history is not rewritten.
    async fn update_current_price(
        &self,
        product_id: &ProductId,
        new_price: Decimal,
    ) -> Result<(), RepositoryError>;
}

/// Append-only price observations per product.
#[async_trait]
pub trait PriceHistoryRepository: Send + Sync {
    /// Append a point regardless of watchlist membership.
    async fn record(&self, product_id: &ProductId, price: Decimal)
        -> Result<(), RepositoryError>;

    /// Observations in ascending timestamp order; empty when none recorded.
    async fn history(&self, product_id: &ProductId) -> Result<Vec<PricePoint>, RepositoryError>;
}

/// Locally stored upvote counters for the community deals feed.
#[async_trait]
pub trait DealVoteRepository: Send + Sync {
    /// Create the counter at 1 on first upvote, increment thereafter.
    async fn upvote(&self, deal_id: i64) -> Result<(), RepositoryError>;

    async fn upvotes(&self, deal_id: i64) -> Result<i64, RepositoryError>;
}
