use async_trait::async_trait;

use super::{DealVoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlDealVoteRepository {
    pool: DbPool,
}

impl SqlDealVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DealVoteRepository for SqlDealVoteRepository {
    async fn upvote(&self, deal_id: i64) -> Result<(), RepositoryError> {
        // Single-statement upsert keeps first-vote creation and later
        // increments atomic without a read-modify-write round trip.
        sqlx::query(
            r#"
            INSERT INTO deal_upvotes (deal_id, upvotes) VALUES (?, 1)
            ON CONFLICT (deal_id) DO UPDATE SET upvotes = upvotes + 1
            "#,
        )
        .bind(deal_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upvotes(&self, deal_id: i64) -> Result<i64, RepositoryError> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT upvotes FROM deal_upvotes WHERE deal_id = ?")
                .bind(deal_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(count.unwrap_or(0))
    }
}
