use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use pricedrop_core::domain::product::ProductId;
use pricedrop_core::domain::watchlist::PricePoint;

use super::{decode_decimal, PriceHistoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPriceHistoryRepository {
    pool: DbPool,
}

impl SqlPriceHistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceHistoryRepository for SqlPriceHistoryRepository {
    async fn record(
        &self,
        product_id: &ProductId,
        price: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO price_history (product_id, price, recorded_at) VALUES (?, ?, ?)")
            .bind(&product_id.0)
            .bind(price.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn history(&self, product_id: &ProductId) -> Result<Vec<PricePoint>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, price, recorded_at
            FROM price_history
            WHERE product_id = ?
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(&product_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let price_raw: String = row.try_get("price")?;
                Ok(PricePoint {
                    product_id: ProductId(row.try_get("product_id")?),
                    price: decode_decimal("price", &price_raw)?,
                    recorded_at: row.try_get::<DateTime<Utc>, _>("recorded_at")?,
                })
            })
            .collect()
    }
}
