use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use pricedrop_core::domain::product::{Marketplace, ProductId};
use pricedrop_core::domain::watchlist::{NewWatchlistEntry, WatchlistEntry};

use super::{decode_decimal, RepositoryError, WatchlistRepository};
use crate::DbPool;

pub struct SqlWatchlistRepository {
    pool: DbPool,
}

impl SqlWatchlistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn entry_from_row(row: &SqliteRow) -> Result<WatchlistEntry, RepositoryError> {
        let marketplace_raw: String = row.try_get("marketplace")?;
        let marketplace = marketplace_raw.parse::<Marketplace>().map_err(|error| {
            RepositoryError::Decode(format!("column `marketplace`: {error}"))
        })?;

        let current_price_raw: String = row.try_get("current_price")?;
        let original_price_raw: Option<String> = row.try_get("original_price")?;
        let original_price = original_price_raw
            .map(|raw| decode_decimal("original_price", &raw))
            .transpose()?;

        Ok(WatchlistEntry {
            id: row.try_get("id")?,
            product_id: ProductId(row.try_get("product_id")?),
            product_name: row.try_get("product_name")?,
            marketplace,
            current_price: decode_decimal("current_price", &current_price_raw)?,
            original_price,
            image_url: row.try_get("image_url")?,
            product_url: row.try_get("product_url")?,
            added_at: row.try_get::<DateTime<Utc>, _>("added_at")?,
        })
    }
}

#[async_trait]
impl WatchlistRepository for SqlWatchlistRepository {
    async fn add(&self, entry: NewWatchlistEntry) -> Result<bool, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO watchlist
                (product_id, product_name, marketplace, current_price,
                 original_price, image_url, product_url, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.product_id.0)
        .bind(&entry.product_name)
        .bind(entry.marketplace.as_str())
        .bind(entry.current_price.to_string())
        .bind(entry.original_price.map(|price| price.to_string()))
        .bind(&entry.image_url)
        .bind(&entry.product_url)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // Duplicate watchlisting is an expected outcome, not a failure.
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                tx.rollback().await?;
                return Ok(false);
            }
            Err(error) => return Err(error.into()),
        }

        sqlx::query("INSERT INTO price_history (product_id, price, recorded_at) VALUES (?, ?, ?)")
            .bind(&entry.product_id.0)
            .bind(entry.current_price.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn remove(&self, product_id: &ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM watchlist WHERE product_id = ?")
            .bind(&product_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, product_name, marketplace, current_price,
                   original_price, image_url, product_url, added_at
            FROM watchlist
            ORDER BY added_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn contains(&self, product_id: &ProductId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT id FROM watchlist WHERE product_id = ?")
            .bind(&product_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn update_current_price(
        &self,
        product_id: &ProductId,
        new_price: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE watchlist SET current_price = ? WHERE product_id = ?")
            .bind(new_price.to_string())
            .bind(&product_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
