use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use pricedrop_core::domain::product::ProductId;
use pricedrop_core::domain::watchlist::{NewWatchlistEntry, PricePoint, WatchlistEntry};

use super::{
    DealVoteRepository, PriceHistoryRepository, RepositoryError, WatchlistRepository,
};

#[derive(Default)]
struct StoreState {
    next_id: i64,
    entries: HashMap<String, WatchlistEntry>,
    history: HashMap<String, Vec<PricePoint>>,
    votes: HashMap<i64, i64>,
}

/// In-memory stand-in for the SQL store. Implements all three repository
/// traits over one shared state so `add` can append its price point the way
/// the transactional SQL implementation does.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

#[async_trait]
impl WatchlistRepository for InMemoryStore {
    async fn add(&self, entry: NewWatchlistEntry) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if state.entries.contains_key(&entry.product_id.0) {
            return Ok(false);
        }

        let now = Utc::now();
        state.next_id += 1;
        let id = state.next_id;
        state.entries.insert(
            entry.product_id.0.clone(),
            WatchlistEntry {
                id,
                product_id: entry.product_id.clone(),
                product_name: entry.product_name,
                marketplace: entry.marketplace,
                current_price: entry.current_price,
                original_price: entry.original_price,
                image_url: entry.image_url,
                product_url: entry.product_url,
                added_at: now,
            },
        );
        state.history.entry(entry.product_id.0.clone()).or_default().push(PricePoint {
            product_id: entry.product_id,
            price: entry.current_price,
            recorded_at: now,
        });
        Ok(true)
    }

    async fn remove(&self, product_id: &ProductId) -> Result<(), RepositoryError> {
        self.state.write().await.entries.remove(&product_id.0);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WatchlistEntry>, RepositoryError> {
        let state = self.state.read().await;
        let mut entries: Vec<WatchlistEntry> = state.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn contains(&self, product_id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.state.read().await.entries.contains_key(&product_id.0))
    }

    async fn update_current_price(
        &self,
        product_id: &ProductId,
        new_price: Decimal,
    ) -> Result<(), RepositoryError> {
        if let Some(entry) = self.state.write().await.entries.get_mut(&product_id.0) {
            entry.current_price = new_price;
        }
        Ok(())
    }
}

#[async_trait]
impl PriceHistoryRepository for InMemoryStore {
    async fn record(
        &self,
        product_id: &ProductId,
        price: Decimal,
    ) -> Result<(), RepositoryError> {
        self.state.write().await.history.entry(product_id.0.clone()).or_default().push(
            PricePoint { product_id: product_id.clone(), price, recorded_at: Utc::now() },
        );
        Ok(())
    }

    async fn history(&self, product_id: &ProductId) -> Result<Vec<PricePoint>, RepositoryError> {
        Ok(self.state.read().await.history.get(&product_id.0).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DealVoteRepository for InMemoryStore {
    async fn upvote(&self, deal_id: i64) -> Result<(), RepositoryError> {
        *self.state.write().await.votes.entry(deal_id).or_insert(0) += 1;
        Ok(())
    }

    async fn upvotes(&self, deal_id: i64) -> Result<i64, RepositoryError> {
        Ok(self.state.read().await.votes.get(&deal_id).copied().unwrap_or(0))
    }
}
