use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::{Marketplace, Product, ProductId};

/// Payload for adding a product to the watchlist. Mirrors the catalog
/// snapshot at add time; the catalog itself is never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWatchlistEntry {
    pub product_id: ProductId,
    pub product_name: String,
    pub marketplace: Marketplace,
    pub current_price: Decimal,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
}

impl From<&Product> for NewWatchlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            marketplace: product.marketplace,
            current_price: product.price,
            original_price: product.original_price,
            image_url: Some(product.image_url.clone()),
            product_url: Some(product.product_url.clone()),
        }
    }
}

/// A stored watchlist row. At most one per product id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub marketplace: Marketplace,
    pub current_price: Decimal,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    /// Difference between list price and the tracked price, when a list
    /// price is known. Negative when the price has risen above list.
    pub fn savings(&self) -> Option<Decimal> {
        self.original_price.map(|original| original - self.current_price)
    }
}

/// One observed price for a product. Append-only; history is always read
/// back in ascending timestamp order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub product_id: ProductId,
    pub price: Decimal,
    pub recorded_at: DateTime<Utc>,
}
