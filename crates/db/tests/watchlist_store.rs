//! End-to-end contract tests for the SQL watchlist store.

use rust_decimal::Decimal;

use pricedrop_core::domain::product::{Marketplace, ProductId};
use pricedrop_core::domain::watchlist::NewWatchlistEntry;
use pricedrop_db::repositories::{
    DealVoteRepository, PriceHistoryRepository, SqlDealVoteRepository,
    SqlPriceHistoryRepository, SqlWatchlistRepository, WatchlistRepository,
};
use pricedrop_db::{connect_with_settings, migrations, DbPool};

async fn test_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    pool
}

fn entry(product_id: &str, marketplace: Marketplace, price_cents: i64) -> NewWatchlistEntry {
    NewWatchlistEntry {
        product_id: ProductId(product_id.to_string()),
        product_name: format!("Listing {product_id}"),
        marketplace,
        current_price: Decimal::new(price_cents, 2),
        original_price: Some(Decimal::new(price_cents + 5000, 2)),
        image_url: Some("https://example.com/image.jpg".to_string()),
        product_url: Some("https://example.com/listing".to_string()),
    }
}

#[tokio::test]
async fn duplicate_add_returns_false_and_leaves_the_entry_unchanged() {
    let pool = test_pool().await;
    let watchlist = SqlWatchlistRepository::new(pool.clone());

    assert!(watchlist.add(entry("amz_001", Marketplace::Amazon, 34800)).await.expect("add"));

    // The second add carries a different price; it must be rejected and the
    // stored snapshot must keep the original one.
    let mut duplicate = entry("amz_001", Marketplace::Amazon, 11111);
    duplicate.product_name = "Renamed".to_string();
    assert!(!watchlist.add(duplicate).await.expect("duplicate add"));

    let entries = watchlist.list().await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].current_price, Decimal::new(34800, 2));
    assert_eq!(entries[0].product_name, "Listing amz_001");

    pool.close().await;
}

#[tokio::test]
async fn rejected_duplicate_does_not_append_history() {
    let pool = test_pool().await;
    let watchlist = SqlWatchlistRepository::new(pool.clone());
    let prices = SqlPriceHistoryRepository::new(pool.clone());
    let id = ProductId("amz_001".to_string());

    watchlist.add(entry("amz_001", Marketplace::Amazon, 34800)).await.expect("add");
    watchlist.add(entry("amz_001", Marketplace::Amazon, 11111)).await.expect("duplicate");

    let history = prices.history(&id).await.expect("history");
    assert_eq!(history.len(), 1, "only the successful add should record a point");
    assert_eq!(history[0].price, Decimal::new(34800, 2));

    pool.close().await;
}

#[tokio::test]
async fn add_then_remove_then_contains_is_false() {
    let pool = test_pool().await;
    let watchlist = SqlWatchlistRepository::new(pool.clone());
    let id = ProductId("ebay_001".to_string());

    watchlist.add(entry("ebay_001", Marketplace::Ebay, 29999)).await.expect("add");
    assert!(watchlist.contains(&id).await.expect("contains"));

    watchlist.remove(&id).await.expect("remove");
    watchlist.remove(&id).await.expect("remove again is idempotent");
    assert!(!watchlist.contains(&id).await.expect("contains after remove"));

    pool.close().await;
}

#[tokio::test]
async fn list_returns_most_recently_added_first() {
    let pool = test_pool().await;
    let watchlist = SqlWatchlistRepository::new(pool.clone());

    watchlist.add(entry("first", Marketplace::Amazon, 1000)).await.expect("add first");
    watchlist.add(entry("second", Marketplace::Temu, 2000)).await.expect("add second");
    watchlist.add(entry("third", Marketplace::Jumia, 3000)).await.expect("add third");

    let entries = watchlist.list().await.expect("list");
    let ids: Vec<&str> = entries.iter().map(|e| e.product_id.0.as_str()).collect();
    assert_eq!(ids, vec!["third", "second", "first"]);

    pool.close().await;
}

#[tokio::test]
async fn history_is_ascending_and_independent_of_membership() {
    let pool = test_pool().await;
    let prices = SqlPriceHistoryRepository::new(pool.clone());
    let id = ProductId("ali_002".to_string());

    // Never watchlisted; record_price alone extends the log.
    assert!(prices.history(&id).await.expect("empty history").is_empty());

    for cents in [5999, 5499, 6299] {
        prices.record(&id, Decimal::new(cents, 2)).await.expect("record");
    }

    let history = prices.history(&id).await.expect("history");
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|pair| pair[0].recorded_at <= pair[1].recorded_at));
    let observed: Vec<Decimal> = history.iter().map(|point| point.price).collect();
    assert_eq!(
        observed,
        vec![Decimal::new(5999, 2), Decimal::new(5499, 2), Decimal::new(6299, 2)]
    );

    pool.close().await;
}

#[tokio::test]
async fn price_refresh_updates_in_place_without_touching_history() {
    let pool = test_pool().await;
    let watchlist = SqlWatchlistRepository::new(pool.clone());
    let prices = SqlPriceHistoryRepository::new(pool.clone());
    let id = ProductId("amz_004".to_string());

    watchlist.add(entry("amz_004", Marketplace::Amazon, 8999)).await.expect("add");
    watchlist
        .update_current_price(&id, Decimal::new(7999, 2))
        .await
        .expect("update price");

    let entries = watchlist.list().await.expect("list");
    assert_eq!(entries[0].current_price, Decimal::new(7999, 2));
    assert_eq!(entries[0].original_price, Some(Decimal::new(13999, 2)));

    let history = prices.history(&id).await.expect("history");
    assert_eq!(history.len(), 1, "refresh must not rewrite history");
    assert_eq!(history[0].price, Decimal::new(8999, 2));

    pool.close().await;
}

#[tokio::test]
async fn deal_upvotes_accumulate_and_stay_independent() {
    let pool = test_pool().await;
    let votes = SqlDealVoteRepository::new(pool.clone());

    for _ in 0..3 {
        votes.upvote(1).await.expect("upvote deal 1");
    }
    votes.upvote(2).await.expect("upvote deal 2");

    assert_eq!(votes.upvotes(1).await.expect("deal 1 count"), 3);
    assert_eq!(votes.upvotes(2).await.expect("deal 2 count"), 1);
    assert_eq!(votes.upvotes(42).await.expect("unvoted deal"), 0);

    pool.close().await;
}
