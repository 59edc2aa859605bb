use rust_decimal::Decimal;

use pricedrop_core::catalog;
use pricedrop_core::config::{AppConfig, LoadOptions};
use pricedrop_core::domain::product::ProductId;
use pricedrop_core::domain::watchlist::NewWatchlistEntry;
use pricedrop_db::repositories::{
    PriceHistoryRepository, SqlPriceHistoryRepository, SqlWatchlistRepository,
    WatchlistRepository,
};
use pricedrop_db::{connect_with_settings, migrations, DbPool};

use crate::commands::CommandResult;

pub fn list() -> CommandResult {
    with_store("watch-list", |pool| async move {
        let watchlist = SqlWatchlistRepository::new(pool);
        let entries = watchlist.list().await.map_err(|error| error.to_string())?;
        let rows: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "product_id": entry.product_id.0,
                    "product_name": entry.product_name,
                    "marketplace": entry.marketplace.as_str(),
                    "current_price": entry.current_price.to_string(),
                    "added_at": entry.added_at.to_rfc3339(),
                })
            })
            .collect();
        serde_json::to_string_pretty(&rows).map_err(|error| error.to_string())
    })
}

pub fn add(product_id: &str) -> CommandResult {
    let id = ProductId(product_id.to_string());
    let product = match catalog::get(&id) {
        Some(product) => product,
        None => {
            return CommandResult::failure(
                "watch-add",
                "unknown_product",
                format!("product `{product_id}` is not in the catalog"),
                2,
            );
        }
    };
    let entry = NewWatchlistEntry::from(product);

    with_store("watch-add", |pool| async move {
        let watchlist = SqlWatchlistRepository::new(pool);
        let added = watchlist.add(entry).await.map_err(|error| error.to_string())?;
        Ok(if added {
            format!("now watching `{}`", product.id.0)
        } else {
            format!("`{}` is already on the watchlist", product.id.0)
        })
    })
}

pub fn remove(product_id: &str) -> CommandResult {
    let id = ProductId(product_id.to_string());
    with_store("watch-remove", |pool| async move {
        let watchlist = SqlWatchlistRepository::new(pool);
        watchlist.remove(&id).await.map_err(|error| error.to_string())?;
        Ok(format!("`{}` removed from the watchlist", id.0))
    })
}

/// Record an externally observed price: append a history point and refresh
/// the stored current price when the product is watchlisted.
pub fn record(product_id: &str, price: &str) -> CommandResult {
    let id = ProductId(product_id.to_string());
    let price = match price.parse::<Decimal>() {
        Ok(price) if price > Decimal::ZERO => price,
        _ => {
            return CommandResult::failure(
                "watch-record",
                "invalid_price",
                format!("`{price}` is not a positive price"),
                2,
            );
        }
    };

    with_store("watch-record", |pool| async move {
        let prices = SqlPriceHistoryRepository::new(pool.clone());
        let watchlist = SqlWatchlistRepository::new(pool);

        prices.record(&id, price).await.map_err(|error| error.to_string())?;
        if watchlist.contains(&id).await.map_err(|error| error.to_string())? {
            watchlist
                .update_current_price(&id, price)
                .await
                .map_err(|error| error.to_string())?;
        }
        Ok(format!("recorded {} for `{}`", price, id.0))
    })
}

/// Shared scaffolding: load config, build a current-thread runtime, open
/// the pool, migrate, run the operation, close the pool.
fn with_store<F, Fut>(command: &str, operation: F) -> CommandResult
where
    F: FnOnce(DbPool) -> Fut,
    Fut: std::future::Future<Output = Result<String, String>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let outcome =
            operation(pool.clone()).await.map_err(|message| ("store", message, 6u8));
        pool.close().await;
        outcome
    });

    match result {
        Ok(message) => CommandResult::success(command, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(command, error_class, message, exit_code)
        }
    }
}
