use std::sync::Arc;

use pricedrop_agent::SummaryRuntime;
use pricedrop_core::config::{AppConfig, ConfigError, LoadOptions};
use pricedrop_core::domain::deal::Deal;
use pricedrop_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::{info, warn};

use crate::summary::HttpSummaryClient;

const EMBEDDED_DEAL_FEED: &str = include_str!("../../../data/community_deals.json");

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub summary: SummaryRuntime,
    pub deals: Vec<Deal>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("community deal feed is invalid: {0}")]
    DealFeed(#[source] serde_json::Error),
    #[error("summary client could not be constructed: {0}")]
    SummaryClient(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let summary = if config.summary.enabled {
        let client =
            HttpSummaryClient::from_config(&config.summary).map_err(BootstrapError::SummaryClient)?;
        SummaryRuntime::new(Some(Arc::new(client)))
    } else {
        SummaryRuntime::disabled()
    };

    let deals = load_deal_feed()?;
    info!(
        event_name = "system.bootstrap.deal_feed_loaded",
        deal_count = deals.len(),
        "community deal feed loaded"
    );

    Ok(Application { config, db_pool, summary, deals })
}

/// Prefer the feed file on disk so operators can swap deals without a
/// rebuild; the embedded copy keeps a fresh checkout working.
fn load_deal_feed() -> Result<Vec<Deal>, BootstrapError> {
    let raw = match std::fs::read_to_string("data/community_deals.json") {
        Ok(raw) => raw,
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.deal_feed_fallback",
                error = %error,
                "deal feed not readable from disk, using embedded copy"
            );
            EMBEDDED_DEAL_FEED.to_string()
        }
    };
    Deal::load_feed(&raw).map_err(BootstrapError::DealFeed)
}
