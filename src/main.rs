//! spitr-economy server entry point.
//!
//! Loads configuration, optionally restores state from PostgreSQL, and
//! serves the REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use spitr_economy::api;
use spitr_economy::app_state::AppState;
use spitr_economy::config::EconomyConfig;
use spitr_economy::domain::{
    AccountLedger, EventBus, InMemoryTtlCache, LotteryTicket, TtlCache,
};
use spitr_economy::persistence::{PostgresPersistence, recorder};
use spitr_economy::service::EconomyService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EconomyConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting spitr-economy");

    let ledger = Arc::new(AccountLedger::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    let store = if config.persistence_enabled {
        Some(start_persistence(&config, &ledger, &event_bus).await?)
    } else {
        tracing::info!("persistence disabled; state is in-memory only");
        None
    };

    let purchases: Arc<dyn TtlCache<String, LotteryTicket>> =
        Arc::new(InMemoryTtlCache::new(config.idempotency_cache_capacity));
    let mut economy = EconomyService::new(ledger, event_bus, config.economy.clone(), purchases);
    if let Some(store) = store {
        economy = economy.with_store(Arc::new(store));
    }

    let app = api::build_app(AppState::new(Arc::new(economy)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects, migrates, restores accounts and spawns the recorder tasks.
/// Returns the store ticket purchases are written through.
async fn start_persistence(
    config: &EconomyConfig,
    ledger: &Arc<AccountLedger>,
    event_bus: &EventBus,
) -> anyhow::Result<PostgresPersistence> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    let persistence = PostgresPersistence::new(pool);
    persistence.migrate().await?;

    let restored = recorder::restore_accounts(&persistence, ledger).await?;
    tracing::info!(restored, "accounts restored from snapshots");

    if config.event_log_enabled {
        let _recorder = recorder::spawn_event_recorder(persistence.clone(), event_bus);
    }
    let _snapshots = recorder::spawn_snapshot_task(
        persistence.clone(),
        Arc::clone(ledger),
        Duration::from_secs(config.snapshot_interval_secs),
        config.cleanup_after_days,
    );
    Ok(persistence)
}
