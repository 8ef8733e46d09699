//! Fund transfer service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ Orchestrator │───▶│ Ledger Store │
//! │  (YAML)  │    │  (axum)  │    │  (5 steps)   │    │ (PG/memory)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Flags: `--env/-e <name>` selects `config/<name>.yaml` (default `dev`),
//! `--port <n>` overrides the gateway port.

use std::sync::Arc;

use anyhow::Context;

use fund_transfer::config::AppConfig;
use fund_transfer::db::Database;
use fund_transfer::gateway::{self, state::AppState};
use fund_transfer::ledger::{LedgerStore, MemoryLedgerStore, PgLedgerStore};
use fund_transfer::logging::init_logging;
use fund_transfer::transfer::TransferPolicy;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    let Some(url) = config.postgres_url.as_deref() else {
        tracing::warn!("No postgres_url configured: using the in-memory ledger store, data is lost on exit");
        return Ok(Arc::new(MemoryLedgerStore::new()));
    };

    let db = Database::connect(
        url,
        config.database.max_connections,
        config.database.acquire_timeout_secs,
    )
    .await
    .context("Failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    Ok(Arc::new(PgLedgerStore::new(db.pool().clone())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&app_config);

    tracing::info!("Starting fund transfer service in {} mode", env);

    let store = open_store(&app_config).await?;
    let policy = TransferPolicy::from(&app_config.transfer);
    if policy.allow_overdraft {
        tracing::warn!("Overdraft allowed: transfers may leave negative balances");
    }
    tracing::info!(store = store.name(), "Ledger store ready");

    let state = Arc::new(AppState::new(store, policy));
    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
