//! Long-running background task that polls the Soroban RPC and writes
//! decoded supply chain events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::rpc::{self, PageRequest};

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Run the polling loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    // Resume from the persisted cursor; fall back to the configured start ledger.
    let last_ledger = db::get_last_ledger(&state.pool).await.unwrap_or(0);
    let mut cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);
    let mut current_ledger = if last_ledger > 0 {
        last_ledger as u32
    } else {
        state.config.start_ledger
    };

    info!("Resuming from ledger {current_ledger}");

    loop {
        let page = PageRequest {
            start_ledger: current_ledger,
            cursor: cursor.as_deref(),
            limit: state.config.events_per_page,
        };

        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(&state.pool, &state.client, &state.config, page) => polled,
        };
        match polled {
            Ok((next_ledger, next_cursor)) => {
                current_ledger = next_ledger;
                cursor = next_cursor;
            }
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!(ledger = current_ledger, "Indexer stopped");
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    page: PageRequest<'_>,
) -> crate::errors::Result<(u32, Option<String>)> {
    let fetched =
        rpc::fetch_events(client, &config.rpc_url, &config.contract_id, page).await?;

    if !fetched.events.is_empty() {
        let decoded = rpc::decode_events(&fetched.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = fetched.events.len(),
            stored = inserted,
            "Polled contract events"
        );
    }

    // With a pagination cursor the next call continues inside the same range;
    // otherwise advance to the latest ledger the RPC knows about.
    let next_ledger = fetched
        .latest_ledger
        .map(|l| (l as u32).max(page.start_ledger))
        .unwrap_or(page.start_ledger);

    // Persist cursor so restarts are deterministic.
    db::save_cursor(pool, next_ledger as i64, fetched.cursor.as_deref()).await?;

    Ok((next_ledger, fetched.cursor))
}
