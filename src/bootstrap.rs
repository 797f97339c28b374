use std::sync::Arc;
use tracing::info;

use crate::{
    api::{handler::AppState, hub::SubscriberHub},
    config::Config,
    error::AppResult,
    ledger::SheetLedger,
    oracle::VaultPriceFeed,
    pipeline::Pipeline,
    scheduler::{Countdown, FeedScheduler, FETCH_INTERVAL_SECS},
};

pub async fn initialize_app_state(config: &Config) -> AppResult<AppState> {
    info!("Initializing application components ...");

    let hub = Arc::new(SubscriberHub::new());
    info!("✅ Subscriber hub initialized");

    let oracle = Arc::new(VaultPriceFeed::new(config.avalanche_rpc_url.clone()));
    info!("✅ Vault price feed oracle initialized ({})", config.avalanche_rpc_url);

    let ledger = Arc::new(SheetLedger::new(config.credentials_path.clone()));
    info!("✅ Sheet ledger initialized (credentials: {})", config.credentials_path);

    let countdown = Arc::new(Countdown::new(FETCH_INTERVAL_SECS as i64));
    let pipeline = Arc::new(Pipeline::new(oracle, ledger, hub.clone(), countdown.clone()));

    // Both feed drivers run for the life of the process
    FeedScheduler::new(pipeline, countdown.clone()).start();
    info!("✅ Fetch and countdown drivers started ({FETCH_INTERVAL_SECS}s interval)");

    Ok(AppState { hub, countdown })
}
