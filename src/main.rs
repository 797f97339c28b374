mod api;
mod bootstrap;
mod config;
mod error;
mod ledger;
mod oracle;
mod pipeline;
mod scheduler;
mod server;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,eth_price_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    info!("🚀 Starting ETH Price Feed Server");

    // Load configuration
    dotenv::dotenv().ok();
    let config = config::Config::from_env()?;

    let state = bootstrap::initialize_app_state(&config).await?;

    // Create HTTP server
    let app = server::create_app(state).await;

    info!("Network: Avalanche Mainnet");
    info!("RPC: {}", config.avalanche_rpc_url);
    info!("Fetching current Ethereum price...");

    // Run the Server
    server::run_server(app, &config.bind_address).await?;

    Ok(())
}
