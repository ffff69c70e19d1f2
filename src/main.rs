use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use blog_api::config::{Cli, Config};
use blog_api::db;
use blog_api::server;
use blog_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args / environment and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // Initialize database; failure here aborts startup
    let pool = db::create_pool(&config.database)?;
    db::run_migrations(&pool)?;

    let state = AppState::from_pool(pool.clone(), &config);

    // Start server
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    server::serve(listener, state, server::shutdown_signal()).await?;

    tracing::info!("Server stopped, closing database pool");
    drop(pool);

    Ok(())
}
