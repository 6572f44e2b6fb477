//! navmenu demo server
//!
//! Serves a page for every route declared in the menu file, with the main
//! menu rendered and the current page's items activated.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use navmenu::server::{AppState, Config, router};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting navmenu demo server");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        port = config.port,
        menu_file = %config.menu_file.display(),
        "Configuration loaded"
    );

    let state = AppState::new(&config).context("failed to initialize application state")?;

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
