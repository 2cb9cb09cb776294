use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use csr_tracker_server::{config::Config, db, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("csr_tracker_server=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize database
    let pool = db::init_db_pool(&config.database_url, config.database_max_connections).await?;
    db::seed_admin(&pool, &config.admin).await?;

    let addr = config.server_addr();
    let state = AppState::new(config, pool);
    state.uploads.ensure_dir().await?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, routes::app(state)).await?;

    Ok(())
}
