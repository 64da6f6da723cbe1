use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wayfarer_api::config::AppConfig;
use wayfarer_api::{app, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and SECRET_KEY.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer_api=info,tower_http=info".into()),
        )
        .init();

    // All configuration problems abort here, before the first request.
    let config = AppConfig::from_env().context("configuration")?;

    let pool = database::connect(&config)
        .await
        .context("database connection")?;
    sqlx::migrate!().run(&pool).await.context("migrations")?;

    let state = AppState {
        pool,
        config: Arc::new(config),
    };

    let bind_addr = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("wayfarer-api listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
