mod config;
mod error;
mod extract;
mod routes;

use anyhow::Context;
use axum::extract::FromRef;
use std::sync::Arc;

use config::AppConfig;
use famshare_store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: AppConfig,
}

impl FromRef<AppState> for Arc<Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "famshare_server=info,famshare_store=info,tower_http=info".into()
            }),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("data directory: {}", config.data_dir.display());

    let store = Store::open_path(&config.db_path()).context("open database")?;
    tracing::info!("database initialized");

    let port = config.port;
    let base_url = config.base_url.clone();
    let state = AppState {
        store: Arc::new(store),
        config,
    };
    let app = routes::router(state);

    tracing::info!("starting server at {base_url}");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("bind port {port}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
