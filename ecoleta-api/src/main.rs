//! REST API server for the Ecoleta collection-point directory.

mod config;
mod error;
mod routes;
mod upload;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPool;
use tracing_subscriber::EnvFilter;

use ecoleta_core::service::EcoletaService;
use ecoleta_store_postgres::PostgresStore;

use crate::config::ApiConfig;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ecoleta_api=debug,tower_http=info")),
        )
        .init();

    let config = ApiConfig::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    let store = PostgresStore::new(pool);
    store.migrate().await.context("running migrations")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let service = Arc::new(EcoletaService::new(Arc::new(store)));
    let app = routes::router(AppState {
        service,
        upload_dir: config.upload_dir.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
