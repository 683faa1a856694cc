//! Farm question answering server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fq_query_api::config::ApiConfig;
use fq_query_api::routes;
use fq_query_api::state::AppState;
use fq_sql_guard::{MockStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fq-query-api starting");

    let config = ApiConfig::load()?;
    tracing::info!(
        validation = ?config.validation,
        remote_classifier = config.zero_shot.is_some(),
        "configuration loaded"
    );

    // Connect to PostgreSQL if a database URL is configured, otherwise serve sample data.
    let state = match &config.database_url {
        Some(database_url) => {
            tracing::info!("connecting to PostgreSQL");
            let store = PgStore::connect(database_url).await?;
            AppState::from_config(&config, Arc::new(store))?
        }
        None => {
            tracing::warn!("DATABASE_URL not set, answering from sample data");
            AppState::from_config(&config, Arc::new(MockStore::with_sample_data()))?
        }
    };

    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
