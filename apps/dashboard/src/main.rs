mod analysis;
mod chat;
mod config;
mod dashboard;
mod errors;
mod render;
mod report;
mod routes;
mod session;
mod state;
mod storage;
#[cfg(test)]
mod testing;
mod theme;
mod upload;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::RemoteScorer;
use crate::config::{AuthMode, Config};
use crate::dashboard::Dashboard;
use crate::routes::build_router;
use crate::session::{AuthProvider, RemoteAuth, SimulatedAuth};
use crate::state::AppState;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore, RedisStore, MEMORY_STORAGE};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume dashboard v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config)?;

    let auth: Arc<dyn AuthProvider> = match config.auth_mode {
        AuthMode::Remote => Arc::new(RemoteAuth::new(
            config.api_base_url.clone(),
            config.analyze_timeout,
        )?),
        AuthMode::Simulated => {
            info!("AUTH_MODE=simulated: identities are fabricated locally");
            Arc::new(SimulatedAuth)
        }
    };

    let scorer = Arc::new(RemoteScorer::new(config.api_base_url.clone()));
    info!("Scoring endpoint: {}/api/analyze", config.api_base_url);

    let mut dashboard = Dashboard::new(auth, store, scorer, config.analyze_timeout);
    dashboard.restore().await;
    info!(
        "Session restored: authenticated={} theme={}",
        dashboard.session().is_authenticated(),
        dashboard.theme().as_str()
    );

    let state = AppState::new(dashboard, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise a JSON file at `STORAGE_PATH`.
/// `STORAGE_PATH=:memory:` keeps everything in-process.
fn build_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Storage backend: redis");
            Ok(Arc::new(RedisStore::new(client, "resume-dashboard")))
        }
        None if config.storage_path.as_os_str() == MEMORY_STORAGE => {
            info!("Storage backend: in-memory, nothing survives a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => {
            info!("Storage backend: {}", config.storage_path.display());
            Ok(Arc::new(JsonFileStore::new(config.storage_path.clone())))
        }
    }
}
