use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StoreBackend};
use models::{location::PARTITION_KEY, LocationSchema};
use service::{
    location::LocationService,
    storage::{DocumentStore, FileDocumentStore, MemoryDocumentStore},
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationService<dyn DocumentStore>>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, schema: Arc<LocationSchema>) -> Self {
        Self { locations: Arc::new(LocationService::new(store, schema)) }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load the schema and open the configured store.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let schema = Arc::new(LocationSchema::load_or_embedded(cfg.schema.path.as_deref())?);

    let store = match cfg.store.backend {
        StoreBackend::Memory => {
            warn!("memory document store selected; locations are lost on restart");
            Arc::new(MemoryDocumentStore::new(PARTITION_KEY)) as Arc<dyn DocumentStore>
        }
        StoreBackend::File => {
            common::env::ensure_data_dir(&cfg.store.path).await?;
            FileDocumentStore::open(&cfg.store.path, PARTITION_KEY).await? as Arc<dyn DocumentStore>
        }
    };
    info!(backend = ?cfg.store.backend, schema = ?cfg.schema.path, "location service ready");
    Ok(AppState::new(store, schema))
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: load config, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.server.bind_addr())))?;
    info!(%addr, "starting locations server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
