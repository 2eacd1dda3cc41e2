use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::auth::{HeaderAuthenticator, auth_middleware};
use crate::handlers::{me, secrets};
use crate::request_id::request_id_middleware;
use pkg_authz::AuthzClient;
use pkg_state::client::StateStore;
use pkg_state::repository::SecretRepository;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
    pub authz_url: String,
    pub store_id: String,
}

/// Build the API router. Every route requires an authenticated caller;
/// the secrets routes additionally check the authorization service inside
/// their handlers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/me", get(me::get_me))
        .route("/projects/{project_id}/secrets", get(secrets::list_secrets))
        .route("/projects/{project_id}/secret", post(secrets::create_secret))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize core subsystems
    let store = StateStore::new(&config.data_dir).await?;
    let repo = SecretRepository::new(store.clone());
    let authz = AuthzClient::new(&config.authz_url, &config.store_id)?;

    let state = AppState {
        repo,
        authz,
        authenticator: Arc::new(HeaderAuthenticator::default()),
    };

    let app = build_router(state);

    info!("Starting API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The store handle is process-wide; release it once serving stops.
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
