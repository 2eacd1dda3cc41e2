pub mod auth;
pub mod handlers;
pub mod request_id;
pub mod server;

use std::sync::Arc;

use pkg_authz::AuthzClient;
use pkg_state::repository::SecretRepository;

use crate::auth::Authenticator;

/// Shared application state injected into all Axum handlers.
/// Constructed once in `start_server`; no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub repo: SecretRepository,
    pub authz: AuthzClient,
    pub authenticator: Arc<dyn Authenticator>,
}
