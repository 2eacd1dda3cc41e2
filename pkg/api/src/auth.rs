use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;

/// The authenticated caller. The identity is an opaque string; it is not
/// validated against any user registry.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub name: String,
}

/// Seam for extracting a caller identity from a request. Deployments can
/// swap the shipped header-based implementation for a token-based one
/// without touching the handlers.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Option<String>;
}

/// Reads the caller identity verbatim from the `user` request header.
pub struct HeaderAuthenticator {
    header: &'static str,
}

impl Default for HeaderAuthenticator {
    fn default() -> Self {
        Self { header: "user" }
    }
}

impl Authenticator for HeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(self.header)?.to_str().ok()?;
        if value.is_empty() {
            return None;
        }
        Some(value.to_string())
    }
}

/// Middleware: resolves the caller identity before any other processing.
/// A request without one terminates here with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match state.authenticator.authenticate(req.headers()) {
        Some(name) => {
            // Inject the authenticated user into the request extensions
            req.extensions_mut().insert(AuthUser { name });
            Ok(next.run(req).await)
        }
        None => {
            warn!("Rejecting request without caller identity");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_authenticator_reads_user_header() {
        let mut headers = HeaderMap::new();
        headers.insert("user", HeaderValue::from_static("alice"));
        let auth = HeaderAuthenticator::default();
        assert_eq!(auth.authenticate(&headers).as_deref(), Some("alice"));
    }

    #[test]
    fn missing_or_empty_header_yields_none() {
        let auth = HeaderAuthenticator::default();
        assert!(auth.authenticate(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert("user", HeaderValue::from_static(""));
        assert!(auth.authenticate(&headers).is_none());
    }
}
