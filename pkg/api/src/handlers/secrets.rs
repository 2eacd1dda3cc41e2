use axum::{
    Extension, Json,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::warn;

use crate::AppState;
use crate::auth::AuthUser;
use pkg_authz::Relation;
use pkg_types::secret::SecretCreate;

/// Run the authorization check for a (user, relation, project) tuple.
/// `Err` carries the response that terminates the request: 403 on an
/// explicit deny, 502 when no verdict could be obtained. An unavailable
/// oracle is never treated as an allow.
async fn authorize(
    state: &AppState,
    user: &AuthUser,
    relation: Relation,
    project_id: &str,
) -> Result<(), axum::response::Response> {
    match state.authz.check(&user.name, relation, project_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err((StatusCode::FORBIDDEN, "Forbidden").into_response()),
        Err(e) => {
            warn!("Authorization check failed for project {}: {}", project_id, e);
            Err((
                StatusCode::BAD_GATEWAY,
                "Authorization service unavailable",
            )
                .into_response())
        }
    }
}

pub async fn list_secrets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AxumPath(project_id): AxumPath<String>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &user, Relation::Reader, &project_id).await {
        return resp;
    }

    match state.repo.list_secrets(&project_id).await {
        Ok(secrets) => (StatusCode::OK, Json(secrets)).into_response(),
        Err(e) => {
            warn!("Failed to list secrets for project {}: {}", project_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable").into_response()
        }
    }
}

pub async fn create_secret(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AxumPath(project_id): AxumPath<String>,
    Json(draft): Json<SecretCreate>,
) -> impl IntoResponse {
    if let Err(resp) = authorize(&state, &user, Relation::Writer, &project_id).await {
        return resp;
    }

    match state.repo.append_secret(&project_id, draft).await {
        Ok(_secret) => (StatusCode::OK, Json(json!({ "status": "success" }))).into_response(),
        Err(e) => {
            warn!("Failed to store secret for project {}: {}", project_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable").into_response()
        }
    }
}
