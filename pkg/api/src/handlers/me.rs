use axum::{Extension, Json, response::IntoResponse};
use serde_json::json;

use crate::auth::AuthUser;

/// Echo the authenticated caller identity. No authorization check; any
/// authenticated caller may ask who they are.
pub async fn get_me(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({ "user": user.name }))
}
