use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied draft for a new secret. Both fields are optional and
/// stored verbatim; no validation beyond JSON shape is performed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A stored secret record. `id` and the timestamps are set once at creation
/// and never change; there is no update operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub id: String,
    pub name: Option<String>,
    /// Secret payload, stored as-is (no encryption).
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Secret {
    /// Build a new record from a draft, generating the id and timestamps.
    pub fn from_draft(draft: SecretCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            value: draft.value,
            created_at: now,
            updated_at: now,
        }
    }
}
