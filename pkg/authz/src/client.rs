use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Relation checked against the authorization service. Reads map to
/// `Reader`, writes to `Writer`; there are no other relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Reader,
    Writer,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Reader => "reader",
            Relation::Writer => "writer",
        }
    }
}

#[derive(Debug, Serialize)]
struct TupleKey {
    user: String,
    relation: &'static str,
    object: String,
}

#[derive(Debug, Serialize)]
struct CheckRequest {
    tuple_key: TupleKey,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    allowed: bool,
}

/// Client for the relationship-based authorization service (OpenFGA-style
/// check endpoint). Answers "is user U allowed relation R on project P?".
#[derive(Clone)]
pub struct AuthzClient {
    http: reqwest::Client,
    base_url: String,
    store_id: String,
}

impl AuthzClient {
    /// Build a client against `base_url` for the given authorization store,
    /// with the default 5s check timeout.
    pub fn new(base_url: &str, store_id: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, store_id, Duration::from_secs(5))
    }

    /// Build a client with an explicit check timeout. The timeout bounds
    /// every check; a slow oracle must not stall a request indefinitely.
    pub fn with_timeout(
        base_url: &str,
        store_id: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store_id: store_id.to_string(),
        })
    }

    /// Ask the authorization service for a verdict on
    /// (user, relation, project). `Ok(false)` is an explicit deny;
    /// `Err` means the service was unreachable, timed out, or returned
    /// something unusable, and must never be treated as an allow.
    pub async fn check(
        &self,
        user: &str,
        relation: Relation,
        project_id: &str,
    ) -> anyhow::Result<bool> {
        let url = format!("{}/stores/{}/check", self.base_url, self.store_id);
        let req = CheckRequest {
            tuple_key: TupleKey {
                user: format!("user:{}", user),
                relation: relation.as_str(),
                object: format!("project:{}", project_id),
            },
        };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Authorization check failed to reach {}: {}", url, e))?;

        if !resp.status().is_success() {
            warn!(
                "Authorization service returned {} for user={} relation={} project={}",
                resp.status(),
                user,
                relation.as_str(),
                project_id
            );
            anyhow::bail!("Authorization service returned {}", resp.status());
        }

        let verdict: CheckResponse = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Malformed authorization response: {}", e))?;

        info!(
            "Authz check: user={} relation={} project={} allowed={}",
            user,
            relation.as_str(),
            project_id,
            verdict.allowed
        );
        Ok(verdict.allowed)
    }
}
