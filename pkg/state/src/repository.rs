use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::client::StateStore;
use pkg_types::secret::{Secret, SecretCreate};

/// Repository for per-project secret collections.
///
/// Each project's secrets live under a single registry key as one JSON
/// array, so a write is a single atomic key replace. Appends to the same
/// project serialize behind a per-project lock; without it, two concurrent
/// read-modify-write cycles could silently drop one of the appends.
///
/// The lock map keeps one entry per project id for the process lifetime;
/// entries are never evicted. Each entry is a single `Arc<Mutex<()>>`.
#[derive(Clone)]
pub struct SecretRepository {
    store: StateStore,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

fn registry_key(project_id: &str) -> String {
    format!("/registry/projects/{}/secrets", project_id)
}

impl SecretRepository {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the stored sequence for a project, empty if none exists yet.
    pub async fn list_secrets(&self, project_id: &str) -> anyhow::Result<Vec<Secret>> {
        match self.store.get(&registry_key(project_id)).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| anyhow::anyhow!("Corrupt secret collection for {}: {}", project_id, e)),
            None => Ok(Vec::new()),
        }
    }

    /// Append a new secret to a project's collection and return it.
    /// The collection is created implicitly on the first write.
    pub async fn append_secret(
        &self,
        project_id: &str,
        draft: SecretCreate,
    ) -> anyhow::Result<Secret> {
        let lock = self.lock_for(project_id);
        let _guard = lock.lock().await;

        let mut secrets = self.list_secrets(project_id).await?;
        let secret = Secret::from_draft(draft);
        secrets.push(secret.clone());

        let data = serde_json::to_vec(&secrets)?;
        self.store.put(&registry_key(project_id), &data).await?;

        info!(
            "Appended secret {} to project {} ({} total)",
            secret.id,
            project_id,
            secrets.len()
        );
        Ok(secret)
    }

    fn lock_for(&self, project_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn temp_repo() -> SecretRepository {
        let dir = std::env::temp_dir().join(format!("vaultd-test-{}", Uuid::new_v4()));
        let store = StateStore::new(dir.to_str().unwrap()).await.unwrap();
        SecretRepository::new(store)
    }

    fn draft(name: &str, value: &str) -> SecretCreate {
        SecretCreate {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
        }
    }

    #[tokio::test]
    async fn unknown_project_lists_empty() {
        let repo = temp_repo().await;
        let secrets = repo.list_secrets("nope").await.unwrap();
        assert!(secrets.is_empty());
    }

    #[tokio::test]
    async fn append_then_list_round_trips() {
        let repo = temp_repo().await;
        let created = repo.append_secret("42", draft("db", "pw123")).await.unwrap();

        let secrets = repo.list_secrets("42").await.unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].id, created.id);
        assert_eq!(secrets[0].name.as_deref(), Some("db"));
        assert_eq!(secrets[0].value.as_deref(), Some("pw123"));
    }

    #[tokio::test]
    async fn appends_preserve_insertion_order_and_unique_ids() {
        let repo = temp_repo().await;
        let first = repo.append_secret("p", draft("a", "1")).await.unwrap();
        let second = repo.append_secret("p", draft("b", "2")).await.unwrap();

        let secrets = repo.list_secrets("p").await.unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[0].id, first.id);
        assert_eq!(secrets[1].id, second.id);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn projects_are_isolated() {
        let repo = temp_repo().await;
        repo.append_secret("a", draft("x", "1")).await.unwrap();

        assert_eq!(repo.list_secrets("a").await.unwrap().len(), 1);
        assert!(repo.list_secrets("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_to_one_project_all_persist() {
        let repo = temp_repo().await;
        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.append_secret("shared", draft(&format!("s{}", i), "v"))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let secrets = repo.list_secrets("shared").await.unwrap();
        assert_eq!(secrets.len(), 8);
    }
}
