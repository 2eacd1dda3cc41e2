use serde::{Deserialize, Serialize};

/// Server configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// port: 3000
/// data-dir: /var/lib/vaultd/data
/// authz-url: http://localhost:8080
/// store-id: 01HXYZ...
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigFile {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    /// Base URL of the relationship-based authorization service.
    #[serde(default, alias = "authz-url")]
    pub authz_url: Option<String>,
    /// Authorization store id; may also come from `OPENFGA_STORE_ID`.
    #[serde(default, alias = "store-id")]
    pub store_id: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
