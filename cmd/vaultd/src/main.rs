use clap::Parser;
use pkg_api::server::{ServerConfig, start_server};
use pkg_types::config::{ServerConfigFile, load_config_file};
use std::net::SocketAddr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "vaultd", about = "relationship-gated secrets service")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = "/etc/vaultd/config.yaml")]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// Base URL of the authorization service
    #[arg(long)]
    authz_url: Option<String>,

    /// Authorization store id (falls back to $OPENFGA_STORE_ID)
    #[arg(long)]
    store_id: Option<String>,
}

/// First few characters of an identifier for log output. The id is an
/// opaque string and may contain multibyte characters, so slice by chars.
fn redact(id: &str) -> String {
    id.chars().take(4).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > env > defaults
    let port = cli.port.or(file_cfg.port).unwrap_or(3000);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| "/tmp/vaultd-data".to_string());
    let authz_url = cli
        .authz_url
        .or(file_cfg.authz_url)
        .unwrap_or_else(|| "http://localhost:8080".to_string());
    let store_id = cli
        .store_id
        .or(file_cfg.store_id)
        .or_else(|| std::env::var("OPENFGA_STORE_ID").ok().filter(|s| !s.is_empty()));

    // Every authorization check needs the store id; startup is fatal without it.
    let Some(store_id) = store_id else {
        anyhow::bail!("authorization store id is not set (--store-id or OPENFGA_STORE_ID)");
    };

    info!("Starting vaultd");
    info!("  Port:      {}", port);
    info!("  Data dir:  {}", data_dir);
    info!("  Authz URL: {}", authz_url);
    info!("  Store id:  {}***", redact(&store_id));

    let config = ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        data_dir,
        authz_url,
        store_id,
    };

    start_server(config).await?;

    Ok(())
}
