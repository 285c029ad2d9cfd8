//! `purchased`: the purchase service binary.
//!
//! Usage:
//!   purchased -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/purchased/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use openerp_core::{Authenticator, Module, ServiceConfig};
use purchase::service::PurchaseService;
use purchase::PurchaseModule;
use tracing::info;

use auth::JwtAuthenticator;
use config::ServerConfig;

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Purchase server.
#[derive(Parser, Debug)]
#[command(name = "purchased", about = "Purchase bidding and request server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    server_config.verify()?;

    let listen = cli
        .listen
        .or_else(|| server_config.server.listen.clone())
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

    let data_dir = PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = ServiceConfig {
        data_dir: Some(data_dir),
        sqlite_path: server_config.storage.sqlite.as_ref().map(PathBuf::from),
        listen: listen.clone(),
    };

    let sqlite_path = core_config.resolve_sqlite_path();
    let sql: Arc<dyn openerp_sql::SQLStore> = Arc::new(
        openerp_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!("SQLite store at {}", sqlite_path.display());

    let service = PurchaseService::new(sql)
        .map_err(|e| anyhow::anyhow!("failed to initialize purchase service: {}", e))?;

    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(&server_config.jwt.secret));

    let module = PurchaseModule::new(service, authenticator);
    info!("{} module initialized", module.name());

    let app = axum::Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
        .merge(module.routes());

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("Purchase server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
