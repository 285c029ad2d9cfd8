//! Server configuration, read from a TOML file.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/purchased"
//!
//! [jwt]
//! secret = "change-me"
//!
//! [server]
//! listen = "0.0.0.0:8080"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub server: ListenConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Overrides `{data_dir}/purchase.sqlite`.
    #[serde(default)]
    pub sqlite: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListenConfig {
    #[serde(default)]
    pub listen: Option<String>,
}

impl ServerConfig {
    /// A bare name resolves to `/etc/purchased/<name>.toml`; anything that
    /// looks like a path is used as is.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/purchased/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Refuse to start with an unusable configuration.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT secret is empty in configuration.");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("Storage data_dir is empty in configuration.");
        }
        Ok(())
    }
}
