use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// HTTP transport parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort when upload speed stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
    /// Hard timeout for one transfer, in seconds.
    pub timeout_secs: u64,
    /// Multipart field carrying the file.
    pub file_field: String,
    /// Multipart field carrying the destination.
    pub destination_field: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            file_field: "file".to_string(),
            destination_field: "folder".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/upq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpqConfig {
    /// Maximum number of uploads in flight at once.
    pub concurrency: usize,
    /// Upload endpoint (http/https). Can be overridden on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Bearer token sent as `Authorization` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Optional HTTP tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for UpqConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            endpoint: None,
            auth_token: None,
            http: None,
        }
    }
}

impl UpqConfig {
    /// Concurrency limit actually used by the queue (at least 1).
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn http_or_default(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("upq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UpqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UpqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<UpqConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: UpqConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
