//! Configuration loading and parsing.
//!
//! Defines the server config schema and resolves defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Bind address used when neither the CLI nor the config names one.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Top-level server configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Bind address (host:port).
    pub bind: Option<String>,
    /// Directory holding the uploaded videos.
    pub media_dir: Option<String>,
    /// Optional directory with the browser GUI (`index.html`, `script.js`).
    pub gui_dir: Option<String>,
}

impl ServerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Extract the media directory from config.
pub fn media_dir_from_config(cfg: &ServerConfig) -> Result<PathBuf> {
    let dir = non_empty(cfg.media_dir.as_deref())
        .ok_or_else(|| anyhow::anyhow!("media_dir is required; use --media-dir or set it in config"))?;
    Ok(PathBuf::from(dir))
}

/// Extract the optional GUI directory from config.
pub fn gui_dir_from_config(cfg: &ServerConfig) -> Option<PathBuf> {
    non_empty(cfg.gui_dir.as_deref()).map(PathBuf::from)
}

/// Parse an optional bind address from config.
pub fn bind_from_config(cfg: &ServerConfig) -> Result<Option<SocketAddr>> {
    let Some(bind) = non_empty(cfg.bind.as_deref()) else {
        return Ok(None);
    };
    let addr = bind.parse().with_context(|| format!("parse bind {bind}"))?;
    Ok(Some(addr))
}

/// Check that the GUI directory exists before serving it.
pub fn validate_gui_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(anyhow::anyhow!("gui_dir is not a directory: {:?}", dir));
    }
    if !dir.join("index.html").is_file() {
        tracing::warn!(gui_dir = %dir.display(), "gui_dir has no index.html");
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
