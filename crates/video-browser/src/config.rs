//! Client configuration.
//!
//! An optional TOML file supplies defaults; command-line flags override it.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::controller::DEFAULT_PREVIEW_LIMIT;
use crate::media::PlayerCommand;

/// Longest preview accepted from config or flags.
pub(crate) const MAX_PREVIEW_SECS: u64 = 3600;

/// Client configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the video hub server.
    pub server: Option<String>,
    /// Preview length in seconds (default: 10).
    pub preview_secs: Option<u64>,
    /// Periodic list refresh in seconds; 0 or unset disables it.
    pub refresh_secs: Option<u64>,
    /// External player settings.
    pub player: Option<PlayerConfig>,
}

/// External player program and arguments.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    /// Arguments added for muted (preview) playback.
    pub mute_args: Option<Vec<String>>,
}

impl ClientConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ClientConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Values given on the command line, each taking precedence over the file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) server: Option<String>,
    pub(crate) player: Option<String>,
    pub(crate) preview_secs: Option<u64>,
    pub(crate) refresh_secs: Option<u64>,
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) server: String,
    pub(crate) player: PlayerCommand,
    pub(crate) preview_limit: Duration,
    pub(crate) refresh_every: Option<Duration>,
}

impl Settings {
    pub(crate) fn resolve(cfg: ClientConfig, overrides: Overrides) -> Result<Self> {
        let server = overrides
            .server
            .or(cfg.server)
            .ok_or_else(|| anyhow::anyhow!("server URL is required; use --server or set `server` in config"))?;
        let server = server.trim().trim_end_matches('/').to_string();
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(anyhow::anyhow!("server URL must start with http:// or https://: {server}"));
        }

        let preview_limit = match overrides.preview_secs.or(cfg.preview_secs) {
            Some(0) => return Err(anyhow::anyhow!("preview_secs must be positive")),
            Some(secs) if secs > MAX_PREVIEW_SECS => {
                return Err(anyhow::anyhow!(
                    "preview_secs must be at most {MAX_PREVIEW_SECS}, got {secs}"
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_PREVIEW_LIMIT,
        };

        let refresh_every = overrides
            .refresh_secs
            .or(cfg.refresh_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let mut player = PlayerCommand::default();
        if let Some(player_cfg) = cfg.player {
            if let Some(program) = player_cfg.program {
                player.program = program;
            }
            if let Some(args) = player_cfg.args {
                player.args = args;
            }
            if let Some(mute_args) = player_cfg.mute_args {
                player.mute_args = mute_args;
            }
        }
        if let Some(program) = overrides.player {
            player.program = program;
        }
        if player.program.trim().is_empty() {
            return Err(anyhow::anyhow!("player program cannot be empty"));
        }

        Ok(Self {
            server,
            player,
            preview_limit,
            refresh_every,
        })
    }
}
