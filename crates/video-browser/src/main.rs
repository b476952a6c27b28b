//! `video-browser` — a small TUI to browse and watch videos on a video hub server.
//!
//! Features:
//! - lists the videos returned by `GET /api/videos`
//! - hover (mouse or cursor): muted preview, stopped after a few seconds
//! - click / Enter: full playback in the main player
//! - optional periodic list refresh
//!
//! Playback is delegated to an external player program (`mpv` by default)
//! that streams `/videos/<name>` straight from the server.

mod config;
mod controller;
mod logging;
mod media;
mod server_api;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{ClientConfig, Overrides, Settings};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "video-browser", version = VERSION)]
struct Args {
    /// Base URL of the video hub server, e.g. http://192.168.1.10:8000
    #[arg(long)]
    server: Option<String>,

    /// Optional client config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player program used for preview and main playback
    #[arg(long)]
    player: Option<String>,

    /// Seconds of preview before the cutoff stops it
    #[arg(long)]
    preview_secs: Option<u64>,

    /// Refresh the video list every N seconds (0 disables)
    #[arg(long)]
    refresh_secs: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = match args.config.as_ref() {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let settings = Settings::resolve(
        cfg,
        Overrides {
            server: args.server,
            player: args.player,
            preview_secs: args.preview_secs,
            refresh_secs: args.refresh_secs,
        },
    )?;

    let log_rx = logging::init();
    tracing::info!(
        server = %settings.server,
        player = %settings.player.program,
        preview_secs = settings.preview_limit.as_secs(),
        "starting video-browser"
    );
    ui::run_tui(settings, log_rx)
}
