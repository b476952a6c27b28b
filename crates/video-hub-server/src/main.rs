//! `video-hub-server` — serves uploaded videos to the video browser clients.
//!
//! Routes:
//! - `GET /api/videos`: JSON array of video file names
//! - `GET /videos/{name}`: the video bytes, with single-range support
//! - `GET /health`
//! - `/swagger-ui/`: OpenAPI docs
//! - `/`: the browser GUI, when `--gui-dir` is set

mod api;
mod config;
mod library;
mod openapi;
mod state;
mod watcher;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;
use crate::library::scan_library;
use crate::state::AppState;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "video-hub-server", version = VERSION)]
struct Args {
    /// HTTP bind address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Directory holding the uploaded videos
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Directory with the browser GUI to serve at /
    #[arg(long)]
    gui_dir: Option<PathBuf>,

    /// Optional server config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,actix_web=info,video_hub_server=info")
        }))
        .init();

    let cfg = match args.config.as_ref() {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let bind = match args.bind {
        Some(addr) => addr,
        None => match config::bind_from_config(&cfg)? {
            Some(addr) => addr,
            None => config::DEFAULT_BIND.parse().context("parse default bind")?,
        },
    };
    let media_dir = match args.media_dir {
        Some(dir) => dir,
        None => config::media_dir_from_config(&cfg)?,
    };
    let gui_dir = args.gui_dir.or_else(|| config::gui_dir_from_config(&cfg));
    if let Some(dir) = gui_dir.as_ref() {
        config::validate_gui_dir(dir)?;
    }

    std::fs::create_dir_all(&media_dir)
        .with_context(|| format!("create media_dir {:?}", media_dir))?;
    tracing::info!(
        bind = %bind,
        media_dir = %media_dir.display(),
        gui_dir = ?gui_dir,
        version = VERSION,
        "starting video-hub-server"
    );

    let library = Arc::new(RwLock::new(scan_library(&media_dir)?));
    let _watcher = match watcher::spawn_library_watcher(library.clone()) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "media watcher disabled; new uploads need a restart");
            None
        }
    };

    let _ = ctrlc::set_handler(move || {
        if let Some(system) = actix_web::rt::System::try_current() {
            system.stop();
        } else {
            std::process::exit(0);
        }
    });

    let state = web::Data::new(AppState::new(library));
    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(Logger::default().exclude("/health"))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            .service(api::list_videos)
            .service(api::stream_video)
            .service(api::health);
        match gui_dir.as_ref() {
            Some(dir) => app.service(actix_files::Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind(bind)
    .with_context(|| format!("bind {bind}"))?
    .run()
    .await
    .context("http server")?;

    Ok(())
}
