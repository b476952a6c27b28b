//! Video browser controller.
//!
//! Owns the list of videos, the preview surface and the main surface, and
//! turns hover/click/tick input into media operations. The controller never
//! blocks: list fetches happen elsewhere and arrive through `apply_listing`,
//! and the preview cutoff is a deadline checked by `tick`.
//!
//! States:
//! - preview: Idle → Previewing → (cutoff | hover leave | click | new hover) → Idle
//! - main: Idle → Playing (click) → Idle (player exit) or Playing (next click)

use std::time::{Duration, Instant};

use anyhow::Result;
use video_browser_types::VideoFile;

use crate::media::{MediaElement, MediaEvent};

pub(crate) const PREVIEW_IDLE_TEXT: &str = "Hover over video name for preview";
pub(crate) const MAIN_IDLE_TEXT: &str = "No video selected";
pub(crate) const EMPTY_LIST_TEXT: &str = "No videos uploaded yet.";
pub(crate) const LIST_ERROR_TEXT: &str = "Error loading video list. Is the server running?";

/// Default preview length before the cutoff stops playback.
pub(crate) const DEFAULT_PREVIEW_LIMIT: Duration = Duration::from_secs(10);

/// What the list panel currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Listing {
    /// No fetch has completed yet.
    Loading,
    Entries(Vec<VideoFile>),
    /// The server returned an empty list.
    Empty,
    /// The last fetch failed; the text is user-facing.
    Error(String),
}

impl Listing {
    pub(crate) fn entries(&self) -> &[VideoFile] {
        match self {
            Listing::Entries(files) => files,
            _ => &[],
        }
    }
}

struct PreviewSession {
    file: VideoFile,
    started: Instant,
    deadline: Instant,
}

pub(crate) struct VideoBrowser<M> {
    server: String,
    preview_player: M,
    main_player: M,
    preview_limit: Duration,
    listing: Listing,
    refreshing: bool,
    preview: Option<PreviewSession>,
    playing: Option<VideoFile>,
    preview_title: String,
    main_title: String,
}

impl<M: MediaElement> VideoBrowser<M> {
    pub(crate) fn new(server: String, preview_player: M, main_player: M, preview_limit: Duration) -> Self {
        Self {
            server,
            preview_player,
            main_player,
            preview_limit,
            listing: Listing::Loading,
            refreshing: false,
            preview: None,
            playing: None,
            preview_title: PREVIEW_IDLE_TEXT.to_string(),
            main_title: MAIN_IDLE_TEXT.to_string(),
        }
    }

    pub(crate) fn server(&self) -> &str {
        &self.server
    }

    pub(crate) fn listing(&self) -> &Listing {
        &self.listing
    }

    pub(crate) fn entries(&self) -> &[VideoFile] {
        self.listing.entries()
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub(crate) fn preview_title(&self) -> &str {
        &self.preview_title
    }

    pub(crate) fn main_title(&self) -> &str {
        &self.main_title
    }

    pub(crate) fn previewing(&self) -> Option<&VideoFile> {
        self.preview.as_ref().map(|s| &s.file)
    }

    pub(crate) fn playing(&self) -> Option<&VideoFile> {
        self.playing.as_ref()
    }

    /// Stream URL loaded into the main surface.
    pub(crate) fn main_source(&self) -> Option<&str> {
        self.main_player.current_src()
    }

    /// Elapsed fraction of the active preview, in `0.0..=1.0`.
    pub(crate) fn preview_progress(&self, now: Instant) -> Option<f64> {
        let session = self.preview.as_ref()?;
        let total = session.deadline.saturating_duration_since(session.started);
        if total.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(session.started);
        Some((elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
    }

    /// Mark a list fetch as in flight. The current list stays visible.
    pub(crate) fn begin_refresh(&mut self) {
        self.refreshing = true;
    }

    /// Apply the outcome of a `GET /api/videos`.
    ///
    /// The list is rebuilt in the order received. A preview whose file is no
    /// longer listed is stopped; main playback is left alone.
    pub(crate) fn apply_listing(&mut self, result: Result<Vec<VideoFile>>) {
        self.refreshing = false;
        self.listing = match result {
            Ok(files) if files.is_empty() => {
                tracing::info!("video list is empty");
                Listing::Empty
            }
            Ok(files) => {
                tracing::info!(count = files.len(), "fetched video list");
                Listing::Entries(files)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "error fetching video list");
                Listing::Error(LIST_ERROR_TEXT.to_string())
            }
        };

        let orphaned = self
            .preview
            .as_ref()
            .map(|s| !self.listing.entries().contains(&s.file))
            .unwrap_or(false);
        if orphaned {
            self.stop_preview();
        }
    }

    /// Start a muted preview of `file` and arm its cutoff.
    pub(crate) fn hover_enter(&mut self, file: &VideoFile, now: Instant) {
        tracing::info!(file = %file, "hover enter: preview");
        self.stop_preview();
        let Some(deadline) = now.checked_add(self.preview_limit) else {
            tracing::warn!(file = %file, limit = ?self.preview_limit, "preview limit out of range");
            self.preview_title = format!("Preview failed to start for {file}");
            return;
        };
        self.preview_title = format!("Previewing: {file}");

        let url = file.stream_url(&self.server);
        self.preview_player.set_muted(true);
        self.preview_player.load(&url);
        match self.preview_player.play() {
            Ok(()) => {
                self.preview = Some(PreviewSession {
                    file: file.clone(),
                    started: now,
                    deadline,
                });
            }
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "preview autoplay prevented");
                self.preview_title = format!("Preview failed to start for {file}");
            }
        }
    }

    /// Stop the preview and clear its title.
    pub(crate) fn hover_leave(&mut self, file: &VideoFile) {
        tracing::info!(file = %file, "hover leave: stop preview");
        self.stop_preview();
    }

    /// Play `file` from the start on the main surface, unmuted.
    pub(crate) fn click(&mut self, file: &VideoFile) {
        tracing::info!(file = %file, "click: play in main player");
        let url = file.stream_url(&self.server);
        if self.previewing() == Some(file) {
            tracing::debug!(file = %file, "clicked file is being previewed");
        }
        self.stop_preview();

        self.main_title = format!("Now Playing: {file}");
        self.main_player.pause();
        self.main_player.set_muted(false);
        self.main_player.load(&url);
        match self.main_player.play() {
            Ok(()) => self.playing = Some(file.clone()),
            Err(e) => {
                tracing::error!(file = %file, error = %e, "main player play error");
                self.main_title = format!("Could not play: {file}");
                self.playing = None;
            }
        }
    }

    /// Fire an expired cutoff and drain surface events.
    pub(crate) fn tick(&mut self, now: Instant) {
        let expired = self
            .preview
            .as_ref()
            .map(|s| now >= s.deadline)
            .unwrap_or(false);
        if expired {
            if let Some(session) = self.preview.take() {
                self.preview_player.pause();
                self.preview_player.seek_to_start();
                tracing::info!(file = %session.file, "preview cutoff reached");
                self.preview_title = format!("Preview ended: {}", session.file);
            }
        }

        while let Some(event) = self.preview_player.poll_event() {
            let Some(session) = self.preview.take() else {
                continue;
            };
            match event {
                MediaEvent::Ended => {
                    tracing::debug!(file = %session.file, "preview reached end of file");
                    self.preview_title = format!("Preview ended: {}", session.file);
                }
                MediaEvent::Failed(reason) => {
                    tracing::warn!(file = %session.file, reason = %reason, "preview playback failed");
                    self.preview_title = format!("Preview failed to start for {}", session.file);
                }
            }
        }

        while let Some(event) = self.main_player.poll_event() {
            let Some(file) = self.playing.take() else {
                continue;
            };
            match event {
                MediaEvent::Ended => {
                    tracing::info!(file = %file, "main playback finished");
                    self.main_title = MAIN_IDLE_TEXT.to_string();
                }
                MediaEvent::Failed(reason) => {
                    tracing::error!(file = %file, reason = %reason, "main playback failed");
                    self.main_title = format!("Could not play: {file}");
                }
            }
        }
    }

    /// The single cancellation path for the preview surface.
    fn stop_preview(&mut self) {
        let session = self.preview.take();
        self.preview_player.pause();
        self.preview_player.clear();
        self.preview_title = PREVIEW_IDLE_TEXT.to_string();
        if let Some(session) = session {
            tracing::debug!(file = %session.file, "preview stopped and reset");
        }
    }

    #[cfg(test)]
    pub(crate) fn preview_player(&self) -> &M {
        &self.preview_player
    }

    #[cfg(test)]
    pub(crate) fn preview_player_mut(&mut self) -> &mut M {
        &mut self.preview_player
    }

    #[cfg(test)]
    pub(crate) fn main_player(&self) -> &M {
        &self.main_player
    }

    #[cfg(test)]
    pub(crate) fn main_player_mut(&mut self) -> &mut M {
        &mut self.main_player
    }
}
