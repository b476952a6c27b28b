//! Ratatui UI loop.
//!
//! Keys:
//! - Up/Down: move the hover cursor (starts a preview)
//! - Esc/Left: leave the hovered entry (stops the preview)
//! - Enter: play the hovered entry in the main player
//! - r: refresh the video list
//! - l: toggle logs
//! - q: quit
//!
//! Mouse: moving over a row hovers it, left click plays it.

mod app;
mod render;

pub(crate) use app::run_tui;
