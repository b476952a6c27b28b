//! HTTP API handlers.
//!
//! Defines the Actix routes for listing and streaming videos.

#[path = "health.rs"]
pub mod health_handler;
pub mod videos;

pub use health_handler::{__path_health, health};
pub use videos::{__path_list_videos, __path_stream_video, list_videos, stream_video};
