//! Shared server state.

use std::sync::{Arc, RwLock};

use crate::library::VideoLibrary;

/// State shared by every request handler.
pub struct AppState {
    pub library: Arc<RwLock<VideoLibrary>>,
}

impl AppState {
    pub fn new(library: Arc<RwLock<VideoLibrary>>) -> Self {
        Self { library }
    }
}
