//! Wire types shared by the video hub server and the browser client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Route that returns the list of available videos as a JSON array of names.
pub const VIDEOS_API_PATH: &str = "/api/videos";

/// Route prefix under which individual video files are streamed.
pub const VIDEO_STREAM_PREFIX: &str = "/videos/";

/// A single uploaded video, identified by its file name.
///
/// The name is the display label and, URL-encoded, the path segment used to
/// request the media bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct VideoFile(String);

impl VideoFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Server-relative stream path, e.g. `/videos/my%20clip.mp4`.
    pub fn stream_path(&self) -> String {
        format!("{VIDEO_STREAM_PREFIX}{}", urlencoding::encode(&self.0))
    }

    /// Absolute stream URL against a server base such as `http://host:8000/`.
    pub fn stream_url(&self, server: &str) -> String {
        format!("{}{}", server.trim_end_matches('/'), self.stream_path())
    }
}

impl fmt::Display for VideoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoFile {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VideoFile {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Body of `GET /api/videos`: a bare JSON array of file names.
pub type VideoListResponse = Vec<VideoFile>;

/// Health probe payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_path_percent_encodes_name() {
        let file = VideoFile::new("my clip #1.mp4");
        assert_eq!(file.stream_path(), "/videos/my%20clip%20%231.mp4");
    }

    #[test]
    fn stream_url_trims_trailing_slash() {
        let file = VideoFile::new("a.mp4");
        assert_eq!(file.stream_url("http://127.0.0.1:8000/"), "http://127.0.0.1:8000/videos/a.mp4");
    }

    #[test]
    fn list_is_a_bare_json_array() {
        let list: VideoListResponse = serde_json::from_str(r#"["b.mp4","a.mp4"]"#).unwrap();
        assert_eq!(list, vec![VideoFile::new("b.mp4"), VideoFile::new("a.mp4")]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["b.mp4","a.mp4"]"#);
    }
}
