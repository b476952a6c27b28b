//! Video listing and streaming handlers.

use std::fmt;
use std::path::{Path, PathBuf};

use actix_web::body::SizedStream;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use video_browser_types::VideoFile;

use crate::state::AppState;

/// Why a `/videos/{name}` request could not be served.
#[derive(Debug)]
pub(crate) enum VideoRequestError {
    /// Name is empty, a dot segment, or contains a path separator.
    InvalidName(String),
    /// Name is not listed, or the file is gone.
    NotFound(String),
    LibraryUnavailable,
}

impl fmt::Display for VideoRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid video name: {name:?}"),
            Self::NotFound(name) => write!(f, "video not found: {name}"),
            Self::LibraryUnavailable => f.write_str("library unavailable"),
        }
    }
}

impl VideoRequestError {
    pub(crate) fn into_response(self) -> HttpResponse {
        let body = self.to_string();
        match self {
            Self::InvalidName(_) => HttpResponse::BadRequest().body(body),
            Self::NotFound(_) => HttpResponse::NotFound().body(body),
            Self::LibraryUnavailable => HttpResponse::InternalServerError().body(body),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Available videos in display order", body = Vec<VideoFile>)
    )
)]
#[get("/api/videos")]
/// List the available videos as a JSON array of file names.
pub async fn list_videos(state: web::Data<AppState>) -> impl Responder {
    match state.library.read() {
        Ok(library) => HttpResponse::Ok().json(library.files()),
        Err(_) => VideoRequestError::LibraryUnavailable.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/videos/{name}",
    params(
        ("name" = String, Path, description = "Video file name as listed by /api/videos")
    ),
    responses(
        (status = 200, description = "Full file stream"),
        (status = 206, description = "Partial content"),
        (status = 400, description = "Invalid video name"),
        (status = 404, description = "Not found")
    )
)]
#[get("/videos/{name}")]
/// Stream a listed video, honoring a single byte range.
pub async fn stream_video(
    state: web::Data<AppState>,
    req: HttpRequest,
    name: web::Path<String>,
) -> impl Responder {
    let name = name.into_inner();
    let path = match resolve_video(&state, &name) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(error = %err, "video request rejected");
            return err.into_response();
        }
    };

    let mut file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(_) => return VideoRequestError::NotFound(name).into_response(),
    };
    let total_len = match file.metadata().await {
        Ok(m) => m.len(),
        Err(_) => return VideoRequestError::NotFound(name).into_response(),
    };

    // A malformed or unsatisfiable range falls back to the whole file.
    let range = req
        .headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| parse_single_range(h, total_len));

    let (start, len, status_code) = match range {
        Some((start, end)) => (
            start,
            end.saturating_sub(start).saturating_add(1),
            StatusCode::PARTIAL_CONTENT,
        ),
        None => (0, total_len, StatusCode::OK),
    };

    if start > 0 && file.seek(std::io::SeekFrom::Start(start)).await.is_err() {
        return HttpResponse::InternalServerError().finish();
    }
    tracing::debug!(file = %name, start, len, "streaming video");

    let stream = ReaderStream::new(file.take(len));
    let body = SizedStream::new(len, stream);

    let mut resp = HttpResponse::build(status_code);
    resp.insert_header((header::ACCEPT_RANGES, "bytes"));
    resp.insert_header((header::CONTENT_TYPE, content_type_for(&path)));
    if let Some((start, end)) = range {
        resp.insert_header((
            header::CONTENT_RANGE,
            format!("bytes {start}-{end}/{total_len}"),
        ));
    }
    resp.body(body)
}

fn resolve_video(state: &AppState, name: &str) -> Result<PathBuf, VideoRequestError> {
    validate_name(name)?;
    let library = state
        .library
        .read()
        .map_err(|_| VideoRequestError::LibraryUnavailable)?;
    library
        .resolve(name)
        .ok_or_else(|| VideoRequestError::NotFound(name.to_string()))
}

/// Reject anything that could address a file outside the media directory.
pub(crate) fn validate_name(name: &str) -> Result<(), VideoRequestError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(VideoRequestError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// MIME type for a video path, by extension.
pub(crate) fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "ogv" => "video/ogg",
        "ts" => "video/mp2t",
        "mpg" | "mpeg" => "video/mpeg",
        _ => "application/octet-stream",
    }
}

/// Parse `bytes=start-end` (first range only), clamping `end` to the file.
pub(crate) fn parse_single_range(header: &str, total_len: u64) -> Option<(u64, u64)> {
    let range = header.trim().strip_prefix("bytes=")?;
    let first = range.split(',').next()?;
    let (start_s, end_s) = first.trim().split_once('-')?;
    if start_s.is_empty() {
        return None;
    }
    let start = start_s.parse::<u64>().ok()?;
    let end = if end_s.is_empty() {
        total_len.saturating_sub(1)
    } else {
        end_s.parse::<u64>().ok()?
    };
    if start >= total_len || end < start {
        return None;
    }
    Some((start, end.min(total_len.saturating_sub(1))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_range_accepts_open_end() {
        assert_eq!(parse_single_range("bytes=10-", 100), Some((10, 99)));
    }

    #[test]
    fn parse_single_range_rejects_invalid() {
        assert!(parse_single_range("items=1-2", 100).is_none());
        assert!(parse_single_range("bytes=-10", 100).is_none());
        assert!(parse_single_range("bytes=abc-", 100).is_none());
        assert!(parse_single_range("bytes=200-300", 100).is_none());
        assert!(parse_single_range("bytes=50-40", 100).is_none());
        assert!(parse_single_range("bytes=0-", 0).is_none());
    }

    #[test]
    fn parse_single_range_clamps_end_and_uses_first() {
        assert_eq!(parse_single_range("bytes=90-200", 100), Some((90, 99)));
        assert_eq!(parse_single_range("bytes=0-1,2-3", 100), Some((0, 1)));
    }

    #[test]
    fn validate_name_rejects_traversal() {
        for bad in ["", ".", "..", "../etc/passwd", "a/b.mp4", "a\\b.mp4"] {
            assert!(
                matches!(validate_name(bad), Err(VideoRequestError::InvalidName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_name("my clip..final.mp4").is_ok());
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("a.MP4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a.webm")), "video/webm");
        assert_eq!(content_type_for(Path::new("a.mkv")), "video/x-matroska");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }
}
