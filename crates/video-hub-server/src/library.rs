//! Video library scanning and indexing.
//!
//! The library is the flat list of video files in the media directory, in
//! the order clients should display them.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use video_browser_types::VideoFile;

/// File extensions treated as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "wmv", "flv", "ogv", "ts", "mpg", "mpeg",
];

/// Returns true if the extension is a known video extension.
pub fn is_supported_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

/// In-memory index of the videos directly under a root directory.
#[derive(Clone, Debug)]
pub struct VideoLibrary {
    root: PathBuf,
    files: Vec<VideoFile>,
}

impl VideoLibrary {
    /// Return the canonical library root path.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Listed videos, in display order.
    pub fn files(&self) -> &[VideoFile] {
        &self.files
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name() == name)
    }

    /// Append a video if it is not listed yet.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.files.push(VideoFile::new(name));
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.name() != name);
        before != self.files.len()
    }

    /// Absolute path of a listed video that still exists on disk.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !self.contains(name) {
            return None;
        }
        let path = self.root.join(name);
        path.is_file().then_some(path)
    }
}

/// Scan the media root and build a new library, sorted by file name.
pub fn scan_library(root: &Path) -> Result<VideoLibrary> {
    let root = root
        .canonicalize()
        .with_context(|| format!("canonicalize root {:?}", root))?;
    if !root.is_dir() {
        return Err(anyhow::anyhow!("root is not a directory: {:?}", root));
    }

    tracing::info!(root = %root.display(), "scanning media directory");

    let mut names = Vec::new();
    for entry in fs::read_dir(&root).with_context(|| format!("read_dir {:?}", root))? {
        let entry = entry.context("read_dir entry")?;
        let path = entry.path();
        if let Some(name) = video_name(&path) {
            names.push(name);
        }
    }
    names.sort_by_key(|name| name.to_lowercase());

    tracing::info!(root = %root.display(), videos = names.len(), "media scan complete");
    Ok(VideoLibrary {
        root,
        files: names.into_iter().map(VideoFile::new).collect(),
    })
}

/// File name of `path` if it is an existing regular file with a video extension.
pub fn video_name(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let ext = path.extension().and_then(OsStr::to_str)?;
    if !is_supported_extension(ext) {
        return None;
    }
    path.file_name().and_then(OsStr::to_str).map(str::to_string)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// Fresh empty directory under the system temp dir.
    pub(crate) fn temp_root(label: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "video-hub-server-{label}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_root;
    use super::*;

    fn names(library: &VideoLibrary) -> Vec<&str> {
        library.files().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn scan_lists_only_videos_sorted() {
        let root = temp_root("scan");
        for name in ["b.mp4", "A.webm", "notes.txt", "c.MKV"] {
            std::fs::write(root.join(name), b"x").unwrap();
        }
        std::fs::create_dir_all(root.join("nested.mp4")).unwrap();

        let library = scan_library(&root).unwrap();
        assert_eq!(names(&library), vec!["A.webm", "b.mp4", "c.MKV"]);
    }

    #[test]
    fn scan_rejects_missing_root() {
        let root = temp_root("missing").join("nope");
        assert!(scan_library(&root).is_err());
    }

    #[test]
    fn insert_appends_and_dedupes() {
        let root = temp_root("insert");
        std::fs::write(root.join("a.mp4"), b"x").unwrap();
        let mut library = scan_library(&root).unwrap();

        assert!(library.insert("z.mp4"));
        assert!(!library.insert("a.mp4"));
        assert!(library.insert("b.mp4"));
        assert_eq!(names(&library), vec!["a.mp4", "z.mp4", "b.mp4"]);

        assert!(library.remove("z.mp4"));
        assert!(!library.remove("z.mp4"));
        assert_eq!(names(&library), vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn resolve_requires_listing_and_file() {
        let root = temp_root("resolve");
        std::fs::write(root.join("a.mp4"), b"x").unwrap();
        std::fs::write(root.join("hidden.mp4"), b"x").unwrap();
        let mut library = scan_library(&root).unwrap();
        library.remove("hidden.mp4");

        assert!(library.resolve("a.mp4").is_some());
        assert!(library.resolve("hidden.mp4").is_none());

        std::fs::remove_file(root.join("a.mp4")).unwrap();
        assert!(library.resolve("a.mp4").is_none());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported_extension("MP4"));
        assert!(is_supported_extension("webm"));
        assert!(!is_supported_extension("flac"));
    }
}
