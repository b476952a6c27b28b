//! Media directory watcher.
//!
//! Keeps the in-memory library in sync when files are added, renamed or
//! removed in the media directory while the server runs.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::library::{VideoLibrary, video_name};

/// Start watching the library root. The returned watcher must be kept alive.
pub fn spawn_library_watcher(library: Arc<RwLock<VideoLibrary>>) -> Result<RecommendedWatcher> {
    let root = library
        .read()
        .map_err(|_| anyhow::anyhow!("library lock poisoned"))?
        .root()
        .to_path_buf();

    let (tx, rx) = unbounded::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("create media watcher")?;
    watcher
        .watch(&root, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch {:?}", root))?;

    tracing::info!(root = %root.display(), "watching media directory");
    std::thread::Builder::new()
        .name("media-watcher".into())
        .spawn(move || {
            for res in rx {
                match res {
                    Ok(event) => {
                        apply_event(&library, &root, &event);
                    }
                    Err(e) => tracing::warn!(error = %e, "media watcher error"),
                }
            }
        })
        .context("spawn media watcher thread")?;

    Ok(watcher)
}

/// Reconcile the library with the paths touched by `event`.
///
/// Each path is re-checked on disk, so creates, renames and removals all
/// reduce to "listed iff it is a video file directly under the root".
pub(crate) fn apply_event(library: &RwLock<VideoLibrary>, root: &Path, event: &Event) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    let Ok(mut library) = library.write() else {
        tracing::warn!("library lock poisoned; dropping watcher event");
        return false;
    };

    let mut changed = false;
    for path in &event.paths {
        let in_root = path
            .parent()
            .and_then(|p| p.canonicalize().ok())
            .map(|p| p == root)
            .unwrap_or(false);
        if !in_root {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if video_name(path).is_some() {
            if library.insert(name) {
                tracing::info!(file = %name, "video added");
                changed = true;
            }
        } else if library.remove(name) {
            tracing::info!(file = %name, "video removed");
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, RemoveKind};

    use super::*;
    use crate::library::scan_library;
    use crate::library::test_support::temp_root;

    fn setup(label: &str) -> (RwLock<VideoLibrary>, std::path::PathBuf) {
        let root = temp_root(label);
        std::fs::write(root.join("a.mp4"), b"x").unwrap();
        let library = scan_library(&root).unwrap();
        let root = library.root().to_path_buf();
        (RwLock::new(library), root)
    }

    fn names(library: &RwLock<VideoLibrary>) -> Vec<String> {
        library
            .read()
            .unwrap()
            .files()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    #[test]
    fn created_video_is_appended() {
        let (library, root) = setup("watch-create");
        let path = root.join("0-new.mp4");
        std::fs::write(&path, b"x").unwrap();

        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(path);
        assert!(apply_event(&library, &root, &event));
        assert_eq!(names(&library), vec!["a.mp4", "0-new.mp4"]);
    }

    #[test]
    fn removed_video_is_dropped() {
        let (library, root) = setup("watch-remove");
        let path = root.join("a.mp4");
        std::fs::remove_file(&path).unwrap();

        let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path(path);
        assert!(apply_event(&library, &root, &event));
        assert!(names(&library).is_empty());
    }

    #[test]
    fn non_video_and_foreign_paths_are_ignored() {
        let (library, root) = setup("watch-ignore");
        let txt = root.join("readme.txt");
        std::fs::write(&txt, b"x").unwrap();
        let elsewhere = temp_root("watch-elsewhere").join("b.mp4");
        std::fs::write(&elsewhere, b"x").unwrap();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(txt)
            .add_path(elsewhere);
        assert!(!apply_event(&library, &root, &event));
        assert_eq!(names(&library), vec!["a.mp4"]);
    }

    #[test]
    fn access_events_do_not_touch_library() {
        let (library, root) = setup("watch-access");
        let event = Event::new(EventKind::Access(AccessKind::Any)).add_path(root.join("a.mp4"));
        assert!(!apply_event(&library, &root, &event));
    }
}
