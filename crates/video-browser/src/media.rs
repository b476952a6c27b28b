//! Media surfaces.
//!
//! A `MediaElement` is the thing a video is loaded into and played on. The
//! controller only talks to this trait; `ProcessPlayer` backs it with an
//! external player program pointed at the server's stream URL, which leaves
//! decoding and HTTP range requests to that program.

use std::fmt;
use std::io;
use std::process::{Child, Command, Stdio};

/// Failure to start playback on a media surface.
#[derive(Debug)]
pub(crate) enum PlayError {
    /// `play` was called before any source was loaded.
    NoSource,
    /// The player program could not be launched.
    Spawn { program: String, source: io::Error },
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::NoSource => write!(f, "no source loaded"),
            PlayError::Spawn { program, source } => {
                write!(f, "failed to launch player {program}: {source}")
            }
        }
    }
}

impl std::error::Error for PlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayError::NoSource => None,
            PlayError::Spawn { source, .. } => Some(source),
        }
    }
}

/// Asynchronous outcome reported by a surface after `play` succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MediaEvent {
    /// Playback reached the end (or the player was closed normally).
    Ended,
    /// Playback stopped because of an error (decode, network, player crash).
    Failed(String),
}

/// A single playback surface (preview or main).
pub(crate) trait MediaElement {
    /// Assign a new source. Does not start playback.
    fn load(&mut self, url: &str);

    /// Start playback of the loaded source from the current position.
    fn play(&mut self) -> Result<(), PlayError>;

    /// Stop advancing playback. Idempotent.
    fn pause(&mut self);

    /// Rewind to position 0 without starting playback.
    fn seek_to_start(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Drop the source and reset the surface to its empty state.
    fn clear(&mut self);

    fn current_src(&self) -> Option<&str>;

    /// Next pending event, if any. Called once per UI tick.
    fn poll_event(&mut self) -> Option<MediaEvent>;
}

/// Command line used to launch the external player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PlayerCommand {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    /// Extra arguments appended when the surface is muted.
    pub(crate) mute_args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self {
            program: "mpv".to_string(),
            args: vec!["--really-quiet".to_string(), "--force-window=yes".to_string()],
            mute_args: vec!["--mute=yes".to_string()],
        }
    }
}

impl PlayerCommand {
    fn build(&self, url: &str, muted: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if muted {
            cmd.args(&self.mute_args);
        }
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Media surface backed by one player process per `play` call.
///
/// The process does not retain a position once paused, so `pause` terminates
/// it and the next `play` starts from the beginning.
pub(crate) struct ProcessPlayer {
    label: &'static str,
    command: PlayerCommand,
    src: Option<String>,
    muted: bool,
    child: Option<Child>,
}

impl ProcessPlayer {
    pub(crate) fn new(label: &'static str, command: PlayerCommand) -> Self {
        Self {
            label,
            command,
            src: None,
            muted: false,
            child: None,
        }
    }

    fn stop_child(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            if e.kind() != io::ErrorKind::InvalidInput {
                tracing::warn!(surface = self.label, error = %e, "failed to stop player");
            }
        }
        let _ = child.wait();
    }
}

impl MediaElement for ProcessPlayer {
    fn load(&mut self, url: &str) {
        self.stop_child();
        self.src = Some(url.to_string());
    }

    fn play(&mut self) -> Result<(), PlayError> {
        let url = self.src.clone().ok_or(PlayError::NoSource)?;
        self.stop_child();
        let child = self
            .command
            .build(&url, self.muted)
            .spawn()
            .map_err(|source| PlayError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;
        tracing::debug!(surface = self.label, pid = child.id(), url = %url, muted = self.muted, "player started");
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_child();
    }

    fn seek_to_start(&mut self) {
        // Position is not kept across pause; nothing to rewind.
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn clear(&mut self) {
        self.stop_child();
        self.src = None;
    }

    fn current_src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => {
                self.child = None;
                if status.success() {
                    Some(MediaEvent::Ended)
                } else {
                    Some(MediaEvent::Failed(format!(
                        "{} exited with {status}",
                        self.command.program
                    )))
                }
            }
            Err(e) => {
                self.child = None;
                Some(MediaEvent::Failed(format!("player wait failed: {e}")))
            }
        }
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.stop_child();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn command(program: &str) -> PlayerCommand {
        PlayerCommand {
            program: program.to_string(),
            args: vec!["--quiet".to_string()],
            mute_args: vec!["--mute=yes".to_string()],
        }
    }

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn muted_command_appends_mute_args_before_url() {
        let cmd = command("mpv").build("http://h/videos/a.mp4", true);
        assert_eq!(args_of(&cmd), vec!["--quiet", "--mute=yes", "http://h/videos/a.mp4"]);
    }

    #[test]
    fn unmuted_command_skips_mute_args() {
        let cmd = command("mpv").build("http://h/videos/a.mp4", false);
        assert_eq!(args_of(&cmd), vec!["--quiet", "http://h/videos/a.mp4"]);
    }

    #[test]
    fn play_without_source_is_rejected() {
        let mut player = ProcessPlayer::new("test", command("mpv"));
        assert!(matches!(player.play(), Err(PlayError::NoSource)));
        assert!(player.child.is_none());
    }

    #[test]
    fn play_reports_missing_program() {
        let mut player = ProcessPlayer::new("test", command("definitely-not-a-real-player-binary"));
        player.load("http://127.0.0.1:1/videos/a.mp4");
        let err = player.play().unwrap_err();
        assert!(matches!(err, PlayError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-player-binary"));
        assert!(player.poll_event().is_none());
    }

    #[test]
    fn clear_drops_source() {
        let mut player = ProcessPlayer::new("test", command("mpv"));
        player.load("http://h/videos/a.mp4");
        assert_eq!(player.current_src(), Some("http://h/videos/a.mp4"));
        player.clear();
        assert_eq!(player.current_src(), None);
    }
}
