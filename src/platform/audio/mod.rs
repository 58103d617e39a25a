// Speech and sound feedback collaborators
// Backed by the platform's command-line speech synthesizer and audio player

use crate::models::pose::{PostureError, PostureResult};
use crate::platform::{get_platform, Platform};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Reads suggestions aloud. Calls may block until speech finishes.
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, text: &str) -> PostureResult<()>;
}

/// Plays an alert clip. Calls may block until playback finishes.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, clip_id: &str) -> PostureResult<()>;
}

fn run_to_completion(mut command: Command, what: &str) -> PostureResult<()> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| PostureError::SideEffectFailure(format!("{} failed to start: {}", what, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(PostureError::SideEffectFailure(format!(
            "{} exited with {}",
            what, status
        )))
    }
}

/// Text-to-speech through the OS speech command
pub struct CommandSpeechEngine {
    platform: Box<dyn Platform>,
}

impl CommandSpeechEngine {
    pub fn new() -> Self {
        Self {
            platform: get_platform(),
        }
    }
}

impl Default for CommandSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn speak(&self, text: &str) -> PostureResult<()> {
        match self.platform.speech_command(text) {
            Some(command) => run_to_completion(command, "Text-to-speech"),
            None => Err(PostureError::SideEffectFailure(
                "Text-to-speech not supported on this platform".to_string(),
            )),
        }
    }
}

/// Plays clips from a directory through the OS audio player
///
/// A clip id that does not resolve to an existing file is a no-op.
pub struct CommandSoundPlayer {
    platform: Box<dyn Platform>,
    clip_dir: PathBuf,
}

impl CommandSoundPlayer {
    pub fn new(clip_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform: get_platform(),
            clip_dir: clip_dir.into(),
        }
    }

    pub fn resolve(&self, clip_id: &str) -> PathBuf {
        let clip = Path::new(clip_id);
        if clip.is_absolute() {
            clip.to_path_buf()
        } else {
            self.clip_dir.join(clip)
        }
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&self, clip_id: &str) -> PostureResult<()> {
        let clip = self.resolve(clip_id);
        if !clip.exists() {
            return Ok(());
        }

        match self.platform.sound_command(&clip) {
            Some(command) => run_to_completion(command, "Sound alert"),
            None => Err(PostureError::SideEffectFailure(
                "Sound playback not supported on this platform".to_string(),
            )),
        }
    }
}

/// Feedback sink that stays silent, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SpeechEngine for Silent {
    fn speak(&self, _text: &str) -> PostureResult<()> {
        Ok(())
    }
}

impl SoundPlayer for Silent {
    fn play(&self, _clip_id: &str) -> PostureResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_clip_is_noop() {
        let dir = std::env::temp_dir().join(format!("stance_track_clips_{}", uuid::Uuid::new_v4()));
        let player = CommandSoundPlayer::new(&dir);
        assert!(player.play("alert.mp3").is_ok());
    }

    #[test]
    fn test_clip_resolution() {
        let player = CommandSoundPlayer::new("/opt/sounds");
        assert_eq!(player.resolve("alert.mp3"), PathBuf::from("/opt/sounds/alert.mp3"));

        let absolute = std::env::temp_dir().join("alert.mp3");
        assert_eq!(player.resolve(&absolute.to_string_lossy()), absolute);
    }

    #[test]
    fn test_silent_feedback() {
        assert!(Silent.speak("Sit up straight!").is_ok());
        assert!(Silent.play("alert.mp3").is_ok());
    }
}
