use std::path::{Path, PathBuf};
use std::process::Command;

pub mod audio;
pub mod pose;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

/// Directory name created under the user's home for config, logs and reports
pub const DATA_DIR_NAME: &str = ".stance_track";

/// Platform abstraction trait for OS-specific operations
pub trait Platform: Send + Sync {
    /// Get the default data directory for the application
    fn get_data_directory(&self) -> Result<PathBuf, Box<dyn std::error::Error>>;

    /// Command that reads `text` aloud, if the platform has a speech synthesizer
    fn speech_command(&self, text: &str) -> Option<Command>;

    /// Command that plays the audio clip at `clip`
    fn sound_command(&self, clip: &Path) -> Option<Command>;
}

/// Get the current platform implementation
pub fn get_platform() -> Box<dyn Platform> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacOSPlatform::new())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPlatform::new())
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::LinuxPlatform::new())
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Box::new(UnsupportedPlatform)
    }
}

/// Home directory joined with the application data directory
pub(crate) fn home_data_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| "Could not determine home directory")?;

    let mut path = PathBuf::from(home);
    path.push(DATA_DIR_NAME);

    Ok(path)
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
struct UnsupportedPlatform;

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
impl Platform for UnsupportedPlatform {
    fn get_data_directory(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        home_data_directory()
    }

    fn speech_command(&self, _text: &str) -> Option<Command> {
        None
    }

    fn sound_command(&self, _clip: &Path) -> Option<Command> {
        None
    }
}
