use super::{home_data_directory, Platform};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct LinuxPlatform;

impl LinuxPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for LinuxPlatform {
    fn get_data_directory(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        home_data_directory()
    }

    fn speech_command(&self, text: &str) -> Option<Command> {
        // espeak-ng installs an espeak compatible binary
        let mut command = Command::new("espeak");
        command.arg(text);
        Some(command)
    }

    fn sound_command(&self, clip: &Path) -> Option<Command> {
        // PulseAudio and PipeWire both ship paplay
        let mut command = Command::new("paplay");
        command.arg(clip);
        Some(command)
    }
}
