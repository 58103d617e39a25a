use super::{home_data_directory, Platform};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct MacOSPlatform;

impl MacOSPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for MacOSPlatform {
    fn get_data_directory(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        home_data_directory()
    }

    fn speech_command(&self, text: &str) -> Option<Command> {
        let mut command = Command::new("say");
        command.arg(text);
        Some(command)
    }

    fn sound_command(&self, clip: &Path) -> Option<Command> {
        let mut command = Command::new("afplay");
        command.arg(clip);
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_speech_command() {
        let platform = MacOSPlatform::new();
        let command = platform.speech_command("Keep your head level.").unwrap();
        assert_eq!(command.get_program(), "say");
    }
}
