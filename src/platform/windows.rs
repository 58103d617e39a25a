use super::{home_data_directory, Platform};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }

    /// Single-quoted PowerShell literal
    fn ps_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn powershell(script: String) -> Command {
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
        command
    }
}

impl Platform for WindowsPlatform {
    fn get_data_directory(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        home_data_directory()
    }

    fn speech_command(&self, text: &str) -> Option<Command> {
        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak({})",
            Self::ps_literal(text)
        );
        Some(Self::powershell(script))
    }

    /// MediaPlayer handles MP3 as well as WAV; give up if the clip never opens
    fn sound_command(&self, clip: &Path) -> Option<Command> {
        let script = format!(
            "Add-Type -AssemblyName PresentationCore; \
             $player = New-Object System.Windows.Media.MediaPlayer; \
             $player.Open([Uri]{}); \
             for ($i = 0; $i -lt 100 -and -not $player.NaturalDuration.HasTimeSpan; $i++) {{ Start-Sleep -Milliseconds 50 }}; \
             if (-not $player.NaturalDuration.HasTimeSpan) {{ $player.Close(); exit 1 }}; \
             $player.Play(); \
             Start-Sleep -Milliseconds ([int]$player.NaturalDuration.TimeSpan.TotalMilliseconds); \
             $player.Close()",
            Self::ps_literal(&clip.to_string_lossy())
        );
        Some(Self::powershell(script))
    }
}
