use crate::core::classifier::{DEFAULT_NECK_THRESHOLD_DEG, DEFAULT_TORSO_THRESHOLD_DEG};
use crate::models::pose::BodySide;
use crate::platform::{get_platform, DATA_DIR_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SUGGESTIONS: [&str; 8] = [
    "Sit up straight!",
    "Align your back with the chair.",
    "Keep your head level.",
    "Avoid slouching!",
    "Roll your shoulders back.",
    "Keep your neck tall and aligned.",
    "Straighten your spine!",
    "Balance your weight evenly.",
];

pub const DEFAULT_QUOTES: [&str; 5] = [
    "Posture is a reflection of your mindset.",
    "Stand tall, feel confident.",
    "Good posture = Good energy.",
    "Your spine deserves better!",
    "A straight back leads to a strong day.",
];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Neck inclination above which posture is bad, in degrees
    pub neck_threshold_deg: f64,
    /// Torso inclination above which posture is bad, in degrees
    pub torso_threshold_deg: f64,
    /// Side of the body facing the camera
    pub body_side: BodySide,
    /// Landmarks reported below this visibility (0.0-1.0) are treated as missing
    pub min_landmark_visibility: f32,
    /// Alert clip played on bad posture, relative to `data_dir` unless absolute
    pub alert_clip: String,
    /// Spoken suggestions, one picked per bad frame
    pub suggestions: Vec<String>,
    /// Encouragement shown on good frames
    pub quotes: Vec<String>,
    /// Fixed seed for message selection
    pub rng_seed: Option<u64>,
    /// Minimum gap between spoken suggestions; 0 speaks on every bad frame
    pub speech_min_interval_ms: u64,
    /// Save a snapshot of every bad frame
    pub snapshots_enabled: bool,
    /// Where the session log, reports and snapshots are written
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = get_platform()
            .get_data_directory()
            .unwrap_or_else(|_| PathBuf::from(".").join(DATA_DIR_NAME));

        Self {
            neck_threshold_deg: DEFAULT_NECK_THRESHOLD_DEG,
            torso_threshold_deg: DEFAULT_TORSO_THRESHOLD_DEG,
            body_side: BodySide::Left,
            min_landmark_visibility: 0.0,
            alert_clip: "alert.mp3".to_string(),
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            quotes: DEFAULT_QUOTES.iter().map(|s| s.to_string()).collect(),
            rng_seed: None,
            speech_min_interval_ms: 0,
            snapshots_enabled: true,
            data_dir,
        }
    }
}

impl Config {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        for (name, value) in [
            ("neck", self.neck_threshold_deg),
            ("torso", self.torso_threshold_deg),
        ] {
            if !(value > 0.0 && value < 180.0) {
                return Err(format!(
                    "Invalid {} threshold: {}. Must be between 0 and 180 degrees",
                    name, value
                )
                .into());
            }
        }

        if !(0.0..=1.0).contains(&self.min_landmark_visibility) {
            return Err(format!(
                "Invalid landmark visibility: {}. Must be between 0.0 and 1.0",
                self.min_landmark_visibility
            )
            .into());
        }

        if self.alert_clip.trim().is_empty() {
            return Err("Alert clip cannot be empty".into());
        }

        if self.suggestions.is_empty() {
            return Err("Suggestions cannot be empty".into());
        }

        if self.quotes.is_empty() {
            return Err("Quotes cannot be empty".into());
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn session_log_path(&self) -> PathBuf {
        self.data_dir.join("posture_log.csv")
    }

    pub fn report_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    /// Get the configuration file path
    fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let mut path = get_platform().get_data_directory()?;
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
