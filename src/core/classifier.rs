// Two-state posture classification against fixed angle thresholds

use crate::models::pose::{AngleReading, PostureState};

pub const DEFAULT_NECK_THRESHOLD_DEG: f64 = 40.0;
pub const DEFAULT_TORSO_THRESHOLD_DEG: f64 = 10.0;

/// Classifies a single angle reading; holds no per-frame history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureClassifier {
    neck_threshold: f64,
    torso_threshold: f64,
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NECK_THRESHOLD_DEG, DEFAULT_TORSO_THRESHOLD_DEG)
    }
}

impl PostureClassifier {
    pub fn new(neck_threshold: f64, torso_threshold: f64) -> Self {
        Self {
            neck_threshold,
            torso_threshold,
        }
    }

    /// Bad when either angle strictly exceeds its threshold
    pub fn classify(&self, angles: &AngleReading) -> PostureState {
        if angles.neck_angle > self.neck_threshold || angles.torso_angle > self.torso_threshold {
            PostureState::Bad
        } else {
            PostureState::Good
        }
    }
}

/// Classify with the default 40° neck / 10° torso thresholds
pub fn classify(angles: &AngleReading) -> PostureState {
    PostureClassifier::default().classify(angles)
}
