// Data models for landmark frames, posture angles, and posture classification

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==============================================================================
// Pixel-space Geometry
// ==============================================================================

/// A point in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Which side of the body the diagnostic angles are measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    #[default]
    Left,
    Right,
}

impl BodySide {
    pub fn shoulder(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftShoulder,
            BodySide::Right => BodyLandmark::RightShoulder,
        }
    }

    pub fn ear(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftEar,
            BodySide::Right => BodyLandmark::RightEar,
        }
    }

    pub fn hip(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftHip,
            BodySide::Right => BodyLandmark::RightHip,
        }
    }
}

/// One tracked body point, normalized to [0, 1] image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: u8,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn new(id: u8, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Landmarks without a visibility score are always considered visible
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility.map_or(true, |v| v >= threshold)
    }

    /// Project normalized coordinates onto a frame of the given size
    pub fn to_pixel(&self, width: u32, height: u32) -> Point2D {
        Point2D::new(self.x as f64 * width as f64, self.y as f64 * height as f64)
    }
}

/// All landmarks detected in one camera frame, keyed by landmark id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    landmarks: HashMap<u8, Landmark>,
}

impl LandmarkFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, landmark: Landmark) {
        self.landmarks.insert(landmark.id, landmark);
    }

    pub fn with(mut self, landmark: Landmark) -> Self {
        self.insert(landmark);
        self
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(&landmark.id())
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl FromIterator<Landmark> for LandmarkFrame {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        let mut frame = LandmarkFrame::new();
        for landmark in iter {
            frame.insert(landmark);
        }
        frame
    }
}

// ==============================================================================
// Posture Angles & Classification
// ==============================================================================

/// Neck and torso inclination relative to true vertical, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleReading {
    pub neck_angle: f64,
    pub torso_angle: f64,
}

impl AngleReading {
    pub fn new(neck_angle: f64, torso_angle: f64) -> Self {
        Self {
            neck_angle,
            torso_angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureState {
    Good,
    Bad,
}

impl PostureState {
    pub fn to_string(&self) -> &'static str {
        match self {
            PostureState::Good => "good",
            PostureState::Bad => "bad",
        }
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, PostureState::Bad)
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PostureError {
    #[error("Degenerate geometry: zero-length segment")]
    DegenerateGeometry,

    #[error("Incomplete landmarks: {0:?} missing")]
    IncompleteLandmarks(BodyLandmark),

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("End of input: {0}")]
    EndOfInput(String),

    #[error("Side effect failed: {0}")]
    SideEffectFailure(String),

    #[error("Posture session already running")]
    AlreadyRunning,

    #[error("Cannot {command} while {from}")]
    InvalidTransition {
        from: &'static str,
        command: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PostureResult<T> = Result<T, PostureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_visibility() {
        let landmark = Landmark::new(11, 0.5, 0.5).with_visibility(0.8);
        assert!(landmark.is_visible(0.5));
        assert!(landmark.is_visible(0.8));
        assert!(!landmark.is_visible(0.9));

        // No score reported by the estimator
        assert!(Landmark::new(11, 0.5, 0.5).is_visible(0.9));
    }

    #[test]
    fn test_landmark_to_pixel() {
        let point = Landmark::new(7, 0.25, 0.5).to_pixel(640, 480);
        assert_eq!(point, Point2D::new(160.0, 240.0));
    }

    #[test]
    fn test_landmark_frame_lookup() {
        let frame: LandmarkFrame = vec![
            Landmark::new(BodyLandmark::LeftShoulder.id(), 0.5, 0.5),
            Landmark::new(BodyLandmark::LeftEar.id(), 0.5, 0.3),
        ]
        .into_iter()
        .collect();

        assert_eq!(frame.len(), 2);
        assert!(frame.get(BodyLandmark::LeftShoulder).is_some());
        assert!(frame.get(BodyLandmark::LeftHip).is_none());
    }

    #[test]
    fn test_landmark_frame_json_shape() {
        let json = r#"{"11": {"id": 11, "x": 0.5, "y": 0.4, "visibility": 0.9}}"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        let shoulder = frame.get(BodyLandmark::LeftShoulder).unwrap();
        assert_eq!(shoulder.visibility, Some(0.9));
        assert_eq!(shoulder.z, None);
    }

    #[test]
    fn test_body_side_landmarks() {
        assert_eq!(BodySide::Left.ear(), BodyLandmark::LeftEar);
        assert_eq!(BodySide::Right.hip(), BodyLandmark::RightHip);
        assert_eq!(BodySide::default(), BodySide::Left);
    }
}
