// Pose estimation platform integration
// The pose model itself runs outside this crate; these are the seams it plugs into

pub mod replay;

pub use replay::RecordedPoseEstimator;

use crate::models::capture::CameraFrame;
use crate::models::pose::{LandmarkFrame, PostureResult};

/// Pose estimation backend
/// Implement this for MediaPipe, ONNX or any other landmark model
pub trait PoseEstimator: Send + Sync {
    /// Landmarks for the person in `frame`, or `None` when nobody is detected
    ///
    /// An `Err` means the backend can no longer produce data.
    fn infer(&self, frame: &CameraFrame) -> PostureResult<Option<LandmarkFrame>>;

    /// Get model info
    fn get_model_info(&self) -> String {
        "unknown pose estimator".to_string()
    }
}
