// Replays landmark frames captured from an earlier pose-estimation run

use super::PoseEstimator;
use crate::models::capture::CameraFrame;
use crate::models::pose::{Landmark, LandmarkFrame, PostureError, PostureResult};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded frame: the detected landmarks, or `null` / `[]` when nobody was in view
pub type RecordedFrame = Option<Vec<Landmark>>;

/// Pose estimator that returns recorded landmark frames in order
///
/// Once every recorded frame has been returned, `infer` reports
/// `EndOfInput`, which ends the detection loop cleanly.
pub struct RecordedPoseEstimator {
    frames: Vec<Option<LandmarkFrame>>,
    cursor: AtomicUsize,
}

impl RecordedPoseEstimator {
    pub fn new(frames: Vec<Option<LandmarkFrame>>) -> Self {
        Self {
            frames,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Load a JSON array of recorded frames
    pub fn from_json(json: &str) -> PostureResult<Self> {
        let recorded: Vec<RecordedFrame> = serde_json::from_str(json).map_err(|e| {
            PostureError::CollaboratorUnavailable(format!("Invalid landmark recording: {}", e))
        })?;

        let frames = recorded
            .into_iter()
            .map(|frame| {
                frame
                    .map(|landmarks| landmarks.into_iter().collect::<LandmarkFrame>())
                    .filter(|landmarks| !landmarks.is_empty())
            })
            .collect();

        Ok(Self::new(frames))
    }

    pub fn from_file(path: &Path) -> PostureResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PostureError::CollaboratorUnavailable(format!(
                "Could not read landmark recording {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PoseEstimator for RecordedPoseEstimator {
    fn infer(&self, _frame: &CameraFrame) -> PostureResult<Option<LandmarkFrame>> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.frames.get(index).cloned().ok_or_else(|| {
            PostureError::EndOfInput("landmark recording exhausted".to_string())
        })
    }

    fn get_model_info(&self) -> String {
        format!("Recorded landmarks ({} frames)", self.frames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::BodyLandmark;

    #[test]
    fn test_replay_in_order_then_exhausted() {
        let json = r#"[
            [{"id": 11, "x": 0.5, "y": 0.4}, {"id": 7, "x": 0.5, "y": 0.2}],
            null
        ]"#;
        let estimator = RecordedPoseEstimator::from_json(json).unwrap();
        assert_eq!(estimator.len(), 2);
        assert_eq!(estimator.get_model_info(), "Recorded landmarks (2 frames)");

        let frame = CameraFrame::blank(0, 8, 8);
        let first = estimator.infer(&frame).unwrap().unwrap();
        assert!(first.get(BodyLandmark::LeftShoulder).is_some());
        assert!(first.get(BodyLandmark::LeftEar).is_some());

        assert!(estimator.infer(&frame).unwrap().is_none());
        assert!(matches!(
            estimator.infer(&frame),
            Err(PostureError::EndOfInput(_))
        ));
    }

    #[test]
    fn test_empty_landmark_list_means_nobody_in_view() {
        let estimator = RecordedPoseEstimator::from_json("[[], null]").unwrap();
        let frame = CameraFrame::blank(0, 8, 8);

        assert!(estimator.infer(&frame).unwrap().is_none());
        assert!(estimator.infer(&frame).unwrap().is_none());
    }

    #[test]
    fn test_invalid_recording() {
        assert!(RecordedPoseEstimator::from_json("{not json").is_err());
    }
}
