// Neck and torso inclination from one side of the body

use crate::core::geometry::angle_at_vertex;
use crate::models::pose::{
    AngleReading, BodyLandmark, BodySide, LandmarkFrame, Point2D, PostureError, PostureResult,
};

/// Maps a landmark frame to the two diagnostic angles
#[derive(Debug, Clone, Copy)]
pub struct AngleExtractor {
    side: BodySide,
    min_visibility: f32,
}

impl Default for AngleExtractor {
    fn default() -> Self {
        Self::new(BodySide::Left, 0.0)
    }
}

impl AngleExtractor {
    pub fn new(side: BodySide, min_visibility: f32) -> Self {
        Self {
            side,
            min_visibility,
        }
    }

    /// Compute neck and torso inclination for a `width` x `height` frame
    ///
    /// Each angle is measured at the lower joint between the upper joint
    /// and a reference point straight above the lower joint on the top
    /// edge of the frame (`y = 0`).
    pub fn extract(&self, frame: &LandmarkFrame, width: u32, height: u32) -> PostureResult<AngleReading> {
        let shoulder = self.pixel(frame, self.side.shoulder(), width, height)?;
        let ear = self.pixel(frame, self.side.ear(), width, height)?;
        let hip = self.pixel(frame, self.side.hip(), width, height)?;

        let neck_angle = angle_at_vertex(shoulder, ear, Point2D::new(shoulder.x, 0.0))?;
        let torso_angle = angle_at_vertex(hip, shoulder, Point2D::new(hip.x, 0.0))?;

        Ok(AngleReading::new(neck_angle, torso_angle))
    }

    fn pixel(
        &self,
        frame: &LandmarkFrame,
        landmark: BodyLandmark,
        width: u32,
        height: u32,
    ) -> PostureResult<Point2D> {
        frame
            .get(landmark)
            .filter(|l| l.is_visible(self.min_visibility))
            .map(|l| l.to_pixel(width, height))
            .ok_or(PostureError::IncompleteLandmarks(landmark))
    }
}
