// Camera abstraction - where the detection loop pulls frames from

use crate::models::capture::CameraFrame;
use crate::models::pose::{PostureError, PostureResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

/// Platform-agnostic frame source
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Prepare the device; fails with `CollaboratorUnavailable` when there is no camera
    async fn open(&self) -> PostureResult<()>;

    /// Wait for the next frame
    async fn next_frame(&self) -> PostureResult<CameraFrame>;

    /// Release the device
    async fn close(&self) {}
}

/// Blank frames of a fixed size at a fixed rate
///
/// Stands in for a camera when landmarks come from a recording.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    ticker: Mutex<Interval>,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, fps: u32) -> PostureResult<Self> {
        if width == 0 || height == 0 {
            return Err(PostureError::InvalidConfig(format!(
                "Invalid frame size {}x{}",
                width, height
            )));
        }
        if fps == 0 || fps > 120 {
            return Err(PostureError::InvalidConfig(format!(
                "Invalid FPS: {}. Must be between 1 and 120",
                fps
            )));
        }

        let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            width,
            height,
            ticker: Mutex::new(ticker),
        })
    }
}

#[async_trait]
impl FrameSource for SyntheticCamera {
    async fn open(&self) -> PostureResult<()> {
        Ok(())
    }

    async fn next_frame(&self) -> PostureResult<CameraFrame> {
        self.ticker.lock().await.tick().await;
        Ok(CameraFrame::blank(
            chrono::Utc::now().timestamp_millis(),
            self.width,
            self.height,
        ))
    }
}
