// Data models for camera frames, pose landmarks, and posture sessions

pub mod capture;
pub mod pose;
pub mod session;
