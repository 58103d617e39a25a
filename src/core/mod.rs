pub mod config;
pub mod export;

// Posture math
pub mod geometry;
pub mod angle_extractor;
pub mod classifier;
pub mod scoring;

// Session pipeline
pub mod frame_source;
pub mod alert_dispatcher;
pub mod session_aggregator;
pub mod detection_loop;
