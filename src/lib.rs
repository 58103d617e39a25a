pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::config::Config;
pub use crate::core::detection_loop::{Collaborators, PostureMonitor};
pub use crate::models::pose::{PostureError, PostureResult, PostureState};
pub use crate::models::session::{MonitorSnapshot, SessionRecord, SessionStatus, StopReport};
