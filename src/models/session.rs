// Data models for posture sessions: run tracking, statistics, and export records

use crate::models::pose::{AngleReading, PostureState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// Session Lifecycle
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl SessionStatus {
    pub fn to_string(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Stopped => "stopped",
        }
    }

    /// The detection worker keeps pulling frames in these states
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused)
    }
}

// ==============================================================================
// Run Tracking & Statistics
// ==============================================================================

/// Length of the current run of identically classified frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunState {
    pub current_state: Option<PostureState>,
    pub consecutive_count: u64,
}

/// Live statistics for the session in progress
///
/// `good_frames` / `bad_frames` mirror the current run (one of them is
/// always zero once a frame has been classified). The `total_*` counters
/// and `score` accumulate over the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub good_frames: u64,
    pub bad_frames: u64,
    pub total_good_frames: u64,
    pub total_bad_frames: u64,
    pub score: i64,
}

impl SessionStats {
    pub fn frames_processed(&self) -> u64 {
        self.total_good_frames + self.total_bad_frames
    }
}

/// A suggestion raised for a frame classified as bad posture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// ==============================================================================
// Export Contract
// ==============================================================================

/// Finalized session handed to the log writer and report generator
///
/// Frame counts are cumulative session totals. The run that was in
/// progress when the session stopped is kept separately in `final_run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub good_frames: u64,
    pub bad_frames: u64,
    pub score: i64,
    pub final_run: RunState,
}

/// Outcome of stopping a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopReport {
    /// No frame was ever classified, nothing was exported
    NothingToReport,
    /// The session had already been exported by an earlier stop
    AlreadyExported,
    Exported { record: SessionRecord },
    ExportFailed {
        record: SessionRecord,
        errors: Vec<String>,
    },
}

impl StopReport {
    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            StopReport::Exported { record } | StopReport::ExportFailed { record, .. } => Some(record),
            _ => None,
        }
    }
}

// ==============================================================================
// UI-facing State
// ==============================================================================

/// Latest state published by the detection loop for presentation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub session_id: Option<Uuid>,
    pub status: SessionStatus,
    pub posture: Option<PostureState>,
    pub angles: Option<AngleReading>,
    pub tip: Option<String>,
    pub stats: SessionStats,
    pub last_error: Option<String>,
}
