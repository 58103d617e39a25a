// Session artifacts - append-only session log, per-session report, bad-posture snapshots

use crate::models::capture::{CameraFrame, PixelFormat};
use crate::models::session::SessionRecord;
use chrono::{DateTime, Local, Utc};
use image::{ImageBuffer, Rgb, Rgba};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Appends one line per finished session
pub trait SessionLogWriter: Send + Sync {
    fn append(&self, record: &SessionRecord) -> ExportResult<()>;
}

/// Produces one report artifact per stopped session
pub trait ReportGenerator: Send + Sync {
    fn export(&self, record: &SessionRecord) -> ExportResult<()>;
}

/// Saves the camera image of a bad-posture frame
pub trait SnapshotWriter: Send + Sync {
    fn save(&self, frame: &CameraFrame) -> ExportResult<PathBuf>;
}

/// Artifacts are named and stamped in the user's local time
fn local(timestamp: &DateTime<Utc>) -> DateTime<Local> {
    timestamp.with_timezone(&Local)
}

fn ensure_dir(path: &Path) -> ExportResult<()> {
    if !path.as_os_str().is_empty() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

// ==============================================================================
// CSV Session Log
// ==============================================================================

/// `timestamp,good_frames,bad_frames,score` lines appended to a CSV file
pub struct CsvSessionLog {
    path: PathBuf,
}

impl CsvSessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format_line(record: &SessionRecord) -> String {
        format!(
            "{},{},{},{}",
            local(&record.timestamp).format("%Y-%m-%d %H:%M:%S"),
            record.good_frames,
            record.bad_frames,
            record.score
        )
    }
}

impl SessionLogWriter for CsvSessionLog {
    fn append(&self, record: &SessionRecord) -> ExportResult<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", Self::format_line(record))?;

        Ok(())
    }
}

// ==============================================================================
// JSON Session Report
// ==============================================================================

#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    title: &'static str,
    date: String,
    duration_seconds: i64,
    good_posture_frames: u64,
    bad_posture_frames: u64,
    posture_score: i64,
    record: &'a SessionRecord,
}

/// Writes `posture_report_<timestamp>.json` into a report directory
pub struct JsonReportGenerator {
    dir: PathBuf,
}

impl JsonReportGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn report_path(&self, record: &SessionRecord) -> PathBuf {
        self.dir.join(format!(
            "posture_report_{}.json",
            local(&record.timestamp).format("%Y%m%d_%H%M%S")
        ))
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn export(&self, record: &SessionRecord) -> ExportResult<()> {
        ensure_dir(&self.dir)?;

        let report = SessionReport {
            title: "Posture Session Report",
            date: local(&record.timestamp).format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_seconds: (record.timestamp - record.started_at).num_seconds(),
            good_posture_frames: record.good_frames,
            bad_posture_frames: record.bad_frames,
            posture_score: record.score,
            record,
        };

        let contents = serde_json::to_string_pretty(&report)?;
        std::fs::write(self.report_path(record), contents)?;

        Ok(())
    }
}

// ==============================================================================
// PNG Snapshots
// ==============================================================================

/// Saves frames as `bad_posture_<timestamp>.png`
pub struct PngSnapshotWriter {
    dir: PathBuf,
}

impl PngSnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self) -> PathBuf {
        let now = Local::now();
        self.dir
            .join(format!("bad_posture_{}.png", now.format("%Y%m%d_%H%M%S_%3f")))
    }
}

impl SnapshotWriter for PngSnapshotWriter {
    fn save(&self, frame: &CameraFrame) -> ExportResult<PathBuf> {
        if frame.data.len() != frame.expected_len() {
            return Err(ExportError::InvalidFrame(format!(
                "expected {} bytes for {}x{}, got {}",
                frame.expected_len(),
                frame.width,
                frame.height,
                frame.data.len()
            )));
        }

        ensure_dir(&self.dir)?;
        let path = self.snapshot_path();

        match frame.format {
            PixelFormat::RGBA8 => {
                let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone())
                        .ok_or_else(|| ExportError::InvalidFrame("Failed to create image buffer".to_string()))?;
                img.save(&path)?;
            }
            PixelFormat::RGB8 | PixelFormat::BGR8 => {
                let mut rgb = frame.data.clone();
                if frame.format == PixelFormat::BGR8 {
                    for chunk in rgb.chunks_exact_mut(3) {
                        chunk.swap(0, 2);
                    }
                }
                let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(frame.width, frame.height, rgb)
                        .ok_or_else(|| ExportError::InvalidFrame("Failed to create image buffer".to_string()))?;
                img.save(&path)?;
            }
        }

        Ok(path)
    }
}
