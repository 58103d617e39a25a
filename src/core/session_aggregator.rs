// Session statistics and the hand-off of finished sessions to the artifact writers

use crate::core::export::{ReportGenerator, SessionLogWriter};
use crate::models::pose::PostureState;
use crate::models::session::{RunState, SessionRecord, SessionStats, StopReport};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

/// Owns the statistics of one session from `start` until it is exported
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    stats: SessionStats,
    final_run: RunState,
    exported: bool,
}

impl SessionAggregator {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at,
            stats: SessionStats::default(),
            final_run: RunState::default(),
            exported: false,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Fold one classified frame into the statistics
    pub fn record(&mut self, posture: PostureState, run: RunState, score: i64) {
        match posture {
            PostureState::Good => {
                self.stats.good_frames = run.consecutive_count;
                self.stats.bad_frames = 0;
                self.stats.total_good_frames += 1;
            }
            PostureState::Bad => {
                self.stats.good_frames = 0;
                self.stats.bad_frames = run.consecutive_count;
                self.stats.total_bad_frames += 1;
            }
        }
        self.stats.score = score;
        self.final_run = run;
    }

    /// Freeze the statistics into a record; `None` if no frame was classified
    pub fn finalize(&self, completed_at: DateTime<Utc>) -> Option<SessionRecord> {
        if self.stats.frames_processed() == 0 {
            return None;
        }

        Some(SessionRecord {
            session_id: self.session_id,
            started_at: self.started_at,
            timestamp: completed_at,
            good_frames: self.stats.total_good_frames,
            bad_frames: self.stats.total_bad_frames,
            score: self.stats.score,
            final_run: self.final_run,
        })
    }

    /// Finalize and hand the record to both writers, at most once per session
    ///
    /// Writer failures are collected into `StopReport::ExportFailed`; the
    /// other writer still runs.
    pub fn export(
        &mut self,
        completed_at: DateTime<Utc>,
        log_writer: &dyn SessionLogWriter,
        report_generator: &dyn ReportGenerator,
    ) -> StopReport {
        if self.exported {
            return StopReport::AlreadyExported;
        }

        let record = match self.finalize(completed_at) {
            Some(record) => record,
            None => {
                info!("Session {} processed no frames, skipping export", self.session_id);
                return StopReport::NothingToReport;
            }
        };
        self.exported = true;

        let mut errors = Vec::new();

        if let Err(e) = log_writer.append(&record) {
            warn!("Failed to append session log: {}", e);
            errors.push(format!("Session log: {}", e));
        }

        if let Err(e) = report_generator.export(&record) {
            warn!("Failed to generate session report: {}", e);
            errors.push(format!("Report: {}", e));
        }

        if errors.is_empty() {
            info!(
                "Exported session {}: good={} bad={} score={}",
                record.session_id, record.good_frames, record.bad_frames, record.score
            );
            StopReport::Exported { record }
        } else {
            StopReport::ExportFailed { record, errors }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::{ExportError, ExportResult};
    use crate::core::scoring::{RunTracker, ScoreAccumulator};
    use std::sync::Mutex;
    use PostureState::{Bad, Good};

    #[derive(Default)]
    struct MemoryWriter {
        records: Mutex<Vec<SessionRecord>>,
        fail: bool,
    }

    impl SessionLogWriter for MemoryWriter {
        fn append(&self, record: &SessionRecord) -> ExportResult<()> {
            if self.fail {
                return Err(ExportError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    impl ReportGenerator for MemoryWriter {
        fn export(&self, record: &SessionRecord) -> ExportResult<()> {
            self.append(record)
        }
    }

    fn feed(aggregator: &mut SessionAggregator, postures: &[PostureState]) {
        let mut run = RunTracker::new();
        let mut score = ScoreAccumulator::new();
        for &posture in postures {
            let run_state = run.record(posture);
            let total = score.record(posture);
            aggregator.record(posture, run_state, total);
        }
    }

    #[test]
    fn test_live_stats_follow_current_run() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        feed(&mut aggregator, &[Good, Good, Good, Bad, Bad]);

        let stats = aggregator.stats();
        assert_eq!(stats.good_frames, 0);
        assert_eq!(stats.bad_frames, 2);
        assert_eq!(stats.total_good_frames, 3);
        assert_eq!(stats.total_bad_frames, 2);
        assert_eq!(stats.score, -1);
    }

    #[test]
    fn test_record_carries_cumulative_totals() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        feed(&mut aggregator, &[Good, Good, Good, Bad, Bad]);

        let record = aggregator.finalize(Utc::now()).unwrap();
        assert_eq!(record.good_frames, 3);
        assert_eq!(record.bad_frames, 2);
        assert_eq!(record.score, -1);
        assert_eq!(record.final_run.current_state, Some(Bad));
        assert_eq!(record.final_run.consecutive_count, 2);
    }

    #[test]
    fn test_empty_session_is_not_exported() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        let writer = MemoryWriter::default();

        assert!(aggregator.finalize(Utc::now()).is_none());
        let report = aggregator.export(Utc::now(), &writer, &writer);
        assert_eq!(report, StopReport::NothingToReport);
        assert!(writer.records.lock().unwrap().is_empty());
    }

    #[test]
    fn test_export_runs_once() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        feed(&mut aggregator, &[Good]);
        let writer = MemoryWriter::default();

        let report = aggregator.export(Utc::now(), &writer, &writer);
        assert!(matches!(report, StopReport::Exported { .. }));
        assert_eq!(writer.records.lock().unwrap().len(), 2);

        let again = aggregator.export(Utc::now(), &writer, &writer);
        assert_eq!(again, StopReport::AlreadyExported);
        assert_eq!(writer.records.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_export_failure_is_reported() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        feed(&mut aggregator, &[Bad]);
        let failing = MemoryWriter {
            fail: true,
            ..Default::default()
        };
        let working = MemoryWriter::default();

        let report = aggregator.export(Utc::now(), &failing, &working);
        match report {
            StopReport::ExportFailed { record, errors } => {
                assert_eq!(record.bad_frames, 1);
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("Session log"));
            }
            other => panic!("unexpected report: {:?}", other),
        }

        // The report writer still received the record
        assert_eq!(working.records.lock().unwrap().len(), 1);
    }
}
