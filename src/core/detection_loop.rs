// Posture monitor - session state machine and the detection worker
//
// IDLE -> RUNNING <-> PAUSED -> STOPPED, with STOPPED -> RUNNING on the next
// start. All per-session state sits behind one lock shared by the command
// methods and the worker task.

use crate::core::alert_dispatcher::{AlertDispatcher, MessageCatalog};
use crate::core::angle_extractor::AngleExtractor;
use crate::core::classifier::PostureClassifier;
use crate::core::config::Config;
use crate::core::export::{
    CsvSessionLog, JsonReportGenerator, PngSnapshotWriter, ReportGenerator, SessionLogWriter,
    SnapshotWriter,
};
use crate::core::frame_source::FrameSource;
use crate::core::scoring::{RunTracker, ScoreAccumulator};
use crate::core::session_aggregator::SessionAggregator;
use crate::models::capture::CameraFrame;
use crate::models::pose::{
    AngleReading, LandmarkFrame, PostureError, PostureResult, PostureState,
};
use crate::models::session::{MonitorSnapshot, SessionStatus, StopReport};
use crate::platform::audio::{CommandSoundPlayer, CommandSpeechEngine, SoundPlayer, SpeechEngine};
use crate::platform::pose::PoseEstimator;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

// ==============================================================================
// Collaborators
// ==============================================================================

/// External services the monitor drives
#[derive(Clone)]
pub struct Collaborators {
    pub frame_source: Arc<dyn FrameSource>,
    pub pose_estimator: Arc<dyn PoseEstimator>,
    pub speech: Arc<dyn SpeechEngine>,
    pub sound: Arc<dyn SoundPlayer>,
    pub session_log: Arc<dyn SessionLogWriter>,
    pub report_generator: Arc<dyn ReportGenerator>,
    pub snapshot_writer: Option<Arc<dyn SnapshotWriter>>,
}

impl Collaborators {
    /// Platform speech and sound plus file writers below `config.data_dir`
    pub fn with_defaults(
        config: &Config,
        frame_source: Arc<dyn FrameSource>,
        pose_estimator: Arc<dyn PoseEstimator>,
    ) -> Self {
        let snapshot_writer: Option<Arc<dyn SnapshotWriter>> = if config.snapshots_enabled {
            Some(Arc::new(PngSnapshotWriter::new(config.snapshot_dir())))
        } else {
            None
        };

        Self {
            frame_source,
            pose_estimator,
            speech: Arc::new(CommandSpeechEngine::new()),
            sound: Arc::new(CommandSoundPlayer::new(&config.data_dir)),
            session_log: Arc::new(CsvSessionLog::new(config.session_log_path())),
            report_generator: Arc::new(JsonReportGenerator::new(config.report_dir())),
            snapshot_writer,
        }
    }
}

// ==============================================================================
// Session State
// ==============================================================================

struct SessionState {
    status: SessionStatus,
    run: RunTracker,
    score: ScoreAccumulator,
    aggregator: SessionAggregator,
    posture: Option<PostureState>,
    angles: Option<AngleReading>,
    tip: Option<String>,
    last_error: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            run: RunTracker::new(),
            score: ScoreAccumulator::new(),
            aggregator: SessionAggregator::new(Utc::now()),
            posture: None,
            angles: None,
            tip: None,
            last_error: None,
        }
    }

    /// Fresh counters for a new session
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            session_id: Some(self.aggregator.session_id()),
            status: self.status,
            posture: self.posture,
            angles: self.angles,
            tip: self.tip.clone(),
            stats: self.aggregator.stats(),
            last_error: self.last_error.clone(),
        }
    }
}

/// State shared between the monitor handle and its worker
struct Shared {
    state: Mutex<SessionState>,
    frame_source: Arc<dyn FrameSource>,
    pose_estimator: Arc<dyn PoseEstimator>,
    snapshot_writer: Option<Arc<dyn SnapshotWriter>>,
    extractor: AngleExtractor,
    classifier: PostureClassifier,
    dispatcher: AlertDispatcher,
    updates: watch::Sender<MonitorSnapshot>,
}

impl Shared {
    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot());
    }

    /// Run one frame through extraction, classification, scoring and feedback
    fn process_frame(&self, state: &mut SessionState, landmarks: &LandmarkFrame, frame: &CameraFrame) {
        let angles = match self.extractor.extract(landmarks, frame.width, frame.height) {
            Ok(angles) => angles,
            Err(e) => {
                debug!("Skipping frame {}: {}", frame.timestamp, e);
                return;
            }
        };

        let posture = self.classifier.classify(&angles);
        let run = state.run.record(posture);
        let score = state.score.record(posture);
        state.aggregator.record(posture, run, score);
        debug!(
            "Frame {}: {} (neck {:.1}, torso {:.1}), score {}",
            frame.timestamp,
            posture.to_string(),
            angles.neck_angle,
            angles.torso_angle,
            score
        );

        state.tip = Some(if posture.is_bad() {
            let outcome = self.dispatcher.on_bad_frame(Utc::now());
            self.save_snapshot(frame);
            outcome.event.message
        } else {
            self.dispatcher.select_quote()
        });
        state.posture = Some(posture);
        state.angles = Some(angles);
    }

    fn save_snapshot(&self, frame: &CameraFrame) {
        let Some(writer) = self.snapshot_writer.clone() else {
            return;
        };

        let frame = frame.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = writer.save(&frame) {
                warn!("Snapshot failed: {}", e);
            }
        });
    }

    /// End the loop but keep the session exportable
    ///
    /// Running out of input is a normal end; anything else is kept as `last_error`.
    async fn finish(&self, e: PostureError) {
        let mut state = self.state.lock().await;
        match &e {
            PostureError::EndOfInput(reason) => info!("Detection loop finished: {}", reason),
            _ => {
                error!("Detection loop stopped: {}", e);
                state.last_error = Some(e.to_string());
            }
        }
        state.status = SessionStatus::Stopped;
        self.publish(&state);
    }

    /// Inference can be slow, keep it off the async workers
    async fn infer(&self, frame: CameraFrame) -> (CameraFrame, PostureResult<Option<LandmarkFrame>>) {
        let estimator = self.pose_estimator.clone();
        let frame = Arc::new(frame);
        let input = frame.clone();
        let result = tokio::task::spawn_blocking(move || estimator.infer(&input))
            .await
            .unwrap_or_else(|e| {
                Err(PostureError::CollaboratorUnavailable(format!(
                    "Pose estimator task failed: {}",
                    e
                )))
            });
        let frame = Arc::try_unwrap(frame).unwrap_or_else(|shared| (*shared).clone());
        (frame, result)
    }

    async fn detection_loop(self: Arc<Self>) {
        loop {
            if !self.state.lock().await.status.is_active() {
                break;
            }

            let frame = match self.frame_source.next_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    self.finish(e).await;
                    break;
                }
            };

            let (frame, inferred) = self.infer(frame).await;
            let landmarks = match inferred {
                Ok(Some(landmarks)) => landmarks,
                Ok(None) => {
                    tokio::task::yield_now().await;
                    continue;
                }
                Err(e) => {
                    self.finish(e).await;
                    break;
                }
            };

            {
                let mut state = self.state.lock().await;
                match state.status {
                    SessionStatus::Running => {
                        self.process_frame(&mut state, &landmarks, &frame);
                        self.publish(&state);
                    }
                    SessionStatus::Paused => {}
                    SessionStatus::Idle | SessionStatus::Stopped => break,
                }
            }

            tokio::task::yield_now().await;
        }

        debug!("Detection loop exited");
    }
}

// ==============================================================================
// Posture Monitor
// ==============================================================================

pub struct PostureMonitor {
    shared: Arc<Shared>,
    session_log: Arc<dyn SessionLogWriter>,
    report_generator: Arc<dyn ReportGenerator>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PostureMonitor {
    pub fn new(config: &Config, collaborators: Collaborators) -> PostureResult<Self> {
        config
            .validate()
            .map_err(|e| PostureError::InvalidConfig(e.to_string()))?;

        let dispatcher = AlertDispatcher::new(
            MessageCatalog {
                suggestions: config.suggestions.clone(),
                quotes: config.quotes.clone(),
            },
            config.alert_clip.clone(),
            collaborators.speech,
            collaborators.sound,
            AlertDispatcher::rng_from_seed(config.rng_seed),
        )
        .with_speech_min_interval(Duration::from_millis(config.speech_min_interval_ms));

        let state = SessionState::new();
        let (updates, _) = watch::channel(state.snapshot());

        let shared = Shared {
            state: Mutex::new(state),
            frame_source: collaborators.frame_source,
            pose_estimator: collaborators.pose_estimator,
            snapshot_writer: collaborators.snapshot_writer,
            extractor: AngleExtractor::new(config.body_side, config.min_landmark_visibility),
            classifier: PostureClassifier::new(config.neck_threshold_deg, config.torso_threshold_deg),
            dispatcher,
            updates,
        };

        Ok(Self {
            shared: Arc::new(shared),
            session_log: collaborators.session_log,
            report_generator: collaborators.report_generator,
            worker: Mutex::new(None),
        })
    }

    /// Receive every published state change
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Latest published state
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.shared.updates.borrow().clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.state.lock().await.status
    }

    /// Reset the counters and launch the detection worker
    pub async fn start(&self) -> PostureResult<()> {
        let mut worker = self.worker.lock().await;
        let mut state = self.shared.state.lock().await;
        if state.status.is_active() {
            return Err(PostureError::AlreadyRunning);
        }

        if let Err(e) = self.shared.frame_source.open().await {
            error!("Cannot start posture session: {}", e);
            return Err(match e {
                PostureError::CollaboratorUnavailable(_) => e,
                other => PostureError::CollaboratorUnavailable(other.to_string()),
            });
        }

        // A worker from the previous session has already seen STOPPED
        if let Some(previous) = worker.take() {
            previous.abort();
        }

        state.reset();
        state.status = SessionStatus::Running;
        self.shared.publish(&state);
        info!(
            "Started posture session {} using {}",
            state.aggregator.session_id(),
            self.shared.pose_estimator.get_model_info()
        );
        drop(state);

        *worker = Some(tokio::spawn(self.shared.clone().detection_loop()));
        Ok(())
    }

    pub async fn pause(&self) -> PostureResult<()> {
        self.transition("pause", SessionStatus::Running, SessionStatus::Paused)
            .await
    }

    pub async fn resume(&self) -> PostureResult<()> {
        self.transition("resume", SessionStatus::Paused, SessionStatus::Running)
            .await
    }

    /// Pause when running, resume when paused
    pub async fn toggle_pause(&self) -> PostureResult<SessionStatus> {
        let mut state = self.shared.state.lock().await;
        state.status = match state.status {
            SessionStatus::Running => SessionStatus::Paused,
            SessionStatus::Paused => SessionStatus::Running,
            other => {
                return Err(PostureError::InvalidTransition {
                    from: other.to_string(),
                    command: "toggle pause",
                })
            }
        };
        info!("Posture session {}", state.status.to_string());
        self.shared.publish(&state);
        Ok(state.status)
    }

    async fn transition(
        &self,
        command: &'static str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> PostureResult<()> {
        let mut state = self.shared.state.lock().await;
        if state.status != from {
            return Err(PostureError::InvalidTransition {
                from: state.status.to_string(),
                command,
            });
        }
        state.status = to;
        info!("Posture session {}", to.to_string());
        self.shared.publish(&state);
        Ok(())
    }

    /// Stop the worker, then export the session if any frame was classified
    pub async fn stop(&self) -> PostureResult<StopReport> {
        let mut worker = self.worker.lock().await;

        let previous = {
            let mut state = self.shared.state.lock().await;
            let previous = state.status;
            state.status = SessionStatus::Stopped;
            self.shared.publish(&state);
            previous
        };

        if previous == SessionStatus::Idle {
            return Ok(StopReport::NothingToReport);
        }

        // The worker checks the status once per iteration
        if let Some(handle) = worker.take() {
            if let Err(e) = handle.await {
                warn!("Detection worker ended abnormally: {}", e);
            }
        }
        self.shared.frame_source.close().await;

        let mut state = self.shared.state.lock().await;
        let report = state.aggregator.export(
            Utc::now(),
            self.session_log.as_ref(),
            self.report_generator.as_ref(),
        );
        if let StopReport::ExportFailed { errors, .. } = &report {
            state.last_error = Some(errors.join("; "));
        }
        state.tip = None;
        self.shared.publish(&state);
        info!("Stopped posture session {}", state.aggregator.session_id());

        Ok(report)
    }
}
