// Spoken and audible feedback for bad posture
//
// Speech and sound run on tokio's blocking pool so the detection loop
// never waits on them. Sound is single-flight: a trigger arriving while a
// clip is still playing is dropped.

use crate::models::session::AlertEvent;
use crate::platform::audio::{SoundPlayer, SpeechEngine};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Message catalogs the dispatcher picks from
#[derive(Debug, Clone, PartialEq)]
pub struct MessageCatalog {
    pub suggestions: Vec<String>,
    pub quotes: Vec<String>,
}

/// What a single bad-frame trigger actually set in motion
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub event: AlertEvent,
    pub speech_requested: bool,
    pub sound_requested: bool,
}

pub struct AlertDispatcher {
    catalog: MessageCatalog,
    alert_clip: String,
    speech: Arc<dyn SpeechEngine>,
    sound: Arc<dyn SoundPlayer>,
    rng: Mutex<StdRng>,
    sound_slot: Arc<Semaphore>,
    speech_min_interval: Duration,
    last_speech: Mutex<Option<DateTime<Utc>>>,
}

impl AlertDispatcher {
    pub fn new(
        catalog: MessageCatalog,
        alert_clip: impl Into<String>,
        speech: Arc<dyn SpeechEngine>,
        sound: Arc<dyn SoundPlayer>,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            alert_clip: alert_clip.into(),
            speech,
            sound,
            rng: Mutex::new(rng),
            sound_slot: Arc::new(Semaphore::new(1)),
            speech_min_interval: Duration::ZERO,
            last_speech: Mutex::new(None),
        }
    }

    /// Seeded when `seed` is given, otherwise seeded from OS entropy
    pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Skip speech requests that arrive sooner than `interval` after the last one
    pub fn with_speech_min_interval(mut self, interval: Duration) -> Self {
        self.speech_min_interval = interval;
        self
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn choose(&self, messages: &[String]) -> Option<String> {
        let mut rng = Self::lock(&self.rng);
        messages.choose(&mut *rng).cloned()
    }

    /// Uniformly random suggestion from the catalog
    pub fn select_suggestion(&self) -> String {
        self.choose(&self.catalog.suggestions).unwrap_or_default()
    }

    /// Uniformly random quote, shown as the tip on good frames
    pub fn select_quote(&self) -> String {
        self.choose(&self.catalog.quotes).unwrap_or_default()
    }

    /// True while an alert clip is playing
    pub fn sound_in_flight(&self) -> bool {
        self.sound_slot.available_permits() == 0
    }

    /// React to one bad frame: pick a suggestion, speak it, play the alert
    ///
    /// Must be called from within a tokio runtime. Returns immediately.
    pub fn on_bad_frame(&self, timestamp: DateTime<Utc>) -> DispatchOutcome {
        let event = AlertEvent {
            message: self.select_suggestion(),
            timestamp,
        };

        let speech_requested = self.request_speech(&event);
        let sound_requested = self.request_sound();

        DispatchOutcome {
            event,
            speech_requested,
            sound_requested,
        }
    }

    fn request_speech(&self, event: &AlertEvent) -> bool {
        if !self.speech_min_interval.is_zero() {
            let mut last = Self::lock(&self.last_speech);
            if let Some(previous) = *last {
                let elapsed = (event.timestamp - previous).to_std().unwrap_or(Duration::ZERO);
                if elapsed < self.speech_min_interval {
                    debug!("Speech debounced: {:?} since last suggestion", elapsed);
                    return false;
                }
            }
            *last = Some(event.timestamp);
        }

        let speech = self.speech.clone();
        let message = event.message.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = speech.speak(&message) {
                warn!("Text-to-speech failed: {}", e);
            }
        });

        true
    }

    fn request_sound(&self) -> bool {
        let permit = match self.sound_slot.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("Sound alert already playing, trigger dropped");
                return false;
            }
        };

        let sound = self.sound.clone();
        let clip = self.alert_clip.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = sound.play(&clip) {
                warn!("Sound alert failed: {}", e);
            }
            drop(permit);
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::{PostureError, PostureResult};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSpeech {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechEngine for CountingSpeech {
        fn speak(&self, text: &str) -> PostureResult<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    /// Sound player that holds each clip for a while and tracks overlap
    #[derive(Default)]
    struct SlowSound {
        active: AtomicUsize,
        max_active: AtomicUsize,
        plays: AtomicUsize,
    }

    impl SoundPlayer for SlowSound {
        fn play(&self, _clip_id: &str) -> PostureResult<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            self.plays.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingFeedback;

    impl SpeechEngine for FailingFeedback {
        fn speak(&self, _text: &str) -> PostureResult<()> {
            Err(PostureError::SideEffectFailure("no voice".to_string()))
        }
    }

    impl SoundPlayer for FailingFeedback {
        fn play(&self, _clip_id: &str) -> PostureResult<()> {
            Err(PostureError::SideEffectFailure("no device".to_string()))
        }
    }

    fn catalog() -> MessageCatalog {
        MessageCatalog {
            suggestions: crate::core::config::DEFAULT_SUGGESTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quotes: crate::core::config::DEFAULT_QUOTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_burst_plays_one_sound_at_a_time() {
        let speech = Arc::new(CountingSpeech::default());
        let sound = Arc::new(SlowSound::default());
        let dispatcher = Arc::new(AlertDispatcher::new(
            catalog(),
            "alert.mp3",
            speech.clone(),
            sound.clone(),
            AlertDispatcher::rng_from_seed(Some(1)),
        ));

        // Fire 50 bad frames from several tasks at once
        let mut handles = Vec::new();
        for _ in 0..5 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                let mut requested = 0;
                for _ in 0..10 {
                    if dispatcher.on_bad_frame(Utc::now()).sound_requested {
                        requested += 1;
                    }
                }
                requested
            }));
        }

        let mut sound_requested = 0;
        for handle in handles {
            sound_requested += handle.await.unwrap();
        }

        wait_until(|| speech.spoken.lock().unwrap().len() == 50).await;
        wait_until(|| !dispatcher.sound_in_flight()).await;

        assert_eq!(speech.spoken.lock().unwrap().len(), 50);
        assert_eq!(sound.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(sound.plays.load(Ordering::SeqCst), sound_requested);
        assert!(sound_requested >= 1);
        assert!(sound_requested < 50, "burst should drop overlapping sound triggers");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sound_available_again_after_playback() {
        let sound = Arc::new(SlowSound::default());
        let dispatcher = AlertDispatcher::new(
            catalog(),
            "alert.mp3",
            Arc::new(CountingSpeech::default()),
            sound.clone(),
            AlertDispatcher::rng_from_seed(Some(2)),
        );

        assert!(dispatcher.on_bad_frame(Utc::now()).sound_requested);
        assert!(!dispatcher.on_bad_frame(Utc::now()).sound_requested);

        wait_until(|| !dispatcher.sound_in_flight()).await;
        assert!(dispatcher.on_bad_frame(Utc::now()).sound_requested);
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let make = || {
            AlertDispatcher::new(
                catalog(),
                "alert.mp3",
                Arc::new(CountingSpeech::default()),
                Arc::new(crate::platform::audio::Silent),
                AlertDispatcher::rng_from_seed(Some(42)),
            )
        };

        let first: Vec<String> = {
            let d = make();
            (0..20).map(|_| d.select_suggestion()).collect()
        };
        let second: Vec<String> = {
            let d = make();
            (0..20).map(|_| d.select_suggestion()).collect()
        };

        assert_eq!(first, second);
        let known: HashSet<String> = catalog().suggestions.into_iter().collect();
        assert!(first.iter().all(|s| known.contains(s)));
    }

    #[tokio::test]
    async fn test_speech_debounce() {
        let speech = Arc::new(CountingSpeech::default());
        let dispatcher = AlertDispatcher::new(
            catalog(),
            "alert.mp3",
            speech.clone(),
            Arc::new(crate::platform::audio::Silent),
            AlertDispatcher::rng_from_seed(Some(3)),
        )
        .with_speech_min_interval(Duration::from_secs(2));

        let start = Utc::now();
        assert!(dispatcher.on_bad_frame(start).speech_requested);
        assert!(!dispatcher.on_bad_frame(start + chrono::Duration::milliseconds(500)).speech_requested);
        assert!(dispatcher.on_bad_frame(start + chrono::Duration::seconds(3)).speech_requested);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_feedback_failures_are_absorbed() {
        let dispatcher = AlertDispatcher::new(
            catalog(),
            "alert.mp3",
            Arc::new(FailingFeedback),
            Arc::new(FailingFeedback),
            AlertDispatcher::rng_from_seed(Some(4)),
        );

        let outcome = dispatcher.on_bad_frame(Utc::now());
        assert!(outcome.speech_requested);
        assert!(outcome.sound_requested);
        assert!(!outcome.event.message.is_empty());

        // Permit is released even though playback failed
        wait_until(|| !dispatcher.sound_in_flight()).await;
        assert!(!dispatcher.sound_in_flight());
    }
}
