//! Per-session synthetic telemetry producer.
//!
//! Each active session owns one tokio task that emits a sample every second into a
//! bounded ring buffer (and, when a store is configured, into the durable append-only
//! log). Tasks are keyed by session id and cancelled through a `CancellationToken`;
//! dropping the simulator cancels every task it spawned.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::telemetry::{GazeDirection, HeadPose, TelemetrySample};
use crate::stats::round_to;
use crate::store::FileStore;

/// Samples kept in memory per session; the oldest is evicted first.
pub const WINDOW_CAPACITY: usize = 1000;
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

const EYE_BASELINE_START: f64 = 75.0;
const EYE_BASELINE_RANGE: (f64, f64) = (60.0, 95.0);
const EYE_JITTER: f64 = 15.0;
const EYE_DRIFT: f64 = 2.0;

const FACE_BASELINE_START: f64 = 85.0;
const FACE_BASELINE_RANGE: (f64, f64) = (75.0, 100.0);
const FACE_JITTER: f64 = 10.0;
const FACE_DRIFT: f64 = 1.0;

const YAW_RANGE: f64 = 20.0;
const PITCH_RANGE: f64 = 10.0;
/// Degrees mapped to a gaze component of 1.0.
const GAZE_NORMALIZER: f64 = 30.0;
const BLINK_PROBABILITY: f64 = 0.1;

/// Random-walk generator for one session's samples.
///
/// Scores are jittered around slowly drifting baselines; head pose is drawn
/// independently each tick. Timestamps never go backwards even if the wall clock does.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    eye_baseline: f64,
    face_baseline: f64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self {
            eye_baseline: EYE_BASELINE_START,
            face_baseline: FACE_BASELINE_START,
            last_timestamp: None,
        }
    }
}

impl SampleGenerator {
    pub fn next_sample<R: Rng>(&mut self, rng: &mut R, now: DateTime<Utc>) -> TelemetrySample {
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        let eye = (self.eye_baseline + rng.gen_range(-EYE_JITTER..=EYE_JITTER)).clamp(0.0, 100.0);
        let face =
            (self.face_baseline + rng.gen_range(-FACE_JITTER..=FACE_JITTER)).clamp(0.0, 100.0);
        let yaw = round_to(rng.gen_range(-YAW_RANGE..=YAW_RANGE), 1);
        let pitch = round_to(rng.gen_range(-PITCH_RANGE..=PITCH_RANGE), 1);
        let blink_detected = rng.gen_bool(BLINK_PROBABILITY);

        let sample = TelemetrySample {
            timestamp,
            eye_contact_score: round_to(eye, 1),
            face_visibility: round_to(face, 1),
            head_pose: HeadPose {
                yaw,
                pitch,
                roll: 0.0,
            },
            blink_detected,
            gaze_direction: GazeDirection {
                x: yaw / GAZE_NORMALIZER,
                y: pitch / GAZE_NORMALIZER,
            },
        };

        self.eye_baseline = (self.eye_baseline + rng.gen_range(-EYE_DRIFT..=EYE_DRIFT))
            .clamp(EYE_BASELINE_RANGE.0, EYE_BASELINE_RANGE.1);
        self.face_baseline = (self.face_baseline + rng.gen_range(-FACE_DRIFT..=FACE_DRIFT))
            .clamp(FACE_BASELINE_RANGE.0, FACE_BASELINE_RANGE.1);

        sample
    }
}

type SampleBuffer = Arc<Mutex<VecDeque<TelemetrySample>>>;

struct Feed {
    buffer: SampleBuffer,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns every session's sampling task and rolling window.
pub struct TelemetrySimulator {
    feeds: Mutex<HashMap<Uuid, Feed>>,
    store: Option<Arc<FileStore>>,
    root: CancellationToken,
    interval: Duration,
    capacity: usize,
}

impl TelemetrySimulator {
    /// Creates a simulator. When `store` is set every sample is also appended to the
    /// session's durable telemetry log.
    pub fn new(store: Option<Arc<FileStore>>) -> Self {
        Self::with_settings(store, SAMPLE_INTERVAL, WINDOW_CAPACITY)
    }

    pub fn with_settings(
        store: Option<Arc<FileStore>>,
        interval: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
            store,
            root: CancellationToken::new(),
            interval,
            capacity: capacity.max(1),
        }
    }

    /// Starts sampling for a session. Returns `false` if it was already running.
    pub async fn start(&self, session_id: Uuid) -> bool {
        let mut feeds = self.feeds.lock().await;
        if feeds.contains_key(&session_id) {
            debug!("Telemetry already running for session {session_id}");
            return false;
        }

        let buffer: SampleBuffer = Arc::new(Mutex::new(VecDeque::with_capacity(self.capacity)));
        let cancel = self.root.child_token();
        let handle = tokio::spawn(sample_loop(
            session_id,
            buffer.clone(),
            cancel.clone(),
            self.store.clone(),
            self.interval,
            self.capacity,
        ));

        feeds.insert(
            session_id,
            Feed {
                buffer,
                cancel,
                handle,
            },
        );
        info!("Telemetry started for session {session_id}");
        true
    }

    /// Stops sampling and releases the session's window. Returns `false` if nothing was running.
    pub async fn stop(&self, session_id: Uuid) -> bool {
        let feed = self.feeds.lock().await.remove(&session_id);
        let Some(feed) = feed else {
            return false;
        };

        feed.cancel.cancel();
        if let Err(e) = feed.handle.await {
            warn!("Telemetry task for session {session_id} ended abnormally: {e}");
        }
        info!("Telemetry stopped for session {session_id}");
        true
    }

    /// Cancels every running task and waits for them to finish.
    pub async fn shutdown(&self) {
        self.root.cancel();
        let feeds: Vec<_> = self.feeds.lock().await.drain().collect();
        for (session_id, feed) in feeds {
            if let Err(e) = feed.handle.await {
                warn!("Telemetry task for session {session_id} ended abnormally: {e}");
            }
        }
    }

    pub async fn is_running(&self, session_id: Uuid) -> bool {
        self.feeds.lock().await.contains_key(&session_id)
    }

    /// All samples no older than `max_age_secs`, oldest first.
    pub async fn recent_window(&self, session_id: Uuid, max_age_secs: i64) -> Vec<TelemetrySample> {
        let Some(buffer) = self.buffer(session_id).await else {
            return Vec::new();
        };
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_secs);
        let samples = buffer.lock().await;
        samples
            .iter()
            .filter(|s| s.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// The most recent `n` samples, oldest first.
    pub async fn latest(&self, session_id: Uuid, n: usize) -> Vec<TelemetrySample> {
        let Some(buffer) = self.buffer(session_id).await else {
            return Vec::new();
        };
        let samples = buffer.lock().await;
        let skip = samples.len().saturating_sub(n);
        samples.iter().skip(skip).cloned().collect()
    }

    async fn buffer(&self, session_id: Uuid) -> Option<SampleBuffer> {
        self.feeds
            .lock()
            .await
            .get(&session_id)
            .map(|f| f.buffer.clone())
    }
}

impl Drop for TelemetrySimulator {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

async fn sample_loop(
    session_id: Uuid,
    buffer: SampleBuffer,
    cancel: CancellationToken,
    store: Option<Arc<FileStore>>,
    interval: Duration,
    capacity: usize,
) {
    let mut rng = StdRng::from_entropy();
    let mut generator = SampleGenerator::default();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sample = generator.next_sample(&mut rng, Utc::now());
                {
                    let mut samples = buffer.lock().await;
                    if samples.len() >= capacity {
                        samples.pop_front();
                    }
                    samples.push_back(sample.clone());
                }

                if let Some(store) = &store {
                    if let Err(e) = store
                        .append_telemetry(session_id, std::slice::from_ref(&sample))
                        .await
                    {
                        warn!("Failed to append telemetry for session {session_id}: {e}");
                    }
                }
            }
            _ = cancel.cancelled() => {
                debug!("Telemetry loop for session {session_id} shutting down");
                break;
            }
        }
    }
}
