// src/controller.rs
//
// Camera session lifecycle and the frame loop.
//
// The device handle lives inside the session state, behind one lock. That
// lock is taken for start, stop, and every device read, and is released
// before any pixel processing. The loop re-checks the state once per frame,
// so a stop from another thread is observed within one frame. A loop is bound
// to the generation of the session it claimed; a restart is a new session.

use crate::error::SessionError;
use crate::pipeline::{FrameReport, MetricsSummary, SessionMetrics, TargetTracker};
use crate::detection::SegmenterConfig;
use crate::types::Frame;
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

// ============================================================================
// COLLABORATORS
// ============================================================================

/// An open capture device.
pub trait FrameSource: Send {
    fn read_frame(&mut self) -> Result<Frame, SessionError>;
}

/// Opens the capture device for a new session.
pub trait DeviceOpener: Send + Sync {
    type Source: FrameSource;

    fn open(&self) -> Result<Self::Source, SessionError>;
}

/// Receives every processed frame (rendering, streaming, logging).
pub trait FrameSink {
    fn on_frame(&mut self, frame: &Frame, report: &FrameReport);
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame, &FrameReport),
{
    fn on_frame(&mut self, frame: &Frame, report: &FrameReport) {
        self(frame, report)
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// An open device plus the identity of the session that opened it.
struct ActiveSession<S> {
    source: S,
    generation: u64,
    /// A `run` loop is driving this session
    claimed: bool,
}

enum SessionState<S> {
    Idle,
    Active(ActiveSession<S>),
}

struct Session<S> {
    state: SessionState<S>,
    /// Bumped on every successful start
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running; nothing changed.
    AlreadyActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyIdle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Stopped,
    FrameReadFailure(String),
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub end: SessionEnd,
    pub metrics: MetricsSummary,
}

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct FrameController<O: DeviceOpener> {
    opener: O,
    session: Mutex<Session<O::Source>>,
    segmenter_config: SegmenterConfig,
}

impl<O: DeviceOpener> FrameController<O> {
    pub fn new(opener: O) -> Self {
        Self::with_segmenter(opener, SegmenterConfig::default())
    }

    pub fn with_segmenter(opener: O, segmenter_config: SegmenterConfig) -> Self {
        Self {
            opener,
            session: Mutex::new(Session {
                state: SessionState::Idle,
                generation: 0,
            }),
            segmenter_config,
        }
    }

    /// Open the device and go active. Idempotent while a session runs.
    pub fn start(&self) -> Result<StartOutcome, SessionError> {
        let mut session = self.session.lock();
        if let SessionState::Active(_) = session.state {
            debug!("Start requested while active, ignoring");
            return Ok(StartOutcome::AlreadyActive);
        }

        match self.opener.open() {
            Ok(source) => {
                session.generation += 1;
                let generation = session.generation;
                session.state = SessionState::Active(ActiveSession {
                    source,
                    generation,
                    claimed: false,
                });
                info!("Camera session {} started", generation);
                Ok(StartOutcome::Started)
            }
            Err(e) => {
                warn!("Camera session not started: {}", e);
                Err(e)
            }
        }
    }

    /// Release the device and go idle.
    pub fn stop(&self) -> StopOutcome {
        let mut session = self.session.lock();
        match std::mem::replace(&mut session.state, SessionState::Idle) {
            SessionState::Active(active) => {
                info!("Camera session {} stopped", active.generation);
                drop(active);
                StopOutcome::Stopped
            }
            SessionState::Idle => StopOutcome::AlreadyIdle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.session.lock().state, SessionState::Active(_))
    }

    /// Drive the active session until it is stopped or a read fails.
    ///
    /// Each session starts with an empty history and is driven by at most
    /// one loop. The loop ends as soon as the session it claimed is gone,
    /// even if another session has been started in the meantime.
    pub fn run<K: FrameSink>(&self, sink: &mut K) -> Result<SessionSummary, SessionError> {
        let generation = self.claim()?;

        let mut tracker = TargetTracker::new(self.segmenter_config.clone());
        let metrics = SessionMetrics::new();

        let end = loop {
            let frame = match self.next_frame(generation) {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => break SessionEnd::FrameReadFailure(e.to_string()),
                None => break SessionEnd::Stopped,
            };

            let started = Instant::now();
            let report = tracker.process_frame(&frame);
            metrics.record(report.status(), started.elapsed().as_micros() as u64);

            sink.on_frame(&frame, &report);
        };

        let summary = SessionSummary {
            frames_processed: tracker.frame_count(),
            end,
            metrics: metrics.summary(),
        };
        info!(
            "Session {} ended ({:?}) after {} frames, {} with target, {} collision-course, {:.1} FPS",
            generation,
            summary.end,
            summary.frames_processed,
            summary.metrics.frames_with_target,
            summary.metrics.collision_course_frames,
            summary.metrics.fps
        );
        Ok(summary)
    }

    /// Mark the active session as driven and return its generation.
    fn claim(&self) -> Result<u64, SessionError> {
        let mut session = self.session.lock();
        match &mut session.state {
            SessionState::Idle => Err(SessionError::NotActive),
            SessionState::Active(active) if active.claimed => Err(SessionError::AlreadyRunning),
            SessionState::Active(active) => {
                active.claimed = true;
                Ok(active.generation)
            }
        }
    }

    /// Read under the session lock. `None` once the claimed session is no
    /// longer the active one. A failed read ends the session before returning.
    fn next_frame(&self, generation: u64) -> Option<Result<Frame, SessionError>> {
        let mut session = self.session.lock();
        let SessionState::Active(active) = &mut session.state else {
            return None;
        };
        if active.generation != generation {
            return None;
        }

        match active.source.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(e) => {
                warn!("{}; releasing camera", e);
                session.state = SessionState::Idle;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TrackingStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    /// Counts opens and live handles; yields `frames` frames then fails,
    /// or runs forever when `frames` is None.
    struct ScriptedOpener {
        available: bool,
        frames: Option<usize>,
        opened: Arc<AtomicUsize>,
        live: Arc<AtomicUsize>,
    }

    impl ScriptedOpener {
        fn new(frames: Option<usize>) -> Self {
            Self {
                available: true,
                frames,
                opened: Arc::new(AtomicUsize::new(0)),
                live: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct ScriptedSource {
        remaining: Option<usize>,
        live: Arc<AtomicUsize>,
    }

    impl Drop for ScriptedSource {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl FrameSource for ScriptedSource {
        fn read_frame(&mut self) -> Result<Frame, SessionError> {
            match &mut self.remaining {
                Some(0) => Err(SessionError::FrameReadFailure("device unplugged".into())),
                Some(n) => {
                    *n -= 1;
                    Ok(Frame::filled(32, 24, [90, 90, 90]))
                }
                None => {
                    thread::sleep(Duration::from_millis(1));
                    Ok(Frame::filled(32, 24, [90, 90, 90]))
                }
            }
        }
    }

    impl DeviceOpener for ScriptedOpener {
        type Source = ScriptedSource;

        fn open(&self) -> Result<ScriptedSource, SessionError> {
            if !self.available {
                return Err(SessionError::DeviceUnavailable("no camera at index 0".into()));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(ScriptedSource {
                remaining: self.frames,
                live: self.live.clone(),
            })
        }
    }

    #[test]
    fn test_start_is_idempotent() {
        let opener = ScriptedOpener::new(None);
        let opened = opener.opened.clone();
        let live = opener.live.clone();
        let controller = FrameController::new(opener);

        assert_eq!(controller.start(), Ok(StartOutcome::Started));
        assert_eq!(controller.start(), Ok(StartOutcome::AlreadyActive));
        assert!(controller.is_active());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert_eq!(controller.stop(), StopOutcome::AlreadyIdle);
    }

    #[test]
    fn test_device_unavailable_leaves_idle() {
        let mut opener = ScriptedOpener::new(None);
        opener.available = false;
        let controller = FrameController::new(opener);

        assert!(matches!(
            controller.start(),
            Err(SessionError::DeviceUnavailable(_))
        ));
        assert!(!controller.is_active());
    }

    #[test]
    fn test_run_without_session_is_rejected() {
        let controller = FrameController::new(ScriptedOpener::new(Some(3)));
        let mut sink = |_: &Frame, _: &FrameReport| {};
        assert_eq!(controller.run(&mut sink).unwrap_err(), SessionError::NotActive);
    }

    #[test]
    fn test_read_failure_ends_session_and_releases_device() {
        let opener = ScriptedOpener::new(Some(5));
        let live = opener.live.clone();
        let controller = FrameController::new(opener);
        controller.start().unwrap();

        let mut seen = Vec::new();
        let mut sink = |_: &Frame, report: &FrameReport| seen.push(report.status());
        let summary = controller.run(&mut sink).unwrap();

        assert_eq!(summary.frames_processed, 5);
        assert!(matches!(summary.end, SessionEnd::FrameReadFailure(_)));
        assert_eq!(summary.metrics.total_frames, 5);
        assert_eq!(seen, vec![TrackingStatus::Scanning; 5]);
        assert!(!controller.is_active());
        assert_eq!(live.load(Ordering::SeqCst), 0);

        // Not restarted automatically, but a new session can be started
        assert_eq!(controller.start(), Ok(StartOutcome::Started));
    }

    #[test]
    fn test_stop_from_another_thread_ends_loop() {
        let opener = ScriptedOpener::new(None);
        let live = opener.live.clone();
        let controller = Arc::new(FrameController::new(opener));
        controller.start().unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let controller = controller.clone();
            thread::spawn(move || {
                let mut sink = |_: &Frame, report: &FrameReport| {
                    let _ = tx.send(report.frame_id);
                };
                controller.run(&mut sink)
            })
        };

        // Let a few frames through, then stop from this thread
        for _ in 0..3 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(controller.stop(), StopOutcome::Stopped);

        let summary = worker.join().unwrap().unwrap();
        assert_eq!(summary.end, SessionEnd::Stopped);
        assert!(summary.frames_processed >= 3);
        assert!(!controller.is_active());
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_restart_between_frames_ends_old_loop() {
        let opener = ScriptedOpener::new(None);
        let opened = opener.opened.clone();
        let live = opener.live.clone();
        let controller = FrameController::new(opener);
        controller.start().unwrap();

        // Stop and immediately restart from inside the frame callback
        let mut ids = Vec::new();
        let mut sink = |_: &Frame, report: &FrameReport| {
            ids.push(report.frame_id);
            if report.frame_id == 3 {
                controller.stop();
                controller.start().unwrap();
            }
            if report.frame_id == 6 {
                controller.stop();
            }
        };
        let summary = controller.run(&mut sink).unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(summary.frames_processed, 3);
        assert_eq!(summary.end, SessionEnd::Stopped);
        assert_eq!(opened.load(Ordering::SeqCst), 2);

        // The new session is untouched and gets its own loop and history
        assert!(controller.is_active());
        assert_eq!(live.load(Ordering::SeqCst), 1);
        let mut ids = Vec::new();
        let mut sink = |_: &Frame, report: &FrameReport| {
            ids.push(report.frame_id);
            if report.frame_id == 2 {
                controller.stop();
            }
        };
        controller.run(&mut sink).unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_second_concurrent_run_is_rejected() {
        let controller = Arc::new(FrameController::new(ScriptedOpener::new(None)));
        controller.start().unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let controller = controller.clone();
            thread::spawn(move || {
                let mut sink = |_: &Frame, report: &FrameReport| {
                    let _ = tx.send(report.frame_id);
                };
                controller.run(&mut sink)
            })
        };
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let mut sink = |_: &Frame, _: &FrameReport| {};
        assert_eq!(
            controller.run(&mut sink).unwrap_err(),
            SessionError::AlreadyRunning
        );
        // The first loop is unaffected
        assert!(controller.is_active());

        controller.stop();
        let summary = worker.join().unwrap().unwrap();
        assert_eq!(summary.end, SessionEnd::Stopped);
    }

    #[test]
    fn test_each_session_starts_with_fresh_history() {
        let controller = FrameController::new(ScriptedOpener::new(Some(2)));
        for _ in 0..2 {
            controller.start().unwrap();
            let mut ids = Vec::new();
            let mut sink = |_: &Frame, report: &FrameReport| ids.push(report.frame_id);
            controller.run(&mut sink).unwrap();
            assert_eq!(ids, vec![1, 2]);
        }
    }
}
