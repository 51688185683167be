// src/pipeline/metrics.rs
//
// Per-session counters. Shared handles so the delivery layer can read them
// while the frame loop is running.

use crate::analysis::TrackingStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_with_target: Arc<AtomicU64>,
    pub collision_course_frames: Arc<AtomicU64>,
    pub receding_intersect_frames: Arc<AtomicU64>,
    pub processing_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_with_target: Arc::new(AtomicU64::new(0)),
            collision_course_frames: Arc::new(AtomicU64::new(0)),
            receding_intersect_frames: Arc::new(AtomicU64::new(0)),
            processing_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    /// Count one processed frame by its outcome.
    pub fn record(&self, status: TrackingStatus, duration_us: u64) {
        self.inc(&self.total_frames);
        match status {
            TrackingStatus::Scanning => {}
            TrackingStatus::Tracking => self.inc(&self.frames_with_target),
            TrackingStatus::SafeRecedingIntersect => {
                self.inc(&self.frames_with_target);
                self.inc(&self.receding_intersect_frames);
            }
            TrackingStatus::CollisionCourse => {
                self.inc(&self.frames_with_target);
                self.inc(&self.collision_course_frames);
            }
        }
        self.set_timing(&self.processing_time_us, duration_us);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            frames_with_target: self.frames_with_target.load(Ordering::Relaxed),
            collision_course_frames: self.collision_course_frames.load(Ordering::Relaxed),
            receding_intersect_frames: self.receding_intersect_frames.load(Ordering::Relaxed),
            last_processing_us: self.processing_time_us.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_with_target: u64,
    pub collision_course_frames: u64,
    pub receding_intersect_frames: u64,
    pub last_processing_us: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_by_status() {
        let metrics = SessionMetrics::new();
        metrics.record(TrackingStatus::Scanning, 10);
        metrics.record(TrackingStatus::Tracking, 10);
        metrics.record(TrackingStatus::CollisionCourse, 10);
        metrics.record(TrackingStatus::SafeRecedingIntersect, 42);

        let s = metrics.summary();
        assert_eq!(s.total_frames, 4);
        assert_eq!(s.frames_with_target, 3);
        assert_eq!(s.collision_course_frames, 1);
        assert_eq!(s.receding_intersect_frames, 1);
        assert_eq!(s.last_processing_us, 42);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = SessionMetrics::new();
        let handle = metrics.clone();
        metrics.record(TrackingStatus::Tracking, 1);
        assert_eq!(handle.summary().total_frames, 1);
    }
}
