// src/pipeline/tracker.rs
//
// One pass per frame, strictly forward:
//   Frame → Mask → Sample → history → dynamics → prediction → decision
//
// The tracker is the only writer of the history buffer. A frame without a
// target leaves the history untouched so a brief dropout keeps the
// trajectory alive.

use super::frame_context::FrameReport;
use crate::analysis::{
    decide, estimate_dynamics, predict, DepthTrend, HistoryBuffer, MotionDirection,
    TrackingStatus,
};
use crate::detection::{select_target, Segmenter, SegmenterConfig};
use crate::types::{Frame, Point, Sample};
use tracing::{debug, info, warn};

pub struct TargetTracker {
    segmenter: Segmenter,
    history: HistoryBuffer,
    frame_count: u64,
    last_status: TrackingStatus,
}

impl TargetTracker {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            segmenter: Segmenter::new(config),
            history: HistoryBuffer::new(),
            frame_count: 0,
            last_status: TrackingStatus::Scanning,
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let mask = self.segmenter.segment(frame);
        let sample = select_target(&mask);
        self.process_detection(sample, frame.center(), frame.timestamp_ms)
    }

    /// Everything downstream of target selection.
    pub fn process_detection(
        &mut self,
        sample: Option<Sample>,
        frame_center: Point,
        timestamp_ms: f64,
    ) -> FrameReport {
        self.frame_count += 1;

        let mut report = FrameReport {
            frame_id: self.frame_count,
            timestamp_ms,
            frame_center,
            sample,
            dynamics: None,
            prediction: None,
            decision: decide(None),
            depth: None,
            motion: None,
            trail: Vec::new(),
            history_len: 0,
        };

        if let Some(sample) = sample {
            self.history.push(sample);
            let dynamics = estimate_dynamics(&self.history);
            let prediction = predict(&sample, &dynamics, frame_center);

            report.decision = decide(Some((&prediction, &dynamics)));
            report.depth = Some(DepthTrend::from_growth(dynamics.growth_rate));
            report.motion = Some(MotionDirection::from_velocity(dynamics.dx, dynamics.dy));
            report.dynamics = Some(dynamics);
            report.prediction = Some(prediction);
        }

        report.trail = self.history.positions().collect();
        report.history_len = self.history.len();

        self.log_transition(&report);
        report
    }

    fn log_transition(&mut self, report: &FrameReport) {
        let status = report.status();
        if status == self.last_status {
            return;
        }

        match (status, report.decision.evasion, report.prediction) {
            (TrackingStatus::CollisionCourse, Some(evasion), Some(prediction)) => warn!(
                "Frame {}: COLLISION COURSE, predicted {:.0}px from center, thrust {}",
                report.frame_id, prediction.distance_to_center, evasion
            ),
            (TrackingStatus::Scanning, ..) => info!(
                "Frame {}: target lost, scanning ({} samples held)",
                report.frame_id, report.history_len
            ),
            _ if self.last_status == TrackingStatus::Scanning => info!(
                "Frame {}: target acquired, {}",
                report.frame_id,
                status.as_str()
            ),
            _ => debug!(
                "Frame {}: {} → {}",
                report.frame_id,
                self.last_status.as_str(),
                status.as_str()
            ),
        }
        self.last_status = status;
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for TargetTracker {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}
