// src/pipeline/frame_context.rs
//
// Everything the pipeline concluded about one frame. Rendering and the
// delivery layer read from this; nothing flows back into the pipeline.

use crate::analysis::{
    Decision, DepthTrend, DynamicsEstimate, MotionDirection, Prediction, TrackingStatus,
};
use crate::types::{Point, Sample};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_id: u64,
    pub timestamp_ms: f64,
    pub frame_center: Point,

    pub sample: Option<Sample>,
    pub dynamics: Option<DynamicsEstimate>,
    pub prediction: Option<Prediction>,
    pub decision: Decision,

    // Telemetry
    pub depth: Option<DepthTrend>,
    pub motion: Option<MotionDirection>,

    /// History positions, newest first
    pub trail: Vec<Point>,
    pub history_len: usize,
}

impl FrameReport {
    pub fn status(&self) -> TrackingStatus {
        self.decision.status
    }

    pub fn has_target(&self) -> bool {
        self.sample.is_some()
    }

    /// `V: <motion> | Z: <depth>` or `NO TARGET`
    pub fn vector_text(&self) -> String {
        match (self.motion, self.depth) {
            (Some(motion), Some(depth)) => format!("V: {} | Z: {}", motion, depth.as_str()),
            _ => "NO TARGET".to_string(),
        }
    }
}
