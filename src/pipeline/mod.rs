// src/pipeline/mod.rs

pub mod frame_context;
pub mod metrics;
pub mod tracker;

pub use frame_context::FrameReport;
pub use metrics::{MetricsSummary, SessionMetrics};
pub use tracker::TargetTracker;
