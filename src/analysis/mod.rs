// src/analysis/mod.rs
//
// Trajectory analysis over the target history.
//
// Signal flow:
//   Sample → history → dynamics ─┬→ predictor ─┐
//                                └─────────────┴→ decision → Decision
//
// Driven per frame by pipeline::tracker::TargetTracker.

pub mod decision;
pub mod dynamics;
pub mod history;
pub mod predictor;

// Re-exports for ergonomic access from the pipeline
pub use decision::{
    classify, decide, is_approaching, Decision, DepthTrend, Evasion, Horizontal,
    MotionDirection, TrackingStatus, Vertical,
};
pub use dynamics::{estimate_dynamics, DynamicsEstimate};
pub use history::HistoryBuffer;
pub use predictor::{predict, Prediction};
