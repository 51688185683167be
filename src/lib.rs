// src/lib.rs
//
// Real-time colored-target tracking with collision-course detection.

pub mod analysis;
pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod recorder;
pub mod types;

#[cfg(feature = "camera")]
pub mod video_processor;

pub use controller::{FrameController, SessionEnd, SessionSummary, StartOutcome, StopOutcome};
pub use error::SessionError;
pub use pipeline::{FrameReport, TargetTracker};
pub use types::{Config, Frame, Point, Sample};
