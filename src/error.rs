//! Device-level failures of a tracking session.
//!
//! Per-frame data conditions (no target, short history) are not errors and
//! never surface here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The capture device could not be opened; the session did not start.
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A read from an open device failed; the session ends.
    #[error("Frame read failed: {0}")]
    FrameReadFailure(String),

    /// `run` was called without an active session.
    #[error("No active session")]
    NotActive,

    /// `run` was called while another loop already drives the session.
    #[error("Session is already being run")]
    AlreadyRunning,
}
