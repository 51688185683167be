use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

// ============================================================================
// TRACKING CONSTANTS
// ============================================================================
//
// Predictor and decision classifier share these; the collision semantics
// only hold when they move together.

/// History depth (position + radius pairs)
pub const BUFFER_SIZE: usize = 32;
/// Minimum history before dynamics are estimated
pub const MIN_HISTORY: usize = 10;
/// Consecutive sample pairs averaged for lateral/vertical velocity
pub const VELOCITY_WINDOW: usize = 9;
/// Samples averaged at each end of the history for growth rate
pub const GROWTH_WINDOW: usize = 5;
/// Frames of constant-velocity extrapolation
pub const PREDICTION_FRAMES: i32 = 15;
/// Radius (px) of the protected disk around the frame center
pub const COLLISION_ZONE: f32 = 80.0;
/// Radius delta that counts as approaching / receding
pub const GROWTH_THRESHOLD: f32 = 0.5;
/// Velocity (px/frame) below which an axis is considered still
pub const MOVEMENT_THRESHOLD: i32 = 2;
/// Enclosing radius (px) a region must exceed to be a target
pub const MIN_TARGET_RADIUS: f32 = 10.0;

/// Inclusive HSV bounds, 8-bit camera convention (H 0-180, S/V 0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Red wraps around the hue circle, so it needs both ends.
pub const TARGET_HUE_LOW: HsvRange = HsvRange::new([0, 120, 70], [10, 255, 255]);
pub const TARGET_HUE_HIGH: HsvRange = HsvRange::new([170, 120, 70], [180, 255, 255]);

// ============================================================================
// RUNTIME CONFIG FILE
// ============================================================================

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}
