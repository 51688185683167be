// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// RUNTIME CONFIGURATION (config.yaml)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device_index: i32,
    /// Flip frames horizontally so the feed behaves like a mirror
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub output_dir: String,
    pub save_annotated: bool,
    pub save_decisions: bool,
    pub fps: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            output_dir: "runs".to_string(),
            save_annotated: true,
            save_decisions: true,
            fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// FRAME DATA
// ============================================================================

/// One captured frame. Packed RGB, 3 bytes per pixel, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp_ms: f64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: usize, height: usize, timestamp_ms: f64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ms,
        }
    }

    /// Frame filled with a single RGB colour
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height, 0.0)
    }

    /// Pixel buffer length agrees with the dimensions
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width * self.height * 3
    }

    /// Geometric center, the viewer's boresight
    pub fn center(&self) -> Point {
        Point::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    #[inline]
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = (y * self.width + x) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }
}

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The tracked target reduced to a point and an apparent size for one frame.
/// Frames without a target carry `Option::<Sample>::None`, never a placeholder.
///
/// `position` is the area-weighted centroid and is what the trajectory is
/// built from. `outline_center` is the center of the enclosing circle of
/// radius `radius`; it only anchors the drawn outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Point,
    pub radius: f32,
    pub outline_center: Point,
}

impl Sample {
    /// Symmetric target: outline centered on the centroid
    pub fn new(x: i32, y: i32, radius: f32) -> Self {
        Self::with_outline(Point::new(x, y), radius, Point::new(x, y))
    }

    pub fn with_outline(position: Point, radius: f32, outline_center: Point) -> Self {
        Self {
            position,
            radius,
            outline_center,
        }
    }
}
