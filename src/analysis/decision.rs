// src/analysis/decision.rs
//
// Avoidance decision: a pure function of (is_intercept, is_approaching),
// evaluated fresh every frame. No hidden state.
//
//   no target this frame          → SCANNING
//   intercept  &  approaching     → COLLISION_COURSE (+ evasion vector)
//   intercept  & !approaching     → SAFE_RECEDING_INTERSECT
//   !intercept                    → TRACKING
//
// Depth and motion labels below are telemetry only; they never feed the
// decision.

use super::dynamics::DynamicsEstimate;
use super::predictor::Prediction;
use crate::config::{GROWTH_THRESHOLD, MOVEMENT_THRESHOLD};
use serde::Serialize;
use std::fmt;

// ============================================================================
// STATUS + EVASION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    Scanning,
    Tracking,
    SafeRecedingIntersect,
    CollisionCourse,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Scanning => "SCANNING",
            TrackingStatus::Tracking => "TRACKING",
            TrackingStatus::SafeRecedingIntersect => "SAFE_RECEDING_INTERSECT",
            TrackingStatus::CollisionCourse => "COLLISION_COURSE",
        }
    }
}

/// Image-space axis directions, shared by evasion thrust and target drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vertical {
    Up,
    Down,
}

/// Steer opposite the target's approach vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evasion {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Evasion {
    pub fn away_from(dx: i32, dy: i32) -> Self {
        Self {
            horizontal: if dx < 0 {
                Horizontal::Right
            } else {
                Horizontal::Left
            },
            vertical: if dy < 0 {
                Vertical::Down
            } else {
                Vertical::Up
            },
        }
    }
}

impl fmt::Display for Evasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.horizontal {
            Horizontal::Left => "LEFT",
            Horizontal::Right => "RIGHT",
        };
        let v = match self.vertical {
            Vertical::Up => "UP",
            Vertical::Down => "DOWN",
        };
        write!(f, "{} & {}", h, v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub status: TrackingStatus,
    pub evasion: Option<Evasion>,
}

impl Decision {
    pub fn scanning() -> Self {
        Self {
            status: TrackingStatus::Scanning,
            evasion: None,
        }
    }

    pub fn is_collision_course(&self) -> bool {
        self.status == TrackingStatus::CollisionCourse
    }
}

pub fn is_approaching(growth_rate: f32) -> bool {
    growth_rate > GROWTH_THRESHOLD
}

/// Decision for a frame that has a target.
pub fn classify(is_intercept: bool, is_approaching: bool, dx: i32, dy: i32) -> Decision {
    match (is_intercept, is_approaching) {
        (true, true) => Decision {
            status: TrackingStatus::CollisionCourse,
            evasion: Some(Evasion::away_from(dx, dy)),
        },
        (true, false) => Decision {
            status: TrackingStatus::SafeRecedingIntersect,
            evasion: None,
        },
        (false, _) => Decision {
            status: TrackingStatus::Tracking,
            evasion: None,
        },
    }
}

/// Full decision for a frame; `None` means no target was detected.
pub fn decide(target: Option<(&Prediction, &DynamicsEstimate)>) -> Decision {
    match target {
        None => Decision::scanning(),
        Some((prediction, dynamics)) => classify(
            prediction.is_intercept,
            is_approaching(dynamics.growth_rate),
            dynamics.dx,
            dynamics.dy,
        ),
    }
}

// ============================================================================
// TELEMETRY LABELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DepthTrend {
    Stable,
    Approaching,
    Receding,
}

impl DepthTrend {
    pub fn from_growth(growth_rate: f32) -> Self {
        if growth_rate > GROWTH_THRESHOLD {
            DepthTrend::Approaching
        } else if growth_rate < -GROWTH_THRESHOLD {
            DepthTrend::Receding
        } else {
            DepthTrend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepthTrend::Stable => "STABLE",
            DepthTrend::Approaching => "APPROACHING",
            DepthTrend::Receding => "RECEDING",
        }
    }
}

/// Image-space drift direction of the target (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MotionDirection {
    pub horizontal: Option<Horizontal>,
    pub vertical: Option<Vertical>,
}

impl MotionDirection {
    pub fn from_velocity(dx: i32, dy: i32) -> Self {
        let horizontal = if dx > MOVEMENT_THRESHOLD {
            Some(Horizontal::Right)
        } else if dx < -MOVEMENT_THRESHOLD {
            Some(Horizontal::Left)
        } else {
            None
        };
        let vertical = if dy > MOVEMENT_THRESHOLD {
            Some(Vertical::Down)
        } else if dy < -MOVEMENT_THRESHOLD {
            Some(Vertical::Up)
        } else {
            None
        };
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

impl fmt::Display for MotionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.horizontal {
            Some(Horizontal::Left) => Some("LEFT"),
            Some(Horizontal::Right) => Some("RIGHT"),
            None => None,
        };
        let v = match self.vertical {
            Some(Vertical::Up) => Some("UP"),
            Some(Vertical::Down) => Some("DOWN"),
            None => None,
        };
        match (h, v) {
            (None, None) => write!(f, "STATIONARY"),
            (Some(h), None) => write!(f, "{}", h),
            (None, Some(v)) => write!(f, "{}", v),
            (Some(h), Some(v)) => write!(f, "{} {}", h, v),
        }
    }
}
