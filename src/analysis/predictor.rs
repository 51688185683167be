// src/analysis/predictor.rs

use super::dynamics::DynamicsEstimate;
use crate::config::{COLLISION_ZONE, PREDICTION_FRAMES};
use crate::types::{Point, Sample};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_point: Point,
    pub distance_to_center: f32,
    /// Extrapolated point falls inside the collision zone
    pub is_intercept: bool,
}

/// Constant-velocity extrapolation [`PREDICTION_FRAMES`] ahead, tested
/// against the collision disk around `center`.
pub fn predict(sample: &Sample, dynamics: &DynamicsEstimate, center: Point) -> Prediction {
    let predicted_point = Point::new(
        sample.position.x + dynamics.dx * PREDICTION_FRAMES,
        sample.position.y + dynamics.dy * PREDICTION_FRAMES,
    );
    let distance_to_center = predicted_point.distance_to(center);

    Prediction {
        predicted_point,
        distance_to_center,
        is_intercept: distance_to_center < COLLISION_ZONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(320, 240);

    fn dyn_xy(dx: i32, dy: i32) -> DynamicsEstimate {
        DynamicsEstimate {
            dx,
            dy,
            growth_rate: 0.0,
        }
    }

    #[test]
    fn test_stationary_target_at_center_intercepts() {
        let p = predict(&Sample::new(320, 240, 30.0), &dyn_xy(0, 0), CENTER);
        assert_eq!(p.predicted_point, CENTER);
        assert_eq!(p.distance_to_center, 0.0);
        assert!(p.is_intercept);
    }

    #[test]
    fn test_extrapolates_fifteen_frames() {
        let p = predict(&Sample::new(100, 100, 30.0), &dyn_xy(10, 6), CENTER);
        assert_eq!(p.predicted_point, Point::new(250, 190));
    }

    #[test]
    fn test_moving_into_zone_intercepts() {
        // 220px left of center, closing 12px/frame → lands 40px short
        let p = predict(&Sample::new(100, 240, 30.0), &dyn_xy(12, 0), CENTER);
        assert_eq!(p.predicted_point, Point::new(280, 240));
        assert!((p.distance_to_center - 40.0).abs() < 1e-6);
        assert!(p.is_intercept);
    }

    #[test]
    fn test_zone_boundary_is_exclusive() {
        let p = predict(&Sample::new(400, 240, 30.0), &dyn_xy(0, 0), CENTER);
        assert_eq!(p.distance_to_center, 80.0);
        assert!(!p.is_intercept);

        let p = predict(&Sample::new(399, 240, 30.0), &dyn_xy(0, 0), CENTER);
        assert!(p.is_intercept);
    }

    #[test]
    fn test_moving_away_misses() {
        let p = predict(&Sample::new(300, 240, 30.0), &dyn_xy(-10, 0), CENTER);
        assert_eq!(p.predicted_point, Point::new(150, 240));
        assert!(!p.is_intercept);
    }
}
