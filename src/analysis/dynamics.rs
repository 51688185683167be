// src/analysis/dynamics.rs
//
// Target motion from the history buffer.
//
// Lateral/vertical velocity is the mean of the 9 newest frame-to-frame
// displacements, truncated to whole pixels. Depth closure is read from
// apparent growth: mean radius of the 5 newest samples minus the mean of
// the 5 oldest samples currently held.
//
// The growth baseline is "as far back as the buffer reaches". While the
// buffer fills (10..32 samples) the lag between the two windows grows with
// it, so growth_rate is measured over a shorter span early in a track and
// settles at 27 frames of lag once the buffer is full.

use super::history::HistoryBuffer;
use crate::config::{GROWTH_WINDOW, MIN_HISTORY, VELOCITY_WINDOW};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DynamicsEstimate {
    /// Pixels per frame, positive = moving right
    pub dx: i32,
    /// Pixels per frame, positive = moving down
    pub dy: i32,
    /// Radius delta between the newest and oldest windows
    pub growth_rate: f32,
}

impl DynamicsEstimate {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Cold start returns the zero estimate until [`MIN_HISTORY`] samples exist.
pub fn estimate_dynamics(history: &HistoryBuffer) -> DynamicsEstimate {
    if history.len() < MIN_HISTORY {
        return DynamicsEstimate::zero();
    }

    let window: Vec<_> = history.newest(VELOCITY_WINDOW + 1).collect();
    let (dx_total, dy_total) = window.windows(2).fold((0i32, 0i32), |(sx, sy), pair| {
        let (now, prev) = (pair[0].position, pair[1].position);
        (sx + now.x - prev.x, sy + now.y - prev.y)
    });
    let steps = VELOCITY_WINDOW as i32;

    let r_now = mean_radius(history.newest(GROWTH_WINDOW).map(|s| s.radius));
    let r_old = mean_radius(history.oldest(GROWTH_WINDOW).map(|s| s.radius));

    DynamicsEstimate {
        dx: dx_total / steps,
        dy: dy_total / steps,
        growth_rate: r_now - r_old,
    }
}

fn mean_radius(radii: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = radii.fold((0.0f32, 0usize), |(s, n), r| (s + r, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    /// Buffer whose newest-first contents equal `samples`.
    fn history_from_newest(samples: &[Sample]) -> HistoryBuffer {
        let mut history = HistoryBuffer::new();
        for s in samples.iter().rev() {
            history.push(*s);
        }
        history
    }

    #[test]
    fn test_cold_start_is_zero_regardless_of_values() {
        for n in 0..MIN_HISTORY {
            let samples: Vec<Sample> = (0..n)
                .map(|i| Sample::new(i as i32 * 50, 1000 - i as i32 * 37, 10.0 + i as f32 * 9.0))
                .collect();
            let history = history_from_newest(&samples);
            assert_eq!(estimate_dynamics(&history), DynamicsEstimate::zero());
        }
    }

    #[test]
    fn test_constant_leftward_motion() {
        // Pushed in order (100,100), (90,100), ... (10,100): the latest is (10,100)
        let mut history = HistoryBuffer::new();
        for i in 0..10 {
            history.push(Sample::new(100 - 10 * i, 100, 20.0));
        }
        let est = estimate_dynamics(&history);
        assert_eq!(est.dx, -10);
        assert_eq!(est.dy, 0);
        assert_eq!(est.growth_rate, 0.0);
    }

    #[test]
    fn test_velocity_sign_follows_newest_minus_previous() {
        // Newest-first (100,20), (100,30), ... target moving up by 10/frame
        let samples: Vec<Sample> = (0..10)
            .map(|i| Sample::new(100, 20 + 10 * i, 20.0))
            .collect();
        let est = estimate_dynamics(&history_from_newest(&samples));
        assert_eq!(est.dx, 0);
        assert_eq!(est.dy, -10);
    }

    #[test]
    fn test_velocity_truncates_toward_zero() {
        // Total displacement -13 over 9 steps → -1.44 → -1
        let mut samples: Vec<Sample> = (0..10).map(|_| Sample::new(50, 50, 20.0)).collect();
        samples[0].position.x = 37;
        samples[0].position.y = 67; // +17 / 9 → 1
        let est = estimate_dynamics(&history_from_newest(&samples));
        assert_eq!(est.dx, -1);
        assert_eq!(est.dy, 1);
    }

    #[test]
    fn test_velocity_uses_only_nine_newest_steps() {
        // A huge jump between samples 10 and 11 must not leak into dx
        let mut samples: Vec<Sample> = (0..12).map(|i| Sample::new(200 - 2 * i, 0, 20.0)).collect();
        samples[10].position.x = -5000;
        samples[11].position.x = -5000;
        let est = estimate_dynamics(&history_from_newest(&samples));
        assert_eq!(est.dx, 2);
    }

    #[test]
    fn test_growth_newest_five_against_oldest_five() {
        let radii = [50.0, 50.0, 50.0, 50.0, 50.0, 40.0, 40.0, 40.0, 40.0, 40.0];
        let samples: Vec<Sample> = radii.iter().map(|&r| Sample::new(100, 100, r)).collect();
        let est = estimate_dynamics(&history_from_newest(&samples));
        assert!((est.growth_rate - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_growth_baseline_reaches_oldest_held_sample() {
        // Linear growth of 1px/frame: the lag between window means equals len - 5
        for len in [10usize, 20, 32] {
            let samples: Vec<Sample> = (0..len)
                .map(|i| Sample::new(0, 0, 100.0 - i as f32))
                .collect();
            let est = estimate_dynamics(&history_from_newest(&samples));
            assert!(
                (est.growth_rate - (len - GROWTH_WINDOW) as f32).abs() < 1e-4,
                "len {} growth {}",
                len,
                est.growth_rate
            );
        }
    }

    #[test]
    fn test_growth_baseline_fixed_once_full() {
        let mut history = HistoryBuffer::new();
        for i in 0..60 {
            history.push(Sample::new(0, 0, i as f32));
        }
        let est = estimate_dynamics(&history);
        assert!((est.growth_rate - 27.0).abs() < 1e-4);
    }
}
