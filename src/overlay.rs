// src/overlay.rs
//
// HUD for the live view. `HudState` is a plain description of what to draw,
// derived from a FrameReport; the OpenCV painter below only executes it.

use crate::analysis::TrackingStatus;
use crate::config::{BUFFER_SIZE, COLLISION_ZONE};
use crate::pipeline::FrameReport;
use crate::types::Point;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Colors used for HUD rendering (BGR format for OpenCV).
pub mod colors {
    pub type Bgr = [u8; 3];

    pub const SCANNING: Bgr = [0, 255, 0];
    pub const TRACKING: Bgr = [0, 255, 255];
    pub const RECEDING_INTERSECT: Bgr = [255, 100, 0];
    pub const COLLISION: Bgr = [0, 0, 255];

    pub const ACTION: Bgr = [0, 255, 255];
    pub const VELOCITY_ARROW: Bgr = [0, 255, 255];
    pub const TRAIL: Bgr = [0, 0, 255];
    pub const WARNING_LINE: Bgr = [0, 0, 255];

    pub const TITLE: Bgr = [150, 150, 150];
    pub const VECTOR_TEXT: Bgr = [255, 255, 255];
    pub const CROSSHAIR: Bgr = [100, 100, 100];
    pub const ZONE: Bgr = [50, 50, 50];
    pub const TOP_BAR: Bgr = [0, 0, 0];
}

pub const TITLE: &str = "ORION EYE LIVE TRACKING";
pub const CROSSHAIR_HALF: i32 = 20;
pub const ARROW_SCALE: i32 = 20;
pub const TOP_BAR_HEIGHT: i32 = 100;

// ============================================================================
// HUD STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub thickness: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub status_text: &'static str,
    pub status_color: colors::Bgr,
    pub vector_text: String,
    pub action_text: Option<String>,
    /// Detected target outline: center and radius
    pub target: Option<(Point, i32)>,
    pub velocity_arrow: Option<(Point, Point)>,
    /// Target to frame center, drawn on collision course
    pub warning_line: Option<(Point, Point)>,
    pub trail: Vec<Segment>,
    pub frame_center: Point,
}

pub fn status_text(status: TrackingStatus) -> &'static str {
    match status {
        TrackingStatus::Scanning => "SCANNING SECTOR...",
        TrackingStatus::Tracking => "TRACKING TARGET",
        TrackingStatus::SafeRecedingIntersect => "TRAJECTORY INTERSECT (SAFE - RECEDING)",
        TrackingStatus::CollisionCourse => "COLLISION COURSE",
    }
}

pub fn status_color(status: TrackingStatus) -> colors::Bgr {
    match status {
        TrackingStatus::Scanning => colors::SCANNING,
        TrackingStatus::Tracking => colors::TRACKING,
        TrackingStatus::SafeRecedingIntersect => colors::RECEDING_INTERSECT,
        TrackingStatus::CollisionCourse => colors::COLLISION,
    }
}

/// Older segments get thinner.
pub fn trail_thickness(segment_index: usize) -> i32 {
    ((BUFFER_SIZE as f64 / (segment_index + 1) as f64).sqrt() * 2.5) as i32
}

impl HudState {
    pub fn from_report(report: &FrameReport) -> Self {
        let status = report.status();
        let mut hud = Self {
            status_text: status_text(status),
            status_color: status_color(status),
            vector_text: report.vector_text(),
            action_text: None,
            target: None,
            velocity_arrow: None,
            warning_line: None,
            trail: trail_segments(&report.trail),
            frame_center: report.frame_center,
        };

        let Some(sample) = report.sample else {
            return hud;
        };
        // Outline, arrow and warning line hang off the enclosing circle
        let anchor = sample.outline_center;
        hud.target = Some((anchor, sample.radius as i32));

        if let Some(evasion) = report.decision.evasion {
            hud.action_text = Some(format!("ACTION: THRUST {}", evasion));
            hud.warning_line = Some((anchor, report.frame_center));
        }

        if let Some(d) = report.dynamics {
            if d.dx.abs() > 1 || d.dy.abs() > 1 {
                let tip = Point::new(anchor.x + d.dx * ARROW_SCALE, anchor.y + d.dy * ARROW_SCALE);
                hud.velocity_arrow = Some((anchor, tip));
            }
        }

        hud
    }
}

fn trail_segments(trail: &[Point]) -> Vec<Segment> {
    trail
        .windows(2)
        .enumerate()
        .map(|(i, pair)| Segment {
            from: pair[0],
            to: pair[1],
            thickness: trail_thickness(i + 1),
        })
        .collect()
}

// ============================================================================
// OPENCV PAINTER
// ============================================================================

#[cfg(feature = "camera")]
pub use painter::draw_hud;

#[cfg(feature = "camera")]
mod painter {
    use super::*;
    use anyhow::Result;
    use opencv::{
        core::{self, Mat, Scalar},
        imgproc,
        prelude::*,
    };

    fn scalar(c: colors::Bgr) -> Scalar {
        Scalar::new(c[0] as f64, c[1] as f64, c[2] as f64, 0.0)
    }

    fn pt(p: Point) -> core::Point {
        core::Point::new(p.x, p.y)
    }

    fn text(output: &mut Mat, s: &str, at: core::Point, scale: f64, color: colors::Bgr, thickness: i32) -> Result<()> {
        imgproc::put_text(
            output,
            s,
            at,
            imgproc::FONT_HERSHEY_SIMPLEX,
            scale,
            scalar(color),
            thickness,
            imgproc::LINE_8,
            false,
        )?;
        Ok(())
    }

    /// Paint the HUD onto a BGR frame in place.
    pub fn draw_hud(output: &mut Mat, hud: &HudState) -> Result<()> {
        let height = output.rows();
        let width = output.cols();

        if let Some(action) = &hud.action_text {
            text(output, action, core::Point::new(50, height - 80), 1.0, colors::ACTION, 2)?;
        }
        if let Some((from, to)) = hud.warning_line {
            imgproc::line(output, pt(from), pt(to), scalar(colors::WARNING_LINE), 3, imgproc::LINE_8, 0)?;
        }
        if let Some((center, radius)) = hud.target {
            imgproc::circle(output, pt(center), radius, scalar(hud.status_color), 2, imgproc::LINE_8, 0)?;
        }
        if let Some((from, to)) = hud.velocity_arrow {
            imgproc::arrowed_line(
                output,
                pt(from),
                pt(to),
                scalar(colors::VELOCITY_ARROW),
                2,
                imgproc::LINE_8,
                0,
                0.1,
            )?;
        }

        for seg in &hud.trail {
            imgproc::line(
                output,
                pt(seg.from),
                pt(seg.to),
                scalar(colors::TRAIL),
                seg.thickness,
                imgproc::LINE_8,
                0,
            )?;
        }

        // Top bar
        imgproc::rectangle(
            output,
            core::Rect::new(0, 0, width, TOP_BAR_HEIGHT),
            scalar(colors::TOP_BAR),
            -1,
            imgproc::LINE_8,
            0,
        )?;
        text(output, TITLE, core::Point::new(20, 30), 0.6, colors::TITLE, 1)?;
        text(output, hud.status_text, core::Point::new(20, 70), 0.9, hud.status_color, 2)?;
        text(output, &hud.vector_text, core::Point::new(20, 95), 0.6, colors::VECTOR_TEXT, 1)?;

        // Crosshair + collision zone
        let c = hud.frame_center;
        imgproc::line(
            output,
            core::Point::new(c.x - CROSSHAIR_HALF, c.y),
            core::Point::new(c.x + CROSSHAIR_HALF, c.y),
            scalar(colors::CROSSHAIR),
            1,
            imgproc::LINE_8,
            0,
        )?;
        imgproc::line(
            output,
            core::Point::new(c.x, c.y - CROSSHAIR_HALF),
            core::Point::new(c.x, c.y + CROSSHAIR_HALF),
            scalar(colors::CROSSHAIR),
            1,
            imgproc::LINE_8,
            0,
        )?;
        imgproc::circle(output, pt(c), COLLISION_ZONE as i32, scalar(colors::ZONE), 1, imgproc::LINE_8, 0)?;

        Ok(())
    }
}
