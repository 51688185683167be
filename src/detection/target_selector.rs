// src/detection/target_selector.rs

use super::contours::{find_contours, Contour};
use super::segmenter::Mask;
use crate::config::MIN_TARGET_RADIUS;
use crate::types::{Point, Sample};
use tracing::trace;

/// Reduce a mask to at most one target sample.
///
/// The largest enclosed region wins (first in raster order on ties). It is
/// rejected when its moments are degenerate or its enclosing radius does not
/// exceed [`MIN_TARGET_RADIUS`].
pub fn select_target(mask: &Mask) -> Option<Sample> {
    let contours = find_contours(mask);
    select_from_contours(&contours)
}

pub fn select_from_contours(contours: &[Contour]) -> Option<Sample> {
    let mut best: Option<(&Contour, f64)> = None;
    for contour in contours {
        let area = contour.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour, area)),
        }
    }
    let (contour, area) = best?;

    let circle = contour.min_enclosing_circle();
    let Some(position) = contour.moments().centroid() else {
        trace!("Largest region is degenerate (area {:.1})", area);
        return None;
    };
    if circle.radius <= MIN_TARGET_RADIUS {
        trace!("Largest region too small (radius {:.1})", circle.radius);
        return None;
    }

    let outline_center = Point::new(circle.center.0 as i32, circle.center.1 as i32);
    Some(Sample::with_outline(position, circle.radius, outline_center))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_squares(size: usize, squares: &[(usize, usize, usize)]) -> Mask {
        let mut mask = Mask::new(size, size);
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[test]
    fn test_empty_mask_is_no_target() {
        assert_eq!(select_target(&Mask::new(40, 40)), None);
    }

    #[test]
    fn test_largest_region_wins() {
        let mask = mask_with_squares(200, &[(10, 10, 25), (100, 100, 41)]);
        let sample = select_target(&mask).unwrap();
        assert_eq!(sample.position, Point::new(120, 120));
        assert!((sample.radius - 20.0 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_equal_areas_pick_first_in_raster_order() {
        let mask = mask_with_squares(200, &[(120, 10, 31), (10, 100, 31)]);
        let sample = select_target(&mask).unwrap();
        assert_eq!(sample.position, Point::new(135, 25));
    }

    #[test]
    fn test_small_radius_rejected_regardless_of_area() {
        // 15px square: enclosing radius 7 * sqrt(2) < 10
        let mask = mask_with_squares(100, &[(40, 40, 15)]);
        assert_eq!(select_target(&mask), None);
    }

    #[test]
    fn test_radius_exactly_at_threshold_rejected() {
        // Diamond |dx| + |dy| <= 10 around (30, 30): enclosing radius exactly 10
        let mut mask = Mask::new(60, 60);
        for y in 20..=40i32 {
            for x in 20..=40i32 {
                if (x - 30).abs() + (y - 30).abs() <= 10 {
                    mask.set(x as usize, y as usize, true);
                }
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!((contours[0].min_enclosing_circle().radius - 10.0).abs() < 1e-4);
        assert_eq!(select_target(&mask), None);
    }

    #[test]
    fn test_degenerate_region_rejected() {
        // Long one-pixel line: wide circle but zero enclosed area
        let mut mask = Mask::new(80, 10);
        for x in 5..70 {
            mask.set(x, 5, true);
        }
        assert_eq!(select_target(&mask), None);
    }

    #[test]
    fn test_lopsided_region_outline_encloses_it() {
        // Square with a long arm to the right: centroid stays near the
        // square, the enclosing circle shifts toward the arm
        let mut mask = mask_with_squares(160, &[(20, 20, 41)]);
        for y in 20..25 {
            for x in 61..121 {
                mask.set(x, y, true);
            }
        }
        let sample = select_target(&mask).unwrap();
        assert_ne!(sample.outline_center, sample.position);
        assert!(sample.outline_center.x > sample.position.x);

        // Truncated center: allow the rounding slack
        for y in 0..160 {
            for x in 0..160 {
                if mask.get(x, y) {
                    let d = Point::new(x as i32, y as i32).distance_to(sample.outline_center);
                    assert!(d <= sample.radius + 1.5, "({}, {}) at {:.2}", x, y, d);
                }
            }
        }
    }
}
