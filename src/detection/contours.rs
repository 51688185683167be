// src/detection/contours.rs
//
// Outer contours of 8-connected mask regions.
//
// Each region is found by flood fill, then its outer boundary is traced
// clockwise (Moore neighbourhood) starting at the region's first pixel in
// raster order. Holes never produce contours of their own. Area and moments
// are polygon moments of the traced boundary, so one-pixel-wide regions
// enclose nothing and come out degenerate.

use super::segmenter::Mask;
use crate::types::Point;
use std::collections::VecDeque;

/// Clockwise in image coordinates (y grows downward), starting east.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

/// Zeroth and first order moments of a closed contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Area-weighted centroid, truncated to pixels. None when degenerate.
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 <= 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: (f32, f32),
    pub radius: f32,
}

/// Boundary of one connected region
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point>,
    /// Pixels in the region (diagnostics only)
    pub pixel_count: usize,
}

impl Contour {
    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        let (mut a, mut m10, mut m01) = (0.0f64, 0.0f64, 0.0f64);
        if n < 3 {
            return Moments {
                m00: 0.0,
                m10: 0.0,
                m01: 0.0,
            };
        }

        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let (xi, yi, xj, yj) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
            let cross = xi * yj - xj * yi;
            a += cross;
            m10 += (xi + xj) * cross;
            m01 += (yi + yj) * cross;
        }

        let sign = if a < 0.0 { -1.0 } else { 1.0 };
        Moments {
            m00: sign * a / 2.0,
            m10: sign * m10 / 6.0,
            m01: sign * m01 / 6.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    pub fn min_enclosing_circle(&self) -> Circle {
        min_enclosing_circle(&self.points)
    }
}

// ============================================================================
// CONTOUR EXTRACTION
// ============================================================================

/// Outer contours of every region, in raster order of each region's first pixel.
pub fn find_contours(mask: &Mask) -> Vec<Contour> {
    let mut visited = vec![false; mask.width * mask.height];
    let mut contours = Vec::new();

    for y in 0..mask.height {
        for x in 0..mask.width {
            let idx = y * mask.width + x;
            if visited[idx] || !mask.get(x, y) {
                continue;
            }
            let pixel_count = flood_fill(mask, &mut visited, x, y);
            let points = trace_boundary(mask, Point::new(x as i32, y as i32), pixel_count);
            contours.push(Contour {
                points,
                pixel_count,
            });
        }
    }

    contours
}

fn flood_fill(mask: &Mask, visited: &mut [bool], x: usize, y: usize) -> usize {
    let mut queue = VecDeque::new();
    visited[y * mask.width + x] = true;
    queue.push_back((x as i32, y as i32));
    let mut count = 0;

    while let Some((cx, cy)) = queue.pop_front() {
        count += 1;
        for &(dx, dy) in &DIRECTIONS {
            let (nx, ny) = (cx + dx, cy + dy);
            if !mask.get_signed(nx, ny) {
                continue;
            }
            let nidx = ny as usize * mask.width + nx as usize;
            if !visited[nidx] {
                visited[nidx] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    count
}

/// Clockwise sweep around `current`, starting just after the backtrack direction.
fn next_boundary_step(mask: &Mask, current: Point, backtrack: usize) -> Option<(usize, Point)> {
    (1..=8).find_map(|i| {
        let dir = (backtrack + i) % 8;
        let (dx, dy) = DIRECTIONS[dir];
        let candidate = Point::new(current.x + dx, current.y + dy);
        mask.get_signed(candidate.x, candidate.y)
            .then_some((dir, candidate))
    })
}

/// `start` must be the region's first pixel in raster order, so its west
/// neighbour is background.
fn trace_boundary(mask: &Mask, start: Point, pixel_count: usize) -> Vec<Point> {
    let mut contour = vec![start];
    let mut current = start;
    let mut backtrack = WEST;
    let mut first_step: Option<Point> = None;
    let max_steps = 4 * pixel_count + 8;

    for _ in 0..max_steps {
        let Some((dir, next)) = next_boundary_step(mask, current, backtrack) else {
            break; // isolated pixel
        };

        if current == start {
            match first_step {
                Some(first) if first == next => break,
                None => first_step = Some(next),
                _ => {}
            }
        }

        contour.push(next);
        current = next;
        // Last background pixel examined, seen from the new position
        backtrack = if dir % 2 == 0 { (dir + 6) % 8 } else { (dir + 5) % 8 };
    }

    if contour.len() > 1 && contour.last() == Some(&start) {
        contour.pop();
    }
    contour
}

// ============================================================================
// MINIMUM ENCLOSING CIRCLE
// ============================================================================

const CIRCLE_EPS: f64 = 1e-7;

#[derive(Clone, Copy)]
struct CircleF64 {
    cx: f64,
    cy: f64,
    r: f64,
}

impl CircleF64 {
    fn contains(&self, p: (f64, f64)) -> bool {
        let d = ((p.0 - self.cx).powi(2) + (p.1 - self.cy).powi(2)).sqrt();
        d <= self.r + CIRCLE_EPS * self.r.max(1.0)
    }

    fn from_two(a: (f64, f64), b: (f64, f64)) -> Self {
        let cx = (a.0 + b.0) / 2.0;
        let cy = (a.1 + b.1) / 2.0;
        let r = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 2.0;
        Self { cx, cy, r }
    }

    fn from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Self {
        let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
        if d.abs() < 1e-12 {
            // Collinear: the widest pair spans the other point
            return [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)]
                .into_iter()
                .fold(Self::from_two(a, b), |best, c| if c.r > best.r { c } else { best });
        }
        let a2 = a.0 * a.0 + a.1 * a.1;
        let b2 = b.0 * b.0 + b.1 * b.1;
        let c2 = c.0 * c.0 + c.1 * c.1;
        let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
        let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
        let r = ((a.0 - cx).powi(2) + (a.1 - cy).powi(2)).sqrt();
        Self { cx, cy, r }
    }
}

/// Smallest circle containing every point (incremental Welzl construction).
pub fn min_enclosing_circle(points: &[Point]) -> Circle {
    if points.is_empty() {
        return Circle {
            center: (0.0, 0.0),
            radius: 0.0,
        };
    }

    let mut pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    shuffle(&mut pts);

    let mut circle = CircleF64 {
        cx: pts[0].0,
        cy: pts[0].1,
        r: 0.0,
    };
    for i in 1..pts.len() {
        if circle.contains(pts[i]) {
            continue;
        }
        circle = CircleF64 {
            cx: pts[i].0,
            cy: pts[i].1,
            r: 0.0,
        };
        for j in 0..i {
            if circle.contains(pts[j]) {
                continue;
            }
            circle = CircleF64::from_two(pts[i], pts[j]);
            for k in 0..j {
                if !circle.contains(pts[k]) {
                    circle = CircleF64::from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Circle {
        center: (circle.cx as f32, circle.cy as f32),
        radius: circle.r as f32,
    }
}

/// Deterministic Fisher-Yates; boundary points arrive in traversal order,
/// which is the worst case for the incremental construction.
fn shuffle<T>(items: &mut [T]) {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for i in (1..items.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}
