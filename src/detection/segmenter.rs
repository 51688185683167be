// src/detection/segmenter.rs
//
// Colour segmentation on raw RGB frames: Gaussian blur, HSV conversion,
// dual hue-range threshold, then a morphological opening to drop speckle.
//
// No OpenCV dependency. The numeric conventions (8-bit HSV, sigma derived
// from kernel size, reflect-101 borders, 3x3 structuring element) follow the
// camera pipeline's so the tuned colour ranges carry over unchanged.

use crate::config::{HsvRange, TARGET_HUE_HIGH, TARGET_HUE_LOW};
use crate::types::Frame;
use tracing::warn;

// ============================================================================
// MASK
// ============================================================================

/// Binary per-pixel map. `1` marks a candidate-object pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = on as u8;
    }

    /// Checked lookup; anything outside the mask is background.
    #[inline]
    pub fn get_signed(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.get(x as usize, y as usize)
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Odd Gaussian kernel size; 0 or 1 disables the blur
    pub blur_kernel: usize,
    /// Pixels inside any of these ranges are marked
    pub hue_ranges: Vec<HsvRange>,
    /// Erosion passes followed by the same number of dilation passes
    pub morph_iterations: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 11,
            hue_ranges: vec![TARGET_HUE_LOW, TARGET_HUE_HIGH],
            morph_iterations: 2,
        }
    }
}

// ============================================================================
// SEGMENTER
// ============================================================================

pub struct Segmenter {
    config: SegmenterConfig,
    kernel: Vec<f32>,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        let kernel = gaussian_kernel(config.blur_kernel);
        Self { config, kernel }
    }

    /// Frame → opened binary mask. Never fails; no match yields an empty mask.
    pub fn segment(&self, frame: &Frame) -> Mask {
        let mut mask = Mask::new(frame.width, frame.height);
        if frame.width == 0 || frame.height == 0 {
            return mask;
        }
        if !frame.is_well_formed() {
            warn!(
                "Dropping malformed frame: {} bytes for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            );
            return mask;
        }

        let blurred = if self.kernel.len() > 1 {
            gaussian_blur(frame, &self.kernel)
        } else {
            frame.data.clone()
        };

        for (i, px) in blurred.chunks_exact(3).enumerate() {
            let hsv = rgb_to_hsv(px[0], px[1], px[2]);
            if self.config.hue_ranges.iter().any(|r| r.contains(hsv)) {
                mask.data[i] = 1;
            }
        }

        for _ in 0..self.config.morph_iterations {
            mask = erode(&mask);
        }
        for _ in 0..self.config.morph_iterations {
            mask = dilate(&mask);
        }
        mask
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

// ============================================================================
// HSV CONVERSION
// ============================================================================

/// RGB → HSV with H in [0, 180], S and V in [0, 255].
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [
        (h / 2.0).round().min(180.0) as u8,
        s.round() as u8,
        max as u8,
    ]
}

// ============================================================================
// BLUR
// ============================================================================

fn gaussian_kernel(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0];
    }
    let size = size | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Mirror an out-of-range index without repeating the edge pixel.
#[inline]
fn reflect_101(mut i: i32, n: usize) -> usize {
    let n = n as i32;
    if n == 1 {
        return 0;
    }
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

fn gaussian_blur(frame: &Frame, kernel: &[f32]) -> Vec<u8> {
    let (w, h) = (frame.width, frame.height);
    let half = (kernel.len() / 2) as i32;
    let mut horizontal = vec![0.0f32; w * h * 3];

    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i32 + k as i32 - half, w);
                let idx = (row + sx) * 3;
                for c in 0..3 {
                    acc[c] += weight * frame.data[idx + c] as f32;
                }
            }
            horizontal[(row + x) * 3..(row + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    let mut out = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i32 + k as i32 - half, h);
                let idx = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += weight * horizontal[idx + c];
                }
            }
            let idx = (y * w + x) * 3;
            for c in 0..3 {
                out[idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

// ============================================================================
// MORPHOLOGY (3x3 square element, out-of-frame neighbours ignored)
// ============================================================================

fn erode(mask: &Mask) -> Mask {
    morph(mask, true)
}

fn dilate(mask: &Mask) -> Mask {
    morph(mask, false)
}

fn morph(mask: &Mask, erode: bool) -> Mask {
    let mut out = Mask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            let mut all = true;
            let mut any = false;
            for ny in y.saturating_sub(1)..=(y + 1).min(mask.height - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(mask.width - 1) {
                    let v = mask.get(nx, ny);
                    all &= v;
                    any |= v;
                }
            }
            out.set(x, y, if erode { all } else { any });
        }
    }
    out
}
