// src/detection/mod.rs
//
// Per-frame target detection:
//   Frame → segmenter (blur, HSV threshold, opening) → Mask
//   Mask  → contours → target_selector → Option<Sample>
//
// Stateless; nothing here remembers previous frames.

pub mod contours;
pub mod segmenter;
pub mod target_selector;

pub use contours::{find_contours, Circle, Contour, Moments};
pub use segmenter::{rgb_to_hsv, Mask, Segmenter, SegmenterConfig};
pub use target_selector::{select_from_contours, select_target};
