//! Built-in recovery marker
//!
//! A plain drawn face on white. It is rendered once per process and shared
//! read-only by every recovery frame.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;

use super::MARKER_SIZE;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SKIN: Rgba<u8> = Rgba([248, 212, 178, 255]);
const HAIR: Rgba<u8> = Rgba([64, 42, 30, 255]);
const FEATURE: Rgba<u8> = Rgba([36, 28, 28, 255]);

static BUILTIN_MARKER: Lazy<Arc<RgbaImage>> = Lazy::new(|| Arc::new(draw_face(MARKER_SIZE)));

/// Shared handle to the built-in marker
pub(crate) fn builtin_marker() -> Arc<RgbaImage> {
    Arc::clone(&BUILTIN_MARKER)
}

fn distance(x: f64, y: f64, cx: f64, cy: f64) -> f64 {
    ((x - cx).powi(2) + (y - cy).powi(2)).sqrt()
}

/// Draw a frontal face filling a `size` x `size` square
fn draw_face(size: u32) -> RgbaImage {
    let s = size as f64;
    let (cx, cy) = (s / 2.0, s / 2.0);
    let face_radius = s * 0.42;
    let eye_radius = s * 0.055;
    let eye_y = s * 0.44;
    let (left_eye_x, right_eye_x) = (s * 0.35, s * 0.65);
    let mouth_radius = s * 0.22;
    let mouth_width = s * 0.03;
    let hairline = s * 0.28;

    RgbaImage::from_fn(size, size, |x, y| {
        let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
        let from_center = distance(px, py, cx, cy);

        if from_center > face_radius {
            return BACKGROUND;
        }

        if py < hairline {
            return HAIR;
        }

        if distance(px, py, left_eye_x, eye_y) <= eye_radius
            || distance(px, py, right_eye_x, eye_y) <= eye_radius
        {
            return FEATURE;
        }

        // Smile: lower arc of a circle around the face center
        let from_mouth_center = distance(px, py, cx, cy - s * 0.02);
        if py > cy + s * 0.1 && (from_mouth_center - mouth_radius).abs() <= mouth_width / 2.0 {
            return FEATURE;
        }

        SKIN
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_marker_is_square_and_shared() {
        let first = builtin_marker();
        let second = builtin_marker();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions(), (MARKER_SIZE, MARKER_SIZE));
    }

    #[test]
    fn face_has_background_corners_and_eyes() {
        let marker = draw_face(MARKER_SIZE);
        assert_eq!(*marker.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*marker.get_pixel(MARKER_SIZE - 1, MARKER_SIZE - 1), BACKGROUND);

        let eye_x = (MARKER_SIZE as f64 * 0.35) as u32;
        let eye_y = (MARKER_SIZE as f64 * 0.44) as u32;
        assert_eq!(*marker.get_pixel(eye_x, eye_y), FEATURE);
        assert_eq!(*marker.get_pixel(MARKER_SIZE / 2, MARKER_SIZE / 2), SKIN);
    }
}
