//! Recovery frame compositing
//!
//! When the processor cannot find a face, the source is cropped to a 1:1.5
//! aspect ratio and stacked between two copies of a marker face on a white
//! canvas. The processor's detector locks onto the markers and the request
//! goes through.
//!
//! The transformation is pure: identical input bytes and marker always
//! give identical output bytes.

mod layout;
mod marker;

pub use layout::{normalized_dimensions, FrameLayout, Orientation, Placement};

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, Rgba, RgbImage, RgbaImage};
use log::debug;

use crate::error::{Result, TransformError};

/// Side of the square marker, in pixels
pub const MARKER_SIZE: u32 = 170;

/// Space between each marker and the image, in pixels
pub const MARKER_GAP: u32 = 200;

/// Quality of the encoded frame
const JPEG_QUALITY: u8 = 80;

/// Marker-based recovery framing
#[derive(Debug, Clone)]
pub struct RecoveryFrame {
    marker: Arc<RgbaImage>,
}

impl Default for RecoveryFrame {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecoveryFrame {
    /// Frame using the built-in marker
    pub fn builtin() -> Self {
        Self {
            marker: marker::builtin_marker(),
        }
    }

    /// Frame using a custom marker image, cropped to a `MARKER_SIZE` square
    pub fn from_marker_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| TransformError::recovery(format!("Cannot decode marker image: {}", e)))?;

        let marker = decoded
            .resize_to_fill(MARKER_SIZE, MARKER_SIZE, FilterType::Lanczos3)
            .to_rgba8();

        Ok(Self {
            marker: Arc::new(marker),
        })
    }

    /// Marker pixels in use
    pub fn marker(&self) -> &RgbaImage {
        &self.marker
    }

    /// Decode, frame and re-encode an image as JPEG
    pub fn apply(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let source = image::load_from_memory(image_bytes)
            .map_err(|e| TransformError::recovery(format!("Cannot decode source image: {}", e)))?;

        let framed = self.compose(&source)?;
        encode_jpeg(&framed)
    }

    /// Frame a decoded image
    pub fn compose(&self, source: &DynamicImage) -> Result<RgbImage> {
        if source.width() == 0 || source.height() == 0 {
            return Err(TransformError::recovery("Source image has zero dimensions"));
        }

        let layout = FrameLayout::compute(source.width(), source.height(), MARKER_SIZE, MARKER_GAP);
        debug!(
            "Framing {}x{} source as {}x{} ({:?})",
            source.width(),
            source.height(),
            layout.canvas_width,
            layout.canvas_height,
            layout.orientation
        );

        let fitted = source
            .resize_to_fill(layout.image_width, layout.image_height, FilterType::Lanczos3)
            .to_rgba8();

        let mut canvas = RgbaImage::from_pixel(
            layout.canvas_width,
            layout.canvas_height,
            Rgba([255, 255, 255, 255]),
        );

        imageops::overlay(&mut canvas, &fitted, layout.image.x as i64, layout.image.y as i64);
        for placement in &layout.markers {
            imageops::overlay(&mut canvas, &*self.marker, placement.x as i64, placement.y as i64);
        }

        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(|e| TransformError::recovery(format!("Cannot encode framed image: {}", e)))?;
    Ok(buffer)
}
