//! Unit tests for the transform client
//!
//! This module contains tests that span several components, plus shared
//! fixtures.

pub mod config_tests;
pub mod qq_mock_tests;

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::config::TransformConfig;

/// Encode a gradient test picture as PNG
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let picture = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(picture)
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("PNG encoding of a test image");
    buffer.into_inner()
}

/// Configuration pointing both capabilities at a mock server, with short delays
pub(crate) fn mock_config(base_uri: &str) -> TransformConfig {
    TransformConfig {
        different_dimension_url: format!("{}/overseas/process", base_uri),
        ai_painting_url: format!("{}/process", base_uri),
        upload_attempts: 4,
        download_attempts: 11,
        upload_timeout: Duration::from_millis(500),
        download_timeout: Duration::from_millis(500),
        retry_interval: Duration::from_millis(10),
        ..TransformConfig::default()
    }
}
