//! Benchmark input images

use anyhow::{Context, Result};
use pixelbench_shared::PixelBuffer;
use std::path::Path;
use tracing::info;

/// Decode an image file to RGBA8.
pub fn load(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    info!("Image loaded: {}x{}", width, height);
    Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
}

/// Deterministic test image: horizontal red ramp, vertical green ramp, a
/// blue checkerboard and opaque alpha, so every filter has edges to work on.
pub fn synthetic(width: u32, height: u32) -> Result<PixelBuffer> {
    let buffer = PixelBuffer::from_fn(width, height, |x, y| {
        let r = (x as u64 * 255 / (width.max(2) as u64 - 1)) as u8;
        let g = (y as u64 * 255 / (height.max(2) as u64 - 1)) as u8;
        let b = if (x / 8 + y / 8) % 2 == 0 { 32 } else { 224 };
        [r, g, b, 255]
    })?;
    info!("Synthetic image: {}x{}", width, height);
    Ok(buffer)
}
