//! Per-pixel colour filters

use crate::to_channel;
use pixelbench_shared::{PixelBuffer, CHANNELS, MAX_BRIGHTNESS_DELTA};

/// Replace R, G and B with the rounded luma `0.299R + 0.587G + 0.114B`.
pub fn grayscale(buf: &mut PixelBuffer) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        let luma = to_channel(0.299 * r + 0.587 * g + 0.114 * b);
        px[0] = luma;
        px[1] = luma;
        px[2] = luma;
    }
}

pub fn invert(buf: &mut PixelBuffer) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}

/// Classic sepia tone matrix, clamped per channel.
pub fn sepia(buf: &mut PixelBuffer) {
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        px[0] = to_channel(0.393 * r + 0.769 * g + 0.189 * b);
        px[1] = to_channel(0.349 * r + 0.686 * g + 0.168 * b);
        px[2] = to_channel(0.272 * r + 0.534 * g + 0.131 * b);
    }
}

/// Binarize on the unweighted channel average: 255 when `avg >= level`.
pub fn threshold(buf: &mut PixelBuffer, level: u8) {
    let level = level as f32;
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
        let avg = sum as f32 / 3.0;
        let v = if avg >= level { 255 } else { 0 };
        px[0] = v;
        px[1] = v;
        px[2] = v;
    }
}

/// Add `delta` to R, G and B, saturating at 0 and 255.
///
/// Deltas beyond ±255 act like ±255.
pub fn brightness(buf: &mut PixelBuffer, delta: i32) {
    let delta = delta.clamp(-MAX_BRIGHTNESS_DELTA, MAX_BRIGHTNESS_DELTA);
    if delta == 0 {
        return;
    }
    let shift = |c: u8| (c as i32 + delta).clamp(0, 255) as u8;
    for px in buf.as_bytes_mut().chunks_exact_mut(CHANNELS) {
        px[0] = shift(px[0]);
        px[1] = shift(px[1]);
        px[2] = shift(px[2]);
    }
}
