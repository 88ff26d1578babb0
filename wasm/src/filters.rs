//! Filter math over raw RGBA slices.
//!
//! Every function rewrites `data` in place. Alpha bytes are never touched.
//! Float results are rounded half away from zero and clamped to `[0, 255]`.

use crate::CHANNELS;

#[inline]
fn clamp_round(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

pub fn grayscale(data: &mut [u8]) {
    for px in data.chunks_exact_mut(CHANNELS) {
        let r = px[0] as f32;
        let g = px[1] as f32;
        let b = px[2] as f32;
        let luma = clamp_round(0.299 * r + 0.587 * g + 0.114 * b);
        px[..3].fill(luma);
    }
}

pub fn invert(data: &mut [u8]) {
    for px in data.chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            *c = !*c;
        }
    }
}

pub fn sepia(data: &mut [u8]) {
    for px in data.chunks_exact_mut(CHANNELS) {
        let r = px[0] as f32;
        let g = px[1] as f32;
        let b = px[2] as f32;
        px[0] = clamp_round(0.393 * r + 0.769 * g + 0.189 * b);
        px[1] = clamp_round(0.349 * r + 0.686 * g + 0.168 * b);
        px[2] = clamp_round(0.272 * r + 0.534 * g + 0.131 * b);
    }
}

/// `(R+G+B)/3 >= level`, evaluated exactly as `R+G+B >= 3*level`.
pub fn threshold(data: &mut [u8], level: u8) {
    let cutoff = 3 * level as u32;
    for px in data.chunks_exact_mut(CHANNELS) {
        let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
        let v = if sum >= cutoff { 255 } else { 0 };
        px[..3].fill(v);
    }
}

pub fn brightness(data: &mut [u8], delta: i32) {
    let delta = delta.clamp(-255, 255) as i16;
    for px in data.chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            *c = (*c as i16 + delta).clamp(0, 255) as u8;
        }
    }
}

fn row_pixels(src: &[u8], row: usize, width: usize) -> std::slice::ChunksExact<'_, u8> {
    let start = row * width * CHANNELS;
    src[start..start + width * CHANNELS].chunks_exact(CHANNELS)
}

fn add_row(cols: &mut [u64], src: &[u8], row: usize, width: usize) {
    for (x, px) in row_pixels(src, row, width).enumerate() {
        for c in 0..3 {
            cols[x * 3 + c] += px[c] as u64;
        }
    }
}

fn sub_row(cols: &mut [u64], src: &[u8], row: usize, width: usize) {
    for (x, px) in row_pixels(src, row, width).enumerate() {
        for c in 0..3 {
            cols[x * 3 + c] -= px[c] as u64;
        }
    }
}

/// Box blur with sliding window sums.
///
/// `cols` holds, for every column, the channel sums over the rows currently
/// inside the vertical window; a horizontal accumulator slides across it.
pub fn blur(data: &mut [u8], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let src = data.to_vec();
    let last_x = width - 1;
    let last_y = height - 1;

    let mut cols = vec![0u64; width * 3];
    for row in 0..=radius.min(last_y) {
        add_row(&mut cols, &src, row, width);
    }

    for y in 0..height {
        let rows = (y.saturating_add(radius).min(last_y) - y.saturating_sub(radius) + 1) as u64;

        let mut acc = [0u64; 3];
        for x in 0..=radius.min(last_x) {
            for c in 0..3 {
                acc[c] += cols[x * 3 + c];
            }
        }

        for x in 0..width {
            let span = (x.saturating_add(radius).min(last_x) - x.saturating_sub(radius) + 1) as u64;
            let count = (span * rows) as f64;
            let px = (y * width + x) * CHANNELS;
            for c in 0..3 {
                let mean = (acc[c] as f64 / count).round();
                data[px + c] = mean.clamp(0.0, 255.0) as u8;
            }

            if x < last_x {
                if let Some(enter) = (x + 1).checked_add(radius) {
                    if enter <= last_x {
                        for c in 0..3 {
                            acc[c] += cols[enter * 3 + c];
                        }
                    }
                }
                if x >= radius {
                    let leave = x - radius;
                    for c in 0..3 {
                        acc[c] -= cols[leave * 3 + c];
                    }
                }
            }
        }

        if y < last_y {
            if let Some(enter) = (y + 1).checked_add(radius) {
                if enter <= last_y {
                    add_row(&mut cols, &src, enter, width);
                }
            }
            if y >= radius {
                sub_row(&mut cols, &src, y - radius, width);
            }
        }
    }
}

/// Sobel magnitude of the channel average; the outer ring is left as is.
pub fn sobel(data: &mut [u8], width: usize, height: usize) {
    if width < 3 || height < 3 {
        return;
    }
    let sums: Vec<i32> = data
        .chunks_exact(CHANNELS)
        .map(|px| px[0] as i32 + px[1] as i32 + px[2] as i32)
        .collect();
    let at = |x: usize, y: usize| sums[y * width + x];

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let left = at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1);
            let right = at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1);
            let top = at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1);
            let bottom = at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1);

            let gx = (right - left) as f32 / 3.0;
            let gy = (bottom - top) as f32 / 3.0;
            let mag = clamp_round((gx * gx + gy * gy).sqrt().min(255.0));

            let px = (y * width + x) * CHANNELS;
            data[px..px + 3].fill(mag);
        }
    }
}
