//! Neighbourhood filters: box blur and Sobel edge magnitude.
//!
//! Both read from an unmodified snapshot of the source for the whole pass.
//! Neither samples outside the image: the blur window shrinks at the edges
//! and Sobel leaves the one-pixel border as it was.

use crate::to_channel;
use pixelbench_shared::{PixelBuffer, CHANNELS};

type Kernel3 = [[i32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Per-channel summed-area table with a zero guard row and column.
///
/// `sums[(y * (w + 1) + x) * 3 + c]` holds the sum of channel `c` over the
/// rectangle `[0, x) x [0, y)`.
struct IntegralImage {
    stride: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(buf: &PixelBuffer) -> Self {
        let w = buf.width() as usize;
        let h = buf.height() as usize;
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1) * 3];
        let data = buf.as_bytes();

        for y in 0..h {
            let mut row = [0u64; 3];
            for x in 0..w {
                let px = (y * w + x) * CHANNELS;
                let above = (y * stride + x + 1) * 3;
                let here = ((y + 1) * stride + x + 1) * 3;
                for c in 0..3 {
                    row[c] += data[px + c] as u64;
                    sums[here + c] = sums[above + c] + row[c];
                }
            }
        }
        Self { stride, sums }
    }

    /// Channel sums over the inclusive rectangle `[x0, x1] x [y0, y1]`.
    #[inline]
    fn rect(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> [u64; 3] {
        let at = |x: usize, y: usize| (y * self.stride + x) * 3;
        let (a, b, c, d) = (at(x0, y0), at(x1 + 1, y0), at(x0, y1 + 1), at(x1 + 1, y1 + 1));
        let mut out = [0u64; 3];
        for (ch, slot) in out.iter_mut().enumerate() {
            *slot = self.sums[d + ch] + self.sums[a + ch] - self.sums[b + ch] - self.sums[c + ch];
        }
        out
    }
}

/// Box blur: each channel becomes the mean over the `(2r+1)^2` window,
/// clipped to the image. Radius 0 is the identity.
pub fn box_blur(buf: &mut PixelBuffer, radius: u32) {
    if radius == 0 {
        return;
    }
    let table = IntegralImage::new(buf);
    let w = buf.width() as usize;
    let h = buf.height() as usize;
    let r = radius as usize;
    let data = buf.as_bytes_mut();

    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = y.saturating_add(r).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = x.saturating_add(r).min(w - 1);
            let count = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
            let sums = table.rect(x0, y0, x1, y1);

            let px = (y * w + x) * CHANNELS;
            for c in 0..3 {
                let mean = (sums[c] as f64 / count).round();
                data[px + c] = mean.clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Sobel gradient magnitude over the unweighted channel average.
///
/// Gradients are accumulated on integer channel sums and divided by 3 once,
/// which equals convolving the per-pixel `(R+G+B)/3` values. Border pixels
/// are left unchanged.
pub fn sobel(buf: &mut PixelBuffer) {
    let w = buf.width() as usize;
    let h = buf.height() as usize;
    if w < 3 || h < 3 {
        return;
    }

    let sums: Vec<i32> = buf
        .pixels()
        .map(|px| px[0] as i32 + px[1] as i32 + px[2] as i32)
        .collect();
    let data = buf.as_bytes_mut();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut sx = 0i32;
            let mut sy = 0i32;
            for (ky, row) in (y - 1..=y + 1).enumerate() {
                for (kx, col) in (x - 1..=x + 1).enumerate() {
                    let s = sums[row * w + col];
                    sx += SOBEL_KERNEL_X[ky][kx] * s;
                    sy += SOBEL_KERNEL_Y[ky][kx] * s;
                }
            }

            let gx = sx as f32 / 3.0;
            let gy = sy as f32 / 3.0;
            let mag = to_channel((gx * gx + gy * gy).sqrt().min(255.0));

            let px = (y * w + x) * CHANNELS;
            data[px] = mag;
            data[px + 1] = mag;
            data[px + 2] = mag;
        }
    }
}
