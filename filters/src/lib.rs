//! Host-side filter library
//!
//! Runs directly on a [`PixelBuffer`] owned by the host. The filter module in
//! `pixelbench-guest` implements the same filters independently; both must
//! agree pixel-for-pixel, which `tests/conformance.rs` checks.
//!
//! Numeric contract (shared with the guest):
//! - colour math is done in `f32`, then rounded half away from zero and
//!   clamped to `[0, 255]`
//! - alpha is never written
//! - spatial filters read from a snapshot of the source, never from pixels
//!   already written in the same pass

pub mod color;
pub mod spatial;

pub use color::{brightness, grayscale, invert, sepia, threshold};
pub use spatial::{box_blur, sobel};

use pixelbench_shared::{FilterRequest, PixelBuffer};

/// Apply a filter to `source`, returning a new buffer. `source` is untouched.
pub fn apply(request: &FilterRequest, source: &PixelBuffer) -> PixelBuffer {
    let mut out = source.clone();
    apply_in_place(request, &mut out);
    out
}

/// Apply a filter to a buffer the caller owns exclusively.
pub fn apply_in_place(request: &FilterRequest, buf: &mut PixelBuffer) {
    match *request {
        FilterRequest::Grayscale => grayscale(buf),
        FilterRequest::Invert => invert(buf),
        FilterRequest::Sepia => sepia(buf),
        FilterRequest::Threshold { level } => threshold(buf, level),
        FilterRequest::Brightness { delta } => brightness(buf, delta),
        FilterRequest::Blur { radius } => box_blur(buf, radius),
        FilterRequest::Sobel => sobel(buf),
    }
}

/// Round half away from zero and clamp into a channel value.
#[inline]
pub(crate) fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_leaves_source_untouched() {
        let src = PixelBuffer::filled(2, 2, [10, 20, 30, 255]).unwrap();
        let out = apply(&FilterRequest::Invert, &src);
        assert_eq!(src.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(out.pixel(0, 0), [245, 235, 225, 255]);
    }

    #[test]
    fn test_to_channel_rounding() {
        assert_eq!(to_channel(0.49), 0);
        assert_eq!(to_channel(0.5), 1);
        assert_eq!(to_channel(254.5), 255);
        assert_eq!(to_channel(300.0), 255);
        assert_eq!(to_channel(-4.0), 0);
    }
}
