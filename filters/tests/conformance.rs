//! Conformance suite for the two filter implementations.
//!
//! The host library (`pixelbench-filters`) and the module library
//! (`pixelbench-guest`, built natively here) are compiled independently.
//! Every property below is checked against both, and the two must agree
//! pixel-for-pixel.

use pixelbench_filters as host;
use pixelbench_guest::filters as guest;
use pixelbench_shared::{FilterRequest, PixelBuffer};
use proptest::prelude::*;

type Impl = fn(&FilterRequest, &PixelBuffer) -> PixelBuffer;

fn run_host(request: &FilterRequest, src: &PixelBuffer) -> PixelBuffer {
    host::apply(request, src)
}

fn run_guest(request: &FilterRequest, src: &PixelBuffer) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let mut out = src.clone();
    let data = out.as_bytes_mut();
    match *request {
        FilterRequest::Grayscale => guest::grayscale(data),
        FilterRequest::Invert => guest::invert(data),
        FilterRequest::Sepia => guest::sepia(data),
        FilterRequest::Threshold { level } => guest::threshold(data, level),
        FilterRequest::Brightness { delta } => guest::brightness(data, delta),
        FilterRequest::Blur { radius } => guest::blur(data, w, h, radius as usize),
        FilterRequest::Sobel => guest::sobel(data, w, h),
    }
    out
}

const IMPLS: [(&str, Impl); 2] = [("host", run_host), ("guest", run_guest)];

fn arb_buffer() -> impl Strategy<Value = PixelBuffer> {
    (1u32..=12, 1u32..=12).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<u8>(), (w * h * 4) as usize)
            .prop_map(move |data| PixelBuffer::new(w, h, data).unwrap())
    })
}

fn arb_request() -> impl Strategy<Value = FilterRequest> {
    prop_oneof![
        Just(FilterRequest::Grayscale),
        Just(FilterRequest::Invert),
        Just(FilterRequest::Sepia),
        any::<u8>().prop_map(|level| FilterRequest::Threshold { level }),
        (-255i32..=255).prop_map(|delta| FilterRequest::Brightness { delta }),
        (0u32..=6).prop_map(|radius| FilterRequest::Blur { radius }),
        Just(FilterRequest::Sobel),
    ]
}

fn alphas(buf: &PixelBuffer) -> Vec<u8> {
    buf.pixels().map(|p| p[3]).collect()
}

fn is_border(buf: &PixelBuffer, x: u32, y: u32) -> bool {
    x == 0 || y == 0 || x == buf.width() - 1 || y == buf.height() - 1
}

proptest! {
    #[test]
    fn host_and_guest_agree(src in arb_buffer(), request in arb_request()) {
        let h = run_host(&request, &src);
        let g = run_guest(&request, &src);
        prop_assert_eq!(h.first_difference(&g), None, "{} diverged", request);
    }

    #[test]
    fn alpha_is_never_modified(src in arb_buffer(), request in arb_request()) {
        for (name, f) in IMPLS {
            let out = f(&request, &src);
            prop_assert_eq!(alphas(&out), alphas(&src), "{} {}", name, request);
        }
    }

    #[test]
    fn invert_is_an_involution(src in arb_buffer()) {
        for (name, f) in IMPLS {
            let twice = f(&FilterRequest::Invert, &f(&FilterRequest::Invert, &src));
            prop_assert_eq!(&twice, &src, "{}", name);
        }
    }

    #[test]
    fn grayscale_equalizes_channels(src in arb_buffer()) {
        for (name, f) in IMPLS {
            let out = f(&FilterRequest::Grayscale, &src);
            for px in out.pixels() {
                prop_assert!(px[0] == px[1] && px[1] == px[2], "{} {:?}", name, px);
            }
        }
    }

    #[test]
    fn threshold_is_binary(src in arb_buffer(), level in any::<u8>()) {
        for (name, f) in IMPLS {
            let out = f(&FilterRequest::Threshold { level }, &src);
            for px in out.pixels() {
                prop_assert!(px[..3].iter().all(|&c| c == 0 || c == 255), "{} {:?}", name, px);
            }
        }
    }

    #[test]
    fn blur_radius_zero_is_identity(src in arb_buffer()) {
        for (name, f) in IMPLS {
            prop_assert_eq!(&f(&FilterRequest::Blur { radius: 0 }, &src), &src, "{}", name);
        }
    }

    #[test]
    fn blur_stays_within_channel_extremes(src in arb_buffer(), radius in 1u32..=4) {
        let lo: Vec<u8> = (0..3).map(|c| src.pixels().map(|p| p[c]).min().unwrap()).collect();
        let hi: Vec<u8> = (0..3).map(|c| src.pixels().map(|p| p[c]).max().unwrap()).collect();
        for (name, f) in IMPLS {
            let out = f(&FilterRequest::Blur { radius }, &src);
            for px in out.pixels() {
                for c in 0..3 {
                    prop_assert!(px[c] >= lo[c] && px[c] <= hi[c], "{} channel {}", name, c);
                }
            }
        }
    }

    #[test]
    fn sobel_preserves_border(src in arb_buffer()) {
        for (name, f) in IMPLS {
            let out = f(&FilterRequest::Sobel, &src);
            for y in 0..src.height() {
                for x in 0..src.width() {
                    if is_border(&src, x, y) {
                        prop_assert_eq!(out.pixel(x, y), src.pixel(x, y), "{} ({}, {})", name, x, y);
                    } else {
                        let px = out.pixel(x, y);
                        prop_assert!(px[0] == px[1] && px[1] == px[2], "{} ({}, {})", name, x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn brightness_agrees_for_any_delta(src in arb_buffer(), delta in any::<i32>()) {
        let request = FilterRequest::Brightness { delta };
        prop_assert_eq!(run_host(&request, &src).first_difference(&run_guest(&request, &src)), None);
    }

    #[test]
    fn brightness_zero_is_identity(src in arb_buffer()) {
        for (name, f) in IMPLS {
            prop_assert_eq!(&f(&FilterRequest::Brightness { delta: 0 }, &src), &src, "{}", name);
        }
    }
}

#[test]
fn white_square_inverts_to_black() {
    let src = PixelBuffer::filled(2, 2, [255, 255, 255, 255]).unwrap();
    for (name, f) in IMPLS {
        let out = f(&FilterRequest::Invert, &src);
        assert_eq!(out.as_bytes(), [0, 0, 0, 255].repeat(4).as_slice(), "{}", name);
    }
}

#[test]
fn brightness_clamps_at_zero() {
    let data = [
        100, 100, 100, 255, 200, 200, 200, 255, 50, 50, 50, 255,
    ]
    .to_vec();
    let src = PixelBuffer::new(1, 3, data).unwrap();
    let expected = [40, 40, 40, 255, 140, 140, 140, 255, 0, 0, 0, 255];
    for (name, f) in IMPLS {
        let out = f(&FilterRequest::Brightness { delta: -60 }, &src);
        assert_eq!(out.as_bytes(), expected.as_slice(), "{}", name);
    }
}

#[test]
fn brightness_extreme_deltas_saturate() {
    let src = PixelBuffer::filled(1, 1, [10, 10, 10, 255]).unwrap();
    for (name, f) in IMPLS {
        let up = f(&FilterRequest::Brightness { delta: i32::MAX }, &src);
        assert_eq!(up.pixel(0, 0), [255, 255, 255, 255], "{}", name);
        let down = f(&FilterRequest::Brightness { delta: i32::MIN }, &src);
        assert_eq!(down.pixel(0, 0), [0, 0, 0, 255], "{}", name);
    }
}

#[test]
fn threshold_boundary_at_128() {
    let below = PixelBuffer::filled(1, 1, [127, 127, 127, 255]).unwrap();
    let at = PixelBuffer::filled(1, 1, [128, 128, 128, 255]).unwrap();
    let request = FilterRequest::Threshold { level: 128 };
    for (name, f) in IMPLS {
        assert_eq!(f(&request, &below).pixel(0, 0), [0, 0, 0, 255], "{}", name);
        assert_eq!(f(&request, &at).pixel(0, 0), [255, 255, 255, 255], "{}", name);
    }
}

#[test]
fn agree_on_larger_image() {
    let src = PixelBuffer::from_fn(67, 41, |x, y| {
        let v = (x * 31 + y * 17) as u8;
        [v, v.wrapping_mul(3), 255 - v, (x ^ y) as u8]
    })
    .unwrap();
    let requests = [
        FilterRequest::Grayscale,
        FilterRequest::Sepia,
        FilterRequest::Threshold { level: 99 },
        FilterRequest::Brightness { delta: 37 },
        FilterRequest::Blur { radius: 5 },
        FilterRequest::Blur { radius: 200 },
        FilterRequest::Sobel,
    ];
    for request in requests {
        let h = run_host(&request, &src);
        let g = run_guest(&request, &src);
        assert_eq!(h.first_difference(&g), None, "{}", request);
    }
}
