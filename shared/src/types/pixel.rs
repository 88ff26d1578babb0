//! RGBA pixel buffer
//!
//! Row-major, four interleaved 8-bit channels per pixel (red, green, blue,
//! alpha). The byte length always equals `width * height * 4`; constructors
//! reject anything else and mutable access never changes the length.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Number of interleaved channels per pixel
pub const CHANNELS: usize = 4;

/// Channel offsets within a pixel
pub const RED: usize = 0;
pub const GREEN: usize = 1;
pub const BLUE: usize = 2;
pub const ALPHA: usize = 3;

/// A validated, owned RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPixelBuffer")]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Wire form of [`PixelBuffer`]; deserialized values go through
/// [`PixelBuffer::new`] before they can be used.
#[derive(Deserialize)]
struct RawPixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TryFrom<RawPixelBuffer> for PixelBuffer {
    type Error = ValidationError;

    fn try_from(raw: RawPixelBuffer) -> Result<Self, Self::Error> {
        PixelBuffer::new(raw.width, raw.height, raw.data)
    }
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, validating the length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ValidationError> {
        let expected = Self::required_len(width, height)?;
        if data.len() != expected {
            return Err(ValidationError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ValidationError> {
        let len = Self::required_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self, ValidationError>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let len = Self::required_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Byte length required for a `width x height` RGBA image.
    ///
    /// Fails for zero dimensions and for sizes that do not fit the 32-bit
    /// offsets used across the module boundary.
    pub fn required_len(width: u32, height: u32) -> Result<usize, ValidationError> {
        if width == 0 || height == 0 {
            return Err(ValidationError::EmptyDimensions { width, height });
        }
        let len = (width as u64) * (height as u64) * CHANNELS as u64;
        if len > u32::MAX as u64 {
            return Err(ValidationError::TooLarge { width, height });
        }
        Ok(len as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total byte length (`width * height * 4`)
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the samples. The slice cannot be resized, so the
    /// length invariant is preserved.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} image",
            x,
            y,
            self.width,
            self.height
        );
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Iterate over pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Index of the first byte of pixel `(x, y)`
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// First pixel that differs from `other`, if any. Buffers of different
    /// dimensions report `(0, 0)`.
    pub fn first_difference(&self, other: &PixelBuffer) -> Option<(u32, u32)> {
        if self.width != other.width || self.height != other.height {
            return Some((0, 0));
        }
        self.pixels()
            .zip(other.pixels())
            .position(|(a, b)| a != b)
            .map(|i| {
                let i = i as u32;
                (i % self.width, i / self.width)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());

        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 4, vec![]),
            Err(ValidationError::EmptyDimensions { .. })
        ));
        assert!(PixelBuffer::filled(3, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn test_too_large_rejected() {
        assert!(matches!(
            PixelBuffer::required_len(65_536, 65_536),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_filled_and_pixel() {
        let buf = PixelBuffer::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buf.byte_len(), 24);
        assert_eq!(buf.pixel_count(), 6);
        assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(buf.pixel(1, 0), [1, 0, 0, 255]);
        assert_eq!(buf.pixel(0, 1), [0, 1, 0, 255]);
        assert_eq!(buf.offset(0, 1), 12);
    }

    #[test]
    fn test_first_difference() {
        let a = PixelBuffer::filled(2, 2, [9, 9, 9, 255]).unwrap();
        let mut b = a.clone();
        assert_eq!(a.first_difference(&b), None);

        let off = b.offset(1, 1);
        b.as_bytes_mut()[off] = 0;
        assert_eq!(a.first_difference(&b), Some((1, 1)));
    }

    #[test]
    fn test_deserialize_validates_length() {
        let err = serde_json::from_str::<PixelBuffer>(r#"{"width":3,"height":3,"data":[1,2,3,4]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("length mismatch"), "{}", err);

        let raw = RawPixelBuffer {
            width: 3,
            height: 3,
            data: vec![1, 2, 3, 4],
        };
        assert!(matches!(
            PixelBuffer::try_from(raw),
            Err(ValidationError::LengthMismatch {
                expected: 36,
                actual: 4,
                ..
            })
        ));

        let err = serde_json::from_str::<PixelBuffer>(r#"{"width":0,"height":1,"data":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("non-zero"), "{}", err);
    }

    #[test]
    fn test_serde_round_trip_keeps_invariant() {
        let buf = PixelBuffer::filled(2, 1, [1, 2, 3, 4]).unwrap();
        let json = serde_json::to_string(&buf).unwrap();
        let back: PixelBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buf);
        assert_eq!(back.byte_len(), 8);
    }
}
