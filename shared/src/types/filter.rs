//! Filter kinds and requests
//!
//! A request names one of the seven filters together with the parameters
//! that filter uses. Parameters belonging to other kinds are not carried.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest magnitude accepted for a brightness delta
pub const MAX_BRIGHTNESS_DELTA: i32 = 255;

/// Filter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Invert,
    Sepia,
    Threshold,
    Brightness,
    Blur,
    Sobel,
}

impl FilterKind {
    /// Every filter kind, in the order they are benchmarked.
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Grayscale,
        FilterKind::Invert,
        FilterKind::Sepia,
        FilterKind::Threshold,
        FilterKind::Brightness,
        FilterKind::Blur,
        FilterKind::Sobel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Invert => "invert",
            FilterKind::Sepia => "sepia",
            FilterKind::Threshold => "threshold",
            FilterKind::Brightness => "brightness",
            FilterKind::Blur => "blur",
            FilterKind::Sobel => "sobel",
        }
    }

    /// Name of the filter module export implementing this kind
    pub fn export_name(self) -> &'static str {
        match self {
            FilterKind::Grayscale => "process_grayscale",
            FilterKind::Invert => "process_invert",
            FilterKind::Sepia => "process_sepia",
            FilterKind::Threshold => "process_threshold",
            FilterKind::Brightness => "process_brightness",
            FilterKind::Blur => "process_blur",
            FilterKind::Sobel => "process_sobel",
        }
    }

    /// Whether the filter reads neighbouring pixels
    pub fn is_spatial(self) -> bool {
        matches!(self, FilterKind::Blur | FilterKind::Sobel)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FilterKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grayscale" | "greyscale" => Ok(FilterKind::Grayscale),
            "invert" => Ok(FilterKind::Invert),
            "sepia" => Ok(FilterKind::Sepia),
            "threshold" => Ok(FilterKind::Threshold),
            "brightness" => Ok(FilterKind::Brightness),
            "blur" => Ok(FilterKind::Blur),
            "sobel" => Ok(FilterKind::Sobel),
            _ => Err(ValidationError::UnknownFilter(s.to_string())),
        }
    }
}

/// Full parameter set, as collected from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Threshold level in [0, 255]
    pub threshold: u8,

    /// Brightness delta in [-255, 255]
    pub brightness: i32,

    /// Box blur radius in pixels
    pub blur_radius: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            threshold: 128,
            brightness: 0,
            blur_radius: 1,
        }
    }
}

impl FilterParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(-MAX_BRIGHTNESS_DELTA..=MAX_BRIGHTNESS_DELTA).contains(&self.brightness) {
            return Err(ValidationError::BrightnessOutOfRange(self.brightness));
        }
        Ok(())
    }
}

/// A single filter invocation with its kind-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "RawFilterRequest")]
pub enum FilterRequest {
    Grayscale,
    Invert,
    Sepia,
    Threshold { level: u8 },
    Brightness { delta: i32 },
    Blur { radius: u32 },
    Sobel,
}

/// Wire form of [`FilterRequest`], checked by [`FilterRequest::validate`]
/// on the way in.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawFilterRequest {
    Grayscale,
    Invert,
    Sepia,
    Threshold { level: u8 },
    Brightness { delta: i32 },
    Blur { radius: u32 },
    Sobel,
}

impl TryFrom<RawFilterRequest> for FilterRequest {
    type Error = ValidationError;

    fn try_from(raw: RawFilterRequest) -> Result<Self, Self::Error> {
        let request = match raw {
            RawFilterRequest::Grayscale => FilterRequest::Grayscale,
            RawFilterRequest::Invert => FilterRequest::Invert,
            RawFilterRequest::Sepia => FilterRequest::Sepia,
            RawFilterRequest::Threshold { level } => FilterRequest::Threshold { level },
            RawFilterRequest::Brightness { delta } => FilterRequest::Brightness { delta },
            RawFilterRequest::Blur { radius } => FilterRequest::Blur { radius },
            RawFilterRequest::Sobel => FilterRequest::Sobel,
        };
        request.validate()?;
        Ok(request)
    }
}

impl FilterRequest {
    /// Build a request for `kind`, taking only the parameters it uses.
    pub fn from_parts(kind: FilterKind, params: &FilterParams) -> Result<Self, ValidationError> {
        let request = match kind {
            FilterKind::Grayscale => FilterRequest::Grayscale,
            FilterKind::Invert => FilterRequest::Invert,
            FilterKind::Sepia => FilterRequest::Sepia,
            FilterKind::Threshold => FilterRequest::Threshold {
                level: params.threshold,
            },
            FilterKind::Brightness => FilterRequest::brightness(params.brightness)?,
            FilterKind::Blur => FilterRequest::Blur {
                radius: params.blur_radius,
            },
            FilterKind::Sobel => FilterRequest::Sobel,
        };
        Ok(request)
    }

    /// Brightness request with a range-checked delta.
    pub fn brightness(delta: i32) -> Result<Self, ValidationError> {
        if !(-MAX_BRIGHTNESS_DELTA..=MAX_BRIGHTNESS_DELTA).contains(&delta) {
            return Err(ValidationError::BrightnessOutOfRange(delta));
        }
        Ok(FilterRequest::Brightness { delta })
    }

    /// Check parameters that the variant types alone do not bound.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            FilterRequest::Brightness { delta } => Self::brightness(delta).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterRequest::Grayscale => FilterKind::Grayscale,
            FilterRequest::Invert => FilterKind::Invert,
            FilterRequest::Sepia => FilterKind::Sepia,
            FilterRequest::Threshold { .. } => FilterKind::Threshold,
            FilterRequest::Brightness { .. } => FilterKind::Brightness,
            FilterRequest::Blur { .. } => FilterKind::Blur,
            FilterRequest::Sobel => FilterKind::Sobel,
        }
    }
}

impl fmt::Display for FilterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRequest::Threshold { level } => write!(f, "threshold(level={})", level),
            FilterRequest::Brightness { delta } => write!(f, "brightness(delta={})", delta),
            FilterRequest::Blur { radius } => write!(f, "blur(radius={})", radius),
            other => f.write_str(other.kind().name()),
        }
    }
}
