//! Sensor/film formats and the metrics derived from their dimensions.
//!
//! A [`Format`] is only a name and a width × height in millimetres. Everything
//! else the engine needs (diagonal, area, circle of confusion, crop factor
//! relative to 35mm full frame) is a pure function of those two numbers and is
//! bundled alongside in [`FormatWithDerived`].

use serde::{Deserialize, Serialize};

/// Diagonal of the 36×24mm full-frame reference, in mm.
pub const FULL_FRAME_DIAGONAL: f64 = 43.27;

/// The circle of confusion is taken as the diagonal over this divisor.
pub const COC_DIVISOR: f64 = 1500.0;

/// An image format: a sensor or film gate size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub id: String,
    pub name: String,
    /// Width in mm.
    pub width: f64,
    /// Height in mm.
    pub height: f64,
    /// User-defined rather than a built-in preset.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_custom: bool,
}

impl Format {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            is_custom: false,
        }
    }

    pub fn custom(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            is_custom: true,
            ..Self::new(id, name, width, height)
        }
    }
}

/// Metrics derived from a format's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormatDerived {
    /// mm
    pub diagonal: f64,
    /// mm²
    pub area: f64,
    /// width / height
    pub aspect_ratio: f64,
    /// Circle of confusion, mm.
    pub coc: f64,
    /// Crop factor relative to 35mm full frame. Not the same quantity as
    /// the target/source scaling factor in [`super::equivalence`].
    pub crop_factor: f64,
}

/// A format together with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatWithDerived {
    #[serde(flatten)]
    pub format: Format,
    #[serde(flatten)]
    pub derived: FormatDerived,
}

impl FormatWithDerived {
    pub fn width(&self) -> f64 {
        self.format.width
    }

    pub fn height(&self) -> f64 {
        self.format.height
    }

    pub fn diagonal(&self) -> f64 {
        self.derived.diagonal
    }

    pub fn coc(&self) -> f64 {
        self.derived.coc
    }
}

pub fn diagonal(width: f64, height: f64) -> f64 {
    (width * width + height * height).sqrt()
}

pub fn area(width: f64, height: f64) -> f64 {
    width * height
}

pub fn aspect_ratio(width: f64, height: f64) -> f64 {
    width / height
}

pub fn circle_of_confusion(diagonal: f64) -> f64 {
    diagonal / COC_DIVISOR
}

/// Crop factor of a format with the given diagonal, relative to full frame.
pub fn format_crop_factor(diagonal: f64) -> f64 {
    FULL_FRAME_DIAGONAL / diagonal
}

/// Compute all derived metrics for a format.
///
/// Zero or negative dimensions produce non-finite values; rejecting them is
/// the caller's job.
pub fn derive_format(format: &Format) -> FormatDerived {
    let d = diagonal(format.width, format.height);
    FormatDerived {
        diagonal: d,
        area: area(format.width, format.height),
        aspect_ratio: aspect_ratio(format.width, format.height),
        coc: circle_of_confusion(d),
        crop_factor: format_crop_factor(d),
    }
}

pub fn with_derived(format: Format) -> FormatWithDerived {
    let derived = derive_format(&format);
    FormatWithDerived { format, derived }
}
