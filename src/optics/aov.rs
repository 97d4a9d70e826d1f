//! Angle of view.

use serde::{Deserialize, Serialize};

use super::format::FormatWithDerived;
use crate::units::radians_to_degrees;

/// Field of view across each axis of a format, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleOfView {
    pub horizontal: f64,
    pub vertical: f64,
    pub diagonal: f64,
}

/// Angle of view across one dimension: `2·atan(d / 2f)`, in degrees.
pub fn aov_for_dimension(dimension: f64, focal_length: f64) -> f64 {
    radians_to_degrees(2.0 * (dimension / (2.0 * focal_length)).atan())
}

pub fn angle_of_view(format: &FormatWithDerived, focal_length: f64) -> AngleOfView {
    AngleOfView {
        horizontal: aov_for_dimension(format.width(), focal_length),
        vertical: aov_for_dimension(format.height(), focal_length),
        diagonal: aov_for_dimension(format.diagonal(), focal_length),
    }
}
