//! Shared test utilities for the lens-equiv test suite.
//!
//! Provides the three reference formats most tests compare across, a compact
//! [`SourceState`] builder, and a float assertion that reports both values on
//! failure.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let formats = test_formats();
//! let cf = crop_factor_between(&full_frame(), &apsc(), EquivalenceMethod::Diagonal);
//! assert_close(cf, 0.625, 1e-9);
//! ```

use crate::optics::{Format, FormatWithDerived, with_derived};
use crate::types::SourceState;

// =========================================================================
// Reference formats
// =========================================================================

/// 36×24mm, id `full-frame`.
pub fn full_frame() -> FormatWithDerived {
    with_derived(Format::new("full-frame", "Full Frame", 36.0, 24.0))
}

/// 22.5×15mm, id `apsc`. Exactly 0.625× full frame on every axis.
pub fn apsc() -> FormatWithDerived {
    with_derived(Format::new("apsc", "APS-C", 22.5, 15.0))
}

/// 18×13.5mm, id `mft`. 4:3, so methods disagree against full frame.
pub fn mft() -> FormatWithDerived {
    with_derived(Format::new("mft", "Micro Four Thirds", 18.0, 13.5))
}

/// The three reference formats as a plain catalog slice.
pub fn test_formats() -> Vec<Format> {
    vec![full_frame().format, apsc().format, mft().format]
}

pub fn source_state(format_id: &str, focal_length: f64, aperture: f64, subject_distance: Option<f64>) -> SourceState {
    SourceState {
        format_id: format_id.to_string(),
        focal_length,
        aperture,
        subject_distance,
    }
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert `|actual − expected| ≤ tolerance`. Panics with both values.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual} (off by {})",
        (actual - expected).abs()
    );
}
