//! Defocus blur disc.
//!
//! [`blur_disc_at_infinity`] uses the thin-lens approximation `f² / (N·s)`;
//! it is the formula the equivalence result reports. The exact form
//! `f² / (N·(s − f))` is kept as [`blur_disc_at_infinity_exact`] for callers
//! that want it. Mixing the two within one comparison breaks blur matching.

pub fn blur_disc_at_infinity(focal_length: f64, aperture: f64, subject_distance: f64) -> f64 {
    (focal_length * focal_length) / (aperture * subject_distance)
}

pub fn blur_disc_at_infinity_exact(focal_length: f64, aperture: f64, subject_distance: f64) -> f64 {
    (focal_length * focal_length) / (aperture * (subject_distance - focal_length))
}

/// Blur of a point at `background_distance` while focused at
/// `subject_distance`: `(f/N) · (f/(s − f)) · |1 − s/s_bg|`.
///
/// Works for foreground points too; zero when the point is in the focal plane.
pub fn blur_disc_at_distance(
    focal_length: f64,
    aperture: f64,
    subject_distance: f64,
    background_distance: f64,
) -> f64 {
    let entrance_pupil = focal_length / aperture;
    let magnification = focal_length / (subject_distance - focal_length);
    let distance_ratio = (1.0 - subject_distance / background_distance).abs();
    entrance_pupil * magnification * distance_ratio
}

/// Blur disc as a percentage of frame width.
pub fn blur_percent(blur_disc: f64, frame_width: f64) -> f64 {
    blur_disc / frame_width * 100.0
}
