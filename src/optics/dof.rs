//! Depth of field.
//!
//! All distances are measured from the lens in mm. The far limit becomes
//! infinite once the subject is at or beyond `H + f`; that case is returned as
//! `None` rather than a large sentinel so callers can't mistake it for a
//! real distance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DofResult {
    /// mm
    pub near_limit: f64,
    /// mm; `None` = infinity.
    pub far_limit: Option<f64>,
    /// mm; `None` exactly when `far_limit` is `None`.
    pub total: Option<f64>,
    /// mm
    pub hyperfocal: f64,
}

impl DofResult {
    pub fn is_infinite(&self) -> bool {
        self.far_limit.is_none()
    }
}

/// `H = f² / (N·c) + f`
pub fn hyperfocal(focal_length: f64, aperture: f64, coc: f64) -> f64 {
    (focal_length * focal_length) / (aperture * coc) + focal_length
}

/// `H·s / (H + s − f)`
pub fn near_limit(hyperfocal: f64, subject_distance: f64, focal_length: f64) -> f64 {
    (hyperfocal * subject_distance) / (hyperfocal + subject_distance - focal_length)
}

/// `H·s / (H − s + f)`, or `None` once the denominator reaches zero.
pub fn far_limit(hyperfocal: f64, subject_distance: f64, focal_length: f64) -> Option<f64> {
    let denominator = hyperfocal - subject_distance + focal_length;
    if denominator <= 0.0 {
        return None;
    }
    Some((hyperfocal * subject_distance) / denominator)
}

pub fn total_dof(near_limit: f64, far_limit: Option<f64>) -> Option<f64> {
    far_limit.map(|far| far - near_limit)
}

pub fn depth_of_field(focal_length: f64, aperture: f64, coc: f64, subject_distance: f64) -> DofResult {
    let h = hyperfocal(focal_length, aperture, coc);
    let near = near_limit(h, subject_distance, focal_length);
    let far = far_limit(h, subject_distance, focal_length);
    DofResult {
        near_limit: near,
        far_limit: far,
        total: total_dof(near, far),
        hyperfocal: h,
    }
}
