//! Number formatting for presentation.
//!
//! The engine returns raw millimetres, f-numbers and degrees. These helpers
//! apply the display policy: how many decimals each quantity gets, when a
//! distance switches from millimetres to metres, and when it is shown as
//! infinity. Nothing here feeds back into a calculation.
//!
//! | Quantity | Example |
//! |---|---|
//! | Focal length | `50mm`, `31.3mm`, `32.0mm` |
//! | Aperture | `f/1.4` (entered), `f/0.88` (solved) |
//! | Distance | `850mm`, `2.5m`, `150m`, `∞`, `—` |
//! | Field of view | `39.6°` |
//! | Blur disc | `0.89mm`, `2.48%` |
//! | Circle of confusion | `0.029mm` |
//! | Crop factor | `0.63×` |

use crate::units::{Unit, mm_to_inches};

/// Distances at or past 10 km are shown as infinity.
pub const INFINITY_THRESHOLD_MM: f64 = 10_000_000.0;

/// Placeholder for a value that is not available.
pub const PLACEHOLDER: &str = "—";

/// Focal length: whole numbers as-is, anything else with one decimal.
pub fn format_focal_length(mm: f64) -> String {
    if mm.fract() == 0.0 {
        format!("{mm}mm")
    } else {
        format!("{mm:.1}mm")
    }
}

/// Aperture as entered by the user: `f/` plus one decimal.
pub fn format_aperture(f_number: f64) -> String {
    format!("f/{f_number:.1}")
}

/// Solved aperture: up to two decimals, one when the second would be zero.
pub fn format_aperture_calculated(f_number: f64) -> String {
    let rounded = (f_number * 100.0).round() / 100.0;
    if ((rounded * 10.0).round() / 10.0 - rounded).abs() < 1e-9 {
        format!("f/{rounded:.1}")
    } else {
        format!("f/{rounded:.2}")
    }
}

/// Distance with automatic unit selection.
///
/// Metric: below 1 m in whole mm, below 100 m in metres with one decimal,
/// beyond that in whole metres. Imperial: below 1 ft in whole inches,
/// otherwise feet with one decimal. Anything at or past 10 km shows as `∞`;
/// `None` shows the placeholder.
pub fn format_distance(mm: Option<f64>, unit: Unit) -> String {
    let Some(mm) = mm else {
        return PLACEHOLDER.to_string();
    };
    if mm >= INFINITY_THRESHOLD_MM {
        return "∞".to_string();
    }
    match unit {
        Unit::Mm => {
            if mm < 1000.0 {
                return format!("{}mm", mm.round());
            }
            let meters = mm / 1000.0;
            if meters < 100.0 {
                format!("{meters:.1}m")
            } else {
                format!("{}m", meters.round())
            }
        }
        Unit::Inches => {
            let inches = mm_to_inches(mm);
            if inches < 12.0 {
                format!("{}in", inches.round())
            } else {
                format!("{:.1}ft", inches / 12.0)
            }
        }
    }
}

/// Format dimensions as `36×24mm` (or inches with two decimals).
pub fn format_dimensions(width_mm: f64, height_mm: f64, unit: Unit) -> String {
    match unit {
        Unit::Mm => format!("{}×{}mm", trim_number(width_mm, 2), trim_number(height_mm, 2)),
        Unit::Inches => format!(
            "{}×{}in",
            trim_number(mm_to_inches(width_mm), 2),
            trim_number(mm_to_inches(height_mm), 2)
        ),
    }
}

/// Far limit or total depth of field, where `None` means infinite.
pub fn format_far_limit(mm: Option<f64>, unit: Unit) -> String {
    match mm {
        Some(_) => format_distance(mm, unit),
        None => "∞".to_string(),
    }
}

pub fn format_fov(degrees: f64) -> String {
    format!("{degrees:.1}°")
}

pub fn format_blur_disc(mm: f64) -> String {
    format!("{mm:.2}mm")
}

pub fn format_blur_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}

pub fn format_coc(mm: f64) -> String {
    format!("{mm:.3}mm")
}

pub fn format_crop_factor(factor: f64) -> String {
    format!("{factor:.2}×")
}

/// Round to at most `max_decimals` and drop trailing zeros.
fn trim_number(value: f64, max_decimals: usize) -> String {
    let s = format!("{value:.max_decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
