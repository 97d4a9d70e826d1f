//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what a photographer reads first: the lens on each side,
//! written the way it is engraved on the barrel (`50mm f/1.4`). Derived
//! optics follow as indented context lines. Raw engine numbers never reach
//! the terminal unformatted; everything goes through [`crate::display`].
//!
//! # Output Format
//!
//! ## Calc
//!
//! ```text
//! Full Frame 35mm → APS-C (Canon)
//!     Crop factor: 0.62×
//!     Situation 1: equivalent focal length and aperture
//!
//! Source: Full Frame 35mm (36×24mm)
//!     Lens: 50mm f/1.4
//!     Entrance pupil: 35.7mm
//!     Angle of view: 46.8° diagonal (39.6° × 27.0°)
//!     Circle of confusion: 0.029mm
//!     Focus: 2.0m
//!     Depth of field: 1.9m – 2.1m (total 130mm)
//!     Hyperfocal: 62.0m
//!     Background blur: 0.89mm (2.48% of frame width)
//!
//! Target: APS-C (Canon) (22.3×14.9mm)
//!     Lens: 31.0mm f/0.87
//!     ...
//! ```
//!
//! A pinned target value is marked on the lens line, e.g.
//! `Lens: 35mm f/1.57 (focal length fixed)`.
//!
//! ## Formats
//!
//! ```text
//! Small format
//!     four-thirds  Micro Four Thirds (17.3×13mm, crop 2.00×, CoC 0.014mm)
//!     ...
//!
//! Custom
//!     my-sensor  My Sensor (30×20mm, crop 1.20×, CoC 0.024mm)
//!
//! 25 formats
//! ```
//!
//! ## Table
//!
//! ```text
//! Full Frame 35mm 50mm f/1.4
//!     phone-1-2.55  Phone 1/2.55": 8.1mm f/0.23 (crop 0.16×)
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::calculate::{EquivalenceResult, SideResult};
use crate::catalog::FormatCatalog;
use crate::display::{
    format_aperture, format_aperture_calculated, format_blur_disc, format_blur_percent, format_coc,
    format_crop_factor, format_dimensions, format_distance, format_far_limit, format_focal_length, format_fov,
};
use crate::optics::{Format, with_derived};
use crate::units::Unit;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Which values on a side were typed in rather than solved for.
#[derive(Debug, Clone, Copy, Default)]
struct Pinned {
    focal_length: bool,
    aperture: bool,
}

/// `Source: Full Frame 35mm (36×24mm)`
fn side_header(label: &str, side: &SideResult, unit: Unit) -> String {
    format!(
        "{label}: {} ({})",
        side.format.format.name,
        format_dimensions(side.format.width(), side.format.height(), unit)
    )
}

/// `50mm f/1.4`, with a solved aperture shown at two decimals.
fn lens_label(focal_length: f64, aperture: f64, aperture_entered: bool) -> String {
    let aperture = if aperture_entered {
        format_aperture(aperture)
    } else {
        format_aperture_calculated(aperture)
    };
    format!("{} {aperture}", format_focal_length(focal_length))
}

fn side_lines(label: &str, side: &SideResult, is_source: bool, pinned: Pinned, unit: Unit) -> Vec<String> {
    let mut lines = vec![side_header(label, side, unit)];

    let aperture_entered = is_source || pinned.aperture;
    let mut lens = format!(
        "{}Lens: {}",
        indent(1),
        lens_label(side.focal_length, side.aperture, aperture_entered)
    );
    if pinned.focal_length {
        lens.push_str(" (focal length fixed)");
    } else if pinned.aperture {
        lens.push_str(" (aperture fixed)");
    }
    lines.push(lens);

    lines.push(format!(
        "{}Entrance pupil: {}",
        indent(1),
        format_focal_length(side.entrance_pupil)
    ));
    lines.push(format!(
        "{}Angle of view: {} diagonal ({} × {})",
        indent(1),
        format_fov(side.aov.diagonal),
        format_fov(side.aov.horizontal),
        format_fov(side.aov.vertical)
    ));
    lines.push(format!(
        "{}Circle of confusion: {}",
        indent(1),
        format_coc(side.format.coc())
    ));

    if let Some(focus) = &side.focus {
        lines.push(format!(
            "{}Focus: {}",
            indent(1),
            format_distance(Some(focus.subject_distance), unit)
        ));
        lines.push(format!(
            "{}Depth of field: {} – {} (total {})",
            indent(1),
            format_distance(Some(focus.dof.near_limit), unit),
            format_far_limit(focus.dof.far_limit, unit),
            format_far_limit(focus.dof.total, unit)
        ));
        lines.push(format!(
            "{}Hyperfocal: {}",
            indent(1),
            format_distance(Some(focus.dof.hyperfocal), unit)
        ));
        lines.push(format!(
            "{}Background blur: {} ({} of frame width)",
            indent(1),
            format_blur_disc(focus.blur_disc),
            format_blur_percent(focus.blur_percent)
        ));
    }
    lines
}

// ============================================================================
// Calc
// ============================================================================

pub fn format_equivalence_output(result: &EquivalenceResult, unit: Unit) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} → {}",
            result.source.format.format.name, result.target.format.format.name
        ),
        format!("{}Crop factor: {}", indent(1), format_crop_factor(result.crop_factor)),
        format!(
            "{}Situation {}: {}",
            indent(1),
            result.situation.number(),
            result.situation.describe()
        ),
        String::new(),
    ];
    lines.extend(side_lines("Source", &result.source, true, Pinned::default(), unit));
    lines.push(String::new());
    lines.extend(side_lines(
        "Target",
        &result.target,
        false,
        Pinned {
            focal_length: result.is_target_focal_overridden,
            aperture: result.is_target_aperture_overridden,
        },
        unit,
    ));
    lines
}

pub fn print_equivalence_output(result: &EquivalenceResult, unit: Unit) {
    for line in format_equivalence_output(result, unit) {
        println!("{}", line);
    }
}

// ============================================================================
// Formats
// ============================================================================

/// `four-thirds  Micro Four Thirds (17.3×13mm, crop 2.00×, CoC 0.014mm)`
fn format_line(format: &Format, unit: Unit) -> String {
    let derived = with_derived(format.clone());
    format!(
        "{}{}  {} ({}, crop {}, CoC {})",
        indent(1),
        format.id,
        format.name,
        format_dimensions(format.width, format.height, unit),
        format_crop_factor(derived.derived.crop_factor),
        format_coc(derived.coc())
    )
}

pub fn format_catalog_output(catalog: &FormatCatalog, unit: Unit) -> Vec<String> {
    let grouped = catalog.grouped();
    let mut lines = Vec::new();

    for (category, formats) in &grouped.groups {
        lines.push(category.label().to_string());
        lines.extend(formats.iter().map(|f| format_line(f, unit)));
        lines.push(String::new());
    }
    if !grouped.custom.is_empty() {
        lines.push("Custom".to_string());
        lines.extend(grouped.custom.iter().map(|f| format_line(f, unit)));
        lines.push(String::new());
    }

    let n = catalog.len();
    lines.push(format!("{} format{}", n, if n == 1 { "" } else { "s" }));
    lines
}

pub fn print_catalog_output(catalog: &FormatCatalog, unit: Unit) {
    for line in format_catalog_output(catalog, unit) {
        println!("{}", line);
    }
}

// ============================================================================
// Table
// ============================================================================

/// One source against many targets. All rows share the same source, so the
/// header is taken from the first.
pub fn format_table_output(rows: &[EquivalenceResult], unit: Unit) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut lines = vec![format!(
        "{} {}",
        first.source.format.format.name,
        lens_label(first.source.focal_length, first.source.aperture, true)
    )];

    for row in rows {
        let target = &row.target;
        let mut line = format!(
            "{}{}  {}: {} (crop {})",
            indent(1),
            target.format.format.id,
            target.format.format.name,
            lens_label(
                target.focal_length,
                target.aperture,
                row.is_target_aperture_overridden
            ),
            format_crop_factor(row.crop_factor)
        );
        if let Some(focus) = &target.focus {
            line.push_str(&format!(", DOF {}", format_far_limit(focus.dof.total, unit)));
        }
        lines.push(line);
    }
    lines
}

pub fn print_table_output(rows: &[EquivalenceResult], unit: Unit) {
    for line in format_table_output(rows, unit) {
        println!("{}", line);
    }
}
