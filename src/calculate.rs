//! End-to-end equivalence calculation.
//!
//! [`calculate_equivalence`] is the single entry point the CLI (or any other
//! front end) calls after every change to the session. It is one stateless
//! pass:
//!
//! ```text
//! format ids ──lookup──▶ Format ──derive──▶ FormatWithDerived
//!                                                 │
//!                  scaling factor ◀───────────────┤
//!                        │                        │
//!   override + match mode ──▶ resolve_target ──▶ target f, N
//!                                                 │
//!   subject distance ──rescale for framing──▶ target s
//!                                                 │
//!                       side_result × 2 ──▶ EquivalenceResult
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optics::{
    AngleOfView, DofResult, Format, FormatWithDerived, Situation, angle_of_view, blur_disc_at_infinity,
    blur_percent, crop_factor_between, depth_of_field, entrance_pupil, resolve_target, target_subject_distance,
    with_derived,
};
use crate::types::{Options, SourceState, TargetState};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Format not found: {0}")]
    FormatNotFound(String),
}

/// Focus-dependent results. Present only when a subject distance is known,
/// and then always all together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusResult {
    /// mm; rescaled for framing on the target side.
    pub subject_distance: f64,
    pub dof: DofResult,
    /// Blur disc for a background at infinity, mm.
    pub blur_disc: f64,
    /// Blur disc as a percentage of frame width.
    pub blur_percent: f64,
}

/// Everything computed for one side of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideResult {
    pub format: FormatWithDerived,
    /// mm
    pub focal_length: f64,
    /// f-number
    pub aperture: f64,
    /// mm
    pub entrance_pupil: f64,
    pub aov: AngleOfView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceResult {
    pub source: SideResult,
    pub target: SideResult,
    /// Target/source scaling factor under the chosen method.
    pub crop_factor: f64,
    pub situation: Situation,
    pub is_target_focal_overridden: bool,
    pub is_target_aperture_overridden: bool,
}

/// Borrowed inputs for one calculation. `formats` is treated as an immutable
/// snapshot for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct EquivalenceInput<'a> {
    pub source: &'a SourceState,
    pub target: &'a TargetState,
    pub options: &'a Options,
    pub formats: &'a [Format],
}

/// Build one side's result. DOF and blur are only computed when
/// `subject_distance` is given.
pub fn side_result(
    format: FormatWithDerived,
    focal_length: f64,
    aperture: f64,
    subject_distance: Option<f64>,
) -> SideResult {
    let focus = subject_distance.map(|s| {
        let blur = blur_disc_at_infinity(focal_length, aperture, s);
        FocusResult {
            subject_distance: s,
            dof: depth_of_field(focal_length, aperture, format.coc(), s),
            blur_disc: blur,
            blur_percent: blur_percent(blur, format.width()),
        }
    });
    SideResult {
        entrance_pupil: entrance_pupil(focal_length, aperture),
        aov: angle_of_view(&format, focal_length),
        format,
        focal_length,
        aperture,
        focus,
    }
}

pub fn calculate_equivalence(input: &EquivalenceInput<'_>) -> Result<EquivalenceResult, CalcError> {
    let EquivalenceInput {
        source,
        target,
        options,
        formats,
    } = *input;

    let source_format = with_derived(find_format(formats, &source.format_id)?.clone());
    let target_format = with_derived(find_format(formats, &target.format_id)?.clone());

    let crop_factor = crop_factor_between(&source_format, &target_format, options.equivalence_method);

    let resolved = resolve_target(
        source.focal_length,
        source.aperture,
        &source_format,
        &target_format,
        crop_factor,
        &target.override_,
        options.match_mode,
    );

    let target_distance = source
        .subject_distance
        .map(|s| target_subject_distance(s, source.focal_length, resolved.focal_length));

    let source_result = side_result(
        source_format,
        source.focal_length,
        source.aperture,
        source.subject_distance,
    );
    let target_result = side_result(target_format, resolved.focal_length, resolved.aperture, target_distance);

    Ok(EquivalenceResult {
        source: source_result,
        target: target_result,
        crop_factor,
        situation: resolved.situation,
        is_target_focal_overridden: target.override_.focal_length().is_some(),
        is_target_aperture_overridden: target.override_.aperture().is_some(),
    })
}

fn find_format<'a>(formats: &'a [Format], id: &str) -> Result<&'a Format, CalcError> {
    formats
        .iter()
        .find(|f| f.id == id)
        .ok_or_else(|| CalcError::FormatNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assert_close, source_state, test_formats};
    use crate::types::{EquivalenceMethod, MatchMode, TargetOverride};

    fn run(
        source: &SourceState,
        target: &TargetState,
        options: &Options,
    ) -> Result<EquivalenceResult, CalcError> {
        let formats = test_formats();
        calculate_equivalence(&EquivalenceInput {
            source,
            target,
            options,
            formats: &formats,
        })
    }

    fn with_mode(match_mode: MatchMode) -> Options {
        Options {
            match_mode,
            ..Options::default()
        }
    }

    // =========================================================================
    // side_result
    // =========================================================================

    #[test]
    fn side_without_distance_has_no_focus() {
        let ff = with_derived(Format::new("full-frame", "Full Frame", 36.0, 24.0));
        let side = side_result(ff, 50.0, 1.4, None);
        assert_eq!(side.format.format.id, "full-frame");
        assert_close(side.entrance_pupil, 35.71, 0.01);
        assert_close(side.aov.horizontal, 39.6, 0.05);
        assert!(side.focus.is_none());
    }

    #[test]
    fn side_with_distance_has_full_focus() {
        let ff = with_derived(Format::new("full-frame", "Full Frame", 36.0, 24.0));
        let focus = side_result(ff, 50.0, 1.4, Some(2000.0)).focus.unwrap();
        assert_eq!(focus.subject_distance, 2000.0);
        assert!(focus.dof.near_limit < 2000.0);
        assert!(focus.dof.far_limit.unwrap() > 2000.0);
        assert_close(focus.blur_disc, 0.893, 1e-3);
        assert_close(focus.blur_percent, 2.48, 1e-2);
    }

    // =========================================================================
    // Situation 1
    // =========================================================================

    #[test]
    fn default_ff_to_apsc() {
        let r = run(
            &source_state("full-frame", 50.0, 1.4, None),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap();
        assert_close(r.crop_factor, 0.625, 1e-9);
        assert_close(r.target.focal_length, 31.25, 1e-9);
        assert_close(r.target.aperture, 0.875, 1e-9);
        assert_eq!(r.situation, Situation::Default);
        assert!(!r.is_target_focal_overridden);
        assert!(!r.is_target_aperture_overridden);
    }

    #[test]
    fn default_preserves_diagonal_aov() {
        let r = run(
            &source_state("full-frame", 50.0, 2.0, None),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap();
        assert_close(r.source.aov.diagonal, r.target.aov.diagonal, 1e-9);
    }

    #[test]
    fn default_preserves_entrance_pupil() {
        let r = run(
            &source_state("full-frame", 85.0, 1.8, None),
            &TargetState::new("mft"),
            &Options::default(),
        )
        .unwrap();
        assert_close(r.source.entrance_pupil, r.target.entrance_pupil, 1e-9);
    }

    #[test]
    fn default_rescales_subject_distance() {
        let r = run(
            &source_state("full-frame", 50.0, 1.4, Some(2000.0)),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap();
        let ratio = r.target.focal_length / r.source.focal_length;
        assert_close(r.target.focus.unwrap().subject_distance, 2000.0 * ratio, 1e-9);
        assert!(r.source.focus.is_some());
    }

    #[test]
    fn default_keeps_absolute_blur_disc() {
        let r = run(
            &source_state("full-frame", 50.0, 2.8, Some(3000.0)),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap();
        let (s, t) = (r.source.focus.unwrap(), r.target.focus.unwrap());
        // f, N and s all scale by k, so f²/(N·s) is unchanged.
        assert_close(s.blur_disc, t.blur_disc, 1e-9);
        assert!(t.blur_percent > s.blur_percent);
    }

    #[test]
    fn no_distance_means_no_focus_on_either_side() {
        let r = run(
            &source_state("full-frame", 50.0, 1.4, None),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap();
        assert!(r.source.focus.is_none());
        assert!(r.target.focus.is_none());
    }

    // =========================================================================
    // Situations 3–6
    // =========================================================================

    #[test]
    fn situation_3_matches_blur_percent() {
        let r = run(
            &source_state("full-frame", 50.0, 1.4, Some(2000.0)),
            &TargetState::new("apsc").with_override(TargetOverride::FocalLength(35.0)),
            &with_mode(MatchMode::BlurDisc),
        )
        .unwrap();
        assert_eq!(r.target.focal_length, 35.0);
        assert_eq!(r.situation, Situation::FocalMatchBlur);
        assert!(r.is_target_focal_overridden);
        assert!(!r.is_target_aperture_overridden);
        assert_close(
            r.source.focus.unwrap().blur_percent,
            r.target.focus.unwrap().blur_percent,
            0.05,
        );
    }

    #[test]
    fn situation_4_scales_aperture_by_diagonal() {
        let r = run(
            &source_state("full-frame", 50.0, 2.8, Some(2000.0)),
            &TargetState::new("apsc").with_override(TargetOverride::FocalLength(35.0)),
            &with_mode(MatchMode::Dof),
        )
        .unwrap();
        assert_eq!(r.target.focal_length, 35.0);
        assert_eq!(r.situation, Situation::FocalMatchDof);
        assert_close(r.target.aperture, 2.8 * 1.6, 1e-9);
    }

    #[test]
    fn situation_5_keeps_pinned_aperture() {
        let r = run(
            &source_state("full-frame", 50.0, 1.4, Some(2000.0)),
            &TargetState::new("apsc").with_override(TargetOverride::Aperture(1.4)),
            &with_mode(MatchMode::BlurDisc),
        )
        .unwrap();
        assert_eq!(r.target.aperture, 1.4);
        assert_eq!(r.situation, Situation::ApertureMatchBlur);
        assert!(!r.is_target_focal_overridden);
        assert!(r.is_target_aperture_overridden);
        assert_close(
            r.source.focus.unwrap().blur_percent,
            r.target.focus.unwrap().blur_percent,
            1e-9,
        );
    }

    #[test]
    fn situation_6_gives_finite_focal() {
        let r = run(
            &source_state("full-frame", 50.0, 2.8, Some(2000.0)),
            &TargetState::new("apsc").with_override(TargetOverride::Aperture(2.8)),
            &with_mode(MatchMode::Dof),
        )
        .unwrap();
        assert_eq!(r.target.aperture, 2.8);
        assert!(r.is_target_aperture_overridden);
        assert!(r.target.focal_length.is_finite() && r.target.focal_length > 0.0);
        assert_eq!(r.situation, Situation::ApertureMatchDof);
    }

    // =========================================================================
    // methods and errors
    // =========================================================================

    #[test]
    fn width_method_on_same_aspect_keeps_diagonal_aov() {
        for method in EquivalenceMethod::ALL {
            let options = Options {
                equivalence_method: method,
                ..Options::default()
            };
            let r = run(
                &source_state("full-frame", 35.0, 2.0, None),
                &TargetState::new("apsc"),
                &options,
            )
            .unwrap();
            // Both formats are 3:2, so every method agrees.
            assert_close(r.source.aov.diagonal, r.target.aov.diagonal, 1e-9);
        }
    }

    #[test]
    fn missing_source_format() {
        let err = run(
            &source_state("nonexistent", 50.0, 1.4, None),
            &TargetState::new("apsc"),
            &Options::default(),
        )
        .unwrap_err();
        assert_eq!(err, CalcError::FormatNotFound("nonexistent".into()));
        assert_eq!(err.to_string(), "Format not found: nonexistent");
    }

    #[test]
    fn missing_target_format() {
        let err = run(
            &source_state("full-frame", 50.0, 1.4, None),
            &TargetState::new("half-frame"),
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::FormatNotFound(id) if id == "half-frame"));
    }

    #[test]
    fn same_format_is_identity() {
        let r = run(
            &source_state("mft", 25.0, 1.7, Some(1500.0)),
            &TargetState::new("mft"),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(r.crop_factor, 1.0);
        assert_eq!(r.target.focal_length, 25.0);
        assert_eq!(r.target.aperture, 1.7);
        assert_eq!(r.source.focus, r.target.focus);
    }
}
