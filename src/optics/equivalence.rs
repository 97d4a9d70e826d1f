//! Equivalence between two formats.
//!
//! # Scaling factor
//!
//! [`crop_factor_between`] relates a *source* format to a *target* format as a
//! target/source ratio along the chosen [`EquivalenceMethod`]. Multiplying the
//! source focal length and f-number by it gives the same field of view and the
//! same entrance pupil on the target, which in turn keeps depth of field and
//! background blur the same. That is the default case and needs no match mode.
//!
//! # Overrides
//!
//! When the user pins one target value, only the other can be solved for, and
//! the result can preserve blur or depth of field but not both:
//!
//! | Situation | Pinned | Match | Solve | Formula |
//! |---|---|---|---|---|
//! | 1 | — | — | f, N | `f_t = f_s·k`, `N_t = N_s·k` |
//! | 3 | focal | blur disc | N | `N_t = N_s · (f_t/f_s) · (w_s/w_t)` |
//! | 4 | focal | DOF | N | `N_t = N_s · (d_s/d_t)` |
//! | 5 | aperture | blur disc | f | `f_t = f_s · (N_t/N_s) · (w_t/w_s)` |
//! | 6 | aperture | DOF | f | `f_t = f_s · √((N_t·d_t)/(N_s·d_s))` |
//!
//! `w` is frame width, `d` the diagonal. All four solves assume the subject is
//! moved to keep framing: `s_t = s_s · f_t/f_s`.
//!
//! Blur: as a share of frame width, `f² / (N·s·w)`. Substituting the scaled
//! distance gives `f_t·f_s / (N_t·s_s·w_t)` on the target, and equating that
//! with the source yields situations 3 and 5.
//!
//! DOF: with `DOF ≈ 2·N·c·s²/f²` and the scaled distance, the focal lengths
//! cancel and only `N·c` remains. Situation 4 follows directly. Situation 6
//! has no exact solution (the focal length drops out), so the returned focal
//! length is an approximation that reconciles framing with the pinned
//! aperture, not a true DOF match.

use serde::{Deserialize, Serialize};

use super::format::FormatWithDerived;
use crate::types::{EquivalenceMethod, MatchMode, TargetOverride};

/// Target/source scaling factor under `method`. Exactly 1 for a format
/// against itself.
pub fn crop_factor_between(
    source: &FormatWithDerived,
    target: &FormatWithDerived,
    method: EquivalenceMethod,
) -> f64 {
    match method {
        EquivalenceMethod::Diagonal => target.diagonal() / source.diagonal(),
        EquivalenceMethod::Width => target.width() / source.width(),
        EquivalenceMethod::Height => target.height() / source.height(),
        EquivalenceMethod::Area => {
            ((target.width() * target.height()) / (source.width() * source.height())).sqrt()
        }
    }
}

/// Same field of view.
pub fn equivalent_focal_length(source_focal_length: f64, crop_factor: f64) -> f64 {
    source_focal_length * crop_factor
}

/// Same entrance pupil.
pub fn equivalent_aperture(source_aperture: f64, crop_factor: f64) -> f64 {
    source_aperture * crop_factor
}

/// Entrance pupil diameter `f / N`, in mm.
pub fn entrance_pupil(focal_length: f64, aperture: f64) -> f64 {
    focal_length / aperture
}

/// Situation 3.
pub fn aperture_for_matching_blur(
    source_focal_length: f64,
    source_aperture: f64,
    source_width: f64,
    target_focal_length: f64,
    target_width: f64,
) -> f64 {
    let focal_ratio = target_focal_length / source_focal_length;
    let width_ratio = source_width / target_width;
    source_aperture * focal_ratio * width_ratio
}

/// Situation 4. Focal lengths cancel once distance is rescaled.
pub fn aperture_for_matching_dof(source_aperture: f64, source_diagonal: f64, target_diagonal: f64) -> f64 {
    source_aperture * (source_diagonal / target_diagonal)
}

/// Situation 5.
pub fn focal_for_matching_blur(
    source_focal_length: f64,
    source_aperture: f64,
    source_width: f64,
    target_aperture: f64,
    target_width: f64,
) -> f64 {
    let aperture_ratio = target_aperture / source_aperture;
    let width_ratio = target_width / source_width;
    source_focal_length * aperture_ratio * width_ratio
}

/// Situation 6. Approximate; see the module docs.
pub fn focal_for_matching_dof(
    source_focal_length: f64,
    source_aperture: f64,
    source_diagonal: f64,
    target_aperture: f64,
    target_diagonal: f64,
) -> f64 {
    let numerator = target_aperture * target_diagonal;
    let denominator = source_aperture * source_diagonal;
    source_focal_length * (numerator / denominator).sqrt()
}

/// Subject distance on the target that keeps the framing of the source.
pub fn target_subject_distance(
    source_subject_distance: f64,
    source_focal_length: f64,
    target_focal_length: f64,
) -> f64 {
    source_subject_distance * (target_focal_length / source_focal_length)
}

/// Which solve applies to a given override and match mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    /// No override: focal length and aperture both scale.
    Default,
    /// Focal length pinned, aperture solved to keep blur.
    FocalMatchBlur,
    /// Focal length pinned, aperture solved to keep DOF.
    FocalMatchDof,
    /// Aperture pinned, focal length solved to keep blur.
    ApertureMatchBlur,
    /// Aperture pinned, focal length solved to approximate DOF.
    ApertureMatchDof,
}

impl Situation {
    pub fn classify(override_: &TargetOverride, match_mode: MatchMode) -> Self {
        match (override_, match_mode) {
            (TargetOverride::None, _) => Situation::Default,
            (TargetOverride::FocalLength(_), MatchMode::BlurDisc) => Situation::FocalMatchBlur,
            (TargetOverride::FocalLength(_), MatchMode::Dof) => Situation::FocalMatchDof,
            (TargetOverride::Aperture(_), MatchMode::BlurDisc) => Situation::ApertureMatchBlur,
            (TargetOverride::Aperture(_), MatchMode::Dof) => Situation::ApertureMatchDof,
        }
    }

    /// Number in the override table.
    pub fn number(self) -> u8 {
        match self {
            Situation::Default => 1,
            Situation::FocalMatchBlur => 3,
            Situation::FocalMatchDof => 4,
            Situation::ApertureMatchBlur => 5,
            Situation::ApertureMatchDof => 6,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Situation::Default => "equivalent focal length and aperture",
            Situation::FocalMatchBlur => "aperture solved to match blur disc",
            Situation::FocalMatchDof => "aperture solved to match depth of field",
            Situation::ApertureMatchBlur => "focal length solved to match blur disc",
            Situation::ApertureMatchDof => "focal length solved to approximate depth of field",
        }
    }
}

/// Target focal length and aperture after applying the override, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTarget {
    pub focal_length: f64,
    pub aperture: f64,
    pub situation: Situation,
}

/// Solve for the target lens given the source lens, both formats, the
/// scaling factor between them and the user's override.
pub fn resolve_target(
    source_focal_length: f64,
    source_aperture: f64,
    source_format: &FormatWithDerived,
    target_format: &FormatWithDerived,
    crop_factor: f64,
    override_: &TargetOverride,
    match_mode: MatchMode,
) -> ResolvedTarget {
    let situation = Situation::classify(override_, match_mode);
    let (focal_length, aperture) = match (situation, *override_) {
        (Situation::FocalMatchBlur, TargetOverride::FocalLength(f)) => (
            f,
            aperture_for_matching_blur(
                source_focal_length,
                source_aperture,
                source_format.width(),
                f,
                target_format.width(),
            ),
        ),
        (Situation::FocalMatchDof, TargetOverride::FocalLength(f)) => (
            f,
            aperture_for_matching_dof(source_aperture, source_format.diagonal(), target_format.diagonal()),
        ),
        (Situation::ApertureMatchBlur, TargetOverride::Aperture(n)) => (
            focal_for_matching_blur(
                source_focal_length,
                source_aperture,
                source_format.width(),
                n,
                target_format.width(),
            ),
            n,
        ),
        (Situation::ApertureMatchDof, TargetOverride::Aperture(n)) => (
            focal_for_matching_dof(
                source_focal_length,
                source_aperture,
                source_format.diagonal(),
                n,
                target_format.diagonal(),
            ),
            n,
        ),
        _ => (
            equivalent_focal_length(source_focal_length, crop_factor),
            equivalent_aperture(source_aperture, crop_factor),
        ),
    };
    ResolvedTarget {
        focal_length,
        aperture,
        situation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::blur::{blur_disc_at_infinity, blur_percent};
    use crate::test_helpers::{apsc, assert_close, full_frame, mft};

    // =========================================================================
    // crop_factor_between
    // =========================================================================

    #[test]
    fn crop_factor_identity_for_every_method() {
        for f in [full_frame(), apsc(), mft()] {
            for m in EquivalenceMethod::ALL {
                assert_eq!(crop_factor_between(&f, &f, m), 1.0, "{} / {m}", f.format.id);
            }
        }
    }

    #[test]
    fn crop_factor_ff_to_apsc_diagonal() {
        assert_close(crop_factor_between(&full_frame(), &apsc(), EquivalenceMethod::Diagonal), 0.625, 1e-12);
    }

    #[test]
    fn crop_factor_width_and_height() {
        let cf_w = crop_factor_between(&full_frame(), &mft(), EquivalenceMethod::Width);
        let cf_h = crop_factor_between(&full_frame(), &mft(), EquivalenceMethod::Height);
        assert_close(cf_w, 18.0 / 36.0, 1e-12);
        assert_close(cf_h, 13.5 / 24.0, 1e-12);
    }

    #[test]
    fn crop_factor_area_is_geometric_mean_of_sides() {
        let cf = crop_factor_between(&full_frame(), &mft(), EquivalenceMethod::Area);
        assert_close(cf, ((18.0 * 13.5) / (36.0 * 24.0_f64)).sqrt(), 1e-12);
    }

    #[test]
    fn crop_factor_reverses() {
        let there = crop_factor_between(&full_frame(), &mft(), EquivalenceMethod::Diagonal);
        let back = crop_factor_between(&mft(), &full_frame(), EquivalenceMethod::Diagonal);
        assert_close(there * back, 1.0, 1e-12);
    }

    // =========================================================================
    // entrance pupil
    // =========================================================================

    #[test]
    fn entrance_pupil_monotonic() {
        assert_close(entrance_pupil(50.0, 1.4), 35.714, 1e-3);
        assert!(entrance_pupil(85.0, 1.4) > entrance_pupil(50.0, 1.4));
        assert!(entrance_pupil(50.0, 2.0) < entrance_pupil(50.0, 1.4));
    }

    #[test]
    fn default_equivalence_preserves_entrance_pupil() {
        let k = 0.625;
        let f = equivalent_focal_length(50.0, k);
        let n = equivalent_aperture(1.4, k);
        assert_close(entrance_pupil(f, n), entrance_pupil(50.0, 1.4), 1e-12);
    }

    // =========================================================================
    // override solves
    // =========================================================================

    #[test]
    fn blur_match_keeps_blur_percent() {
        let (ff, aps) = (full_frame(), apsc());
        let n_t = aperture_for_matching_blur(50.0, 1.4, ff.width(), 35.0, aps.width());
        // 1.4 × 0.7 × 1.6
        assert_close(n_t, 1.568, 1e-12);

        let s_t = target_subject_distance(2000.0, 50.0, 35.0);
        let src = blur_percent(blur_disc_at_infinity(50.0, 1.4, 2000.0), ff.width());
        let tgt = blur_percent(blur_disc_at_infinity(35.0, n_t, s_t), aps.width());
        assert_close(src, tgt, 1e-9);
    }

    #[test]
    fn dof_match_ignores_focal_lengths() {
        let n = aperture_for_matching_dof(2.8, full_frame().diagonal(), apsc().diagonal());
        assert_close(n, 2.8 * 1.6, 1e-9);
    }

    #[test]
    fn focal_for_blur_inverts_aperture_for_blur() {
        let (ff, aps) = (full_frame(), apsc());
        let n_t = aperture_for_matching_blur(50.0, 1.4, ff.width(), 35.0, aps.width());
        let f_t = focal_for_matching_blur(50.0, 1.4, ff.width(), n_t, aps.width());
        assert_close(f_t, 35.0, 1e-9);
    }

    #[test]
    fn focal_for_dof_same_aperture() {
        let (ff, aps) = (full_frame(), apsc());
        let f = focal_for_matching_dof(50.0, 2.8, ff.diagonal(), 2.8, aps.diagonal());
        assert!(f.is_finite() && f > 0.0);
        assert_close(f, 50.0 * 0.625_f64.sqrt(), 1e-9);
    }

    #[test]
    fn subject_distance_scales_with_focal_ratio() {
        assert_close(target_subject_distance(2000.0, 50.0, 31.25), 1250.0, 1e-9);
    }

    // =========================================================================
    // classification and resolve_target
    // =========================================================================

    #[test]
    fn classify_covers_the_table() {
        use MatchMode::*;
        let none = TargetOverride::None;
        let focal = TargetOverride::FocalLength(35.0);
        let ap = TargetOverride::Aperture(2.8);
        assert_eq!(Situation::classify(&none, BlurDisc).number(), 1);
        assert_eq!(Situation::classify(&none, Dof).number(), 1);
        assert_eq!(Situation::classify(&focal, BlurDisc).number(), 3);
        assert_eq!(Situation::classify(&focal, Dof).number(), 4);
        assert_eq!(Situation::classify(&ap, BlurDisc).number(), 5);
        assert_eq!(Situation::classify(&ap, Dof).number(), 6);
    }

    #[test]
    fn resolve_default() {
        let (ff, aps) = (full_frame(), apsc());
        let cf = crop_factor_between(&ff, &aps, EquivalenceMethod::Diagonal);
        let r = resolve_target(50.0, 1.4, &ff, &aps, cf, &TargetOverride::None, MatchMode::Dof);
        assert_eq!(r.situation, Situation::Default);
        assert_close(r.focal_length, 31.25, 1e-9);
        assert_close(r.aperture, 0.875, 1e-9);
    }

    #[test]
    fn resolve_keeps_pinned_value_exactly() {
        let (ff, aps) = (full_frame(), apsc());
        let cf = crop_factor_between(&ff, &aps, EquivalenceMethod::Diagonal);

        let r = resolve_target(50.0, 1.4, &ff, &aps, cf, &TargetOverride::FocalLength(35.0), MatchMode::BlurDisc);
        assert_eq!(r.focal_length, 35.0);
        assert_eq!(r.situation, Situation::FocalMatchBlur);

        let r = resolve_target(50.0, 1.4, &ff, &aps, cf, &TargetOverride::Aperture(1.4), MatchMode::BlurDisc);
        assert_eq!(r.aperture, 1.4);
        // 50 × 1 × 0.625
        assert_close(r.focal_length, 31.25, 1e-9);
    }
}
