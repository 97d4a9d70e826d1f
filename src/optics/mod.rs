//! The optics engine: pure functions, no state, no I/O.
//!
//! | Quantity | Module | Formula |
//! |---|---|---|
//! | **Format metrics** | [`format`] | `d = √(w²+h²)`, `c = d/1500`, crop = `43.27/d` |
//! | **Angle of view** | [`aov`] | `2·atan(d / 2f)` |
//! | **Depth of field** | [`dof`] | `H = f²/(N·c) + f`, near/far from `H`, `s`, `f` |
//! | **Blur disc** | [`blur`] | `f²/(N·s)` at infinity; thin-lens at a distance |
//! | **Equivalence** | [`equivalence`] | scaling factor + override solves |
//!
//! Everything here takes and returns millimetres, f-numbers and degrees. The
//! orchestration that ties these into a two-sided result lives in
//! [`crate::calculate`].

pub mod aov;
pub mod blur;
pub mod dof;
pub mod equivalence;
pub mod format;

pub use aov::{AngleOfView, angle_of_view, aov_for_dimension};
pub use blur::{blur_disc_at_distance, blur_disc_at_infinity, blur_disc_at_infinity_exact, blur_percent};
pub use dof::{DofResult, depth_of_field, far_limit, hyperfocal, near_limit, total_dof};
pub use equivalence::{
    ResolvedTarget, Situation, crop_factor_between, entrance_pupil, resolve_target, target_subject_distance,
};
pub use format::{FULL_FRAME_DIAGONAL, Format, FormatDerived, FormatWithDerived, derive_format, with_derived};
