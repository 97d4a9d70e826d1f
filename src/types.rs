//! Session input types shared by the engine, the config loader, the share
//! codec and the CLI.
//!
//! A calculation is driven by three records: what the photographer has
//! ([`SourceState`]), what they want to match it on ([`TargetState`]), and
//! how to match ([`Options`]). All three are plain data, serialized with serde
//! so they can travel through `config.toml`, share strings and `--json` output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::units::Unit;

/// A string did not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}' (expected one of: {})", .expected.join(", "))]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static [&'static str],
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static [&'static str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Which dimension two formats are compared on when computing the scaling
/// factor between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceMethod {
    #[default]
    Diagonal,
    Width,
    Height,
    Area,
}

impl EquivalenceMethod {
    pub const ALL: [EquivalenceMethod; 4] = [
        EquivalenceMethod::Diagonal,
        EquivalenceMethod::Width,
        EquivalenceMethod::Height,
        EquivalenceMethod::Area,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquivalenceMethod::Diagonal => "diagonal",
            EquivalenceMethod::Width => "width",
            EquivalenceMethod::Height => "height",
            EquivalenceMethod::Area => "area",
        }
    }
}

impl fmt::Display for EquivalenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquivalenceMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquivalenceMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                ParseEnumError::new(
                    "equivalence method",
                    s,
                    &["diagonal", "width", "height", "area"],
                )
            })
    }
}

/// Which optical property to hold constant when one target value is fixed
/// by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Keep background blur, as a share of frame width, the same.
    #[default]
    BlurDisc,
    /// Keep depth of field the same.
    Dof,
}

impl MatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::BlurDisc => "blur_disc",
            MatchMode::Dof => "dof",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur_disc" => Ok(MatchMode::BlurDisc),
            "dof" => Ok(MatchMode::Dof),
            other => Err(ParseEnumError::new("match mode", other, &["blur_disc", "dof"])),
        }
    }
}

/// Calculation options. `display_unit` is carried for presentation and never
/// read by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub equivalence_method: EquivalenceMethod,
    pub match_mode: MatchMode,
    pub display_unit: Unit,
}

/// The camera the photographer is starting from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceState {
    pub format_id: String,
    /// Focal length in mm.
    pub focal_length: f64,
    /// f-number.
    pub aperture: f64,
    /// Focus distance in mm. Without it, DOF and blur are not computed.
    pub subject_distance: Option<f64>,
}

/// A user-fixed value on the target side. At most one can exist, which the
/// enum makes impossible to violate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TargetOverride {
    #[default]
    None,
    /// Focal length in mm; the aperture is solved for.
    FocalLength(f64),
    /// f-number; the focal length is solved for.
    Aperture(f64),
}

impl TargetOverride {
    /// Build from two nullable fields. When both are present the focal
    /// length override wins and the aperture is dropped.
    pub fn from_nullable(focal_length: Option<f64>, aperture: Option<f64>) -> Self {
        match (focal_length, aperture) {
            (Some(f), _) => TargetOverride::FocalLength(f),
            (None, Some(n)) => TargetOverride::Aperture(n),
            (None, None) => TargetOverride::None,
        }
    }

    pub fn focal_length(&self) -> Option<f64> {
        match *self {
            TargetOverride::FocalLength(f) => Some(f),
            _ => None,
        }
    }

    pub fn aperture(&self) -> Option<f64> {
        match *self {
            TargetOverride::Aperture(n) => Some(n),
            _ => None,
        }
    }
}

/// The system the photographer wants an equivalent on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    pub format_id: String,
    #[serde(rename = "override")]
    pub override_: TargetOverride,
}

impl TargetState {
    pub fn new(format_id: impl Into<String>) -> Self {
        Self {
            format_id: format_id.into(),
            override_: TargetOverride::None,
        }
    }

    /// Build from two nullable pinned values; see
    /// [`TargetOverride::from_nullable`] for the tie-break.
    pub fn from_nullable(format_id: impl Into<String>, focal_length: Option<f64>, aperture: Option<f64>) -> Self {
        Self::new(format_id).with_override(TargetOverride::from_nullable(focal_length, aperture))
    }

    pub fn with_override(mut self, override_: TargetOverride) -> Self {
        self.override_ = override_;
        self
    }
}

/// Input bounds the UI layer enforces before calling the engine. The engine
/// itself does not check them.
pub mod bounds {
    pub const FOCAL_LENGTH_MIN: f64 = 1.0;
    pub const FOCAL_LENGTH_MAX: f64 = 2000.0;
    pub const APERTURE_MIN: f64 = 0.7;
    pub const APERTURE_MAX: f64 = 128.0;
    /// 100 km.
    pub const SUBJECT_DISTANCE_MAX: f64 = 100_000_000.0;
    pub const FORMAT_DIMENSION_MIN: f64 = 1.0;
    pub const FORMAT_DIMENSION_MAX: f64 = 500.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_nullable_prefers_focal_override() {
        assert_eq!(
            TargetOverride::from_nullable(Some(35.0), Some(2.8)),
            TargetOverride::FocalLength(35.0)
        );
        assert_eq!(
            TargetOverride::from_nullable(None, Some(2.8)),
            TargetOverride::Aperture(2.8)
        );
        assert_eq!(TargetOverride::from_nullable(None, None), TargetOverride::None);
    }

    #[test]
    fn target_state_from_nullable() {
        let t = TargetState::from_nullable("apsc", Some(35.0), Some(2.8));
        assert_eq!(t.format_id, "apsc");
        assert_eq!(t.override_, TargetOverride::FocalLength(35.0));
        assert_eq!(TargetState::from_nullable("apsc", None, None), TargetState::new("apsc"));
    }

    #[test]
    fn override_accessors() {
        let o = TargetOverride::Aperture(4.0);
        assert_eq!(o.aperture(), Some(4.0));
        assert_eq!(o.focal_length(), None);
    }

    #[test]
    fn method_parses_every_variant() {
        for m in EquivalenceMethod::ALL {
            assert_eq!(m.as_str().parse::<EquivalenceMethod>().unwrap(), m);
        }
    }

    #[test]
    fn unknown_method_error_lists_choices() {
        let err = "volume".parse::<EquivalenceMethod>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid equivalence method 'volume' (expected one of: diagonal, width, height, area)"
        );
    }

    #[test]
    fn match_mode_round_trips_through_str() {
        assert_eq!("dof".parse::<MatchMode>().unwrap(), MatchMode::Dof);
        assert_eq!(MatchMode::BlurDisc.to_string(), "blur_disc");
        assert!("bokeh".parse::<MatchMode>().is_err());
    }

    #[test]
    fn options_default() {
        let o = Options::default();
        assert_eq!(o.equivalence_method, EquivalenceMethod::Diagonal);
        assert_eq!(o.match_mode, MatchMode::BlurDisc);
        assert_eq!(o.display_unit, Unit::Mm);
    }

    #[test]
    fn target_override_serializes_tagged() {
        let json = serde_json::to_string(&TargetOverride::FocalLength(35.0)).unwrap();
        assert_eq!(json, r#"{"kind":"focal_length","value":35.0}"#);
        let none = serde_json::to_string(&TargetOverride::None).unwrap();
        assert_eq!(none, r#"{"kind":"none"}"#);
    }
}
