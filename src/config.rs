//! Session configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. A config file holds
//! a whole calculator session: the source lens, the target format and optional
//! override, the calculation options, and any custom formats. Stock defaults
//! are the base layer; the user's file is merged on top, then command-line
//! flags on top of that.
//!
//! ## Config File Location
//!
//! `config.toml` in the directory passed with `--dir` (default: the current
//! directory). Without a file, the stock defaults apply: a 50mm f/1.4 on full
//! frame, compared against Canon APS-C.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [source]
//! format = "full-frame-35mm"
//! focal_length = 50.0        # mm
//! aperture = 1.4             # f-number
//! # subject_distance = 2000.0  # mm; enables DOF and blur
//!
//! [target]
//! format = "apsc-canon"
//! # focal_length = 35.0     # pin the focal length, solve the aperture
//! # aperture = 2.8          # or pin the aperture, solve the focal length
//!
//! [options]
//! equivalence_method = "diagonal"   # diagonal | width | height | area
//! match_mode = "blur_disc"          # blur_disc | dof
//! display_unit = "mm"               # mm | inches
//!
//! [processing]
//! max_processes = 4         # Max parallel workers for `table` (omit for auto)
//!
//! [[custom_formats]]
//! id = "my-sensor"
//! name = "My Sensor"
//! width = 30.0
//! height = 20.0
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [target]
//! format = "four-thirds"
//! ```
//!
//! Unknown keys are rejected to catch typos early. At most one of
//! `target.focal_length` and `target.aperture` may be set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{DEFAULT_SOURCE_FORMAT, DEFAULT_TARGET_FORMAT, FormatCatalog};
use crate::optics::Format;
use crate::types::{Options, SourceState, TargetState, bounds};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// A calculator session loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// The lens and format being converted from.
    pub source: SourceConfig,
    /// The format being converted to, with an optional pinned value.
    pub target: TargetConfig,
    /// Equivalence method, match mode, display unit.
    pub options: Options,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// User-defined formats added to the catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_formats: Vec<CustomFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Format id from the catalog.
    pub format: String,
    /// Focal length in mm.
    pub focal_length: f64,
    /// f-number.
    pub aperture: f64,
    /// Focus distance in mm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_distance: Option<f64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_SOURCE_FORMAT.to_string(),
            focal_length: 50.0,
            aperture: 1.4,
            subject_distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Format id from the catalog.
    pub format: String,
    /// Pinned focal length in mm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    /// Pinned f-number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_TARGET_FORMAT.to_string(),
            focal_length: None,
            aperture: None,
        }
    }
}

/// A user-defined format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomFormat {
    pub id: String,
    pub name: String,
    /// mm
    pub width: f64,
    /// mm
    pub height: f64,
}

impl CustomFormat {
    pub fn to_format(&self) -> Format {
        Format::custom(&self.id, &self.name, self.width, self.height)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch tables.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{key} must be between {min} and {max} (got {value})"
        )));
    }
    Ok(())
}

impl SessionConfig {
    /// Validate values against the calculator's input bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use bounds::*;

        check_range(
            "source.focal_length",
            self.source.focal_length,
            FOCAL_LENGTH_MIN,
            FOCAL_LENGTH_MAX,
        )?;
        check_range("source.aperture", self.source.aperture, APERTURE_MIN, APERTURE_MAX)?;
        if let Some(s) = self.source.subject_distance {
            if !(s > 0.0 && s <= SUBJECT_DISTANCE_MAX) {
                return Err(ConfigError::Validation(format!(
                    "source.subject_distance must be positive and at most {SUBJECT_DISTANCE_MAX} mm"
                )));
            }
        }

        if self.target.focal_length.is_some() && self.target.aperture.is_some() {
            return Err(ConfigError::Validation(
                "at most one of target.focal_length and target.aperture may be set".into(),
            ));
        }
        if let Some(f) = self.target.focal_length {
            check_range("target.focal_length", f, FOCAL_LENGTH_MIN, FOCAL_LENGTH_MAX)?;
        }
        if let Some(n) = self.target.aperture {
            check_range("target.aperture", n, APERTURE_MIN, APERTURE_MAX)?;
        }

        let mut seen = HashSet::new();
        for custom in &self.custom_formats {
            if custom.id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "custom_formats.id must not be empty".into(),
                ));
            }
            if !seen.insert(custom.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate custom format id '{}'",
                    custom.id
                )));
            }
            let key = format!("custom_formats['{}']", custom.id);
            check_range(
                &format!("{key}.width"),
                custom.width,
                FORMAT_DIMENSION_MIN,
                FORMAT_DIMENSION_MAX,
            )?;
            check_range(
                &format!("{key}.height"),
                custom.height,
                FORMAT_DIMENSION_MIN,
                FORMAT_DIMENSION_MAX,
            )?;
        }
        Ok(())
    }

    pub fn source_state(&self) -> SourceState {
        SourceState {
            format_id: self.source.format.clone(),
            focal_length: self.source.focal_length,
            aperture: self.source.aperture,
            subject_distance: self.source.subject_distance,
        }
    }

    pub fn target_state(&self) -> TargetState {
        TargetState::from_nullable(&self.target.format, self.target.focal_length, self.target.aperture)
    }

    /// Presets plus this session's custom formats.
    pub fn catalog(&self) -> FormatCatalog {
        FormatCatalog::with_custom(self.custom_formats.iter().map(CustomFormat::to_format))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SessionConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SessionConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SessionConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SessionConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# lens-equiv Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Source: the lens you have
# ---------------------------------------------------------------------------
[source]
# Format id. Run `lens-equiv formats` to list them.
format = "full-frame-35mm"

# Focal length in mm.
focal_length = 50.0

# Aperture as an f-number.
aperture = 1.4

# Focus distance in mm. Setting it enables depth of field and blur output.
# subject_distance = 2000.0

# ---------------------------------------------------------------------------
# Target: the format you want an equivalent on
# ---------------------------------------------------------------------------
[target]
format = "apsc-canon"

# Pin ONE of these to solve for the other; leave both out for full equivalence.
# focal_length = 35.0
# aperture = 2.8

# ---------------------------------------------------------------------------
# Options
# ---------------------------------------------------------------------------
[options]
# How formats are compared: diagonal | width | height | area
equivalence_method = "diagonal"

# What a pinned target value should preserve: blur_disc | dof
match_mode = "blur_disc"

# Unit for displayed distances: mm | inches
display_unit = "mm"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `lens-equiv table`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Custom formats (repeat the block for each one)
# ---------------------------------------------------------------------------
# [[custom_formats]]
# id = "my-sensor"
# name = "My Sensor"
# width = 30.0
# height = 20.0
"##
}
