//! Compact share strings for a calculator session.
//!
//! A session round-trips through a URL query string with short keys, so a
//! comparison can be pasted into a chat or bookmarked:
//!
//! ```text
//! sf=full-frame-35mm&sl=50&sa=1.4&sd=2000&tf=four-thirds&ta=2.8&mm=dof
//! ```
//!
//! | Key | Meaning |
//! |---|---|
//! | `sf` / `tf` | source / target format id |
//! | `sw` `sh` `sn` / `tw` `th` `tn` | custom format width, height, name (when no id) |
//! | `sl`, `sa`, `sd` | source focal length, aperture, subject distance |
//! | `tl`, `ta` | target focal length / aperture override |
//! | `em`, `mm` | equivalence method, match mode (only written when not default) |
//!
//! Parsing is lenient: unknown keys, unparsable numbers and unknown enum values
//! are ignored so a damaged link still opens with whatever survived. An empty
//! `sd`, `tl` or `ta` explicitly clears that value. If a link carries both
//! target overrides, the focal length wins.
//!
//! Custom formats are not stored by id, since a recipient wouldn't have them,
//! but by dimensions, and come back as ephemeral formats with ids like
//! `url-custom-source-30x20`.

use crate::catalog::FormatCatalog;
use crate::config::{CustomFormat, SessionConfig};
use crate::types::{EquivalenceMethod, MatchMode, Options, SourceState, TargetOverride, TargetState};

const URL_CUSTOM_FORMAT_PREFIX: &str = "url-custom-";

/// How a share string names a format.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatRef {
    Id(String),
    Custom {
        width: f64,
        height: f64,
        name: Option<String>,
    },
}

/// Which side of the comparison a custom format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

/// Deterministic id for a format that arrived by dimensions.
pub fn url_custom_format_id(side: Side, width: f64, height: f64) -> String {
    format!("{URL_CUSTOM_FORMAT_PREFIX}{}-{width}x{height}", side.as_str())
}

/// Whatever a share string specified. `None` = not mentioned. For the
/// nullable fields, `Some(None)` = explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareState {
    pub source_format: Option<FormatRef>,
    pub source_focal_length: Option<f64>,
    pub source_aperture: Option<f64>,
    pub subject_distance: Option<Option<f64>>,
    pub target_format: Option<FormatRef>,
    pub target_focal_length: Option<Option<f64>>,
    pub target_aperture: Option<Option<f64>>,
    pub equivalence_method: Option<EquivalenceMethod>,
    pub match_mode: Option<MatchMode>,
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_nullable_number(value: Option<&str>) -> Option<Option<f64>> {
    match value {
        None => None,
        Some("") => Some(None),
        Some(v) => parse_number(Some(v)).map(Some),
    }
}

fn parse_format_ref(params: &[(String, String)], id_key: &str, w_key: &str, h_key: &str, n_key: &str) -> Option<FormatRef> {
    if let Some(id) = get(params, id_key).filter(|v| !v.is_empty()) {
        return Some(FormatRef::Id(id.to_string()));
    }
    let width = parse_number(get(params, w_key))?;
    let height = parse_number(get(params, h_key))?;
    let name = get(params, n_key).filter(|v| !v.is_empty()).map(str::to_string);
    Some(FormatRef::Custom { width, height, name })
}

/// Value for `key`. For repeated keys the first one wins.
fn get<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Parse a query string (with or without a leading `?`).
pub fn parse_share_params(query: &str) -> ShareState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let params: Vec<(String, String)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(pair), String::new()),
        })
        .collect();

    ShareState {
        source_format: parse_format_ref(&params, "sf", "sw", "sh", "sn"),
        source_focal_length: parse_number(get(&params, "sl")),
        source_aperture: parse_number(get(&params, "sa")),
        subject_distance: parse_nullable_number(get(&params, "sd")),
        target_format: parse_format_ref(&params, "tf", "tw", "th", "tn"),
        target_focal_length: parse_nullable_number(get(&params, "tl")),
        target_aperture: parse_nullable_number(get(&params, "ta")),
        equivalence_method: get(&params, "em").and_then(|v| v.parse().ok()),
        match_mode: get(&params, "mm").and_then(|v| v.parse().ok()),
    }
}

impl ShareState {
    /// Apply everything the share string specified on top of `config`.
    /// Custom formats are added to `config.custom_formats` under their
    /// ephemeral ids.
    pub fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(format) = &self.source_format {
            config.source.format = resolve_format_ref(format, Side::Source, config);
        }
        if let Some(f) = self.source_focal_length {
            config.source.focal_length = f;
        }
        if let Some(n) = self.source_aperture {
            config.source.aperture = n;
        }
        if let Some(s) = self.subject_distance {
            config.source.subject_distance = s;
        }

        if let Some(format) = &self.target_format {
            config.target.format = resolve_format_ref(format, Side::Target, config);
        }
        if self.target_focal_length.is_some() || self.target_aperture.is_some() {
            let focal = self.target_focal_length.unwrap_or(config.target.focal_length);
            let aperture = self.target_aperture.unwrap_or(config.target.aperture);
            // A value pinned by the link releases the one it doesn't mention.
            let (focal, aperture) = match (self.target_focal_length, self.target_aperture) {
                (Some(Some(_)), None) => (focal, None),
                (None, Some(Some(_))) => (None, aperture),
                _ => (focal, aperture),
            };
            let resolved = TargetOverride::from_nullable(focal, aperture);
            config.target.focal_length = resolved.focal_length();
            config.target.aperture = resolved.aperture();
        }

        if let Some(m) = self.equivalence_method {
            config.options.equivalence_method = m;
        }
        if let Some(m) = self.match_mode {
            config.options.match_mode = m;
        }
    }
}

/// Id for a format named in a share string. Dimensions that match a format
/// already in the catalog (a preset, a local custom format, or one the other
/// side of the same link just added) reuse its id.
fn resolve_format_ref(format: &FormatRef, side: Side, config: &mut SessionConfig) -> String {
    match format {
        FormatRef::Id(id) => id.clone(),
        FormatRef::Custom { width, height, name } => {
            let catalog = config.catalog();
            if let Some(existing) = catalog
                .formats()
                .iter()
                .find(|f| f.width == *width && f.height == *height)
            {
                return existing.id.clone();
            }
            let id = url_custom_format_id(side, *width, *height);
            config.custom_formats.push(CustomFormat {
                id: id.clone(),
                name: name.clone().unwrap_or_else(|| format!("{width} × {height}mm")),
                width: *width,
                height: *height,
            });
            id
        }
    }
}

/// The session a share string describes, as opened by `local`'s owner.
///
/// The string is applied over the stock defaults, not over `local`: default
/// values are never written into a share string, so anything it leaves out
/// means "default". Only the recipient's custom formats, display unit and
/// processing settings carry over; none of them changes the result.
pub fn open_share(query: &str, local: &SessionConfig) -> SessionConfig {
    let mut config = SessionConfig {
        custom_formats: local.custom_formats.clone(),
        processing: local.processing.clone(),
        ..SessionConfig::default()
    };
    config.options.display_unit = local.options.display_unit;
    parse_share_params(query).apply_to(&mut config);
    config
}

/// Serialize a session. Custom formats (anything flagged `is_custom` in
/// `catalog`) are written by dimensions; presets by id.
pub fn serialize_share_params(
    source: &SourceState,
    target: &TargetState,
    options: &Options,
    catalog: &FormatCatalog,
) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    push_format(&mut params, catalog, &source.format_id, ("sf", "sw", "sh", "sn"));
    params.push(("sl", source.focal_length.to_string()));
    params.push(("sa", source.aperture.to_string()));
    if let Some(s) = source.subject_distance {
        params.push(("sd", s.to_string()));
    }

    push_format(&mut params, catalog, &target.format_id, ("tf", "tw", "th", "tn"));
    if let Some(f) = target.override_.focal_length() {
        params.push(("tl", f.to_string()));
    }
    if let Some(n) = target.override_.aperture() {
        params.push(("ta", n.to_string()));
    }

    if options.equivalence_method != EquivalenceMethod::default() {
        params.push(("em", options.equivalence_method.to_string()));
    }
    if options.match_mode != MatchMode::default() {
        params.push(("mm", options.match_mode.to_string()));
    }

    params
        .iter()
        .map(|(k, v)| format!("{k}={}", percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_format(
    params: &mut Vec<(&'static str, String)>,
    catalog: &FormatCatalog,
    format_id: &str,
    (id_key, w_key, h_key, n_key): (&'static str, &'static str, &'static str, &'static str),
) {
    match catalog.find(format_id).filter(|f| f.is_custom) {
        Some(custom) => {
            params.push((w_key, custom.width.to_string()));
            params.push((h_key, custom.height.to_string()));
            if !custom.name.is_empty() {
                params.push((n_key, custom.name.clone()));
            }
        }
        None => params.push((id_key, format_id.to_string())),
    }
}

/// `application/x-www-form-urlencoded` encoding: unreserved bytes pass
/// through, space becomes `+`, everything else `%XX`.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Inverse of [`percent_encode`]. Malformed escapes are kept literally.
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let digits = &bytes[i + 1..i + 3];
                let hex = std::str::from_utf8(digits)
                    .ok()
                    .filter(|_| digits.iter().all(u8::is_ascii_hexdigit));
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
