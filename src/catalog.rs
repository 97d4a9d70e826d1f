//! Format catalog: built-in presets plus user-defined formats.
//!
//! The engine only ever sees a `&[Format]`. This module is where that slice
//! comes from. Presets are grouped into four size classes for listing; custom
//! formats (from `config.toml` or a share string) are appended after them and
//! flagged `is_custom`.
//!
//! Ids are unique across the catalog. A custom format whose id collides with a
//! preset replaces it, so a user can correct a preset's dimensions locally.

use serde::{Deserialize, Serialize};

use crate::optics::Format;

pub const DEFAULT_SOURCE_FORMAT: &str = "full-frame-35mm";
pub const DEFAULT_TARGET_FORMAT: &str = "apsc-canon";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatCategory {
    Small,
    Medium,
    Large,
    Cinema,
}

impl FormatCategory {
    pub const ALL: [FormatCategory; 4] = [
        FormatCategory::Small,
        FormatCategory::Medium,
        FormatCategory::Large,
        FormatCategory::Cinema,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormatCategory::Small => "Small format",
            FormatCategory::Medium => "Medium format",
            FormatCategory::Large => "Large format",
            FormatCategory::Cinema => "Cinema",
        }
    }
}

/// A built-in format.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub width: f64,
    pub height: f64,
    pub category: FormatCategory,
}

impl Preset {
    pub fn to_format(&self) -> Format {
        Format::new(self.id, self.name, self.width, self.height)
    }
}

const fn preset(id: &'static str, name: &'static str, width: f64, height: f64, category: FormatCategory) -> Preset {
    Preset {
        id,
        name,
        width,
        height,
        category,
    }
}

use FormatCategory::{Cinema, Large, Medium, Small};

pub const PRESETS: &[Preset] = &[
    preset("phone-1-2.55", "Phone 1/2.55\"", 5.6, 4.2, Small),
    preset("one-inch", "1\" type", 13.2, 8.8, Small),
    preset("four-thirds", "Micro Four Thirds", 17.3, 13.0, Small),
    preset("apsc-canon", "APS-C (Canon)", 22.3, 14.9, Small),
    preset("apsc", "APS-C (Nikon/Sony/Fuji)", 23.5, 15.6, Small),
    preset("aps-h", "APS-H", 28.7, 19.0, Small),
    preset("full-frame-35mm", "Full Frame 35mm", 36.0, 24.0, Small),
    preset("half-frame", "Half frame 35mm", 24.0, 18.0, Small),
    preset("xpan", "XPan panoramic", 65.0, 24.0, Small),
    preset("gfx", "44×33 digital medium format", 43.8, 32.9, Medium),
    preset("phase-one-iq4", "Phase One IQ4 (53.4×40)", 53.4, 40.0, Medium),
    preset("645", "645 film", 56.0, 41.5, Medium),
    preset("6x6", "6×6 film", 56.0, 56.0, Medium),
    preset("6x7", "6×7 film", 70.0, 56.0, Medium),
    preset("6x9", "6×9 film", 84.0, 56.0, Medium),
    preset("6x17", "6×17 panoramic", 168.0, 56.0, Medium),
    preset("4x5", "4×5 sheet film", 121.0, 97.0, Large),
    preset("5x7", "5×7 sheet film", 178.0, 127.0, Large),
    preset("8x10", "8×10 sheet film", 254.0, 203.0, Large),
    preset("super-16", "Super 16", 12.52, 7.41, Cinema),
    preset("super-35", "Super 35", 24.89, 18.66, Cinema),
    preset("academy-35", "Academy 35mm", 21.95, 16.0, Cinema),
    preset("arri-alexa-lf", "ARRI Alexa LF", 36.7, 25.54, Cinema),
    preset("imax-65", "IMAX 15/70", 70.41, 52.63, Cinema),
];

/// Formats grouped for listing.
#[derive(Debug, Clone, Default)]
pub struct GroupedFormats {
    pub groups: Vec<(FormatCategory, Vec<Format>)>,
    pub custom: Vec<Format>,
}

/// Every format available to one calculation.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    formats: Vec<Format>,
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::presets()
    }
}

impl FormatCatalog {
    /// Built-in presets only.
    pub fn presets() -> Self {
        Self {
            formats: PRESETS.iter().map(Preset::to_format).collect(),
        }
    }

    /// Presets plus `custom`. Custom entries are marked `is_custom` and
    /// replace any preset with the same id.
    pub fn with_custom(custom: impl IntoIterator<Item = Format>) -> Self {
        let mut catalog = Self::presets();
        catalog.extend(custom);
        catalog
    }

    /// Add formats, replacing same-id entries in place.
    pub fn extend(&mut self, custom: impl IntoIterator<Item = Format>) {
        for mut format in custom {
            format.is_custom = true;
            match self.formats.iter_mut().find(|f| f.id == format.id) {
                Some(existing) => *existing = format,
                None => self.formats.push(format),
            }
        }
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn find(&self, id: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Group by preset category, keeping catalog order inside each group.
    /// Empty categories are skipped.
    pub fn grouped(&self) -> GroupedFormats {
        let mut grouped = GroupedFormats::default();
        for category in FormatCategory::ALL {
            let members: Vec<Format> = self
                .formats
                .iter()
                .filter(|f| !f.is_custom && preset_category(&f.id) == Some(category))
                .cloned()
                .collect();
            if !members.is_empty() {
                grouped.groups.push((category, members));
            }
        }
        grouped.custom = self.formats.iter().filter(|f| f.is_custom).cloned().collect();
        grouped
    }
}

/// Category of a built-in preset by id.
pub fn preset_category(id: &str) -> Option<FormatCategory> {
    PRESETS.iter().find(|p| p.id == id).map(|p| p.category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn preset_ids_are_unique() {
        let ids: HashSet<&str> = PRESETS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PRESETS.len());
    }

    #[test]
    fn defaults_exist() {
        let catalog = FormatCatalog::presets();
        assert!(catalog.find(DEFAULT_SOURCE_FORMAT).is_some());
        assert!(catalog.find(DEFAULT_TARGET_FORMAT).is_some());
    }

    #[test]
    fn presets_have_positive_dimensions() {
        for p in PRESETS {
            assert!(p.width > 0.0 && p.height > 0.0, "{}", p.id);
        }
    }

    #[test]
    fn with_custom_appends_and_flags() {
        let catalog = FormatCatalog::with_custom([Format::new("mine", "Mine", 30.0, 20.0)]);
        assert_eq!(catalog.len(), PRESETS.len() + 1);
        let mine = catalog.find("mine").unwrap();
        assert!(mine.is_custom);
    }

    #[test]
    fn custom_replaces_preset_with_same_id() {
        let catalog = FormatCatalog::with_custom([Format::new("apsc-canon", "Canon measured", 22.2, 14.8)]);
        assert_eq!(catalog.len(), PRESETS.len());
        let f = catalog.find("apsc-canon").unwrap();
        assert_eq!(f.width, 22.2);
        assert!(f.is_custom);
    }

    #[test]
    fn find_missing_is_none() {
        assert!(FormatCatalog::presets().find("nonexistent").is_none());
    }

    #[test]
    fn grouped_puts_custom_last() {
        let catalog = FormatCatalog::with_custom([Format::new("mine", "Mine", 30.0, 20.0)]);
        let grouped = catalog.grouped();
        let categories: Vec<FormatCategory> = grouped.groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, FormatCategory::ALL.to_vec());
        assert_eq!(grouped.custom.len(), 1);
        assert_eq!(grouped.custom[0].id, "mine");
        let small = &grouped.groups[0].1;
        assert!(small.iter().any(|f| f.id == "full-frame-35mm"));
    }

    #[test]
    fn grouped_total_matches_catalog() {
        let catalog = FormatCatalog::presets();
        let grouped = catalog.grouped();
        let total: usize = grouped.groups.iter().map(|(_, v)| v.len()).sum();
        assert_eq!(total + grouped.custom.len(), catalog.len());
    }
}
