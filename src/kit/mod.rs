//! Host kit document records.
//!
//! A record is an opaque JSON object. The engine reads and writes a handful
//! of well-known keys and carries every other key through untouched, in its
//! original order.

mod dimension;
mod keys;
mod prefix;

pub use dimension::{
    custom_dimension_size, dimension_to_string, dimension_value, em_dimension, format_number,
    numeric_dimension, CUSTOM_UNIT,
};
pub use keys::{
    field_key, synonym_prefixes, TypographyField, COLOR_KEY, FONT_STACK_KEY, ID_KEY,
    LEGACY_PREFIXES, LEGACY_TYPO_FLAG_KEY, SIZE_TEXT_KEY, TITLE_KEY,
};
pub use prefix::{detect_prefix, DEFAULT_PREFIX};

use serde_json::{Map, Value};

pub type KitRecord = Map<String, Value>;

/// The two record collections a kit document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    CustomColors,
    CustomTypography,
}

impl SettingKind {
    pub const ALL: [SettingKind; 2] = [SettingKind::CustomColors, SettingKind::CustomTypography];

    pub const fn key(self) -> &'static str {
        match self {
            Self::CustomColors => "custom_colors",
            Self::CustomTypography => "custom_typography",
        }
    }
}

/// Both record collections of one kit document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KitCollections {
    pub colors: Vec<KitRecord>,
    pub fonts: Vec<KitRecord>,
}

impl KitCollections {
    /// Pulls both collections out of a page-settings object. Missing or
    /// malformed collections read as empty.
    pub fn from_page_settings(settings: &Map<String, Value>) -> Self {
        let read = |kind: SettingKind| {
            settings
                .get(kind.key())
                .cloned()
                .map(records_from_value)
                .unwrap_or_default()
        };
        Self {
            colors: read(SettingKind::CustomColors),
            fonts: read(SettingKind::CustomTypography),
        }
    }

    /// Replaces both collections, leaving every other setting untouched.
    pub fn write_into(self, settings: &mut Map<String, Value>) {
        settings.insert(
            SettingKind::CustomColors.key().to_string(),
            records_to_value(self.colors),
        );
        settings.insert(
            SettingKind::CustomTypography.key().to_string(),
            records_to_value(self.fonts),
        );
    }

    pub fn records(&self, kind: SettingKind) -> &[KitRecord] {
        match kind {
            SettingKind::CustomColors => &self.colors,
            SettingKind::CustomTypography => &self.fonts,
        }
    }
}

/// String view of a record field; non-strings read as empty.
pub fn str_field<'a>(record: &'a KitRecord, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Keeps only the object entries of a raw settings value.
pub fn records_from_value(value: Value) -> Vec<KitRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn records_to_value(records: Vec<KitRecord>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}
