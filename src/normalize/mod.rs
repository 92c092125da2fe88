//! Conversions from host kit records into canonical tokens.
//!
//! Kit records may carry the same logical property under several prefixes.
//! Readers consult the detected prefix first and then the legacy ones.

pub mod options;

use serde_json::Value;

use crate::kit::{
    custom_dimension_size, detect_prefix, dimension_to_string, field_key, numeric_dimension,
    str_field, synonym_prefixes, KitRecord, TypographyField, COLOR_KEY, FONT_STACK_KEY, ID_KEY,
    SIZE_TEXT_KEY, TITLE_KEY,
};
use crate::sanitize::coerce_weight;
use crate::tokens::{ColorToken, FontToken};

pub use options::{
    color_options, colors_from_options, font_options, fonts_from_options, ColorOptions,
    FontOptions, FontProps,
};

/// `None` when the record lacks a title or a color.
pub fn color_from_kit(record: &KitRecord) -> Option<ColorToken> {
    let title = str_field(record, TITLE_KEY);
    let color = str_field(record, COLOR_KEY);
    if title.is_empty() || color.is_empty() {
        return None;
    }
    Some(ColorToken::new(str_field(record, ID_KEY), title, color))
}

pub fn colors_from_kit(records: &[KitRecord]) -> Vec<ColorToken> {
    records.iter().filter_map(color_from_kit).collect()
}

/// Reads every record with the prefix detected over the whole collection.
pub fn fonts_from_kit(records: &[KitRecord]) -> Vec<FontToken> {
    let prefix = detect_prefix(records);
    records
        .iter()
        .filter_map(|record| font_from_kit(record, &prefix))
        .collect()
}

/// `None` when the record has no title.
pub fn font_from_kit(record: &KitRecord, prefix: &str) -> Option<FontToken> {
    let title = str_field(record, TITLE_KEY);
    if title.is_empty() {
        return None;
    }
    let prefixes = synonym_prefixes(prefix);

    Some(FontToken {
        id: str_field(record, ID_KEY).to_string(),
        title: title.to_string(),
        family: read_family(record, &prefixes),
        size: read_size(record, &prefixes),
        weight: prefixes.iter().find_map(|prefix| {
            record
                .get(&field_key(prefix, TypographyField::FontWeight))
                .and_then(coerce_weight)
        }),
        line_height: first_dimension(record, &prefixes, TypographyField::LineHeight),
    })
}

fn read_size(record: &KitRecord, prefixes: &[&str]) -> String {
    let custom_string = record.iter().find_map(|(key, value)| {
        if !key.ends_with(TypographyField::FontSizeCustom.suffix()) {
            return None;
        }
        value
            .as_str()
            .map(str::trim)
            .filter(|size| !size.is_empty())
            .map(str::to_string)
    });
    if let Some(size) = custom_string {
        return size;
    }

    let custom_dimension = prefixes.iter().find_map(|prefix| {
        record
            .get(&field_key(prefix, TypographyField::FontSize))
            .and_then(custom_dimension_size)
    });
    if let Some(size) = custom_dimension {
        return size;
    }

    let host_size = first_dimension(record, prefixes, TypographyField::FontSize);
    let entered = str_field(record, SIZE_TEXT_KEY).trim();
    let same_size = numeric_dimension(entered)
        .is_some_and(|dimension| dimension_to_string(&dimension) == host_size);
    if !host_size.is_empty() && same_size {
        entered.to_string()
    } else {
        host_size
    }
}

fn first_dimension(record: &KitRecord, prefixes: &[&str], field: TypographyField) -> String {
    prefixes
        .iter()
        .filter_map(|prefix| record.get(&field_key(prefix, field)))
        .map(dimension_to_string)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn read_family(record: &KitRecord, prefixes: &[&str]) -> String {
    let family = prefixes
        .iter()
        .filter_map(|prefix| record.get(&field_key(prefix, TypographyField::FontFamily)))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|family| !family.is_empty())
        .unwrap_or("");

    let stack = str_field(record, FONT_STACK_KEY).trim();
    let stack_primary = stack.split(',').next().unwrap_or("").trim();
    if !family.is_empty() && stack_primary.eq_ignore_ascii_case(family) {
        stack.to_string()
    } else {
        family.to_string()
    }
}
