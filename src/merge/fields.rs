//! Projection of canonical values onto every synonymous host key.

use serde_json::{json, Value};

use crate::kit::{
    dimension_value, em_dimension, field_key, numeric_dimension, synonym_prefixes, KitRecord,
    TypographyField, COLOR_KEY, CUSTOM_UNIT, FONT_STACK_KEY, LEGACY_TYPO_FLAG_KEY,
    SIZE_TEXT_KEY,
};
use crate::sanitize::is_clamp;
use crate::tokens::{ColorToken, FontToken};

const CUSTOM_FLAG: &str = "custom";

fn write_all(record: &mut KitRecord, prefixes: &[&str], field: TypographyField, value: &Value) {
    for prefix in prefixes {
        record.insert(field_key(prefix, field), value.clone());
    }
}

pub(super) fn write_color(record: &mut KitRecord, color: &ColorToken) {
    record.insert(COLOR_KEY.to_string(), json!(color.color));
}

/// Writes the non-empty fields of `font`; empty fields leave the base
/// record's values in place.
pub(super) fn write_font(record: &mut KitRecord, font: &FontToken, prefix: &str) {
    let prefixes = synonym_prefixes(prefix);

    write_all(record, &prefixes, TypographyField::Typography, &json!(CUSTOM_FLAG));
    record.insert(LEGACY_TYPO_FLAG_KEY.to_string(), json!(CUSTOM_FLAG));

    let family = font.primary_family();
    if !family.is_empty() {
        write_all(record, &prefixes, TypographyField::FontFamily, &json!(family));
        record.insert(FONT_STACK_KEY.to_string(), json!(font.family.trim()));
    }

    write_size(record, font.size.trim(), &prefixes);

    if let Some(weight) = font.weight {
        write_all(record, &prefixes, TypographyField::FontWeight, &json!(weight.to_string()));
    }
    if let Some(line_height) = em_dimension(&font.line_height) {
        write_all(record, &prefixes, TypographyField::LineHeight, &line_height);
    }
}

fn write_size(record: &mut KitRecord, size: &str, prefixes: &[&str]) {
    if size.is_empty() {
        return;
    }
    let custom_suffix = TypographyField::FontSizeCustom.suffix();
    let stale_custom: Vec<String> = record
        .keys()
        .filter(|key| key.ends_with(custom_suffix))
        .cloned()
        .collect();

    if is_clamp(size) {
        let mut targets: Vec<String> = prefixes
            .iter()
            .map(|prefix| field_key(prefix, TypographyField::FontSizeCustom))
            .collect();
        for key in stale_custom {
            if !targets.contains(&key) {
                targets.push(key);
            }
        }
        for key in targets {
            record.insert(key, json!(size));
        }
        record.insert(SIZE_TEXT_KEY.to_string(), json!(size));
        write_all(
            record,
            prefixes,
            TypographyField::FontSize,
            &dimension_value(CUSTOM_UNIT, json!(size)),
        );
    } else if let Some(dimension) = numeric_dimension(size) {
        write_all(record, prefixes, TypographyField::FontSize, &dimension);
        record.insert(SIZE_TEXT_KEY.to_string(), json!(size));
        for key in stale_custom {
            record.insert(key, json!(""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(size: &str) -> FontToken {
        FontToken {
            size: size.into(),
            ..FontToken::titled("Heading")
        }
    }

    #[test]
    fn clamp_is_written_verbatim_to_every_custom_and_size_key() {
        let clamp = "clamp(3rem, 2.5385rem + 2.0513vw, 4rem)";
        let mut record = KitRecord::new();
        record.insert("old_font_size_custom".into(), json!("clamp(1rem, 1vw, 2rem)"));

        write_font(&mut record, &font(clamp), "site");

        for key in [
            "site_font_size_custom",
            "typography_font_size_custom",
            "typography_typo_font_size_custom",
            "old_font_size_custom",
        ] {
            assert_eq!(record[key], json!(clamp), "{key}");
        }
        for key in ["site_font_size", "typography_font_size", "typography_typo_font_size"] {
            assert_eq!(
                record[key],
                json!({"unit": "custom", "size": clamp, "sizes": []}),
                "{key}"
            );
        }
    }

    #[test]
    fn numeric_size_blanks_stale_custom_keys() {
        let mut record = KitRecord::new();
        record.insert("typography_font_size_custom".into(), json!("clamp(1rem, 1vw, 2rem)"));

        write_font(&mut record, &font("18px"), "typography");

        assert_eq!(record["typography_font_size_custom"], json!(""));
        assert_eq!(
            record["typography_font_size"],
            json!({"unit": "px", "size": 18.0, "sizes": []})
        );
    }

    #[test]
    fn numeric_size_keeps_the_entered_spelling() {
        let mut record = KitRecord::new();
        write_font(&mut record, &font("1.50rem"), "typography");

        assert_eq!(record[SIZE_TEXT_KEY], json!("1.50rem"));
        assert_eq!(
            record["typography_font_size"],
            json!({"unit": "rem", "size": 1.5, "sizes": []})
        );
    }

    #[test]
    fn flags_are_set_and_empty_fields_are_left_alone() {
        let mut record = KitRecord::new();
        record.insert("typography_font_family".into(), json!("Georgia"));

        write_font(&mut record, &FontToken::titled("Quote"), "typography_typo");

        assert_eq!(record["typography_typo_typography"], json!("custom"));
        assert_eq!(record["typography_typography"], json!("custom"));
        assert_eq!(record["typography_typo"], json!("custom"));
        assert_eq!(record["typography_font_family"], json!("Georgia"));
        assert!(!record.contains_key("typography_font_size"));
    }

    #[test]
    fn family_stack_keeps_primary_in_host_fields() {
        let mut record = KitRecord::new();
        let token = FontToken {
            family: "Inter, system-ui, sans-serif".into(),
            weight: Some(700),
            line_height: "1.2em".into(),
            ..FontToken::titled("Heading")
        };

        write_font(&mut record, &token, "typography");

        assert_eq!(record["typography_font_family"], json!("Inter"));
        assert_eq!(record["typography_typo_font_family"], json!("Inter"));
        assert_eq!(record[FONT_STACK_KEY], json!("Inter, system-ui, sans-serif"));
        assert_eq!(record["typography_font_weight"], json!("700"));
        assert_eq!(
            record["typography_line_height"],
            json!({"unit": "em", "size": 1.2, "sizes": []})
        );
    }

    #[test]
    fn first_written_key_carries_the_detected_prefix() {
        let mut record = KitRecord::new();
        write_font(&mut record, &font("1rem"), "brand");
        assert_eq!(record.keys().next().map(String::as_str), Some("brand_typography"));
    }
}
