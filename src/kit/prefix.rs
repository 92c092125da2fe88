use super::keys::TypographyField;
use super::KitRecord;

/// Prefix assumed when no existing record reveals one.
pub const DEFAULT_PREFIX: &str = "typography_typo";

const DETECTION_ORDER: [TypographyField; 4] = [
    TypographyField::FontSizeCustom,
    TypographyField::FontSize,
    TypographyField::FontFamily,
    TypographyField::Typography,
];

fn prefix_of(key: &str) -> Option<&str> {
    DETECTION_ORDER.iter().find_map(|field| {
        key.strip_suffix(field.suffix())
            .filter(|prefix| !prefix.is_empty())
    })
}

/// Field-name prefix used by the existing typography records: the first key,
/// scanning records and then keys in order, that ends in a known typography
/// suffix.
pub fn detect_prefix<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a KitRecord>,
{
    records
        .into_iter()
        .flat_map(|record| record.keys())
        .find_map(|key| prefix_of(key))
        .unwrap_or(DEFAULT_PREFIX)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> KitRecord {
        value.as_object().cloned().expect("object fixture")
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        assert_eq!(detect_prefix(&Vec::<KitRecord>::new()), DEFAULT_PREFIX);
        let plain = record(json!({"_id": "a", "title": "Body"}));
        assert_eq!(detect_prefix([&plain]), DEFAULT_PREFIX);
    }

    #[test]
    fn first_matching_key_wins() {
        let first = record(json!({"_id": "a", "title": "Body", "typography_typography": "custom"}));
        let second = record(json!({"styled_font_size": {"unit": "px", "size": 16}}));
        assert_eq!(detect_prefix([&first, &second]), "typography");
    }

    #[test]
    fn custom_size_suffix_is_checked_before_plain_size() {
        let item = record(json!({"site_typo_font_size_custom": "clamp(1rem, 2vw, 3rem)"}));
        assert_eq!(detect_prefix([&item]), "site_typo");
    }

    #[test]
    fn bare_suffix_without_prefix_is_ignored() {
        let item = record(json!({"_font_size": "x", "brand_font_family": "Inter"}));
        assert_eq!(detect_prefix([&item]), "brand");
    }
}
