//! Field sanitizers and the size / line-height / weight grammars.
//!
//! Every function here degrades instead of failing: input that does not fit
//! its grammar comes back as an empty string (or `None` for weights).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Weight used by the bulk policy when a parsed weight is out of range.
pub const DEFAULT_BULK_WEIGHT: u32 = 400;
pub const MIN_WEIGHT: u32 = 100;
pub const MAX_WEIGHT: u32 = 1000;

static SCRIPT_STYLE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)>").expect("static regex")
});
static MARKUP_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));
static FAMILY_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-,\t\n\x0B\x0C\r ]").expect("static regex"));
static NUMERIC_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9]*\.?[0-9]+\s*(px|rem|em)$").expect("static regex"));
static CLAMP_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^clamp\(\s*.+\s*,\s*.+\s*,\s*.+\s*\)$").expect("static regex")
});
static CLAMP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^clamp\(.+\)$").expect("static regex"));
static LINE_HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9]*\.?[0-9]+\s*em$").expect("static regex"));
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{3}){1,2}$").expect("static regex"));
static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("static regex"));
static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("static regex"));

/// Removes `<script>`/`<style>` blocks with their content, then every tag.
pub fn strip_tags(value: &str) -> String {
    let without_blocks = SCRIPT_STYLE_BLOCKS.replace_all(value, "");
    MARKUP_TAGS.replace_all(&without_blocks, "").into_owned()
}

/// Single-line text sanitizer used for titles and identifiers.
pub fn sanitize_text_field(value: &str) -> String {
    let stripped = if value.contains('<') {
        strip_tags(value)
    } else {
        value.to_string()
    };
    let mut filtered = INLINE_WHITESPACE
        .replace_all(&stripped, " ")
        .trim()
        .to_string();

    let mut found_octets = false;
    while PERCENT_OCTET.is_match(&filtered) {
        filtered = PERCENT_OCTET.replace_all(&filtered, "").into_owned();
        found_octets = true;
    }
    if found_octets {
        filtered = INLINE_WHITESPACE
            .replace_all(&filtered, " ")
            .trim()
            .to_string();
    }
    filtered
}

/// Lowercases and keeps only `[a-z0-9_-]`.
pub fn sanitize_key(value: &str) -> String {
    value
        .to_ascii_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
        .collect()
}

pub fn sanitize_font_family(value: &str) -> String {
    let stripped = strip_tags(value).replace(['"', '\''], "");
    FAMILY_DISALLOWED
        .replace_all(&stripped, "")
        .trim()
        .to_string()
}

/// Accepts `<number><px|rem|em>` (whitespace allowed before the unit) or a
/// three-argument `clamp(...)`; returns the trimmed input verbatim.
pub fn sanitize_font_size(value: &str) -> String {
    let stripped = strip_tags(value);
    let value = stripped.trim();
    if NUMERIC_SIZE.is_match(value) || CLAMP_SIZE.is_match(value) {
        value.to_string()
    } else {
        String::new()
    }
}

pub fn sanitize_line_height(value: &str) -> String {
    let stripped = strip_tags(value);
    let value = stripped.trim();
    if LINE_HEIGHT.is_match(value) {
        value.to_string()
    } else {
        String::new()
    }
}

/// `#rgb` or `#rrggbb`; anything else is rejected.
pub fn sanitize_hex_color(value: &str) -> String {
    if HEX_COLOR.is_match(value) {
        value.to_string()
    } else {
        String::new()
    }
}

/// Loose clamp check used when projecting sizes into host fields.
pub fn is_clamp(value: &str) -> bool {
    CLAMP_PREFIX.is_match(value)
}

/// Absolute integer of the leading numeric part of `value`
/// (`"700"` → 700, `"-300"` → 300, `"bold"` → 0).
pub fn absint_str(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let digits = trimmed
        .strip_prefix(['-', '+'])
        .unwrap_or(trimmed);
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<u64>()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Text view of a scalar JSON value: strings as-is, numbers printed,
/// everything else empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

/// Raw-field weight policy: absolute-value coercion, no range substitution.
/// Zero means "no weight".
pub fn coerce_weight(value: &Value) -> Option<u32> {
    let weight = match value {
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX)
            } else if let Some(n) = number.as_u64() {
                u32::try_from(n).unwrap_or(u32::MAX)
            } else {
                number
                    .as_f64()
                    .map(|f| f.abs().trunc().min(f64::from(u32::MAX)) as u32)
                    .unwrap_or(0)
            }
        }
        Value::String(text) => absint_str(text),
        Value::Bool(true) => 1,
        _ => 0,
    };
    (weight != 0).then_some(weight)
}

/// Bulk-text weight policy: values outside `[100, 1000]` become 400.
pub fn bulk_weight(weight: u32) -> Option<u32> {
    match weight {
        0 => None,
        MIN_WEIGHT..=MAX_WEIGHT => Some(weight),
        _ => Some(DEFAULT_BULK_WEIGHT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn font_size_accepts_numeric_and_clamp_grammars_verbatim() {
        for accepted in [
            "16px",
            "1.25rem",
            ".875em",
            "2REM",
            "1 rem",
            "clamp(3rem, 2.5385rem + 2.0513vw, 4rem)",
            "CLAMP(1rem,2vw,3rem)",
        ] {
            assert_eq!(sanitize_font_size(accepted), accepted, "{accepted}");
        }
    }

    #[test]
    fn font_size_rejects_everything_else() {
        for rejected in ["", "16", "16pt", "large", "clamp(1rem)", "calc(1rem + 2px)", "-2px"] {
            assert_eq!(sanitize_font_size(rejected), "", "{rejected}");
        }
    }

    #[test]
    fn font_size_trims_and_strips_markup() {
        assert_eq!(sanitize_font_size("  <b>18px</b> "), "18px");
    }

    #[test]
    fn line_height_only_accepts_em() {
        assert_eq!(sanitize_line_height("1.5em"), "1.5em");
        assert_eq!(sanitize_line_height(" 1.2 em "), "1.2 em");
        assert_eq!(sanitize_line_height("24px"), "");
        assert_eq!(sanitize_line_height("1.5"), "");
    }

    #[test]
    fn font_family_drops_quotes_markup_and_symbols() {
        assert_eq!(
            sanitize_font_family(r#" "Open Sans", 'Segoe UI', sans-serif; "#),
            "Open Sans, Segoe UI, sans-serif"
        );
        assert_eq!(sanitize_font_family("<script>x()</script>Inter"), "Inter");
        assert_eq!(sanitize_font_family("!!!"), "");
    }

    #[test]
    fn hex_color_requires_hash_and_three_or_six_digits() {
        assert_eq!(sanitize_hex_color("#1e73be"), "#1e73be");
        assert_eq!(sanitize_hex_color("#FFF"), "#FFF");
        assert_eq!(sanitize_hex_color("1e73be"), "");
        assert_eq!(sanitize_hex_color("#12345"), "");
        assert_eq!(sanitize_hex_color("#gggggg"), "");
    }

    #[test]
    fn text_field_collapses_whitespace_and_octets() {
        assert_eq!(sanitize_text_field("  Brand\t\nPrimary  "), "Brand Primary");
        assert_eq!(sanitize_text_field("<em>Accent</em>"), "Accent");
        assert_eq!(sanitize_text_field("Accent%20Two"), "AccentTwo");
    }

    #[test]
    fn sanitize_key_keeps_slug_characters() {
        assert_eq!(sanitize_key("Colors!"), "colors");
        assert_eq!(sanitize_key("fonts_2-b"), "fonts_2-b");
    }

    #[test]
    fn weight_policies_differ_on_out_of_range_values() {
        assert_eq!(bulk_weight(700), Some(700));
        assert_eq!(bulk_weight(50), Some(DEFAULT_BULK_WEIGHT));
        assert_eq!(bulk_weight(1200), Some(DEFAULT_BULK_WEIGHT));
        assert_eq!(bulk_weight(0), None);

        assert_eq!(coerce_weight(&json!(50)), Some(50));
        assert_eq!(coerce_weight(&json!(-300)), Some(300));
        assert_eq!(coerce_weight(&json!("1200")), Some(1200));
        assert_eq!(coerce_weight(&json!("bold")), None);
        assert_eq!(coerce_weight(&json!("")), None);
        assert_eq!(coerce_weight(&Value::Null), None);
    }

    #[test]
    fn absint_reads_leading_digits() {
        assert_eq!(absint_str(" 600"), 600);
        assert_eq!(absint_str("-400"), 400);
        assert_eq!(absint_str("700px"), 700);
        assert_eq!(absint_str("x"), 0);
    }
}
