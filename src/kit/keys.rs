pub const ID_KEY: &str = "_id";
pub const TITLE_KEY: &str = "title";
pub const COLOR_KEY: &str = "color";

/// Prefixes earlier host versions used for typography fields. Writes go to
/// the detected prefix and to every one of these.
pub const LEGACY_PREFIXES: [&str; 2] = ["typography", "typography_typo"];

/// Bare flag some host builds check before honouring custom typography.
pub const LEGACY_TYPO_FLAG_KEY: &str = "typography_typo";

/// Full family stack; the host itself only stores the primary family.
pub const FONT_STACK_KEY: &str = "edtm_font_stack";

/// Size exactly as entered; the host only keeps the parsed dimension.
pub const SIZE_TEXT_KEY: &str = "edtm_size_text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypographyField {
    Typography,
    FontFamily,
    FontSize,
    FontSizeCustom,
    FontWeight,
    LineHeight,
}

impl TypographyField {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Typography => "_typography",
            Self::FontFamily => "_font_family",
            Self::FontSize => "_font_size",
            Self::FontSizeCustom => "_font_size_custom",
            Self::FontWeight => "_font_weight",
            Self::LineHeight => "_line_height",
        }
    }
}

pub fn field_key(prefix: &str, field: TypographyField) -> String {
    format!("{prefix}{}", field.suffix())
}

/// Detected prefix first, then the legacy prefixes, without duplicates.
pub fn synonym_prefixes(prefix: &str) -> Vec<&str> {
    let mut prefixes = vec![prefix];
    for legacy in LEGACY_PREFIXES {
        if !prefixes.contains(&legacy) {
            prefixes.push(legacy);
        }
    }
    prefixes
}
