//! Flat option-store form: `{title: hex}` and `{title: {family, size, weight, line_height}}`.
//!
//! Titles are the only key, so two titles that differ only by case share one
//! slot. The last one written wins, at the position of the first.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize::{coerce_weight, scalar_text};
use crate::tokens::{title_key, weight_field, ColorToken, FontToken};

pub type ColorOptions = IndexMap<String, String>;
pub type FontOptions = IndexMap<String, FontProps>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontProps {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, with = "weight_field")]
    pub weight: Option<u32>,
    #[serde(default)]
    pub line_height: String,
}

impl FontProps {
    /// Lenient read: non-object values give empty props, scalar fields are
    /// stringified.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).map(scalar_text).unwrap_or_default();
        Self {
            family: field("family"),
            size: field("size"),
            weight: value.get("weight").and_then(coerce_weight),
            line_height: field("line_height"),
        }
    }

    fn from_token(font: &FontToken) -> Self {
        Self {
            family: font.family.clone(),
            size: font.size.clone(),
            weight: font.weight,
            line_height: font.line_height.clone(),
        }
    }

    fn into_token(self, title: String) -> FontToken {
        FontToken {
            id: String::new(),
            title,
            family: self.family,
            size: self.size,
            weight: self.weight,
            line_height: self.line_height,
        }
    }

    /// Overlays the non-empty fields of `self` onto `font`.
    pub fn overlay(&self, font: &mut FontToken) {
        if !self.family.is_empty() {
            font.family = self.family.clone();
        }
        if !self.size.is_empty() {
            font.size = self.size.clone();
        }
        if self.weight.is_some() {
            font.weight = self.weight;
        }
        if !self.line_height.is_empty() {
            font.line_height = self.line_height.clone();
        }
    }
}

/// Folds `(title, value)` pairs on the case-insensitive title.
fn fold_titles<V>(entries: impl IntoIterator<Item = (String, V)>) -> IndexMap<String, V> {
    let mut slots: IndexMap<String, (String, V)> = IndexMap::new();
    for (title, value) in entries {
        slots.insert(title_key(&title), (title, value));
    }
    slots.into_values().collect()
}

pub fn color_options(colors: &[ColorToken]) -> ColorOptions {
    fold_titles(
        colors
            .iter()
            .map(|color| (color.title.clone(), color.color.clone())),
    )
}

pub fn font_options(fonts: &[FontToken]) -> FontOptions {
    fold_titles(
        fonts
            .iter()
            .map(|font| (font.title.clone(), FontProps::from_token(font))),
    )
}

pub fn colors_from_options(options: &ColorOptions) -> Vec<ColorToken> {
    fold_titles(options.iter().map(|(title, hex)| (title.clone(), hex.clone())))
        .into_iter()
        .map(|(title, color)| ColorToken::new("", title, color))
        .collect()
}

pub fn fonts_from_options(options: &FontOptions) -> Vec<FontToken> {
    fold_titles(options.iter().map(|(title, props)| (title.clone(), props.clone())))
        .into_iter()
        .map(|(title, props)| props.into_token(title))
        .collect()
}

/// Reads a stored color mapping, keeping only string values.
pub fn color_options_from_value(value: &Value) -> ColorOptions {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(title, hex)| Some((title.clone(), hex.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

pub fn font_options_from_value(value: &Value) -> FontOptions {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .map(|(title, props)| (title.clone(), FontProps::from_value(props)))
                .collect()
        })
        .unwrap_or_default()
}
