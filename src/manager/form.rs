//! Submitted rows and bulk text, reduced to canonical tokens.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bulk::{parse_bulk_colors, parse_bulk_fonts};
use crate::sanitize::{
    coerce_weight, sanitize_font_family, sanitize_font_size, sanitize_hex_color,
    sanitize_line_height, sanitize_text_field,
};
use crate::tokens::{title_key, ColorToken, FontToken};

/// One edited color row. `token` is the title as the row editor names it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub color: String,
}

impl ColorRow {
    fn to_token(&self) -> Option<ColorToken> {
        let token = ColorToken::new(
            sanitize_text_field(&self.id),
            sanitize_text_field(&self.token),
            sanitize_hex_color(&self.color),
        );
        token.is_complete().then_some(token)
    }
}

impl From<&ColorToken> for ColorRow {
    fn from(color: &ColorToken) -> Self {
        Self {
            id: color.id.clone(),
            token: color.title.clone(),
            color: color.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub size: String,
    /// Raw field value; numbers and numeric strings are both accepted.
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub line_height: String,
}

impl FontRow {
    fn to_token(&self) -> Option<FontToken> {
        let title = sanitize_text_field(&self.token);
        if title.is_empty() {
            return None;
        }
        Some(FontToken {
            id: sanitize_text_field(&self.id),
            title,
            family: sanitize_font_family(&self.family),
            size: sanitize_font_size(&self.size),
            weight: coerce_weight(&self.weight),
            line_height: sanitize_line_height(&self.line_height),
        })
    }
}

impl From<&FontToken> for FontRow {
    fn from(font: &FontToken) -> Self {
        Self {
            id: font.id.clone(),
            token: font.title.clone(),
            family: font.family.clone(),
            size: font.size.clone(),
            weight: font.weight.map_or(Value::Null, Value::from),
            line_height: font.line_height.clone(),
        }
    }
}

/// Everything a save submits: edited rows plus optional bulk paste text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub colors: Vec<ColorRow>,
    #[serde(default)]
    pub fonts: Vec<FontRow>,
    #[serde(default)]
    pub colors_bulk: String,
    #[serde(default)]
    pub fonts_bulk: String,
}

impl SaveForm {
    /// Sanitized rows first, then bulk entries whose title no row already
    /// uses (compared case-insensitively).
    pub fn into_tokens(self) -> (Vec<ColorToken>, Vec<FontToken>) {
        let mut colors: Vec<ColorToken> = self.colors.iter().filter_map(ColorRow::to_token).collect();
        let row_titles = titles(colors.iter().map(|color| color.title.as_str()));
        if !self.colors_bulk.trim().is_empty() {
            colors.extend(
                parse_bulk_colors(&self.colors_bulk)
                    .filter(|color| !row_titles.contains(&title_key(&color.title))),
            );
        }

        let mut fonts: Vec<FontToken> = self.fonts.iter().filter_map(FontRow::to_token).collect();
        let row_titles = titles(fonts.iter().map(|font| font.title.as_str()));
        if !self.fonts_bulk.trim().is_empty() {
            fonts.extend(
                parse_bulk_fonts(&self.fonts_bulk)
                    .filter(|font| !row_titles.contains(&title_key(&font.title))),
            );
        }

        (colors, fonts)
    }
}

fn titles<'t>(titles: impl Iterator<Item = &'t str>) -> HashSet<String> {
    titles.map(title_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_win_over_bulk_entries_with_the_same_title() {
        let form = SaveForm {
            colors: vec![ColorRow {
                id: "c1".into(),
                token: "Primary".into(),
                color: "#111111".into(),
            }],
            colors_bulk: "primary: #222222\nAccent: #333333".into(),
            ..SaveForm::default()
        };

        let (colors, fonts) = form.into_tokens();
        assert!(fonts.is_empty());
        assert_eq!(
            colors,
            vec![
                ColorToken::new("c1", "Primary", "#111111"),
                ColorToken::new("", "Accent", "#333333"),
            ]
        );
    }

    #[test]
    fn incomplete_color_rows_are_dropped() {
        let form = SaveForm {
            colors: vec![
                ColorRow {
                    token: "Broken".into(),
                    color: "blue".into(),
                    ..ColorRow::default()
                },
                ColorRow {
                    token: " ".into(),
                    color: "#fff".into(),
                    ..ColorRow::default()
                },
            ],
            ..SaveForm::default()
        };
        assert!(form.into_tokens().0.is_empty());
    }

    #[test]
    fn font_rows_are_sanitized_field_by_field() {
        let form = SaveForm {
            fonts: vec![FontRow {
                id: "t1".into(),
                token: "<b>Body</b>".into(),
                family: "'Inter', sans-serif".into(),
                size: "16pt".into(),
                weight: json!("-600"),
                line_height: "1.5em".into(),
            }],
            fonts_bulk: "Lead: Lato, 20px, 300".into(),
            ..SaveForm::default()
        };

        let (_, fonts) = form.into_tokens();
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].title, "Body");
        assert_eq!(fonts[0].family, "Inter, sans-serif");
        assert_eq!(fonts[0].size, "");
        assert_eq!(fonts[0].weight, Some(600));
        assert_eq!(fonts[1].title, "Lead");
        assert_eq!(fonts[1].weight, Some(300));
    }

    #[test]
    fn font_row_round_trips_a_token() {
        let font = FontToken {
            id: "t9".into(),
            title: "Display".into(),
            family: "Inter".into(),
            size: "clamp(2rem, 4vw, 3rem)".into(),
            weight: Some(800),
            line_height: "1.1em".into(),
        };
        let form = SaveForm {
            fonts: vec![FontRow::from(&font)],
            ..SaveForm::default()
        };
        assert_eq!(form.into_tokens().1, vec![font]);
    }
}
