//! The editable rows the admin table shows.

use indexmap::IndexMap;
use serde::Serialize;

use crate::kit::KitCollections;
use crate::normalize::{colors_from_kit, fonts_from_kit, ColorOptions, FontOptions};
use crate::queue::PendingJob;
use crate::tokens::{title_key, ColorToken, FontToken};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenRows {
    pub colors: Vec<ColorToken>,
    pub fonts: Vec<FontToken>,
}

impl TokenRows {
    /// A queued job is shown as-is so deletes are visible before the kit
    /// catches up, including a job that clears every token.
    pub fn from_pending(job: &PendingJob) -> Self {
        Self {
            colors: job.colors_norm.clone(),
            fonts: job.fonts_norm.clone(),
        }
    }

    /// Kit records overlaid with option values. Option titles the kit does
    /// not know are appended without an id.
    pub fn overlay(kit: &KitCollections, colors: &ColorOptions, fonts: &FontOptions) -> Self {
        let mut color_rows: IndexMap<String, ColorToken> = colors_from_kit(&kit.colors)
            .into_iter()
            .map(|color| (title_key(&color.title), color))
            .collect();
        for (title, hex) in colors {
            color_rows
                .entry(title_key(title))
                .and_modify(|row| row.color = hex.clone())
                .or_insert_with(|| ColorToken::new("", title.clone(), hex.clone()));
        }

        let mut font_rows: IndexMap<String, FontToken> = fonts_from_kit(&kit.fonts)
            .into_iter()
            .map(|font| (title_key(&font.title), font))
            .collect();
        for (title, props) in fonts {
            let row = font_rows
                .entry(title_key(title))
                .or_insert_with(|| FontToken::titled(title.clone()));
            props.overlay(row);
        }

        Self {
            colors: color_rows.into_values().collect(),
            fonts: font_rows.into_values().collect(),
        }
    }
}
