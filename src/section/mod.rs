//! Which admin panel (colors or fonts) a request belongs to.

use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize_key;

/// Per-user meta key holding the last panel a user worked in.
pub const SECTION_PREFERENCE_KEY: &str = "edtm_last_active_section";
/// Query parameter carrying the visible panel in admin URLs.
pub const SECTION_QUERY_PARAM: &str = "edtm_section";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Colors,
    #[default]
    Fonts,
}

impl Section {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colors => "colors",
            Self::Fonts => "fonts",
        }
    }

    fn from_exact(value: &str) -> Option<Self> {
        match value {
            "colors" => Some(Self::Colors),
            "fonts" => Some(Self::Fonts),
            _ => None,
        }
    }

    /// Slug-sanitizes `value` before matching.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_exact(&sanitize_key(value))
    }
}

/// Candidate sources, consulted in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSource<'a> {
    /// Referring page URL; its `edtm_section` query parameter is read.
    Referer(&'a str),
    /// Hidden form field posted with the request.
    Form(&'a str),
    /// Stored user preference; must match exactly.
    Preference(&'a str),
}

impl SectionSource<'_> {
    fn section(&self) -> Option<Section> {
        match self {
            Self::Referer(url) => referer_section(url),
            Self::Form(value) => Section::parse(value),
            Self::Preference(value) => Section::from_exact(value),
        }
    }
}

/// First source that names a known section, else [`Section::Fonts`].
pub fn resolve_section(sources: &[SectionSource<'_>]) -> Section {
    sources
        .iter()
        .find_map(SectionSource::section)
        .unwrap_or_default()
}

fn referer_section(url: &str) -> Option<Section> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or("");
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == SECTION_QUERY_PARAM)
        .last()
        .and_then(|(_, value)| Section::parse(value))
}
