//! Portable JSON exchange format.
//!
//! ```json
//! {"schema": "edtm-1.0", "generated_at": "2024-05-01 12:00:00", "site": "https://example.test",
//!  "colors": [{"id", "title", "color"}], "fonts": [{"id", "title", "family", "size", "weight", "line_height"}]}
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::sanitize::{
    coerce_weight, sanitize_font_family, sanitize_font_size, sanitize_hex_color,
    sanitize_line_height, sanitize_text_field, scalar_text,
};
use crate::tokens::{ColorToken, FontToken};

pub const SCHEMA: &str = "edtm-1.0";
pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 2 * 1024 * 1024;
const IMPORT_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import file must have a .json extension: {path}")]
    WrongExtension { path: PathBuf },
    #[error("failed to read import file: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("import file is {size} bytes; the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("import file is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("import payload must be a non-empty JSON object")]
    NotAnObject,
    #[error("import payload has neither `colors` nor `fonts`")]
    MissingTokens,
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Where an export reads its tokens from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportSource {
    #[default]
    Kit,
    Plugin,
}

impl ExportSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kit => "kit",
            Self::Plugin => "plugin",
        }
    }
}

impl FromStr for ExportSource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "kit" => Ok(Self::Kit),
            "plugin" => Ok(Self::Plugin),
            other => Err(format!("unknown export source `{other}` (expected kit or plugin)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePayload {
    pub schema: String,
    pub generated_at: String,
    pub site: String,
    pub colors: Vec<ColorToken>,
    pub fonts: Vec<FontToken>,
}

impl ExchangePayload {
    /// Blanks every id unless `preserve_ids` is set.
    pub fn build(
        site: impl Into<String>,
        mut colors: Vec<ColorToken>,
        mut fonts: Vec<FontToken>,
        preserve_ids: bool,
        now: OffsetDateTime,
    ) -> Self {
        if !preserve_ids {
            strip_ids(&mut colors, &mut fonts);
        }
        Self {
            schema: SCHEMA.to_string(),
            generated_at: timestamp(now),
            site: site.into(),
            colors,
            fonts,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `YYYY-MM-DD HH:MM:SS`.
pub fn timestamp(now: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    now.format(&format).unwrap_or_default()
}

pub fn strip_ids(colors: &mut [ColorToken], fonts: &mut [FontToken]) {
    colors.iter_mut().for_each(|color| color.id.clear());
    fonts.iter_mut().for_each(|font| font.id.clear());
}

/// Sanitized tokens ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedTokens {
    pub colors: Vec<ColorToken>,
    pub fonts: Vec<FontToken>,
}

/// Reads and validates an import file. Only `.json` files up to `limit`
/// bytes are accepted.
pub fn read_import_file(path: &Path, preserve_ids: bool, limit: u64) -> ImportResult<ImportedTokens> {
    let has_json_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(IMPORT_EXTENSION));
    if !has_json_extension {
        return Err(ImportError::WrongExtension {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(read_err)?.len();
    if size > limit {
        return Err(ImportError::TooLarge { size, limit });
    }
    let bytes = fs::read(path).map_err(read_err)?;
    parse_import(&bytes, preserve_ids, limit)
}

pub fn parse_import(bytes: &[u8], preserve_ids: bool, limit: u64) -> ImportResult<ImportedTokens> {
    let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ImportError::TooLarge { size, limit });
    }

    let payload: Value = serde_json::from_slice(bytes).map_err(ImportError::InvalidJson)?;
    let payload = match payload {
        Value::Object(object) if !object.is_empty() => object,
        _ => return Err(ImportError::NotAnObject),
    };
    if !payload.contains_key("colors") && !payload.contains_key("fonts") {
        return Err(ImportError::MissingTokens);
    }

    let entries = |key: &str| -> Vec<Map<String, Value>> {
        match payload.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            _ => Vec::new(),
        }
    };

    let colors = entries("colors")
        .iter()
        .map(|entry| import_color(entry, preserve_ids))
        .filter(ColorToken::is_complete)
        .collect();
    let fonts = entries("fonts")
        .iter()
        .map(|entry| import_font(entry, preserve_ids))
        .filter(|font| !font.title.is_empty())
        .collect();

    Ok(ImportedTokens { colors, fonts })
}

fn text(entry: &Map<String, Value>, key: &str) -> String {
    entry.get(key).map(scalar_text).unwrap_or_default()
}

fn import_id(entry: &Map<String, Value>, preserve_ids: bool) -> String {
    if preserve_ids {
        sanitize_text_field(&text(entry, "id"))
    } else {
        String::new()
    }
}

fn import_color(entry: &Map<String, Value>, preserve_ids: bool) -> ColorToken {
    ColorToken {
        id: import_id(entry, preserve_ids),
        title: sanitize_text_field(&text(entry, "title")),
        color: sanitize_hex_color(&text(entry, "color")),
    }
}

fn import_font(entry: &Map<String, Value>, preserve_ids: bool) -> FontToken {
    FontToken {
        id: import_id(entry, preserve_ids),
        title: sanitize_text_field(&text(entry, "title")),
        family: sanitize_font_family(&text(entry, "family")),
        size: sanitize_font_size(&text(entry, "size")),
        weight: entry.get("weight").and_then(coerce_weight),
        line_height: sanitize_line_height(&text(entry, "line_height")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::with_temp_root;
    use serde_json::json;
    use time::macros::datetime;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn export_without_preserve_ids_blanks_every_id() {
        let payload = ExchangePayload::build(
            "https://example.test",
            vec![ColorToken::new("c1", "Primary", "#1e73be")],
            vec![FontToken {
                id: "t1".into(),
                ..FontToken::titled("Body")
            }],
            false,
            datetime!(2024-05-01 08:09:10 UTC),
        );

        assert_eq!(payload.schema, "edtm-1.0");
        assert_eq!(payload.generated_at, "2024-05-01 08:09:10");
        assert!(payload.colors.iter().all(|c| c.id.is_empty()));
        assert!(payload.fonts.iter().all(|f| f.id.is_empty()));
    }

    #[test]
    fn export_serializes_tokens_in_exchange_shape() {
        let payload = ExchangePayload::build(
            "https://example.test",
            Vec::new(),
            vec![FontToken {
                id: "t1".into(),
                family: "Inter".into(),
                size: "2rem".into(),
                weight: Some(700),
                ..FontToken::titled("Heading")
            }],
            true,
            datetime!(2024-05-01 00:00:00 UTC),
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["fonts"][0],
            json!({"id": "t1", "title": "Heading", "family": "Inter", "size": "2rem", "weight": 700, "line_height": ""})
        );
        assert_eq!(value["colors"], json!([]));
    }

    #[test]
    fn import_accepts_either_collection_alone() {
        let tokens = parse_import(
            &bytes(json!({"colors": [{"id": "c1", "title": "Primary", "color": "#1e73be"}]})),
            true,
            DEFAULT_MAX_IMPORT_BYTES,
        )
        .unwrap();
        assert_eq!(tokens.colors, vec![ColorToken::new("c1", "Primary", "#1e73be")]);
        assert!(tokens.fonts.is_empty());

        let tokens = parse_import(&bytes(json!({"fonts": "oops"})), true, DEFAULT_MAX_IMPORT_BYTES)
            .unwrap();
        assert_eq!(tokens, ImportedTokens::default());
    }

    #[test]
    fn import_rejects_bad_payload_shapes() {
        let limit = DEFAULT_MAX_IMPORT_BYTES;
        assert!(matches!(
            parse_import(b"{not json", true, limit),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_import(b"[1, 2]", true, limit),
            Err(ImportError::NotAnObject)
        ));
        assert!(matches!(parse_import(b"{}", true, limit), Err(ImportError::NotAnObject)));
        assert!(matches!(
            parse_import(&bytes(json!({"schema": "edtm-1.0"})), true, limit),
            Err(ImportError::MissingTokens)
        ));
        assert!(matches!(
            parse_import(&bytes(json!({"colors": []})), true, 4),
            Err(ImportError::TooLarge { limit: 4, .. })
        ));
    }

    #[test]
    fn import_sanitizes_fields_and_optionally_drops_ids() {
        let tokens = parse_import(
            &bytes(json!({
                "colors": [
                    {"id": "c1", "title": " <b>Primary</b> ", "color": "#1e73be"},
                    {"id": "c2", "title": "Bad", "color": "blue"},
                    "junk"
                ],
                "fonts": [
                    {"id": "t1", "title": "Heading", "family": "\"Inter\", sans-serif",
                     "size": "clamp(3rem, 2.5385rem + 2.0513vw, 4rem)", "weight": "-700", "line_height": "1.2em"},
                    {"id": "t2", "title": "", "family": "Roboto"},
                    {"title": "Body", "size": "16pt", "weight": 50, "line_height": "24px"}
                ]
            })),
            false,
            DEFAULT_MAX_IMPORT_BYTES,
        )
        .unwrap();

        assert_eq!(tokens.colors, vec![ColorToken::new("", "Primary", "#1e73be")]);
        assert_eq!(
            tokens.fonts,
            vec![
                FontToken {
                    id: String::new(),
                    title: "Heading".into(),
                    family: "Inter, sans-serif".into(),
                    size: "clamp(3rem, 2.5385rem + 2.0513vw, 4rem)".into(),
                    weight: Some(700),
                    line_height: "1.2em".into(),
                },
                FontToken {
                    weight: Some(50),
                    ..FontToken::titled("Body")
                },
            ]
        );
    }

    #[test]
    fn import_file_must_be_json_and_within_limit() {
        with_temp_root("import", |root| {
            let text_file = root.join("tokens.txt");
            fs::write(&text_file, "{}").unwrap();
            assert!(matches!(
                read_import_file(&text_file, true, DEFAULT_MAX_IMPORT_BYTES),
                Err(ImportError::WrongExtension { .. })
            ));

            let json_file = root.join("tokens.JSON");
            fs::write(&json_file, bytes(json!({"colors": []}))).unwrap();
            assert!(read_import_file(&json_file, true, DEFAULT_MAX_IMPORT_BYTES).is_ok());
            assert!(matches!(
                read_import_file(&json_file, true, 3),
                Err(ImportError::TooLarge { .. })
            ));

            assert!(matches!(
                read_import_file(&root.join("missing.json"), true, DEFAULT_MAX_IMPORT_BYTES),
                Err(ImportError::Read { .. })
            ));
        });
    }
}
