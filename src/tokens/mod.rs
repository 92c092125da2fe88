//! Canonical token records shared by every representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::sanitize::coerce_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Color,
    Font,
}

impl TokenKind {
    /// Namespace of identifiers synthesized for this kind.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Color => "edtm_c_",
            Self::Font => "edtm_t_",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Font => "font",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorToken {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: String,
}

impl ColorToken {
    pub fn new(id: impl Into<String>, title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: color.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.color.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontToken {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, with = "weight_field")]
    pub weight: Option<u32>,
    #[serde(default)]
    pub line_height: String,
}

impl FontToken {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// First entry of the family stack, the one the host renders.
    pub fn primary_family(&self) -> &str {
        self.family.split(',').next().unwrap_or("").trim()
    }
}

/// Case-folded title used as the join key between representations.
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Weights travel as an integer, or `""` when unset; any numeric-looking
/// input is accepted on the way in.
pub(crate) mod weight_field {
    use super::*;

    pub fn serialize<S: Serializer>(weight: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        match weight {
            Some(weight) => serializer.serialize_u32(*weight),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(coerce_weight(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn font_token_weight_serializes_as_number_or_empty_string() {
        let mut token = FontToken::titled("Body");
        assert_eq!(serde_json::to_value(&token).unwrap()["weight"], json!(""));
        token.weight = Some(600);
        assert_eq!(serde_json::to_value(&token).unwrap()["weight"], json!(600));
    }

    #[test]
    fn font_token_accepts_string_weights_and_missing_fields() {
        let token: FontToken =
            serde_json::from_value(json!({"title": "Heading", "weight": "700"})).unwrap();
        assert_eq!(token.weight, Some(700));
        assert_eq!(token.family, "");
        assert_eq!(token.id, "");
    }

    #[test]
    fn primary_family_is_first_stack_entry() {
        let token = FontToken {
            family: "Inter, system-ui, sans-serif".into(),
            ..FontToken::default()
        };
        assert_eq!(token.primary_family(), "Inter");
        assert_eq!(FontToken::default().primary_family(), "");
    }
}
