use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

/// Unit the host uses for free-form size expressions such as `clamp()`.
pub const CUSTOM_UNIT: &str = "custom";

static NUMERIC_DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]*\.?[0-9]+)\s*(px|rem|em)\s*$").expect("static regex")
});

pub fn dimension_value(unit: &str, size: Value) -> Value {
    json!({ "unit": unit, "size": size, "sizes": [] })
}

/// `"1.5rem"` → `{unit: "rem", size: 1.5}`. Only plain number + unit parses.
pub fn numeric_dimension(value: &str) -> Option<Value> {
    let captures = NUMERIC_DIMENSION.captures(value)?;
    let size: f64 = captures[1].parse().ok()?;
    Some(dimension_value(&captures[2].to_ascii_lowercase(), json!(size)))
}

/// Line heights only travel as `em` dimensions.
pub fn em_dimension(value: &str) -> Option<Value> {
    numeric_dimension(value).filter(|dimension| dimension["unit"] == "em")
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            text.bytes()
                .any(|b| b.is_ascii_digit())
                .then(|| text.parse::<f64>().ok())
                .flatten()
                .filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Renders a host dimension as a size string; anything that is not a
/// `{unit, size}` object renders empty.
pub fn dimension_to_string(dimension: &Value) -> String {
    let Some(object) = dimension.as_object() else {
        return String::new();
    };
    let (Some(unit), Some(size)) = (object.get("unit"), object.get("size")) else {
        return String::new();
    };
    let unit = match unit {
        Value::String(unit) => unit.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if let Some(number) = numeric(size) {
        return format!("{}{unit}", format_number(number));
    }
    match size {
        Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => String::new(),
    }
}

/// Size expression stored as `{unit: "custom", size: "<expr>"}`.
pub fn custom_dimension_size(dimension: &Value) -> Option<String> {
    let object = dimension.as_object()?;
    if object.get("unit").and_then(Value::as_str) != Some(CUSTOM_UNIT) {
        return None;
    }
    object
        .get("size")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|size| !size.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_dimension_parses_plain_sizes_only() {
        assert_eq!(
            numeric_dimension(" 1.5REM "),
            Some(json!({"unit": "rem", "size": 1.5, "sizes": []}))
        );
        assert_eq!(
            numeric_dimension("16 px"),
            Some(json!({"unit": "px", "size": 16.0, "sizes": []}))
        );
        assert_eq!(numeric_dimension("clamp(1rem, 2vw, 3rem)"), None);
        assert_eq!(numeric_dimension("16pt"), None);
    }

    #[test]
    fn em_dimension_rejects_other_units() {
        assert_eq!(
            em_dimension("1.2 em"),
            Some(json!({"unit": "em", "size": 1.2, "sizes": []}))
        );
        assert_eq!(em_dimension("24px"), None);
    }

    #[test]
    fn dimension_to_string_drops_trailing_zero_fraction() {
        assert_eq!(dimension_to_string(&json!({"unit": "px", "size": 16.0})), "16px");
        assert_eq!(dimension_to_string(&json!({"unit": "em", "size": 1.25})), "1.25em");
        assert_eq!(dimension_to_string(&json!({"unit": "rem", "size": "2"})), "2rem");
    }

    #[test]
    fn dimension_to_string_passes_through_string_sizes() {
        let clamp = json!({"unit": "custom", "size": " clamp(1rem, 2vw, 3rem) "});
        assert_eq!(dimension_to_string(&clamp), "clamp(1rem, 2vw, 3rem)");
        assert_eq!(custom_dimension_size(&clamp).as_deref(), Some("clamp(1rem, 2vw, 3rem)"));
    }

    #[test]
    fn malformed_dimensions_render_empty() {
        assert_eq!(dimension_to_string(&json!("16px")), "");
        assert_eq!(dimension_to_string(&json!({"unit": "px"})), "");
        assert_eq!(dimension_to_string(&json!({"unit": "px", "size": ""})), "");
        assert_eq!(custom_dimension_size(&json!({"unit": "px", "size": "x"})), None);
    }
}
