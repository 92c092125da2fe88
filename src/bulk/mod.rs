//! Bulk paste parser: one `Name: value, value, ...` token per line.
//!
//! Both parsers are lazy iterators over the borrowed text. They are `Clone`,
//! so a caller can restart a parse without re-reading the input.

use crate::sanitize::{
    absint_str, bulk_weight, sanitize_font_family, sanitize_font_size, sanitize_hex_color,
    sanitize_line_height, sanitize_text_field,
};
use crate::tokens::{ColorToken, FontToken};

/// Splits on commas that are not nested inside parentheses, trimming each
/// segment. A trailing empty segment is dropped.
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                buffer.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                buffer.push(ch);
            }
            ',' if depth == 0 => {
                segments.push(buffer.trim().to_string());
                buffer.clear();
            }
            _ => buffer.push(ch),
        }
    }
    if !buffer.trim().is_empty() {
        segments.push(buffer.trim().to_string());
    }
    segments
}

fn is_weight_segment(segment: &str) -> bool {
    (2..=4).contains(&segment.len()) && segment.bytes().all(|b| b.is_ascii_digit())
}

/// `(name, rest)` for every non-blank line that has a colon and a usable name.
fn entries(text: &str) -> impl Iterator<Item = (String, &str)> + Clone + '_ {
    text.split(['\r', '\n']).filter_map(|line| {
        let line = line.trim();
        let (name, rest) = line.split_once(':')?;
        let name = sanitize_text_field(name.trim());
        (!name.is_empty()).then(|| (name, rest.trim()))
    })
}

pub fn parse_bulk_colors(text: &str) -> impl Iterator<Item = ColorToken> + Clone + '_ {
    entries(text).filter_map(|(title, rest)| {
        let color = sanitize_hex_color(rest);
        (!color.is_empty()).then(|| ColorToken::new("", title, color))
    })
}

pub fn parse_bulk_fonts(text: &str) -> impl Iterator<Item = FontToken> + Clone + '_ {
    entries(text).map(|(title, rest)| parse_font_line(title, rest))
}

fn parse_font_line(title: String, rest: &str) -> FontToken {
    let mut family_parts: Vec<String> = Vec::new();
    let mut size = String::new();
    let mut weight = 0u32;
    let mut line_height = String::new();

    for segment in split_top_level(rest) {
        if size.is_empty() {
            let candidate = sanitize_font_size(&segment);
            if !candidate.is_empty() {
                size = candidate;
                continue;
            }
        }
        if !size.is_empty() && weight == 0 && is_weight_segment(&segment) {
            weight = absint_str(&segment);
            continue;
        }
        if !size.is_empty() && line_height.is_empty() {
            let candidate = sanitize_line_height(&segment);
            if !candidate.is_empty() {
                line_height = candidate;
                continue;
            }
        }
        family_parts.push(segment);
    }

    FontToken {
        id: String::new(),
        title,
        family: sanitize_font_family(&family_parts.join(", ")),
        size,
        weight: bulk_weight(weight),
        line_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_top_level_keeps_clamp_arguments_together() {
        assert_eq!(
            split_top_level("Inter, clamp(1rem, 2vw + 1rem, 3rem), 700"),
            vec!["Inter", "clamp(1rem, 2vw + 1rem, 3rem)", "700"]
        );
        assert_eq!(split_top_level("a, b,"), vec!["a", "b"]);
        assert_eq!(split_top_level("a),(b, c"), vec!["a)", "(b, c"]);
    }

    #[test]
    fn parses_heading_line_with_clamp_and_font_stack() {
        let fonts: Vec<_> = parse_bulk_fonts(
            "Heading: Inter, system-ui, sans-serif, clamp(3rem, 2.5385rem + 2.0513vw, 4rem), 700, 1.2em",
        )
        .collect();

        assert_eq!(
            fonts,
            vec![FontToken {
                id: String::new(),
                title: "Heading".into(),
                family: "Inter, system-ui, sans-serif".into(),
                size: "clamp(3rem, 2.5385rem + 2.0513vw, 4rem)".into(),
                weight: Some(700),
                line_height: "1.2em".into(),
            }]
        );
    }

    #[test]
    fn size_with_space_before_unit_is_accepted() {
        let body = parse_bulk_fonts("Body: Roboto, 1 rem, 400, 1.5em")
            .next()
            .expect("one token");
        assert_eq!(body.family, "Roboto");
        assert_eq!(body.size, "1 rem");
        assert_eq!(body.weight, Some(400));
        assert_eq!(body.line_height, "1.5em");
    }

    #[test]
    fn weight_requires_a_size_first() {
        let token = parse_bulk_fonts("Caption: Lato, 600")
            .next()
            .expect("one token");
        assert_eq!(token.size, "");
        assert_eq!(token.weight, None);
        assert_eq!(token.family, "Lato, 600");
    }

    #[test]
    fn first_em_value_is_taken_as_size_before_line_height() {
        let token = parse_bulk_fonts("Lead: Lato, 1.25em, 1.6em")
            .next()
            .expect("one token");
        assert_eq!(token.size, "1.25em");
        assert_eq!(token.line_height, "1.6em");
        assert_eq!(token.family, "Lato");
    }

    #[test]
    fn out_of_range_bulk_weight_falls_back_to_default() {
        let token = parse_bulk_fonts("Tiny: Lato, 12px, 50")
            .next()
            .expect("one token");
        assert_eq!(token.weight, Some(400));
    }

    #[test]
    fn skips_lines_without_colon_or_name() {
        let text = "no colon here\r\n\r\n: #fff\rPrimary: #1e73be\nBroken: blue\n";
        let colors: Vec<_> = parse_bulk_colors(text).collect();
        assert_eq!(colors, vec![ColorToken::new("", "Primary", "#1e73be")]);
    }

    #[test]
    fn first_colon_delimits_name() {
        let token = parse_bulk_fonts("Display: Inter, 48px, 800, 1.1em: extra")
            .next()
            .expect("one token");
        assert_eq!(token.title, "Display");
        assert_eq!(token.size, "48px");
        assert_eq!(token.weight, Some(800));
        assert_eq!(token.family, "Inter, 11em extra");
    }

    #[test]
    fn parsers_are_restartable() {
        let text = "A: #111\nB: #222";
        let parser = parse_bulk_colors(text);
        let first: Vec<_> = parser.clone().collect();
        let second: Vec<_> = parser.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
