//! Text cleanup heuristics for feed markup and stored memory text
//!
//! Feed descriptions arrive as HTML fragments; memory text comes back from
//! the store with tags already collapsed, which can join adjacent words.
//! Both paths normalize through the helpers here.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static CAMEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).unwrap());

/// Decode the fixed set of HTML entities seen in feed content.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// Clean a raw feed description: drop tags, decode entities, collapse
/// whitespace, cap at `max_len` chars with an ellipsis.
pub fn clean_feed_text(html: &str, max_len: usize) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = TAG_RE.replace_all(html, "");
    let text = decode_entities(&text);
    let text = collapse_whitespace(&text);
    if text.chars().count() > max_len {
        let capped: String = text.chars().take(max_len).collect();
        format!("{}...", capped)
    } else {
        text
    }
}

/// Normalize free text recovered from the memory store: strip any residual
/// markup, decode entities, re-insert the space lost at lowercase→uppercase
/// joins, collapse whitespace.
pub fn restore_stored_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = TAG_RE.replace_all(raw, " ");
    let text = decode_entities(&text);
    let text = CAMEL_RE.replace_all(&text, "${1} ${2}");
    collapse_whitespace(&text)
}

/// Derive a display name from recovered text: everything up to the first
/// period, truncated to 60 chars at a word boundary with an ellipsis.
pub fn display_name(text: &str) -> String {
    let name = text.split('.').next().unwrap_or("");
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 60 {
        return name.to_string();
    }
    let capped: String = chars[..60].iter().collect();
    let cut = match capped.rfind(' ') {
        Some(pos) => &capped[..pos],
        None => capped.as_str(),
    };
    format!("{}...", cut)
}

/// Extract the src of the first image tag in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC_RE
        .captures(html)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<p>Fresh &amp; bold</p> <b>drop</b>&nbsp;now";
        assert_eq!(clean_feed_text(html, 500), "Fresh & bold drop now");
    }

    #[test]
    fn caps_long_descriptions_with_ellipsis() {
        let long = "x".repeat(600);
        let cleaned = clean_feed_text(&long, 500);
        assert_eq!(cleaned.chars().count(), 503);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn repairs_camel_case_joins() {
        assert_eq!(
            restore_stored_text("New SneakersIn StoresToday"),
            "New Sneakers In Stores Today"
        );
    }

    #[test]
    fn display_name_stops_at_first_period() {
        assert_eq!(display_name("Air Max 2024. Now in stores."), "Air Max 2024");
    }

    #[test]
    fn display_name_truncates_at_word_boundary() {
        let text = "A very long product name that keeps going and going well past sixty characters total";
        let name = display_name(text);
        assert!(name.chars().count() <= 63);
        assert!(name.ends_with("..."));
        assert!(!name.trim_end_matches("...").ends_with(' '));
    }

    #[test]
    fn finds_first_image_source() {
        let html = r#"<div><img alt="x" src="https://cdn.example.com/a.jpg"> <img src="b.jpg"></div>"#;
        assert_eq!(
            first_img_src(html).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(first_img_src("no images here"), None);
    }
}
