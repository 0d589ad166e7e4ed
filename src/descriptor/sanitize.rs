// Markup → plain text for the human-readable description.
//
// Descriptions are small HTML fragments ("<p>Adds <b>foo</b> support</p>").
// Only the visible text matters for similarity, so tags are dropped, a
// handful of common entities are decoded, and whitespace is collapsed.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Converts markup into plain text. Swappable so a full HTML parser can be
/// plugged in without touching the descriptor parser.
pub trait MarkupSanitizer {
    fn to_plain_text(&self, markup: &str) -> String;
}

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid entity regex"));

/// Regex-based tag stripper. Every tag becomes whitespace so words on
/// either side don't fuse together.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagStripper;

impl MarkupSanitizer for TagStripper {
    fn to_plain_text(&self, markup: &str) -> String {
        let without_comments = COMMENT.replace_all(markup, " ");
        let without_tags = TAG.replace_all(&without_comments, " ");
        let decoded = decode_entities(&without_tags);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex_lite::Captures<'_>| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        let text = TagStripper.to_plain_text("<p>Adds <b>Rust</b>\n   support</p><ul><li>fast</li></ul>");
        assert_eq!(text, "Adds Rust support fast");
    }

    #[test]
    fn test_decodes_entities() {
        let text = TagStripper.to_plain_text("Tom &amp; Jerry &lt;3 &#65;&#x42;");
        assert_eq!(text, "Tom & Jerry <3 AB");
    }

    #[test]
    fn test_drops_comments() {
        let text = TagStripper.to_plain_text("keep<!-- <b>drop</b> -->this");
        assert_eq!(text, "keep this");
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(TagStripper.to_plain_text("already plain"), "already plain");
    }
}
