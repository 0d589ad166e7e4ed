// Plugin descriptor (META-INF/plugin.xml) field extraction.
//
// The descriptor is pattern-matched rather than parsed as XML: only a few
// well-known elements are needed, real-world descriptors are frequently
// sloppy, and a partial descriptor should still yield whatever fields it
// does carry. Missing fields stay None.

pub mod sanitize;

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::analysis::model::{CompatibilityRange, PluginDependency, PluginMetadata};
use sanitize::MarkupSanitizer;

/// Path of the descriptor inside the sub-container that carries it.
pub const DESCRIPTOR_PATH: &str = "META-INF/plugin.xml";

static ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<id>(.*?)</id>").expect("valid regex"));
static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<name>(.*?)</name>").expect("valid regex"));
static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<version>(.*?)</version>").expect("valid regex"));
static VENDOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<vendor\b[^>]*>(.*?)</vendor>").expect("valid regex"));
static DEPENDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<depends\b([^>]*)>([^<]+)</depends>").expect("valid regex"));
static OPTIONAL_TRUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\boptional\s*=\s*"true""#).expect("valid regex"));
static IDEA_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<idea-version\b([^>]*)>").expect("valid regex"));
static SINCE_BUILD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsince-build\s*=\s*"([^"]+)""#).expect("valid regex"));
static UNTIL_BUILD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\buntil-build\s*=\s*"([^"]+)""#).expect("valid regex"));
static DESCRIPTION_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<description>\s*<!\[CDATA\[(.*?)\]\]>\s*</description>")
        .expect("valid regex")
});
static DESCRIPTION_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<description>(.*?)</description>").expect("valid regex"));

/// Everything pulled out of one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub metadata: PluginMetadata,
    pub dependencies: Vec<PluginDependency>,
    pub description: Option<String>,
}

/// Extract identity, dependency, compatibility, and description fields.
pub fn parse_descriptor(xml: &str, sanitizer: &dyn MarkupSanitizer) -> Descriptor {
    let compatibility = parse_compatibility(xml);

    Descriptor {
        metadata: PluginMetadata {
            plugin_id: first_match(&ID, xml),
            name: first_match(&NAME, xml),
            version: first_match(&VERSION, xml),
            vendor: first_match(&VENDOR, xml),
            compatibility,
        },
        dependencies: parse_dependencies(xml),
        description: parse_description(xml, sanitizer),
    }
}

/// Every `<depends>` element, in document order.
pub fn parse_dependencies(xml: &str) -> Vec<PluginDependency> {
    DEPENDS
        .captures_iter(xml)
        .filter_map(|caps| {
            let id = caps[2].trim();
            if id.is_empty() {
                return None;
            }
            Some(PluginDependency {
                id: id.to_string(),
                optional: OPTIONAL_TRUE.is_match(&caps[1]),
            })
        })
        .collect()
}

/// The since/until build pair from `<idea-version>`. A range without a
/// since-build is treated as absent.
pub fn parse_compatibility(xml: &str) -> Option<CompatibilityRange> {
    let attrs = IDEA_VERSION.captures(xml)?;
    let attrs = attrs.get(1)?.as_str();
    let since_build = SINCE_BUILD.captures(attrs)?[1].to_string();
    let until_build = UNTIL_BUILD.captures(attrs).map(|c| c[1].to_string());
    Some(CompatibilityRange {
        since_build,
        until_build,
    })
}

/// The human description as plain text. Prefers the CDATA-wrapped form that
/// descriptors conventionally use.
pub fn parse_description(xml: &str, sanitizer: &dyn MarkupSanitizer) -> Option<String> {
    let raw = DESCRIPTION_CDATA
        .captures(xml)
        .or_else(|| DESCRIPTION_PLAIN.captures(xml))?;
    let text = sanitizer.to_plain_text(raw[1].trim());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_match(re: &Regex, xml: &str) -> Option<String> {
    re.captures(xml)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}
