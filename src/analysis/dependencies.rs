// Dependency accounting: declared plugin dependencies plus bundled libraries.
//
// A package bundles its own code next to third-party libraries. Which
// sub-containers count as "own code" is decided by an `OwnCodeFilter`; the
// rest are reported as library JARs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use super::model::{CompatibilityRange, Dependencies, JarInfo, LibraryJar, PluginDependency};

static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("valid version regex"));

/// Id segments that also lead common third-party library names
/// (`kotlin-stdlib`, `json-smart`, `core-utils`) and so never identify a plugin.
const GENERIC_SEGMENTS: &[&str] = &[
    "api", "client", "common", "commons", "core", "http", "java", "json", "kotlin", "lib",
    "plugin", "plugins", "runtime", "server", "shared", "util", "utils", "xml",
];

/// Decides which sub-containers belong to the plugin itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OwnCodeFilter {
    /// Own code is the sub-container carrying the descriptor, plus any
    /// sub-container whose normalized name contains the normalized declared
    /// plugin id, or whose name starts with the id's last segment when that
    /// segment is not a generic library word.
    #[default]
    DeclaredId,
    /// Own code is any sub-container whose name contains this substring.
    Pattern(String),
    /// Every sub-container is reported as a library.
    None,
}

impl OwnCodeFilter {
    pub fn is_own_code(&self, jar: &JarInfo, plugin_id: Option<&str>) -> bool {
        match self {
            OwnCodeFilter::DeclaredId => {
                if jar.has_descriptor {
                    return true;
                }
                let Some(id) = plugin_id else {
                    return false;
                };
                let name = normalize(file_stem(&jar.name));
                let full = normalize(id);
                if !full.is_empty() && name.contains(&full) {
                    return true;
                }
                let last = id.rsplit('.').next().map(normalize).unwrap_or_default();
                let leading = name.split('-').next().unwrap_or_default();
                last.len() > 2 && leading == last && !GENERIC_SEGMENTS.contains(&last.as_str())
            }
            OwnCodeFilter::Pattern(pattern) => jar.name.contains(pattern.as_str()),
            OwnCodeFilter::None => false,
        }
    }
}

/// Lower-case and unify separators so `com.example.fancy`, `fancy_tools`, and
/// `Fancy-Tools` compare on equal footing.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' | '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn file_stem(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.strip_suffix(".jar").unwrap_or(file)
}

/// First `N.N.N` in a library name (`jackson-core-2.17.2.jar` → `2.17.2`).
pub fn library_version(jar_name: &str) -> Option<String> {
    SEMVER.find(jar_name).map(|m| m.as_str().to_string())
}

pub fn build_dependencies(
    plugin_dependencies: Vec<PluginDependency>,
    jars: &[JarInfo],
    file_hashes: &BTreeMap<String, String>,
    plugin_id: Option<&str>,
    compatibility: Option<CompatibilityRange>,
    filter: &OwnCodeFilter,
) -> Dependencies {
    let library_jars = jars
        .iter()
        .filter(|jar| !filter.is_own_code(jar, plugin_id))
        .map(|jar| LibraryJar {
            name: jar.name.clone(),
            version: library_version(&jar.name),
            size: jar.size,
            hash: file_hashes.get(&jar.name).cloned().unwrap_or_default(),
        })
        .collect();

    Dependencies {
        plugin_dependencies,
        library_jars,
        compatibility,
    }
}
