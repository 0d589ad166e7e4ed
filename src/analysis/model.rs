// PluginAnalysis: the canonical, persisted fingerprint source of one package.
//
// Every collection is ordered (BTreeMap / BTreeSet) so that serializing the
// same analysis always produces the same bytes. Field names are camelCase
// on disk.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identity fields from the descriptor. All optional: the descriptor may be
/// partial or missing entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    pub plugin_id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub vendor: Option<String>,
    pub compatibility: Option<CompatibilityRange>,
}

/// Host build range the plugin declares it works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRange {
    pub since_build: String,
    pub until_build: Option<String>,
}

/// Summary of one nested sub-container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarInfo {
    pub name: String,
    pub size: u64,
    pub entry_count: usize,
    pub has_descriptor: bool,
    /// Dotted package names of the classes inside.
    pub packages: BTreeSet<String>,
}

/// Shape of the package as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInfo {
    pub total_files: usize,
    /// Sum of uncompressed file sizes in bytes
    pub total_size: u64,
    /// Extension (without the dot, "" if none) → number of files
    pub files_by_type: BTreeMap<String, usize>,
    /// Sub-containers in container entry order
    pub jar_files: Vec<JarInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDependency {
    pub id: String,
    pub optional: bool,
}

/// A bundled third-party library (a sub-container that is not the plugin's
/// own code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryJar {
    pub name: String,
    pub version: Option<String>,
    pub size: u64,
    /// SHA-256 of the library's bytes
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    pub plugin_dependencies: Vec<PluginDependency>,
    pub library_jars: Vec<LibraryJar>,
    pub compatibility: Option<CompatibilityRange>,
}

/// Content-addressable identity. Flipping any input byte flips
/// `overall_hash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSignature {
    pub overall_hash: String,
    pub descriptor_hash: Option<String>,
    /// Empty when the package contains no sub-containers
    pub aggregate_class_hash: String,
    /// Path → hex SHA-256 for every file in the package
    pub file_hashes: BTreeMap<String, String>,
}

/// The textual and identifier surface used for similarity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDna {
    pub keywords: BTreeSet<String>,
    pub description: Option<String>,
    pub methods: BTreeSet<String>,
}

/// Everything extracted from one package. Write-once, read-many.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginAnalysis {
    pub metadata: PluginMetadata,
    pub structure: StructureInfo,
    pub dependencies: Dependencies,
    pub content_signature: ContentSignature,
    #[serde(rename = "pluginDNA")]
    pub plugin_dna: PluginDna,
}

impl PluginAnalysis {
    /// Best human label for this package: declared name, then id, then
    /// the fallback the caller provides (usually the file name).
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.metadata
            .name
            .as_deref()
            .or(self.metadata.plugin_id.as_deref())
            .unwrap_or(fallback)
    }
}
