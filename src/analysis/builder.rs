// Canonical analysis builder: one pass over a package, one PluginAnalysis.
//
// Every top-level file is digested and counted. Sub-containers are also
// scanned for packages, method symbols, keywords, and the descriptor. The
// result is a pure function of the input bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};

use super::dependencies::{build_dependencies, OwnCodeFilter};
use super::model::{PluginAnalysis, PluginDna, PluginMetadata, StructureInfo};
use super::signature::{build_content_signature, sha256_hex};
use crate::archive::jar::{scan_jar, DnaAccumulator};
use crate::archive::walker::{is_sub_container, ArchiveWalker};
use crate::descriptor::parse_descriptor;
use crate::descriptor::sanitize::{MarkupSanitizer, TagStripper};
use crate::error::ExtractError;

/// Builds a `PluginAnalysis` from a package container.
pub struct AnalysisBuilder {
    own_code: OwnCodeFilter,
    sanitizer: Box<dyn MarkupSanitizer + Send + Sync>,
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self::new(OwnCodeFilter::default())
    }
}

impl AnalysisBuilder {
    pub fn new(own_code: OwnCodeFilter) -> Self {
        Self {
            own_code,
            sanitizer: Box::new(TagStripper),
        }
    }

    /// Swap the markup sanitizer used for the description field.
    pub fn with_sanitizer(mut self, sanitizer: Box<dyn MarkupSanitizer + Send + Sync>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Analyze a package on disk. A missing input is reported separately from
    /// an unreadable one.
    pub fn analyze_path(&self, path: &Path) -> Result<PluginAnalysis, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ExtractError::Io {
            location: path.display().to_string(),
            source,
        })?;
        self.analyze_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Analyze a package from any seekable byte source.
    pub fn analyze_reader<R: Read + Seek>(
        &self,
        reader: R,
        label: &str,
    ) -> Result<PluginAnalysis, ExtractError> {
        let mut walker = ArchiveWalker::open(reader, label)?;

        let mut file_hashes = BTreeMap::new();
        let mut files_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_files = 0usize;
        let mut total_size = 0u64;
        let mut jar_files = Vec::new();
        let mut descriptor: Option<String> = None;
        let mut acc = DnaAccumulator::default();

        for entry in walker.entries() {
            let entry = entry?;
            total_files += 1;
            total_size += entry.size;
            *files_by_type.entry(extension_of(&entry.name)).or_insert(0) += 1;
            file_hashes.insert(entry.name.clone(), sha256_hex(&entry.bytes));

            if !is_sub_container(&entry.name) {
                continue;
            }

            let (scan, next) = scan_jar(&entry.name, &entry.bytes, acc)?;
            acc = next;
            if let Some(xml) = scan.descriptor {
                if descriptor.is_none() {
                    descriptor = Some(xml);
                } else {
                    warn!(jar = %scan.info.name, "Ignoring additional plugin descriptor");
                }
            }
            jar_files.push(scan.info);
        }

        let parsed = descriptor
            .as_deref()
            .map(|xml| parse_descriptor(xml, self.sanitizer.as_ref()));
        if parsed.is_none() {
            debug!(package = label, "No plugin descriptor found");
        }
        let (metadata, plugin_dependencies, description) = match parsed {
            Some(d) => (d.metadata, d.dependencies, d.description),
            None => (PluginMetadata::default(), Vec::new(), None),
        };

        let dependencies = build_dependencies(
            plugin_dependencies,
            &jar_files,
            &file_hashes,
            metadata.plugin_id.as_deref(),
            metadata.compatibility.clone(),
            &self.own_code,
        );

        info!(
            package = label,
            files = total_files,
            jars = jar_files.len(),
            methods = acc.methods.len(),
            skipped_classes = acc.skipped_classes,
            "Analyzed plugin package"
        );

        Ok(PluginAnalysis {
            metadata,
            structure: StructureInfo {
                total_files,
                total_size,
                files_by_type,
                jar_files,
            },
            dependencies,
            content_signature: build_content_signature(file_hashes, descriptor.as_deref()),
            plugin_dna: PluginDna {
                keywords: acc.keywords,
                description,
                methods: acc.methods,
            },
        })
    }
}

/// Extension of the file name (after the last dot of the last path
/// segment), or the empty string.
fn extension_of(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}
