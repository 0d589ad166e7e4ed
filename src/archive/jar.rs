// Nested sub-container (JAR) scan.
//
// A sub-container's bytes are opened through an in-memory random-access view
// that lives only for the duration of `scan_jar`. Keywords and method
// symbols found across all sub-containers are collected in a
// `DnaAccumulator` that is moved into each scan and handed back out, so the
// walk over a package is a plain fold.

use std::collections::BTreeSet;
use std::io::Cursor;

use tracing::debug;

use super::walker::ArchiveWalker;
use crate::analysis::model::JarInfo;
use crate::classfile;
use crate::descriptor::DESCRIPTOR_PATH;
use crate::error::ExtractError;

const CLASS_EXTENSION: &str = ".class";

/// Identifier surface gathered across every sub-container of a package.
#[derive(Debug, Clone, Default)]
pub struct DnaAccumulator {
    pub keywords: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    /// Classes that could not be introspected and were skipped
    pub skipped_classes: usize,
}

/// Result of scanning one sub-container.
#[derive(Debug, Clone)]
pub struct JarScan {
    pub info: JarInfo,
    /// Descriptor text, if this sub-container carries one
    pub descriptor: Option<String>,
}

/// Split a path or package name into lower-cased keyword tokens on `-`, `/`,
/// `.`, and `_`.
pub fn path_keywords(path: &str) -> BTreeSet<String> {
    path.split(['-', '/', '.', '_'])
        .filter(|part| !part.trim().is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Dotted package of a class entry path (`com/foo/Bar.class` → `com.foo`).
/// Classes in the default package yield an empty string.
pub fn package_of(class_path: &str) -> String {
    match class_path.rsplit_once('/') {
        Some((dir, _)) => dir.replace('/', "."),
        None => String::new(),
    }
}

/// Scan one sub-container and fold what it contains into `acc`.
pub fn scan_jar(
    name: &str,
    bytes: &[u8],
    mut acc: DnaAccumulator,
) -> Result<(JarScan, DnaAccumulator), ExtractError> {
    acc.keywords.extend(path_keywords(name));

    let mut walker = ArchiveWalker::open(Cursor::new(bytes), name)?;
    let entry_count = walker.entry_count();
    let has_descriptor = walker.entry_names().iter().any(|n| n == DESCRIPTOR_PATH);

    let mut packages = BTreeSet::new();
    for entry in walker.entries_matching(|n| n.ends_with(CLASS_EXTENSION)) {
        let entry = entry?;
        let package = package_of(&entry.name);
        match classfile::method_names(&entry.bytes) {
            Ok(methods) => acc.methods.extend(methods),
            Err(e) => {
                debug!(jar = name, class = %entry.name, error = %e, "Skipping unparseable class");
                acc.skipped_classes += 1;
            }
        }
        acc.keywords.extend(path_keywords(&package));
        if !package.is_empty() {
            packages.insert(package);
        }
    }

    let descriptor = if has_descriptor {
        walker
            .read_by_name(DESCRIPTOR_PATH)?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
    } else {
        None
    };

    debug!(
        jar = name,
        entries = entry_count,
        packages = packages.len(),
        has_descriptor,
        "Scanned sub-container"
    );

    let info = JarInfo {
        name: name.to_string(),
        size: bytes.len() as u64,
        entry_count,
        has_descriptor,
        packages,
    };
    Ok((JarScan { info, descriptor }, acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_keywords_splits_and_lowercases() {
        let kw = path_keywords("lib/Fancy-Core_2.1.jar");
        let expected: BTreeSet<String> = ["lib", "fancy", "core", "2", "1", "jar"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(kw, expected);
    }

    #[test]
    fn test_path_keywords_ignores_empty_runs() {
        let kw = path_keywords("a--b//c");
        assert_eq!(kw.len(), 3);
    }

    #[test]
    fn test_package_of() {
        assert_eq!(package_of("com/example/fancy/Action.class"), "com.example.fancy");
        assert_eq!(package_of("Main.class"), "");
    }
}
