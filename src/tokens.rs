// Analysis → canonical token set, the only input to set similarity.
//
// Each token carries a category prefix (`pkgWord=`, `methodWord=`, ...) so
// that the same word appearing in two categories never collides. The set
// is ordered, and the whole function is pure: the same analysis always
// yields the same tokens.

use std::collections::BTreeSet;

use crate::analysis::model::PluginAnalysis;
use crate::classfile::split_camel_case;

/// Upper bound on method symbols fed into the token set. Keeps pathological
/// packages (tens of thousands of generated methods) cheap to compare.
pub const MAX_METHOD_SYMBOLS: usize = 500;

/// Package-path segments this short carry no signal (`io`, `ui`, `v2`).
const MIN_PACKAGE_WORD_LEN: usize = 3;

pub fn tokenize(analysis: &PluginAnalysis) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    if let Some(id) = &analysis.metadata.plugin_id {
        tokens.insert(format!("pluginId={id}"));
    }
    if let Some(name) = &analysis.metadata.name {
        tokens.insert(format!("name={name}"));
    }

    for jar in &analysis.structure.jar_files {
        tokens.insert(format!("jar={}", jar.name));
        for package in &jar.packages {
            for word in package.split(['.', '-', '_']) {
                if word.chars().count() >= MIN_PACKAGE_WORD_LEN {
                    tokens.insert(format!("pkgWord={word}"));
                }
            }
        }
    }

    for dependency in &analysis.dependencies.plugin_dependencies {
        tokens.insert(format!("dependency={}", dependency.id));
    }

    let dna = &analysis.plugin_dna;
    for keyword in &dna.keywords {
        tokens.insert(format!("keyword={keyword}"));
    }
    if let Some(description) = &dna.description {
        for word in description.split_whitespace() {
            tokens.insert(format!("description={word}"));
        }
    }
    for method in dna.methods.iter().take(MAX_METHOD_SYMBOLS) {
        for word in split_camel_case(method) {
            tokens.insert(format!("methodWord={word}"));
        }
    }

    tokens
}
