// Unit tests for the analysis builder over whole in-memory packages.
//
// Covers the canonical record end to end: identity from the descriptor,
// structure counts, dependency split, content signature, DNA collection,
// and the properties everything downstream relies on (determinism, entry
// order independence, tolerance of bad classes).

mod common;

use std::io::Cursor;

use common::{class_with_methods, fancy_plugin, plugin_xml, zip_bytes};
use plugin_dna::analysis::signature::sha256_hex;
use plugin_dna::analysis::{AnalysisBuilder, OwnCodeFilter, PluginAnalysis};
use plugin_dna::error::ExtractError;
use plugin_dna::tokens::tokenize;

fn analyze(bytes: Vec<u8>) -> PluginAnalysis {
    AnalysisBuilder::default()
        .analyze_reader(Cursor::new(bytes), "test.zip")
        .unwrap()
}

// ============================================================
// Canonical fields
// ============================================================

#[test]
fn identity_comes_from_descriptor() {
    let analysis = analyze(fancy_plugin());
    let meta = &analysis.metadata;
    assert_eq!(meta.plugin_id.as_deref(), Some("com.example.fancy"));
    assert_eq!(meta.name.as_deref(), Some("Fancy Tools"));
    assert_eq!(meta.version.as_deref(), Some("1.0.0"));
    assert_eq!(
        meta.compatibility.as_ref().map(|c| c.since_build.as_str()),
        Some("231")
    );
    assert_eq!(
        analysis.plugin_dna.description.as_deref(),
        Some("Adds fancy refactorings for Kotlin code")
    );
}

#[test]
fn structure_counts_top_level_files() {
    let analysis = analyze(fancy_plugin());
    let structure = &analysis.structure;
    assert_eq!(structure.total_files, 2);
    assert_eq!(structure.files_by_type.get("jar"), Some(&2));
    assert_eq!(structure.jar_files.len(), 2);
    assert_eq!(structure.jar_files[0].name, "fancy/lib/fancy.jar");
    assert!(structure.jar_files[0].has_descriptor);
    assert!(structure.jar_files[0]
        .packages
        .contains("com.example.fancy.actions"));
    assert_eq!(analysis.content_signature.file_hashes.len(), 2);
}

#[test]
fn own_jar_is_not_a_library() {
    let analysis = analyze(fancy_plugin());
    let libraries = &analysis.dependencies.library_jars;
    assert_eq!(libraries.len(), 1);
    assert_eq!(libraries[0].name, "fancy/lib/gson-2.10.1.jar");
    assert_eq!(libraries[0].version.as_deref(), Some("2.10.1"));
    assert_eq!(
        Some(&libraries[0].hash),
        analysis
            .content_signature
            .file_hashes
            .get("fancy/lib/gson-2.10.1.jar")
    );
    let ids: Vec<&str> = analysis
        .dependencies
        .plugin_dependencies
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(ids, vec!["com.intellij.modules.platform", "org.jetbrains.kotlin"]);
}

#[test]
fn none_filter_reports_every_jar() {
    let analysis = AnalysisBuilder::new(OwnCodeFilter::None)
        .analyze_reader(Cursor::new(fancy_plugin()), "test.zip")
        .unwrap();
    assert_eq!(analysis.dependencies.library_jars.len(), 2);
}

#[test]
fn methods_collected_across_jars() {
    let analysis = analyze(fancy_plugin());
    let methods = &analysis.plugin_dna.methods;
    for expected in ["<init>", "actionPerformed", "renameSymbol", "libCall"] {
        assert!(methods.contains(expected), "missing method {expected}");
    }
    assert!(analysis.plugin_dna.keywords.contains("fancy"));
    assert!(analysis.plugin_dna.keywords.contains("refactor"));
}

#[test]
fn descriptor_hash_matches_descriptor_bytes() {
    let xml = plugin_xml("a.b", "AB", "desc", &[]);
    let jar = zip_bytes(&[("META-INF/plugin.xml", xml.clone().into_bytes())]);
    let analysis = analyze(zip_bytes(&[("ab/lib/ab.jar", jar)]));
    assert_eq!(
        analysis.content_signature.descriptor_hash,
        Some(sha256_hex(xml.as_bytes()))
    );
}

// ============================================================
// Edge cases
// ============================================================

#[test]
fn package_without_descriptor_still_analyzes() {
    let jar = zip_bytes(&[("com/x/Foo.class", class_with_methods(&["doWork"]))]);
    let analysis = analyze(zip_bytes(&[("x/lib/x.jar", jar), ("x/README", b"hi".to_vec())]));
    assert_eq!(analysis.metadata.plugin_id, None);
    assert_eq!(analysis.metadata.name, None);
    assert_eq!(analysis.content_signature.descriptor_hash, None);
    assert!(analysis.plugin_dna.methods.contains("doWork"));
    assert_eq!(analysis.structure.files_by_type.get(""), Some(&1));
}

#[test]
fn package_without_jars_has_empty_aggregate() {
    let analysis = analyze(zip_bytes(&[("notes.txt", b"plain".to_vec())]));
    assert!(analysis.structure.jar_files.is_empty());
    assert_eq!(analysis.content_signature.aggregate_class_hash, "");
    assert!(!analysis.content_signature.overall_hash.is_empty());
}

#[test]
fn bad_class_is_skipped_not_fatal() {
    let jar = zip_bytes(&[
        ("com/x/Good.class", class_with_methods(&["fine"])),
        ("com/x/Bad.class", b"not a class".to_vec()),
    ]);
    let analysis = analyze(zip_bytes(&[("x/lib/x.jar", jar)]));
    assert!(analysis.plugin_dna.methods.contains("fine"));
    assert_eq!(analysis.plugin_dna.methods.len(), 1);
}

#[test]
fn first_descriptor_wins() {
    let first = zip_bytes(&[(
        "META-INF/plugin.xml",
        plugin_xml("first.id", "First", "one", &[]).into_bytes(),
    )]);
    let second = zip_bytes(&[(
        "META-INF/plugin.xml",
        plugin_xml("second.id", "Second", "two", &[]).into_bytes(),
    )]);
    let analysis = analyze(zip_bytes(&[("p/lib/a.jar", first), ("p/lib/b.jar", second)]));
    assert_eq!(analysis.metadata.plugin_id.as_deref(), Some("first.id"));
}

#[test]
fn garbage_input_is_archive_corrupt() {
    let result = AnalysisBuilder::default()
        .analyze_reader(Cursor::new(b"definitely not a zip".to_vec()), "junk.zip");
    assert!(matches!(result, Err(ExtractError::ArchiveCorrupt { .. })));
}

#[test]
fn corrupt_nested_jar_is_archive_corrupt() {
    let result = AnalysisBuilder::default().analyze_reader(
        Cursor::new(zip_bytes(&[("p/lib/broken.jar", b"garbage".to_vec())])),
        "p.zip",
    );
    assert!(matches!(result, Err(ExtractError::ArchiveCorrupt { .. })));
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn same_bytes_same_json() {
    let a = serde_json::to_string_pretty(&analyze(fancy_plugin())).unwrap();
    let b = serde_json::to_string_pretty(&analyze(fancy_plugin())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn entry_order_does_not_change_signature_or_dna() {
    let jar_a = zip_bytes(&[("com/x/A.class", class_with_methods(&["alpha"]))]);
    let jar_b = zip_bytes(&[("com/y/B.class", class_with_methods(&["beta"]))]);
    let forward = analyze(zip_bytes(&[
        ("p/lib/a.jar", jar_a.clone()),
        ("p/lib/b.jar", jar_b.clone()),
    ]));
    let reversed = analyze(zip_bytes(&[("p/lib/b.jar", jar_b), ("p/lib/a.jar", jar_a)]));

    assert_eq!(forward.content_signature, reversed.content_signature);
    assert_eq!(forward.plugin_dna, reversed.plugin_dna);
    assert_eq!(tokenize(&forward), tokenize(&reversed));
}

#[test]
fn json_roundtrip_preserves_analysis() {
    let analysis = analyze(fancy_plugin());
    let json = serde_json::to_string(&analysis).unwrap();
    assert!(json.contains("\"pluginDNA\""));
    let back: PluginAnalysis = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis);
}
