// Content signature: per-file SHA-256 digests folded into composite hashes.
//
// Composite hashes are computed over the *sorted* concatenation of hex
// digests, so they depend only on the set of file contents and never on the
// order the container happened to list its entries in.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use super::model::ContentSignature;
use crate::archive::walker::is_sub_container;

/// Lowercase hex SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Build the signature from the path → digest table of every file in the
/// package plus the descriptor text, if one was found.
pub fn build_content_signature(
    file_hashes: BTreeMap<String, String>,
    descriptor: Option<&str>,
) -> ContentSignature {
    let descriptor_hash = descriptor.map(|xml| sha256_hex(xml.as_bytes()));

    let sub_container_digests: Vec<&str> = file_hashes
        .iter()
        .filter(|(path, _)| is_sub_container(path))
        .map(|(_, digest)| digest.as_str())
        .collect();
    let aggregate_class_hash = if sub_container_digests.is_empty() {
        String::new()
    } else {
        sorted_digest(sub_container_digests)
    };

    let overall_hash = sorted_digest(file_hashes.values().map(String::as_str).collect());

    ContentSignature {
        overall_hash,
        descriptor_hash,
        aggregate_class_hash,
        file_hashes,
    }
}

fn sorted_digest(mut digests: Vec<&str>) -> String {
    digests.sort_unstable();
    sha256_hex(digests.concat().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(path, bytes)| (path.to_string(), sha256_hex(bytes.as_bytes())))
            .collect()
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_descriptor_hash_absent_without_descriptor() {
        let sig = build_content_signature(table(&[("lib/a.jar", "a")]), None);
        assert!(sig.descriptor_hash.is_none());
        let sig = build_content_signature(table(&[("lib/a.jar", "a")]), Some("<id>x</id>"));
        assert_eq!(sig.descriptor_hash, Some(sha256_hex(b"<id>x</id>")));
    }

    #[test]
    fn test_aggregate_ignores_non_jar_files() {
        let jars_only = build_content_signature(table(&[("lib/a.jar", "a")]), None);
        let with_readme =
            build_content_signature(table(&[("lib/a.jar", "a"), ("README.md", "r")]), None);
        assert_eq!(jars_only.aggregate_class_hash, with_readme.aggregate_class_hash);
        assert_ne!(jars_only.overall_hash, with_readme.overall_hash);
    }

    #[test]
    fn test_aggregate_empty_without_jars() {
        let sig = build_content_signature(table(&[("README.md", "r")]), None);
        assert!(sig.aggregate_class_hash.is_empty());
        assert!(!sig.overall_hash.is_empty());
    }

    #[test]
    fn test_composites_depend_on_content_not_paths() {
        // Same bytes at different paths: composites are content-addressed
        let a = build_content_signature(table(&[("lib/a.jar", "1"), ("lib/b.jar", "2")]), None);
        let b = build_content_signature(table(&[("lib/x.jar", "2"), ("lib/y.jar", "1")]), None);
        assert_eq!(a.overall_hash, b.overall_hash);
        assert_eq!(a.aggregate_class_hash, b.aggregate_class_hash);
        assert_ne!(a.file_hashes, b.file_hashes);
    }

    #[test]
    fn test_any_byte_change_flips_overall() {
        let a = build_content_signature(table(&[("lib/a.jar", "payload")]), None);
        let b = build_content_signature(table(&[("lib/a.jar", "paylaod")]), None);
        let again = build_content_signature(table(&[("lib/a.jar", "payload")]), None);
        assert_ne!(a.overall_hash, b.overall_hash);
        assert_eq!(a, again);
    }
}
