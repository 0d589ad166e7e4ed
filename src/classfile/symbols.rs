// Identifier → word splitting for method symbols.
//
// `getUserName` → ["get", "user", "name"]. The split happens before every
// ASCII uppercase letter, so acronyms break into single letters
// (`parseURL` → ["parse", "u", "r", "l"]). Token-level similarity depends on
// this exact rule, so it must not drift.

/// Split an identifier before each uppercase ASCII letter and lower-case the
/// fragments. Empty fragments are dropped.
pub fn split_camel_case(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in identifier.chars() {
        if c.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
