//! Name normalization and similarity
//!
//! Normalized forms are used for comparison only; display names keep the
//! original casing. Legal-suffix variants collapse to canonical tokens so
//! "ACME L.L.C." and "Acme LLC" compare equal.

use super::config::ReconcileConfig;
use crate::record::OwnerType;

/// Normalize an owner name for comparison: uppercase, strip punctuation,
/// collapse whitespace, canonicalize legal suffixes.
pub fn normalize_name(name: &str) -> String {
    let upper = name.to_uppercase();
    let mut cleaned = String::with_capacity(upper.len());
    for c in upper.chars() {
        match c {
            // Periods and apostrophes vanish so "L.L.C." becomes "LLC"
            '.' | '\'' => {}
            c if c.is_alphanumeric() => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }
    cleaned
        .split_whitespace()
        .map(canonical_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonical_token(token: &str) -> &str {
    match token {
        "CORPORATION" => "CORP",
        "INCORPORATED" => "INC",
        "COMPANY" => "CO",
        "LIMITED" => "LTD",
        other => other,
    }
}

/// Classify an owner by the legal suffix in its normalized name.
pub fn infer_owner_type(name: &str) -> OwnerType {
    let normalized = normalize_name(name);
    if normalized.is_empty() {
        return OwnerType::Unknown;
    }
    for token in normalized.split_whitespace() {
        match token {
            "LLC" => return OwnerType::Llc,
            "CORP" | "INC" | "CO" | "LTD" => return OwnerType::Corporation,
            "TRUST" => return OwnerType::Trust,
            _ => {}
        }
    }
    OwnerType::Individual
}

/// Two normalized names refer to the same owner if they are equal, one
/// contains the other and both are long enough, or their edit similarity
/// meets the threshold.
pub fn same_owner(a: &str, b: &str, config: &ReconcileConfig) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if a.len() >= config.min_substring_len
        && b.len() >= config.min_substring_len
        && (a.contains(b) || b.contains(a))
    {
        return true;
    }
    edit_similarity(a, b) >= config.similarity_threshold
}

/// Similarity ratio in `[0, 1]`: `1 - distance / max_len`.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Levenshtein distance, two-row dynamic programming.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_suffix_variants() {
        assert_eq!(normalize_name("Acme L.L.C."), "ACME LLC");
        assert_eq!(normalize_name("ACME LLC"), "ACME LLC");
        assert_eq!(normalize_name("Beacon Corporation"), "BEACON CORP");
        assert_eq!(normalize_name("Beacon Corp."), "BEACON CORP");
        assert_eq!(normalize_name("  O'Brien   Family  Trust "), "OBRIEN FAMILY TRUST");
    }

    #[test]
    fn owner_type_inference() {
        assert_eq!(infer_owner_type("Acme L.L.C."), OwnerType::Llc);
        assert_eq!(infer_owner_type("Beacon Corporation"), OwnerType::Corporation);
        assert_eq!(infer_owner_type("Holloway Family Trust"), OwnerType::Trust);
        assert_eq!(infer_owner_type("Margaret Holloway"), OwnerType::Individual);
        assert_eq!(infer_owner_type("   "), OwnerType::Unknown);
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn similarity_absorbs_single_typo() {
        let config = ReconcileConfig::default().with_similarity_threshold(0.9);
        let a = normalize_name("LEXINGTON HOLDINGS LLC");
        let b = normalize_name("LEXINGTON HOLDINGS LLD");
        assert!(same_owner(&a, &b, &config));
    }

    #[test]
    fn substring_match_needs_minimum_length() {
        let config = ReconcileConfig::default();
        // Long containment matches
        assert!(same_owner("LEXINGTON HOLDINGS LLC", "LEXINGTON HOLDINGS", &config));
        // Short names do not containment-match
        assert!(!same_owner("LI", "LIU", &config));
    }

    #[test]
    fn distinct_names_do_not_match() {
        let config = ReconcileConfig::default();
        let a = normalize_name("JOHN SMITH");
        let b = normalize_name("J. SMITH TRUST");
        assert!(!same_owner(&a, &b, &config));
    }
}
