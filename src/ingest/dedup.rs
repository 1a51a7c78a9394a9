// src/ingest/dedup.rs
use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::ingest::types::JobRecord;

/// Separator between key parts; feed titles and URLs practically never contain it.
pub const KEY_DELIMITER: char = '|';

/// Identity of a posting within one run: company + role (case-folded) + apply link.
pub fn key_for(rec: &JobRecord) -> String {
    format!(
        "{}{d}{}{d}{}",
        rec.company.trim().to_lowercase(),
        rec.role.trim().to_lowercase(),
        rec.apply_link.trim(),
        d = KEY_DELIMITER
    )
}

pub fn is_duplicate(key: &str, seen: &HashSet<String>) -> bool {
    seen.contains(key)
}

/// Short stable digest of a key, safe to put in logs.
pub fn key_digest(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(company: &str, role: &str, link: &str) -> JobRecord {
        JobRecord {
            company: company.into(),
            role: role.into(),
            apply_link: link.into(),
            ..Default::default()
        }
    }

    #[test]
    fn key_folds_case_and_whitespace() {
        let a = rec("  Acme ", "SWE Intern", "https://acme.test/1 ");
        let b = rec("acme", " swe intern ", "https://acme.test/1");
        assert_eq!(key_for(&a), key_for(&b));
        assert_eq!(key_for(&b), "acme|swe intern|https://acme.test/1");
    }

    #[test]
    fn link_case_is_significant() {
        let a = rec("Acme", "Intern", "https://acme.test/A");
        let b = rec("Acme", "Intern", "https://acme.test/a");
        assert_ne!(key_for(&a), key_for(&b));
    }

    #[test]
    fn duplicate_lookup_and_digest() {
        let mut seen = HashSet::new();
        let k = key_for(&rec("Acme", "Intern", "https://acme.test/1"));
        assert!(!is_duplicate(&k, &seen));
        seen.insert(k.clone());
        assert!(is_duplicate(&k, &seen));
        assert_eq!(key_digest(&k).len(), 12);
        assert_eq!(key_digest(&k), key_digest(&k));
    }
}
