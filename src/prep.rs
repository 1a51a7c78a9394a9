// src/prep.rs
//! Interview practice: a small curated question bank.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Domain drilled when none is asked for.
pub const DEFAULT_DOMAIN: &str = "arrays";
/// Domain served for names the bank does not know.
pub const FALLBACK_DOMAIN: &str = "behavioral";

const BANK: &[(&str, &[&str])] = &[
    (
        "arrays",
        &[
            "Two Sum",
            "Best Time to Buy and Sell Stock",
            "Product of Array Except Self",
        ],
    ),
    ("graphs", &["Number of Islands", "Clone Graph"]),
    (
        "behavioral",
        &[
            "Tell me about a time you disagreed with a teammate.",
            "Describe a challenging bug you fixed.",
        ],
    ),
];

pub fn domains() -> impl Iterator<Item = &'static str> {
    BANK.iter().map(|(d, _)| *d)
}

/// Questions for a domain (case-insensitive); unknown domains get the behavioral set.
pub fn questions(domain: &str) -> &'static [&'static str] {
    let find = |name: &str| {
        BANK.iter()
            .find(|(d, _)| d.eq_ignore_ascii_case(name))
            .map(|(_, qs)| *qs)
    };
    find(domain.trim())
        .or_else(|| find(FALLBACK_DOMAIN))
        .unwrap_or_default()
}

pub fn ask_random_with<R: Rng + ?Sized>(domain: &str, rng: &mut R) -> Option<&'static str> {
    questions(domain).choose(rng).copied()
}

pub fn ask_random(domain: &str) -> Option<&'static str> {
    ask_random_with(domain, &mut rand::rng())
}
