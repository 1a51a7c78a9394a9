// src/ingest/extract.rs
//! Heuristic location / deadline extraction for feed entries.
//!
//! Extraction is driven by an ordered rule list (regex + target field) so new
//! posting formats only need a new rule, not new control flow. Every rule is
//! compiled case-insensitive; rules that depend on capitalisation (the
//! "City, ST" shapes) opt out locally with an inline `(?-i:...)` group.
//!
//! A captured value ends at the next known label ("... Deadline:") or at the
//! end of its sentence, so one-line summaries with several labels split cleanly.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ingest::to_plain_lines;
use crate::ingest::types::RawEntry;

/// Field a rule fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Location,
    Deadline,
}

/// Serializable rule definition (see `config/extract_rules.toml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub field: Field,
    pub pattern: String,
}

/// Rule set as loaded from disk, before regex compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    #[serde(rename = "rule", default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    #[serde(default = "default_tag_keywords")]
    pub tag_keywords: Vec<String>,
    /// Labels that terminate a captured value when they follow it on the same line.
    #[serde(default = "default_stop_labels")]
    pub stop_labels: Vec<String>,
}

const DEFAULT_RULES: &[(Field, &str)] = &[
    (Field::Location, r"\blocation\s*:\s*([^\n|;]+)"),
    (Field::Location, r"\bbased in\s*:\s*([^\n|;]+)"),
    (Field::Location, r"\boffice\s*:\s*([^\n|;]+)"),
    (Field::Location, r"\b(remote)\b"),
    // City, ST
    (
        Field::Location,
        r"(?-i:\b([A-Z][a-z]+(?:[ .'-][A-Z][a-z]+)*,\s?[A-Z]{2})\b)",
    ),
    // City, Country
    (
        Field::Location,
        r"(?-i:\b([A-Z][a-z]+(?:[ .'-][A-Z][a-z]+)*,\s?[A-Z][a-z]+(?:\s[A-Z][a-z]+)*)\b)",
    ),
    (Field::Deadline, r"\bapply by\s*:\s*([^\n|;]+)"),
    (Field::Deadline, r"\bdeadline\s*:\s*([^\n|;]+)"),
    (Field::Deadline, r"\bapplications close\s*:\s*([^\n|;]+)"),
];

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tag_keywords() -> Vec<String> {
    ["location", "city", "remote", "office"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_stop_labels() -> Vec<String> {
    [
        "location",
        "based in",
        "office",
        "apply by",
        "deadline",
        "applications close",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for RulesFile {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(field, pattern)| RuleSpec {
                    field: *field,
                    pattern: pattern.to_string(),
                })
                .collect(),
            date_formats: default_date_formats(),
            tag_keywords: default_tag_keywords(),
            stop_labels: default_stop_labels(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    field: Field,
    re: Regex,
}

/// Compiled, ready-to-run extraction rules.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
    /// Any known label followed by a colon.
    stop: Option<Regex>,
    date_formats: Vec<String>,
    tag_keywords: Vec<String>,
}

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?](?:\s|$)").unwrap());

static DEFAULT_EXTRACTOR: Lazy<FieldExtractor> = Lazy::new(FieldExtractor::default);

impl Default for FieldExtractor {
    fn default() -> Self {
        // Built-in patterns are constants; a failure here is a programming error.
        Self::from_rules(RulesFile::default()).unwrap()
    }
}

impl FieldExtractor {
    /// Compile a rule set. Any invalid pattern rejects the whole set.
    pub fn from_rules(file: RulesFile) -> Result<Self> {
        let mut rules = Vec::with_capacity(file.rules.len());
        for spec in file.rules {
            let re = Regex::new(&format!("(?i){}", spec.pattern))
                .with_context(|| format!("compiling {:?} rule `{}`", spec.field, spec.pattern))?;
            rules.push(CompiledRule {
                field: spec.field,
                re,
            });
        }
        let labels: Vec<String> = file
            .stop_labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(regex::escape)
            .collect();
        let stop = if labels.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})\s*:", labels.join("|"));
            Some(Regex::new(&pattern).context("compiling stop labels")?)
        };
        Ok(Self {
            rules,
            stop,
            date_formats: file.date_formats,
            tag_keywords: file
                .tag_keywords
                .into_iter()
                .map(|k| k.to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn shared_default() -> &'static FieldExtractor {
        &DEFAULT_EXTRACTOR
    }

    pub fn rule_count(&self, field: Field) -> usize {
        self.rules.iter().filter(|r| r.field == field).count()
    }

    /// Structured field, then text rules, then category tags. Empty when nothing matches.
    pub fn location(&self, entry: &RawEntry) -> String {
        if let Some(loc) = entry.location.as_deref().map(str::trim) {
            if !loc.is_empty() {
                return loc.to_string();
            }
        }

        let text = entry_text(entry);
        if let Some(found) = self.first_match(Field::Location, &text) {
            return found;
        }

        self.location_from_tags(&entry.categories).unwrap_or_default()
    }

    /// First matching deadline rule, normalized to `YYYY-MM-DD` when a date format parses.
    pub fn deadline(&self, entry: &RawEntry) -> String {
        let text = entry_text(entry);
        match self.first_match(Field::Deadline, &text) {
            Some(raw) => self.normalize_date(&raw).unwrap_or(raw),
            None => String::new(),
        }
    }

    /// Try each configured format in order against the start of the value; first
    /// success wins. Trailing words ("May 1, 2024 - apply early") are ignored as
    /// long as the date ends on a word boundary.
    pub fn normalize_date(&self, raw: &str) -> Option<String> {
        let candidate = raw.trim().trim_end_matches(['.', ',']).trim();
        self.date_formats
            .iter()
            .find_map(|fmt| {
                let (date, rest) = NaiveDate::parse_and_remainder(candidate, fmt).ok()?;
                let clean_end = rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
                clean_end.then_some(date)
            })
            .map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Cut a captured value at the next label, then at the end of its sentence.
    fn clip_value<'a>(&self, raw: &'a str) -> &'a str {
        let mut head = raw;
        if let Some(stop) = &self.stop {
            if let Some(m) = stop.find_iter(raw).find(|m| m.start() > 0) {
                head = &raw[..m.start()];
            }
        }
        if let Some(end) = sentence_end(head) {
            head = &head[..end];
        }
        head.trim().trim_end_matches([',', ';', '-', '|']).trim_end()
    }

    fn first_match(&self, field: Field, text: &str) -> Option<String> {
        self.rules
            .iter()
            .filter(|r| r.field == field)
            .find_map(|r| {
                let caps = r.re.captures(text)?;
                let m = caps.get(1).or_else(|| caps.get(0))?;
                let value = self.clip_value(m.as_str());
                (!value.is_empty()).then(|| value.to_string())
            })
    }

    fn location_from_tags(&self, tags: &[String]) -> Option<String> {
        tags.iter().find_map(|tag| {
            let lower = tag.to_ascii_lowercase();
            if !self.tag_keywords.iter().any(|k| lower.contains(k.as_str())) {
                return None;
            }
            // "location:Berlin" -> "Berlin"; plain "Remote" stays as is.
            let value = match tag.split_once(':') {
                Some((_, rest)) if !rest.trim().is_empty() => rest.trim(),
                _ => tag.trim(),
            };
            (!value.is_empty()).then(|| value.to_string())
        })
    }
}

/// Byte offset of the first `.`, `!` or `?` that closes a sentence. A period after
/// an abbreviation ("St.", "D.C.") does not count.
fn sentence_end(s: &str) -> Option<usize> {
    SENTENCE_END.find_iter(s).map(|m| m.start()).find(|&at| {
        let word = s[..at].rsplit(char::is_whitespace).next().unwrap_or_default();
        !is_abbreviation(word)
    })
}

fn is_abbreviation(word: &str) -> bool {
    if word.contains('.') {
        return true;
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            let rest = chars.as_str();
            rest.len() <= 2 && rest.chars().all(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}

/// Summary and description joined, with markup reduced to plain lines.
fn entry_text(entry: &RawEntry) -> String {
    let joined = format!(
        "{}\n{}",
        entry.summary.as_deref().unwrap_or_default(),
        entry.description.as_deref().unwrap_or_default()
    );
    to_plain_lines(&joined)
}

/// Location using the built-in rules.
pub fn extract_location(entry: &RawEntry) -> String {
    FieldExtractor::shared_default().location(entry)
}

/// Deadline using the built-in rules.
pub fn extract_deadline(entry: &RawEntry) -> String {
    FieldExtractor::shared_default().deadline(entry)
}
