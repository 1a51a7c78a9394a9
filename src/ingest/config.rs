// src/ingest/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::extract::{FieldExtractor, RulesFile};

pub const ENV_FEEDS_PATH: &str = "INGEST_FEEDS_PATH";
pub const ENV_RULES_PATH: &str = "EXTRACT_RULES_PATH";

const DEFAULT_FEEDS: &[&str] = &["config/feeds.toml", "config/feeds.json"];
const DEFAULT_RULES: &[&str] = &["config/extract_rules.toml"];

/// On-disk feed list: `feeds = [...]` in TOML, or `{"feeds": [...]}` in JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedsFile {
    #[serde(default)]
    pub feeds: Vec<String>,
}

/// JSON feed lists may also be a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedsDoc {
    Table(FeedsFile),
    List(Vec<String>),
}

impl From<FeedsDoc> for FeedsFile {
    fn from(doc: FeedsDoc) -> Self {
        match doc {
            FeedsDoc::Table(file) => file,
            FeedsDoc::List(feeds) => FeedsFile { feeds },
        }
    }
}

impl FeedsFile {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing TOML feed list")
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let doc: FeedsDoc = serde_json::from_str(s).context("parsing JSON feed list")?;
        Ok(doc.into())
    }

    /// Parse by file extension; unknown extensions try TOML, then JSON.
    pub fn parse(s: &str, ext: &str) -> Result<Self> {
        match ext {
            "toml" => Self::from_toml(s),
            "json" => Self::from_json(s),
            _ => Self::from_toml(s)
                .or_else(|_| Self::from_json(s))
                .map_err(|_| anyhow!("unsupported feed list format")),
        }
    }

    /// Addresses in file order, trimmed and without blanks or repeats.
    pub fn into_addresses(self) -> Vec<String> {
        clean_list(self.feeds)
    }
}

/// First configured file: the env var when set (it must exist), else the first
/// existing candidate.
fn resolve_config_path(env_key: &str, candidates: &[&str]) -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            bail!("{env_key} points to non-existent path {}", pb.display());
        }
        return Ok(Some(pb));
    }
    Ok(candidates.iter().map(PathBuf::from).find(|p| p.exists()))
}

/// Load a feed list from an explicit path.
pub fn load_feeds_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let file = FeedsFile::parse(&content, &ext)
        .with_context(|| format!("loading feed list {}", path.display()))?;
    Ok(file.into_addresses())
}

/// $INGEST_FEEDS_PATH, then config/feeds.toml, then config/feeds.json; none is an empty list.
pub fn load_feeds_default() -> Result<Vec<String>> {
    match resolve_config_path(ENV_FEEDS_PATH, DEFAULT_FEEDS)? {
        Some(p) => load_feeds_from(&p),
        None => Ok(Vec::new()),
    }
}

/// Trim, drop blanks and repeats. Order is kept: it decides output order.
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}

/// Compile extraction rules from a TOML file.
pub fn load_rules_from(path: &Path) -> Result<FieldExtractor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading extraction rules from {}", path.display()))?;
    let file: RulesFile = toml::from_str(&content)
        .with_context(|| format!("parsing extraction rules in {}", path.display()))?;
    FieldExtractor::from_rules(file)
}

/// $EXTRACT_RULES_PATH, then config/extract_rules.toml, then the built-in rules.
pub fn load_rules_default() -> Result<FieldExtractor> {
    match resolve_config_path(ENV_RULES_PATH, DEFAULT_RULES)? {
        Some(p) => load_rules_from(&p),
        None => Ok(FieldExtractor::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::extract::Field;
    use std::fs;

    #[test]
    fn trim_dedup_and_formats_work() {
        let toml = r#"feeds = [" https://a.test/rss ", "", "https://b.test/rss", "https://a.test/rss"]"#;
        let json = r#"["https://c.test/rss", "  https://b.test/rss  ", ""]"#;
        assert_eq!(
            FeedsFile::from_toml(toml).unwrap().into_addresses(),
            vec!["https://a.test/rss".to_string(), "https://b.test/rss".to_string()]
        );
        assert_eq!(
            FeedsFile::from_json(json).unwrap().into_addresses(),
            vec!["https://c.test/rss".to_string(), "https://b.test/rss".to_string()]
        );
    }

    #[test]
    fn json_table_form_and_unknown_extension() {
        let table = r#"{"feeds": ["https://a.test/rss", " https://a.test/rss"]}"#;
        assert_eq!(
            FeedsFile::from_json(table).unwrap().into_addresses(),
            vec!["https://a.test/rss".to_string()]
        );
        // No extension: TOML first, JSON second.
        assert_eq!(FeedsFile::parse(r#"feeds = ["x"]"#, "").unwrap().feeds, vec!["x"]);
        assert_eq!(FeedsFile::parse(r#"["y"]"#, "").unwrap().feeds, vec!["y"]);
        assert!(FeedsFile::parse("- https://a.test/rss", "yaml").is_err());
        assert!(FeedsFile::from_json(r#"{"feeds": "one"}"#).is_err());
        assert!(FeedsFile::from_toml("urls = []").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("none.toml");
        std::env::set_var(ENV_RULES_PATH, &missing);
        assert!(resolve_config_path(ENV_RULES_PATH, DEFAULT_RULES).is_err());
        std::env::remove_var(ENV_RULES_PATH);
    }

    #[test]
    fn rules_file_replaces_builtin_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("rules.toml");
        fs::write(
            &p,
            r#"
date_formats = ["%d.%m.%Y"]

[[rule]]
field = "deadline"
pattern = 'bewerbungsschluss\s*:\s*([^\n]+)'

[[rule]]
field = "location"
pattern = 'standort\s*:\s*([^\n]+)'
"#,
        )
        .unwrap();
        let ex = load_rules_from(&p).unwrap();
        assert_eq!(ex.rule_count(Field::Deadline), 1);
        assert_eq!(ex.rule_count(Field::Location), 1);
        assert_eq!(ex.normalize_date("01.06.2025").as_deref(), Some("2025-06-01"));
    }
}
