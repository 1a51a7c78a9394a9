// tests/ingest_config.rs
use internship_assistant::ingest::config::{
    load_feeds_default, load_feeds_from, load_rules_default, ENV_FEEDS_PATH, ENV_RULES_PATH,
};
use internship_assistant::ingest::extract::Field;
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feeds.toml");
    fs::write(
        &p_toml,
        r#"
feeds = [" https://a.test/rss ", "", "https://b.test/rss", "https://b.test/rss"]
"#,
    )
    .unwrap();
    let v = load_feeds_from(&p_toml).unwrap();
    assert_eq!(
        v,
        vec!["https://a.test/rss".to_string(), "https://b.test/rss".to_string()]
    );

    let p_json = dir.path().join("feeds.json");
    fs::write(&p_json, r#"["https://c.test/atom"," https://b.test/rss  ", ""]"#).unwrap();
    let vj = load_feeds_from(&p_json).unwrap();
    assert_eq!(
        vj,
        vec!["https://c.test/atom".to_string(), "https://b.test/rss".to_string()]
    );

    let p_bad = dir.path().join("feeds.yaml");
    fs::write(&p_bad, "- https://a.test/rss").unwrap();
    assert!(load_feeds_from(&p_bad).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_FEEDS_PATH);

    // 1) Nothing configured -> empty
    let v = load_feeds_default().unwrap();
    assert!(v.is_empty());

    // 2) JSON fallback in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("feeds.json"), r#"["https://json.test/rss"]"#).unwrap();
    assert_eq!(
        load_feeds_default().unwrap(),
        vec!["https://json.test/rss".to_string()]
    );

    // 3) TOML takes precedence over JSON
    fs::write(
        cfg_dir.join("feeds.toml"),
        r#"feeds = ["https://a.test/rss","https://b.test/rss"]"#,
    )
    .unwrap();
    assert_eq!(
        load_feeds_default().unwrap(),
        vec!["https://a.test/rss".to_string(), "https://b.test/rss".to_string()]
    );

    // 4) ENV wins over both
    let p_env = tmp.path().join("mine.json");
    fs::write(&p_env, r#"["https://x.test/rss"]"#).unwrap();
    env::set_var(ENV_FEEDS_PATH, p_env.display().to_string());
    assert_eq!(
        load_feeds_default().unwrap(),
        vec!["https://x.test/rss".to_string()]
    );

    // 5) ENV pointing nowhere is an error, not a silent fallback
    env::set_var(ENV_FEEDS_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_feeds_default().is_err());
    env::remove_var(ENV_FEEDS_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn rules_default_falls_back_to_builtin() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_RULES_PATH);

    let builtin = load_rules_default().unwrap();
    assert!(builtin.rule_count(Field::Location) > 0);
    assert!(builtin.rule_count(Field::Deadline) > 0);

    let p = tmp.path().join("rules.toml");
    fs::write(
        &p,
        r#"
[[rule]]
field = "deadline"
pattern = 'closes\s+([^\n]+)'
"#,
    )
    .unwrap();
    env::set_var(ENV_RULES_PATH, p.display().to_string());
    let custom = load_rules_default().unwrap();
    assert_eq!(custom.rule_count(Field::Deadline), 1);
    assert_eq!(custom.rule_count(Field::Location), 0);

    // A broken pattern rejects the file.
    fs::write(
        &p,
        r#"
[[rule]]
field = "location"
pattern = '(unclosed'
"#,
    )
    .unwrap();
    assert!(load_rules_default().is_err());
    env::remove_var(ENV_RULES_PATH);

    env::set_current_dir(&old).unwrap();
}

#[test]
fn json_object_with_feeds_key_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feeds.json");
    fs::write(
        &p,
        r#"{"feeds": ["https://a.test/rss", "", " https://a.test/rss "]}"#,
    )
    .unwrap();
    assert_eq!(load_feeds_from(&p).unwrap(), vec!["https://a.test/rss".to_string()]);
}
