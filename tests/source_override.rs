mod support;

use std::sync::Arc;

use serde_json::json;
use serial_test::serial;
use shortcodes::application::{builtin, loader::ShortcodeLoader};
use shortcodes::config::Settings;
use shortcodes::infra::source::SourceLocator;
use tempfile::TempDir;

use support::write_default_config;

const VAR: &str = "SHORTCODES_TEST_OVERRIDE";

fn set_override(value: &str) {
    // SAFETY: every test touching the variable runs under `#[serial]`.
    unsafe { std::env::set_var(VAR, value) };
}

fn clear_override() {
    // SAFETY: every test touching the variable runs under `#[serial]`.
    unsafe { std::env::remove_var(VAR) };
}

#[test]
#[serial]
fn absent_override_uses_default_relative_path() {
    clear_override();
    let dir = TempDir::new().unwrap();

    let locator = SourceLocator::from_env(dir.path(), VAR);

    assert_eq!(locator.override_location(), None);
    assert_eq!(
        locator.config_path(),
        dir.path().join(".config/shortcodes.yaml")
    );
}

#[test]
#[serial]
fn existing_override_file_is_used_verbatim() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("site.yaml");
    std::fs::write(&file, "shortcodes: {}\n").unwrap();
    set_override(file.to_str().unwrap());

    let locator = SourceLocator::from_env("/somewhere/else", VAR);
    clear_override();

    assert_eq!(locator.config_path(), file);
}

#[test]
#[serial]
fn existing_relative_override_is_used_verbatim() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(workdir.path().join("local.yaml"), "shortcodes: {}\n").unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(workdir.path()).unwrap();

    set_override("local.yaml");
    let locator = SourceLocator::from_env("/srv/site", VAR);
    clear_override();
    let path = locator.config_path();
    let config = shortcodes::infra::source::load_source(&path);
    std::env::set_current_dir(previous).unwrap();

    assert_eq!(path, std::path::Path::new("local.yaml"));
    assert_eq!(config.unwrap(), json!({"shortcodes": {}}));
}

#[test]
#[serial]
fn relative_override_resolves_against_base_dir() {
    set_override("conf/custom.yaml");
    let locator = SourceLocator::from_env("/srv/site/", VAR);
    clear_override();

    assert_eq!(
        locator.config_path(),
        std::path::Path::new("/srv/site/conf/custom.yaml")
    );
}

#[test]
#[serial]
fn blank_override_is_ignored() {
    set_override("   ");
    let locator = SourceLocator::from_env("/srv/site", VAR);
    clear_override();

    assert_eq!(locator.override_location(), None);
}

#[test]
#[serial]
fn loader_from_settings_follows_the_override() {
    let dir = TempDir::new().unwrap();
    write_default_config(dir.path(), "shortcodes:\n  ignored: Echo\n");
    let file = dir.path().join("override.toml");
    std::fs::write(&file, "[shortcodes]\necho = \"Echo\"\n").unwrap();
    set_override(file.to_str().unwrap());

    let mut settings = Settings::default();
    settings.source.base_dir = dir.path().to_path_buf();
    settings.source.override_env = VAR.to_string();
    settings.cache.durable_dir = dir.path().join("durable");

    let loader = ShortcodeLoader::from_settings(&settings, Arc::new(builtin::registry()));
    clear_override();

    assert_eq!(
        loader.config().as_value(),
        json!({"shortcodes": {"echo": "Echo"}})
    );
    assert!(settings.cache.durable_dir.is_dir());
}
