mod support;

use std::sync::Arc;

use serde_json::json;
use shortcodes::application::resolver::{ConfigResolver, FetcherKind};
use shortcodes::cache::{CacheKeys, Ttl};
use shortcodes::domain::configuration::Configuration;
use shortcodes::infra::source::SourceLocator;
use tempfile::TempDir;

use support::{Op, RecordingDurable, RecordingFast, write_default_config};

const FAST_KEY: &str = "shortcode-config";
const DURABLE_KEY: &str = "shortcodes-config";

fn resolver(
    dir: &TempDir,
    fast: &Arc<RecordingFast>,
    durable: &Arc<RecordingDurable>,
    read_durable: bool,
) -> ConfigResolver {
    ConfigResolver::new(fast.clone(), SourceLocator::new(dir.path()))
        .with_durable(durable.clone(), read_durable)
}

#[test]
fn valid_fast_value_is_returned_without_writes() {
    let dir = TempDir::new().unwrap();
    let cached = json!({"shortcodes": {"greet": "Greeter"}});
    let fast = Arc::new(RecordingFast::with(FAST_KEY, cached.clone()));
    let durable = Arc::new(RecordingDurable::with(DURABLE_KEY, json!({"shortcodes": {}})));
    write_default_config(dir.path(), "shortcodes:\n  other: Other\n");

    let resolution = resolver(&dir, &fast, &durable, true).resolve_detailed();

    assert_eq!(resolution.winner, Some(FetcherKind::FastCache));
    assert_eq!(resolution.config.as_value(), cached);
    assert!(fast.writes().is_empty());
    assert!(durable.ops().is_empty(), "durable tier must not be touched");
}

#[test]
fn durable_hit_repairs_fast_tier_only() {
    let dir = TempDir::new().unwrap();
    let stored = json!({"namespace": "App", "shortcodes": {"w": "Widget"}});
    let fast = Arc::new(RecordingFast::default());
    let durable = Arc::new(RecordingDurable::with(DURABLE_KEY, stored.clone()));

    let resolution = resolver(&dir, &fast, &durable, true).resolve_detailed();

    assert_eq!(resolution.winner, Some(FetcherKind::DurableCache));
    assert_eq!(resolution.config.as_value(), stored);
    assert_eq!(fast.writes(), vec![Op::Set(FAST_KEY.into(), stored)]);
    assert!(durable.writes().is_empty());
}

#[test]
fn invalid_fast_value_falls_through_to_durable() {
    let dir = TempDir::new().unwrap();
    let stored = json!({"shortcodes": {"a": "A"}});
    let fast = Arc::new(RecordingFast::with(FAST_KEY, json!("corrupted")));
    let durable = Arc::new(RecordingDurable::with(DURABLE_KEY, stored.clone()));

    let config = resolver(&dir, &fast, &durable, true).resolve();

    assert_eq!(config.as_value(), stored);
    assert_eq!(fast.stored(FAST_KEY), Some(stored));
}

#[test]
fn source_hit_writes_durable_forever_then_fast() {
    let dir = TempDir::new().unwrap();
    write_default_config(dir.path(), "namespace: App\nshortcodes:\n  greet: Greeter\n");
    let fast = Arc::new(RecordingFast::failing());
    let durable = Arc::new(RecordingDurable::with(DURABLE_KEY, json!(["not", "a", "map"])));

    let resolution = resolver(&dir, &fast, &durable, true).resolve_detailed();
    let expected = json!({"namespace": "App", "shortcodes": {"greet": "Greeter"}});

    assert_eq!(resolution.winner, Some(FetcherKind::Source));
    assert_eq!(resolution.config.as_value(), expected);
    assert_eq!(
        durable.writes(),
        vec![Op::SetTtl(DURABLE_KEY.into(), expected.clone(), Ttl::Never)]
    );
    assert_eq!(fast.writes(), vec![Op::Set(FAST_KEY.into(), expected)]);
}

#[test]
fn total_failure_purges_both_keys_and_returns_empty() {
    let dir = TempDir::new().unwrap();
    write_default_config(dir.path(), "just a string\n");
    let fast = Arc::new(RecordingFast::with(FAST_KEY, json!(42)));
    let durable = Arc::new(RecordingDurable::with(DURABLE_KEY, json!("nope")));
    let resolver = resolver(&dir, &fast, &durable, true);

    let first = resolver.resolve_detailed();
    assert_eq!(first.winner, None);
    assert_eq!(first.config, Configuration::empty());
    assert_eq!(fast.writes(), vec![Op::Delete(FAST_KEY.into())]);
    assert_eq!(durable.writes(), vec![Op::Delete(DURABLE_KEY.into())]);

    // Purging again with nothing stored is still fine.
    let second = resolver.resolve();
    assert!(second.is_empty());
    assert_eq!(fast.stored(FAST_KEY), None);
    assert_eq!(durable.stored(DURABLE_KEY), None);
}

#[test]
fn missing_source_file_counts_as_failure() {
    let dir = TempDir::new().unwrap();
    let fast = Arc::new(RecordingFast::default());
    let durable = Arc::new(RecordingDurable::default());

    let config = resolver(&dir, &fast, &durable, false).resolve();

    assert!(config.is_empty());
    assert!(fast.writes().contains(&Op::Delete(FAST_KEY.into())));
}

#[test]
fn successive_resolutions_agree() {
    let dir = TempDir::new().unwrap();
    write_default_config(dir.path(), "shortcodes:\n  year: CurrentYear\n");
    let fast = Arc::new(RecordingFast::default());
    let durable = Arc::new(RecordingDurable::default());
    let resolver = resolver(&dir, &fast, &durable, true);

    let first = resolver.resolve_detailed();
    let second = resolver.resolve_detailed();

    assert_eq!(first.config, second.config);
    assert_eq!(first.winner, Some(FetcherKind::Source));
    assert_eq!(second.winner, Some(FetcherKind::FastCache));
}

#[test]
fn disabled_durable_reads_skip_straight_to_source() {
    let dir = TempDir::new().unwrap();
    write_default_config(dir.path(), "shortcodes:\n  from_file: File\n");
    let fast = Arc::new(RecordingFast::default());
    let durable = Arc::new(RecordingDurable::with(
        DURABLE_KEY,
        json!({"shortcodes": {"from_durable": "Durable"}}),
    ));

    let resolution = resolver(&dir, &fast, &durable, false).resolve_detailed();

    assert_eq!(resolution.winner, Some(FetcherKind::Source));
    assert!(
        !durable.ops().contains(&Op::Get(DURABLE_KEY.into())),
        "durable tier must not be read"
    );
    assert_eq!(
        durable.stored(DURABLE_KEY),
        Some(json!({"shortcodes": {"from_file": "File"}}))
    );
}

#[test]
fn custom_keys_are_used_for_every_operation() {
    let dir = TempDir::new().unwrap();
    let fast = Arc::new(RecordingFast::default());
    let durable = Arc::new(RecordingDurable::default());
    let resolver = resolver(&dir, &fast, &durable, true).with_keys(CacheKeys::new("f", "d"));

    resolver.resolve();

    assert_eq!(
        fast.ops(),
        vec![Op::Get("f".into()), Op::Delete("f".into())]
    );
    assert_eq!(
        durable.ops(),
        vec![Op::Get("d".into()), Op::Delete("d".into())]
    );
}

#[test]
fn override_location_is_honoured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("elsewhere.json");
    std::fs::write(&path, r#"{"shortcodes": {"j": "Json"}}"#).unwrap();
    let fast = Arc::new(RecordingFast::default());

    let locator =
        SourceLocator::new(dir.path()).with_override(Some(path.to_string_lossy().into_owned()));
    let config = ConfigResolver::new(fast, locator).resolve();

    assert_eq!(config.as_value(), json!({"shortcodes": {"j": "Json"}}));
}
