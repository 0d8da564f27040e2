//! Tests for configuration loading.

use emote_rate_limit::EmoteConfig;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_bundled_defaults() {
    let config = EmoteConfig::bundled().unwrap();

    assert_eq!(config.bot().prefix(), "em/");
    assert_eq!(config.http().read_timeout(), Duration::from_secs(60));
    assert_eq!(config.http().head_timeout(), Duration::from_secs(10));
    assert_eq!(*config.import().size_limit(), 50_000_000);
    assert_eq!(config.transfer().cooldown(), Duration::from_secs(20));
    assert_eq!(config.disambiguation().timeout(), Duration::from_secs(30));
    assert_eq!(config.pagination().idle_timeout(), Duration::from_secs(120));
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[bot]
prefix = "!"

[import]
size_limit = 1000
"#
    )
    .unwrap();

    let config = EmoteConfig::from_file(file.path()).unwrap();

    assert_eq!(config.bot().prefix(), "!");
    assert_eq!(*config.import().size_limit(), 1000);
    // Untouched sections keep their defaults
    assert_eq!(*config.transfer().cooldown_secs(), 20);
}

#[test]
fn test_invalid_values_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[import]
size_limit = 0
"#
    )
    .unwrap();

    assert!(EmoteConfig::from_file(file.path()).is_err());
}
