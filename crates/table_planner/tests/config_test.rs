//! Tests for layered configuration files.

use std::path::PathBuf;
use table_planner::{CONFIG_FILE_NAME, PlannerConfig, WindowLimit};

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_missing_files_give_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = PlannerConfig::from_sources(&[dir.path().join(CONFIG_FILE_NAME)], false);
    assert_eq!(config, PlannerConfig::default());
}

#[test]
fn test_later_files_override_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    let user = write(
        &dir,
        "user.json",
        r#"{ "rate_limits": { "user_command_limit": 5, "guild_command_limit": 20 } }"#,
    );
    let data = write(
        &dir,
        "data.json",
        r#"{ "rate_limits": { "user_command_limit": 7 },
             "my_tables": { "column_widths": { "status": 12 } } }"#,
    );

    let config = PlannerConfig::from_sources(&[user, data], false);
    assert_eq!(config.rate_limits.user, WindowLimit::new(7, 10));
    assert_eq!(config.rate_limits.guild, WindowLimit::new(20, 10));
    assert_eq!(config.my_tables.status, 12);
    assert_eq!(config.list_tables.status, 10);
}

#[test]
fn test_malformed_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(
        &dir,
        "good.json",
        r#"{ "list_tables": { "column_widths": { "gm": 16 } } }"#,
    );
    let broken = write(&dir, "broken.json", "{ \"list_tables\": ");

    let config = PlannerConfig::from_sources(&[good, broken], false);
    assert_eq!(config.list_tables.gm, 16);
    assert_eq!(config.rate_limits, PlannerConfig::default().rate_limits);
}

#[test]
fn test_load_reads_data_dir_config() {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir,
        CONFIG_FILE_NAME,
        r#"{ "rate_limits": { "list_cooldown_seconds": 90 } }"#,
    );

    let config = PlannerConfig::load(dir.path());
    assert_eq!(config.rate_limits.list_cooldown_seconds, 90);
}
