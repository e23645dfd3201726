//! Configuration files, environment overrides and validation
use e_fleet::layout::LayoutMode;
use e_fleet::{FleetConfig, FleetError, GridConfig, LayoutKind};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.json");

    let mut config = FleetConfig::default();
    config.layout.mode = LayoutKind::Custom;
    config.layout.custom = GridConfig::new(2, 3);
    config.lifecycle.enabled = true;
    config.scan.exact_names = vec!["Messenger.exe".to_string()];
    config.save_to_file(&path).unwrap();

    let loaded = FleetConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.json");
    std::fs::write(&path, r#"{ "layout": { "mode": "chaotic", "chaotic_seed": 5 } }"#).unwrap();

    let config = FleetConfig::load_from_file(&path).unwrap();
    assert_eq!(config.layout.mode, LayoutKind::Chaotic);
    assert_eq!(config.layout.to_mode(), LayoutMode::Chaotic { seed: Some(5) });
    assert_eq!(config.arrange.resolve_timeout(), Duration::from_millis(5000));
    assert_eq!(config.scan.extension.as_deref(), Some("exe"));
}

#[test]
fn test_broken_and_missing_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();

    assert!(matches!(
        FleetConfig::load_from_file(&broken),
        Err(FleetError::ConfigError(_))
    ));
    assert!(matches!(
        FleetConfig::load_from_file(dir.path().join("absent.json")),
        Err(FleetError::IoError(_))
    ));
}

#[test]
fn test_environment_overrides() {
    let config = FleetConfig::default().with_overrides(overrides(&[
        ("FLEET_LAYOUT_MODE", "Custom"),
        ("FLEET_MONITOR", "1"),
        ("FLEET_CUSTOM_COLS", "4"),
        ("FLEET_CUSTOM_ROWS", "3"),
        ("FLEET_TRACK_EXITS", "TRUE"),
        ("FLEET_MIN_LIFETIME_MS", "2500"),
        ("FLEET_RESOLVE_TIMEOUT_MS", "8000"),
    ]));

    assert_eq!(config.layout.monitor_index, 1);
    assert_eq!(config.layout.to_mode(), LayoutMode::CustomGrid { cols: 4, rows: 3 });
    assert!(config.lifecycle.enabled);
    assert_eq!(config.lifecycle.min_lifetime(), Duration::from_millis(2500));
    assert_eq!(config.arrange.resolve_timeout(), Duration::from_millis(8000));
}

#[test]
fn test_unparseable_overrides_are_ignored() {
    let config = FleetConfig::default().with_overrides(overrides(&[
        ("FLEET_LAYOUT_MODE", "spiral"),
        ("FLEET_MONITOR", "second"),
        ("FLEET_MIN_LIFETIME_MS", "-1"),
    ]));
    assert_eq!(config, FleetConfig::default());
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = FleetConfig::default();
    config.scan.name_patterns.clear();
    assert!(matches!(config.validate(), Err(FleetError::ConfigError(_))));

    let mut config = FleetConfig::default();
    config.layout.selected_cells = vec![3, 50];
    assert!(config.validate().is_err());

    let mut config = FleetConfig::default();
    config.arrange.poll_interval_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_custom_grid_zero_dims_are_floored() {
    let mut config = FleetConfig::default();
    config.layout.mode = LayoutKind::Custom;
    config.layout.custom = GridConfig::new(0, 0);
    assert_eq!(config.layout.to_mode(), LayoutMode::CustomGrid { cols: 1, rows: 1 });
}

#[test]
fn test_scan_request_from_config() {
    let mut config = FleetConfig::default();
    config.scan.name_patterns = vec!["Unigram".to_string()];
    config.scan.extension = None;

    let known = vec![PathBuf::from("/fleet/a/unigram")];
    let request = config.scan.request("/fleet", known);

    assert!(request.matcher.matches("UNIGRAM"));
    assert!(!request.matcher.matches("Telegram.exe"));
    assert_eq!(request.extension, None);
    assert!(request.is_known(&PathBuf::from("/FLEET/A/Unigram")));
}

#[test]
fn test_strip_modes_from_environment() {
    let config =
        FleetConfig::default().with_overrides(overrides(&[("FLEET_LAYOUT_MODE", "horizontal")]));
    assert_eq!(config.layout.mode, LayoutKind::Horizontal);
    assert_eq!(config.layout.to_mode(), LayoutMode::Horizontal);

    let config =
        FleetConfig::default().with_overrides(overrides(&[("FLEET_LAYOUT_MODE", " Vertical ")]));
    assert_eq!(config.layout.to_mode(), LayoutMode::Vertical);

    let json = serde_json::to_string(&config.layout.mode).unwrap();
    assert_eq!(json, "\"vertical\"");
}
