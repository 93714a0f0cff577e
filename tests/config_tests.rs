//! Config file loading and hot-reload tests
//!
//! Exercises `NodeConfig::load_from_file` and `ConfigReloader` against
//! real files in a temp directory.

use std::io::Write;
use std::time::Duration;

use fog_node::config::watcher::ConfigReloader;
use fog_node::config::{ConfigError, NodeConfig, SettingsCell, SettingsPatch};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_CONFIG: &str = r#"
[device]
ip = "10.1.1.20"
sample_path = "next"
actuation_path = "flags"

[sampling]
sample_period_secs = 0.25
window_secs = 5.0

[cloud]
url = "http://localhost:3000/api/intelligence/insert"
idle_report_interval_secs = 30.0

[timeouts]
fetch_ms = 200
actuation_ms = 200
cloud_ms = 5000

[server]
addr = "127.0.0.1:8090"

[health.weights]
thermal = 0.4
mechanical = 0.3
electrical = 0.2
load = 0.1

[health.decision]
thermal_protection_temp_c = 170.0
"#;

#[test]
fn full_file_overrides_every_section() {
    let file = write_config(FULL_CONFIG);
    let cfg = NodeConfig::load_from_file(file.path()).unwrap();

    assert_eq!(cfg.device.ip, "10.1.1.20");
    assert_eq!(cfg.server.addr, "127.0.0.1:8090");
    assert_eq!(cfg.timeouts.cloud_ms, 5000);
    assert_eq!(cfg.cloud.idle_report_interval(), Duration::from_secs(30));
    assert_eq!(cfg.health.weights.thermal, 0.4);
    assert_eq!(cfg.health.decision.thermal_protection_temp_c, 170.0);
    // Untouched keys keep their defaults
    assert_eq!(
        cfg.health.decision.emergency_health,
        NodeConfig::default().health.decision.emergency_health
    );

    let link = cfg.link_settings();
    assert_eq!(link.device_ip, "10.1.1.20");
    assert_eq!(link.window_capacity(), 20);
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let cfg = NodeConfig::load_from_file(file.path()).unwrap();
    assert_eq!(cfg, NodeConfig::default());
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let file = write_config("[sampling]\nwindow_sec = 4.0\n");
    let cfg = NodeConfig::load_from_file(file.path()).unwrap();
    assert_eq!(cfg.sampling.window_secs, NodeConfig::default().sampling.window_secs);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NodeConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
}

#[test]
fn bad_toml_is_parse_error_with_path() {
    let file = write_config("[sampling\nwindow_secs = ");
    match NodeConfig::load_from_file(file.path()).unwrap_err() {
        ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn out_of_range_values_are_collected() {
    let file = write_config(
        r#"
[sampling]
sample_period_secs = 0.0

[health.weights]
thermal = 0.9
"#,
    );
    match NodeConfig::load_from_file(file.path()).unwrap_err() {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("sample_period_secs")), "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("health.weights")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

/// Reloader and live cell seeded from the file as it is now.
fn watch(file: &NamedTempFile, overrides: SettingsPatch) -> (ConfigReloader, SettingsCell) {
    let baseline = NodeConfig::load_from_file(file.path()).unwrap().link_settings();
    let cell = SettingsCell::new(baseline.merged(&overrides));
    let reloader = ConfigReloader::new(file.path().to_path_buf(), baseline, overrides);
    (reloader, cell)
}

#[test]
fn reload_swaps_changed_link_settings() {
    let file = write_config("[device]\nip = \"10.0.0.1\"\n");
    let (mut reloader, cell) = watch(&file, SettingsPatch::default());

    // Unchanged file: nothing to swap
    assert!(reloader.reload(&cell).unwrap().is_empty());

    std::fs::write(
        file.path(),
        "[device]\nip = \"10.0.0.2\"\n\n[sampling]\nwindow_secs = 4.0\n",
    )
    .unwrap();

    let changes = reloader.reload(&cell).unwrap();
    assert_eq!(changes.len(), 2, "{changes:?}");
    assert!(changes.iter().any(|c| c.starts_with("device_ip")));
    assert!(changes.iter().any(|c| c.starts_with("window_secs")));

    let live = cell.load();
    assert_eq!(live.device_ip, "10.0.0.2");
    assert_eq!(live.window_secs, 4.0);
}

#[test]
fn invalid_reload_keeps_live_settings() {
    let file = write_config("[device]\nip = \"10.0.0.1\"\n");
    let (mut reloader, cell) = watch(&file, SettingsPatch::default());

    std::fs::write(file.path(), "[sampling]\nsample_period_secs = -2.0\n").unwrap();
    assert!(matches!(reloader.reload(&cell), Err(ConfigError::Validation(_))));
    assert_eq!(cell.load().device_ip, "10.0.0.1");
}

/// An edit to one file field must not undo the command-line device address
/// or an operator's API edit to a different field.
#[test]
fn unrelated_file_edit_keeps_cli_and_api_settings() {
    let file = write_config(
        "[device]\nip = \"10.0.0.1\"\n\n[sampling]\nsample_period_secs = 0.5\nwindow_secs = 10.0\n",
    );
    let cli = SettingsPatch {
        device_ip: Some("192.168.9.9".to_string()),
        ..SettingsPatch::default()
    };
    let (mut reloader, cell) = watch(&file, cli);
    assert_eq!(cell.load().device_ip, "192.168.9.9");

    // Operator shortens the window over the API
    cell.update(&SettingsPatch {
        window_secs: Some(5.0),
        ..SettingsPatch::default()
    })
    .unwrap();

    std::fs::write(
        file.path(),
        "[device]\nip = \"10.0.0.1\"\n\n[sampling]\nsample_period_secs = 0.25\nwindow_secs = 10.0\n",
    )
    .unwrap();

    let changes = reloader.reload(&cell).unwrap();
    assert_eq!(changes.len(), 1, "{changes:?}");
    assert!(changes[0].starts_with("sample_period_secs"));

    let live = cell.load();
    assert_eq!(live.device_ip, "192.168.9.9");
    assert_eq!(live.window_secs, 5.0);
    assert_eq!(live.sample_period_secs, 0.25);
}

/// A device address edited in the file is masked while the command line pins it.
#[test]
fn file_device_ip_edit_is_masked_by_cli_override() {
    let file = write_config("[device]\nip = \"10.0.0.1\"\n");
    let cli = SettingsPatch {
        device_ip: Some("192.168.9.9".to_string()),
        ..SettingsPatch::default()
    };
    let (mut reloader, cell) = watch(&file, cli);

    std::fs::write(file.path(), "[device]\nip = \"10.0.0.3\"\n").unwrap();
    assert!(reloader.reload(&cell).unwrap().is_empty());
    assert_eq!(cell.load().device_ip, "192.168.9.9");
}
