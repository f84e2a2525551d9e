use super::{load_settings_with, normalize_api_base_url, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use shared::domain::EmployeeId;

fn temp_settings_file(tag: &str, contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("workdesk_config_test_{tag}_{suffix}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("workdesk.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn cleanup(path: &Path) {
    let dir = path.parent().expect("parent");
    fs::remove_dir_all(dir).expect("cleanup");
}

fn missing_path() -> PathBuf {
    env::temp_dir().join("workdesk_config_test_missing/workdesk.toml")
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_with(&missing_path(), env_from(&[])).expect("load");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api_base_url, "http://localhost:8000/");
    assert_eq!(settings.employee_id, EmployeeId(10002));
    assert_eq!(settings.cache_ttl(), Duration::from_secs(300));
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "file",
        r#"api_base_url = "http://api.internal:9000"
employee_id = 10007
cache_ttl_seconds = 30
"#,
    );

    let settings = load_settings_with(&path, env_from(&[])).expect("load");
    assert_eq!(settings.api_base_url, "http://api.internal:9000/");
    assert_eq!(settings.employee_id, EmployeeId(10007));
    assert_eq!(settings.cache_ttl_seconds, 30);

    cleanup(&path);
}

#[test]
fn environment_overrides_file() {
    let path = temp_settings_file(
        "env",
        "api_base_url = \"http://from-file\"\nemployee_id = 1\n",
    );

    let settings = load_settings_with(
        &path,
        env_from(&[
            ("WORKDESK_API_URL", "http://from-env:8000"),
            ("WORKDESK_EMPLOYEE_ID", "10003"),
            ("APP__CACHE_TTL_SECONDS", "5"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.api_base_url, "http://from-env:8000/");
    assert_eq!(settings.employee_id, EmployeeId(10003));
    assert_eq!(settings.cache_ttl_seconds, 5);

    cleanup(&path);
}

#[test]
fn app_prefixed_base_url_wins_over_workdesk_variable() {
    let settings = load_settings_with(
        &missing_path(),
        env_from(&[
            ("WORKDESK_API_URL", "http://first"),
            ("APP__API_BASE_URL", "http://second"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.api_base_url, "http://second/");
}

#[test]
fn invalid_env_numbers_are_ignored() {
    let settings = load_settings_with(
        &missing_path(),
        env_from(&[
            ("WORKDESK_EMPLOYEE_ID", "abc"),
            ("APP__CACHE_TTL_SECONDS", "-3"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.employee_id, EmployeeId(10002));
    assert_eq!(settings.cache_ttl_seconds, 300);
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_settings_file("malformed", "employee_id = \"not a number\"\n");

    let err = load_settings_with(&path, env_from(&[])).expect_err("bad toml");
    assert!(err.to_string().contains("invalid settings file"));

    cleanup(&path);
}

#[test]
fn normalizes_base_urls() {
    assert_eq!(normalize_api_base_url(""), "http://localhost:8000/");
    assert_eq!(normalize_api_base_url("  "), "http://localhost:8000/");
    assert_eq!(
        normalize_api_base_url("api.local:8000"),
        "http://api.local:8000/"
    );
    assert_eq!(
        normalize_api_base_url("https://erp.example.com/backend"),
        "https://erp.example.com/backend/"
    );
    assert_eq!(normalize_api_base_url("http://host/"), "http://host/");
}

#[test]
fn zero_ttl_is_raised_to_one_second() {
    let settings = Settings {
        cache_ttl_seconds: 0,
        ..Settings::default()
    };
    assert_eq!(settings.cache_ttl(), Duration::from_secs(1));
}
