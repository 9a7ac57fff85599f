use super::{apply_env, apply_file, load_settings, FileSettings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_core_debounce() {
    let settings = Settings::default();
    assert_eq!(settings.viewport_debounce_ms, 250);
    assert_eq!(settings.log_level, "info");
    assert!(!settings.dump_state);
}

#[test]
fn file_values_override_defaults() {
    let file_cfg: FileSettings =
        toml::from_str("viewport_debounce_ms = 100\ndump_state = true\n").expect("toml");
    let mut settings = Settings::default();
    apply_file(&mut settings, file_cfg);

    assert_eq!(settings.viewport_debounce_ms, 100);
    assert!(settings.dump_state);
    assert_eq!(settings.log_level, "info");
}

#[test]
fn app_prefixed_env_wins_over_short_form() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("REPLAY_DEBOUNCE_MS", "40"),
            ("APP__VIEWPORT_DEBOUNCE_MS", "80"),
            ("REPLAY_LOG", "debug"),
        ]),
    );

    assert_eq!(settings.viewport_debounce_ms, 80);
    assert_eq!(settings.log_level, "debug");
}

#[test]
fn unparsable_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[("REPLAY_DEBOUNCE_MS", "soon"), ("APP__LOG_LEVEL", " ")]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("replay_missing_{suffix}.toml"));

    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("replay_config_{suffix}.toml"));
    fs::write(&path, "dump_state = true\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("settings");
    fs::remove_file(&path).expect("cleanup");

    assert!(settings.dump_state);
}
