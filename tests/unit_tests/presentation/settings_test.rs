use voice_detector::domain::Classification;
use voice_detector::presentation::config::{DEFAULT_API_KEY, Settings};
use voice_detector::presentation::Environment;

#[test]
fn given_no_settings_file_when_loading_then_defaults_apply() {
    let dir = tempfile::tempdir().unwrap();

    let settings = Settings::load_from(Environment::Test, dir.path()).unwrap();

    assert_eq!(settings.audio.sample_rate, 16_000);
    assert_eq!(settings.audio.min_samples, 16_000);
    assert_eq!(settings.labels.fallback_ai_index, 1);
    assert!(settings.model.id.contains("Deepfake-audio-detection"));
}

#[test]
fn given_environment_settings_file_when_loading_then_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("appsettings.test.toml"),
        r#"
[audio]
min_samples = 32000
transcode_enabled = false

[labels]
ai_patterns = ["synthetic"]
human_patterns = ["genuine"]
fallback_ai_index = 0
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Environment::Test, dir.path()).unwrap();

    assert_eq!(settings.audio.min_samples, 32_000);
    assert!(!settings.audio.transcode_enabled);
    assert_eq!(settings.labels.ai_patterns, vec!["synthetic"]);
}

#[test]
fn given_label_settings_when_building_policy_then_rules_follow_configuration() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("appsettings.test.toml"),
        "[labels]\nai_patterns = [\"synthetic\"]\nhuman_patterns = [\"genuine\"]\nfallback_ai_index = 0\n",
    )
    .unwrap();

    let policy = Settings::load_from(Environment::Test, dir.path())
        .unwrap()
        .labels
        .to_policy();

    assert_eq!(policy.classify(1, "SYNTHETIC"), Classification::AiGenerated);
    assert_eq!(policy.classify(0, "genuine"), Classification::Human);
    assert_eq!(policy.classify(0, "LABEL_0"), Classification::AiGenerated);
}

#[test]
fn given_settings_file_for_other_environment_when_loading_then_it_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("appsettings.prod.toml"), "[audio]\nmin_samples = 1\n").unwrap();

    let settings = Settings::load_from(Environment::Test, dir.path()).unwrap();

    assert_eq!(settings.audio.min_samples, 16_000);
}

#[test]
fn given_auth_settings_when_debug_formatted_then_key_is_redacted() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(Environment::Test, dir.path()).unwrap();

    let rendered = format!("{:?}", settings.auth);

    assert!(!rendered.contains(DEFAULT_API_KEY));
    assert!(rendered.contains("REDACTED"));
}
